use thiserror::Error;

/// A failure to turn a document into a `ParsedScript`.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("error decoding YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("error parsing script info: {0}")]
    Metadata(String),

    #[error("error parsing commands: {0}")]
    Commands(String),

    #[error("unsupported mapping key: {0}")]
    UnsupportedKey(String),

    #[error("invalid '{command}' command: {reason}")]
    InvalidCommand {
        command: &'static str,
        reason: String,
    },
}

/// A failure to navigate a path expression through a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("Cannot access key '{key}' on non-object")]
    NotAnObject { key: String },

    #[error("Key '{key}' not found")]
    KeyNotFound { key: String },

    #[error("Cannot index non-array with [{index}]")]
    NotASequence { index: i64 },

    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("Invalid path syntax: {reason} in '{path}'")]
    MalformedPath { path: String, reason: &'static str },
}

/// A `${...}` reference that could not be resolved.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("Unknown variable ${{{0}}}")]
    UnknownVariable(String),

    #[error("Cannot resolve ${{{reference}}}: {source}")]
    Path {
        reference: String,
        #[source]
        source: PathError,
    },
}

/// A failed `Assert equals` or `Assert that`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssertionError {
    #[error("Not equal:\n  Expected: {expected}\n  Actual:   {actual}")]
    NotEqual { expected: String, actual: String },

    #[error("Condition is false.\n{0}")]
    ConditionFalse(String),

    #[error("Condition is true when it should be false.\nNot: {0}")]
    NegationHeld(String),

    #[error("All conditions failed. Last error: {}", describe_last(.last))]
    AnyFailed { last: Option<Box<AssertionError>> },

    #[error("no valid condition specified")]
    NoConditionSpecified,

    #[error("invalid condition: {0}")]
    InvalidConditionShape(String),
}

fn describe_last(last: &Option<Box<AssertionError>>) -> String {
    match last {
        Some(err) => err.to_string(),
        None => "no conditions given".to_string(),
    }
}

/// A failure while executing a script. Execution stops at the first one.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("error parsing script: {0}")]
    Parse(#[from] ParseError),

    #[error("error resolving variables in {command}: {source}")]
    Resolve {
        command: &'static str,
        #[source]
        source: ResolveError,
    },

    #[error("As: output variable is empty")]
    EmptyOutput,

    #[error("Unexpected output.\n  Expected: {expected}\n  Actual:   {actual}")]
    UnexpectedOutput { expected: String, actual: String },

    #[error("assertion failed: {0}")]
    AssertionFailed(#[from] AssertionError),

    #[error("error writing output: {0}")]
    Io(#[from] std::io::Error),
}

impl ScriptError {
    pub(crate) fn resolve(command: &'static str) -> impl FnOnce(ResolveError) -> ScriptError {
        move |source| ScriptError::Resolve { command, source }
    }
}
