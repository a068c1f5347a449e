//! Intermediate representation produced by the parser and consumed by the
//! interpreter.

use crate::value::Value;

/// A single script command, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `Print: text`: write resolved text to stdout and the output register.
    Print(String),
    /// `Output: value`: store the resolved value in the output register.
    Output(Value),
    /// `Expected output: value`: compare against the output register.
    ExpectedOutput(Value),
    /// `Assert equals: { actual, expected }`
    AssertEquals { actual: Value, expected: Value },
    /// `Assert that: { ... }`: the raw predicate tree, decoded after resolution.
    AssertThat(Value),
    /// `As: ${name}`: bind the output register to `name`.
    AsAlias(String),
    /// `${name}: value`: declarative binding.
    VarAssignment { name: String, value: Value },
    /// `Test case: name`: structural marker, no runtime effect.
    TestCaseMarker(String),
}

impl Command {
    /// The document key this command was written with.
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::Print(_) => "Print",
            Command::Output(_) => "Output",
            Command::ExpectedOutput(_) => "Expected output",
            Command::AssertEquals { .. } => "Assert equals",
            Command::AssertThat(_) => "Assert that",
            Command::AsAlias(_) => "As",
            Command::VarAssignment { .. } => "variable assignment",
            Command::TestCaseMarker(_) => "Test case",
        }
    }
}

/// A declared script input: `input: { name: { description, default } }`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputParam {
    pub name: String,
    pub description: String,
    pub default: Option<Value>,
}

/// The section before the `---` divider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptMetadata {
    pub description: String,
    /// In declaration order.
    pub input: Vec<InputParam>,
}

impl ScriptMetadata {
    pub fn input_param(&self, name: &str) -> Option<&InputParam> {
        self.input.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedScript {
    pub metadata: ScriptMetadata,
    pub commands: Vec<Command>,
}
