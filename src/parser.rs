use crate::ast::*;
use crate::error::ParseError;
use crate::from_yaml::{convert, documents, key_string};
use crate::interpolate::whole_reference;
use crate::value::Value;
use serde::Deserialize;
use tracing::debug;

/// Parse a script document.
///
/// A document with a `---` divider line has metadata before the divider and
/// commands after it. Without a divider the whole document is commands.
pub fn parse(input: &str) -> Result<ParsedScript, ParseError> {
    match split_at_divider(input) {
        Some((head, body)) => Ok(ParsedScript {
            metadata: parse_metadata(head)?,
            commands: parse_commands(body)?,
        }),
        None => Ok(ParsedScript {
            metadata: ScriptMetadata::default(),
            commands: parse_commands(input)?,
        }),
    }
}

/// Split at the first line consisting of exactly `---`.
fn split_at_divider(input: &str) -> Option<(&str, &str)> {
    let mut start = 0;
    for line in input.split_inclusive('\n') {
        let end = start + line.len();
        if line.ends_with('\n') && line.trim_end_matches(['\n', '\r']) == "---" {
            return Some((&input[..start], &input[end..]));
        }
        start = end;
    }
    None
}

// ── Metadata ────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawMetadata {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    input: Option<serde_yaml::Mapping>,
}

#[derive(Deserialize, Default)]
struct RawInputParam {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    default: Option<serde_yaml::Value>,
}

fn parse_metadata(input: &str) -> Result<ScriptMetadata, ParseError> {
    let docs = documents(input)?;
    let Some(doc) = docs.into_iter().next() else {
        return Ok(ScriptMetadata::default());
    };
    let raw: RawMetadata =
        serde_yaml::from_value(doc).map_err(|e| ParseError::Metadata(e.to_string()))?;

    let mut metadata = ScriptMetadata {
        description: raw.description.unwrap_or_default(),
        input: Vec::new(),
    };
    for (key, param) in raw.input.unwrap_or_default() {
        let name = key_string(&key)?;
        let param: RawInputParam = if param.is_null() {
            RawInputParam::default()
        } else {
            serde_yaml::from_value(param)
                .map_err(|e| ParseError::Metadata(format!("input '{}': {}", name, e)))?
        };
        metadata.input.push(InputParam {
            name,
            description: param.description.unwrap_or_default(),
            default: param.default.map(convert).transpose()?,
        });
    }
    Ok(metadata)
}

// ── Commands ────────────────────────────────────────────────────────

/// Decode every top-level key of every document into a command, in the
/// order the keys appear. A document may also be a list of such mappings.
fn parse_commands(input: &str) -> Result<Vec<Command>, ParseError> {
    let mut commands = Vec::new();
    for doc in documents(input)? {
        match doc {
            serde_yaml::Value::Mapping(map) => decode_mapping(map, &mut commands)?,
            serde_yaml::Value::Sequence(items) => {
                for item in items {
                    match item {
                        serde_yaml::Value::Mapping(map) => decode_mapping(map, &mut commands)?,
                        serde_yaml::Value::Null => {}
                        other => {
                            return Err(ParseError::Commands(format!(
                                "expected a mapping of commands, found {:?}",
                                other
                            )))
                        }
                    }
                }
            }
            other => {
                return Err(ParseError::Commands(format!(
                    "expected a mapping of commands, found {:?}",
                    other
                )))
            }
        }
    }
    Ok(commands)
}

fn decode_mapping(map: serde_yaml::Mapping, out: &mut Vec<Command>) -> Result<(), ParseError> {
    for (key, value) in map {
        let key = key_string(&key)?;
        if let Some(cmd) = decode_command(&key, convert(value)?)? {
            out.push(cmd);
        }
    }
    Ok(())
}

type Decoder = fn(Value) -> Result<Command, ParseError>;

/// Recognized command keys.
const DECODERS: &[(&str, Decoder)] = &[
    ("Print", decode_print),
    ("Assert equals", decode_assert_equals),
    ("Assert that", decode_assert_that),
    ("Output", decode_output),
    ("Expected output", decode_expected_output),
    ("As", decode_as),
    ("Test case", decode_test_case),
];

/// Decode one `key: value` entry. Unrecognized keys yield `None`.
pub fn decode_command(key: &str, value: Value) -> Result<Option<Command>, ParseError> {
    if let Some((_, decode)) = DECODERS.iter().find(|(k, _)| *k == key) {
        return decode(value).map(Some);
    }
    if let Some(name) = assignment_target(key) {
        return Ok(Some(Command::VarAssignment {
            name: name.to_string(),
            value,
        }));
    }
    debug!(key, "ignoring unrecognized command");
    Ok(None)
}

/// `${name}` → `name`
fn assignment_target(key: &str) -> Option<&str> {
    key.strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|name| !name.is_empty())
}

fn decode_print(value: Value) -> Result<Command, ParseError> {
    Ok(Command::Print(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_text(),
    }))
}

fn decode_output(value: Value) -> Result<Command, ParseError> {
    Ok(Command::Output(value))
}

fn decode_expected_output(value: Value) -> Result<Command, ParseError> {
    Ok(Command::ExpectedOutput(value))
}

fn decode_test_case(value: Value) -> Result<Command, ParseError> {
    Ok(Command::TestCaseMarker(value.to_text()))
}

fn decode_assert_equals(value: Value) -> Result<Command, ParseError> {
    let invalid = |reason: &str| ParseError::InvalidCommand {
        command: "Assert equals",
        reason: reason.to_string(),
    };
    let Value::Mapping(mut map) = value else {
        return Err(invalid("expected a mapping with 'actual' and 'expected'"));
    };
    let actual = map
        .remove("actual")
        .ok_or_else(|| invalid("missing required parameter: actual"))?;
    let expected = map
        .remove("expected")
        .ok_or_else(|| invalid("missing required parameter: expected"))?;
    Ok(Command::AssertEquals { actual, expected })
}

fn decode_assert_that(value: Value) -> Result<Command, ParseError> {
    match value {
        Value::Mapping(_) => Ok(Command::AssertThat(value)),
        _ => Err(ParseError::InvalidCommand {
            command: "Assert that",
            reason: "expected a mapping of conditions".to_string(),
        }),
    }
}

fn decode_as(value: Value) -> Result<Command, ParseError> {
    match value.as_str().and_then(whole_reference) {
        Some(name) => Ok(Command::AsAlias(name.to_string())),
        None => Err(ParseError::InvalidCommand {
            command: "As",
            reason: "variable name must be in ${var} format".to_string(),
        }),
    }
}

// ── Test cases ──────────────────────────────────────────────────────

/// One section of a multi-case document.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub name: String,
    pub source: String,
}

/// Split a document on `---` divider lines into independent test cases.
///
/// Each case is named after its leading `Test case:` line. Blank sections
/// are skipped.
pub fn split_test_cases(input: &str) -> Vec<TestCase> {
    let mut cases = Vec::new();
    let mut current = String::new();
    for line in input.split_inclusive('\n') {
        if line.trim_end() == "---" {
            push_case(&mut cases, &current);
            current.clear();
        } else {
            current.push_str(line);
        }
    }
    push_case(&mut cases, &current);
    cases
}

fn push_case(cases: &mut Vec<TestCase>, section: &str) {
    let section = section.trim();
    if section.is_empty() {
        return;
    }
    let first_line = section.lines().next().unwrap_or_default();
    let name = match first_line.strip_prefix("Test case:") {
        Some(name) => name.trim().to_string(),
        None => "(unnamed)".to_string(),
    };
    cases.push(TestCase {
        name,
        source: format!("{}\n", section),
    });
}
