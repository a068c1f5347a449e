pub mod assert;
pub mod ast;
pub mod error;
pub mod from_yaml;
pub mod interpolate;
pub mod interpreter;
pub mod options;
pub mod parser;
pub mod path;
pub mod render;
pub mod value;
pub mod variables;

use ast::ParsedScript;
use error::{ParseError, ScriptError};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io;
use value::Value;

pub use parser::{split_test_cases, TestCase};

// ── Core API ───────────────────────────────────────────────────────

/// Parse a script document.
pub fn parse_script(data: &[u8]) -> Result<ParsedScript, ParseError> {
    let input = std::str::from_utf8(data)
        .map_err(|e| ParseError::Commands(format!("script is not valid UTF-8: {}", e)))?;
    parser::parse(input)
}

/// Execute a parsed script with the given input values, printing to stdout.
/// Returns the final output value, if any.
pub fn execute_script(
    script: &ParsedScript,
    input: &BTreeMap<String, String>,
) -> Result<Option<Value>, ScriptError> {
    execute_script_to(script, input, io::stdout().lock())
}

/// Like `execute_script`, but `Print` output goes to `out`.
pub fn execute_script_to<W: io::Write>(
    script: &ParsedScript,
    input: &BTreeMap<String, String>,
    out: W,
) -> Result<Option<Value>, ScriptError> {
    interpreter::execute(script, input, out)
}

/// Help text for a script: its description and declared inputs.
pub fn script_help(script: &ParsedScript) -> String {
    let mut help = String::new();
    help.push_str(&script.metadata.description);
    help.push_str("\n\n");

    if !script.metadata.input.is_empty() {
        help.push_str("Options:\n");
        for param in &script.metadata.input {
            let _ = write!(help, "  --{}   {}", param.name, param.description);
            if let Some(default) = &param.default {
                let _ = write!(help, " (default: {})", default.to_text());
            }
            help.push('\n');
        }
    }

    help
}
