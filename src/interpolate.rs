use crate::error::ResolveError;
use crate::value::Value;
use crate::variables::Variables;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn reference_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("reference pattern is valid"))
}

/// The result of substituting references inside a piece of text.
///
/// Unresolvable references are left in `text` verbatim; `error` holds the
/// first such failure.
#[derive(Debug, Clone, PartialEq)]
pub struct TextResolution {
    pub text: String,
    pub error: Option<ResolveError>,
}

impl TextResolution {
    pub fn into_result(self) -> Result<String, ResolveError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.text),
        }
    }
}

/// If `s` is exactly one `${reference}`, the reference body.
pub fn whole_reference(s: &str) -> Option<&str> {
    let caps = reference_regex().captures(s)?;
    let whole = caps.get(0)?;
    if whole.start() == 0 && whole.end() == s.len() {
        caps.get(1).map(|m| m.as_str())
    } else {
        None
    }
}

/// Replace every `${reference}` in `raw` with the text form of its value.
/// Sequences and mappings are substituted as block YAML.
pub fn resolve_text(raw: &str, vars: &Variables) -> TextResolution {
    let mut first_error = None;
    let text = reference_regex().replace_all(raw, |caps: &Captures| {
        match vars.lookup(&caps[1]) {
            Ok(value) => value.to_text(),
            Err(err) => {
                first_error.get_or_insert(err);
                caps[0].to_string()
            }
        }
    });
    TextResolution {
        text: text.into_owned(),
        error: first_error,
    }
}

/// Resolve references everywhere inside `value`, depth-first.
///
/// A string that is exactly one reference becomes the referenced value
/// itself, keeping its structure. If that reference cannot be resolved the
/// string is kept unchanged rather than reported.
pub fn resolve_value(value: &Value, vars: &Variables) -> Result<Value, ResolveError> {
    match value {
        Value::String(s) => resolve_string(s, vars, &mut Vec::new()),
        Value::Sequence(items) => items
            .iter()
            .map(|item| resolve_value(item, vars))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence),
        Value::Mapping(map) => map
            .iter()
            .map(|(key, item)| Ok((key.clone(), resolve_value(item, vars)?)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Value::Mapping),
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(value.clone()),
    }
}

/// `seen` holds the references already followed for this string, so a
/// variable whose value refers back to itself stops instead of looping.
fn resolve_string(
    s: &str,
    vars: &Variables,
    seen: &mut Vec<String>,
) -> Result<Value, ResolveError> {
    let Some(reference) = whole_reference(s) else {
        return resolve_text(s, vars).into_result().map(Value::String);
    };
    if seen.iter().any(|r| r == reference) {
        return Ok(Value::String(s.to_string()));
    }
    match vars.lookup(reference) {
        Ok(Value::String(inner)) => {
            seen.push(reference.to_string());
            resolve_string(inner, vars, seen)
        }
        Ok(resolved) => Ok(resolved.clone()),
        Err(_) => Ok(Value::String(s.to_string())),
    }
}
