use crate::error::ParseError;
use crate::value::{Number, Value};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Decode every document in a YAML stream, in order, keeping the raw
/// `serde_yaml` form so top-level key order survives. Empty documents
/// are dropped.
pub fn documents(input: &str) -> Result<Vec<serde_yaml::Value>, ParseError> {
    let mut docs = Vec::new();
    for de in serde_yaml::Deserializer::from_str(input) {
        let doc = serde_yaml::Value::deserialize(de)?;
        if !doc.is_null() {
            docs.push(doc);
        }
    }
    Ok(docs)
}

/// Convert a decoded `serde_yaml` value into a `Value`.
/// Tags are dropped; mapping keys must be scalars.
pub fn convert(raw: serde_yaml::Value) -> Result<Value, ParseError> {
    Ok(match raw {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => Value::Number(convert_number(&n)),
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => Value::Sequence(
            items
                .into_iter()
                .map(convert)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        serde_yaml::Value::Mapping(map) => {
            let mut result = BTreeMap::new();
            for (key, item) in map {
                result.insert(key_string(&key)?, convert(item)?);
            }
            Value::Mapping(result)
        }
        serde_yaml::Value::Tagged(tagged) => convert(tagged.value)?,
    })
}

fn convert_number(n: &serde_yaml::Number) -> Number {
    match n.as_i64() {
        Some(i) => Number::Integer(i),
        // u64 beyond i64::MAX and real floats both land here
        None => Number::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

/// The string form of a scalar mapping key.
pub fn key_string(key: &serde_yaml::Value) -> Result<String, ParseError> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(convert_number(n).to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => key_string(&tagged.value),
        other => Err(ParseError::UnsupportedKey(format!("{:?}", other))),
    }
}
