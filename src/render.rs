use crate::value::{Number, Value};
use std::collections::BTreeMap;
use std::fmt::Write;

// ── YAML ────────────────────────────────────────────────────────────

/// Render a value as block-style YAML without the final newline. Writers
/// that emit it as a document add the newline back.
///
/// This is the canonical text form used for output comparison, for
/// substituting structured values into text, and for diagnostics.
pub fn to_yaml(value: &Value) -> String {
    match serde_yaml::to_string(&to_serde_yaml(value)) {
        Ok(mut text) => {
            if text.ends_with('\n') {
                text.pop();
            }
            text
        }
        // Only reachable for values serde_yaml cannot represent
        Err(_) => to_flow(value),
    }
}

/// Inverse of `from_yaml::convert`.
fn to_serde_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Number(Number::Integer(i)) => serde_yaml::Value::Number((*i).into()),
        Value::Number(Number::Float(x)) => serde_yaml::Value::Number((*x).into()),
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::Sequence(items) => {
            serde_yaml::Value::Sequence(items.iter().map(to_serde_yaml).collect())
        }
        Value::Mapping(map) => serde_yaml::Value::Mapping(
            map.iter()
                .map(|(key, item)| {
                    (serde_yaml::Value::String(key.clone()), to_serde_yaml(item))
                })
                .collect(),
        ),
    }
}

/// Render a value on a single line in YAML flow style: `[a, b]`, `{k: v}`.
pub fn to_flow(value: &Value) -> String {
    let mut buf = String::new();
    write_flow(&mut buf, value);
    buf
}

/// Flow style for sequences, block style for everything else.
pub fn to_display(value: &Value) -> String {
    match value {
        Value::Sequence(_) => to_flow(value),
        _ => to_yaml(value),
    }
}

fn write_flow(buf: &mut String, value: &Value) {
    match value {
        Value::Sequence(items) => {
            buf.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push_str(", ");
                }
                write_flow(buf, item);
            }
            buf.push(']');
        }
        Value::Mapping(map) => {
            buf.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    buf.push_str(", ");
                }
                buf.push_str(&yaml_string(key));
                buf.push_str(": ");
                write_flow(buf, item);
            }
            buf.push('}');
        }
        Value::String(s) if s.contains('\n') => buf.push_str(&double_quoted(s)),
        scalar => buf.push_str(&yaml_scalar(scalar)),
    }
}

fn yaml_scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => yaml_string(s),
        Value::Sequence(_) => "[]".to_string(),
        Value::Mapping(_) => "{}".to_string(),
    }
}

fn yaml_string(s: &str) -> String {
    if is_plain_safe(s) {
        s.to_string()
    } else {
        double_quoted(s)
    }
}

/// Whether `s` can be written unquoted and still read back as the same string.
fn is_plain_safe(s: &str) -> bool {
    const RESERVED: &[&str] = &[
        "null", "~", "true", "false", "yes", "no", "on", "off", "y", "n", ".inf", "-.inf",
        ".nan",
    ];
    const INDICATORS: &str = "-?:,[]{}#&*!|>'\"%@`";

    let Some(first) = s.chars().next() else {
        return false;
    };
    if INDICATORS.contains(first) || first.is_whitespace() {
        return false;
    }
    if s.ends_with(char::is_whitespace) || s.ends_with(':') {
        return false;
    }
    if RESERVED.iter().any(|r| r.eq_ignore_ascii_case(s)) {
        return false;
    }
    if s.parse::<f64>().is_ok() || s.starts_with("0x") || s.starts_with("0o") {
        return false;
    }
    !(s.contains(": ") || s.contains(" #") || s.chars().any(char::is_control))
}

fn double_quoted(s: &str) -> String {
    let mut buf = String::new();
    write_escaped(&mut buf, s);
    buf
}

fn write_escaped(buf: &mut String, s: &str) {
    buf.push('"');
    for ch in s.chars() {
        match ch {
            '"' => buf.push_str("\\\""),
            '\\' => buf.push_str("\\\\"),
            '\n' => buf.push_str("\\n"),
            '\r' => buf.push_str("\\r"),
            '\t' => buf.push_str("\\t"),
            c if c < '\u{0020}' => {
                let _ = write!(buf, "\\u{:04x}", c as u32);
            }
            c => buf.push(c),
        }
    }
    buf.push('"');
}

// ── JSON ────────────────────────────────────────────────────────────

/// Pretty JSON writer: 2-space indent, one entry per line.
struct JsonWriter {
    buf: String,
    depth: usize,
}

impl JsonWriter {
    fn new() -> Self {
        JsonWriter {
            buf: String::new(),
            depth: 0,
        }
    }

    fn newline(&mut self) {
        self.buf.push('\n');
        for _ in 0..self.depth {
            self.buf.push_str("  ");
        }
    }

    fn write_value(&mut self, value: &Value) {
        match value {
            Value::Null => self.buf.push_str("null"),
            Value::Bool(b) => self.buf.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.write_number(*n),
            Value::String(s) => write_escaped(&mut self.buf, s),
            Value::Sequence(items) => self.write_array(items),
            Value::Mapping(map) => self.write_object(map),
        }
    }

    fn write_number(&mut self, n: Number) {
        match n {
            Number::Integer(i) => {
                let _ = write!(self.buf, "{}", i);
            }
            // JSON has no NaN or infinity
            Number::Float(x) if !x.is_finite() => self.buf.push_str("null"),
            Number::Float(x) => {
                let _ = write!(self.buf, "{}", x);
            }
        }
    }

    fn write_array(&mut self, items: &[Value]) {
        self.buf.push('[');
        self.depth += 1;

        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            self.newline();
            self.write_value(item);
        }

        self.depth -= 1;
        if !items.is_empty() {
            self.newline();
        }
        self.buf.push(']');
    }

    fn write_object(&mut self, map: &BTreeMap<String, Value>) {
        self.buf.push('{');
        self.depth += 1;

        for (i, (key, item)) in map.iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            self.newline();
            write_escaped(&mut self.buf, key);
            self.buf.push_str(": ");
            self.write_value(item);
        }

        self.depth -= 1;
        if !map.is_empty() {
            self.newline();
        }
        self.buf.push('}');
    }
}

/// Serialize a value to pretty-printed JSON (2-space indent).
pub fn to_json_pretty(value: &Value) -> String {
    let mut w = JsonWriter::new();
    w.write_value(value);
    w.buf
}
