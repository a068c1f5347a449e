use crate::error::PathError;
use crate::value::Value;

/// One step of a path expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathStep<'a> {
    /// `.key`
    Key(&'a str),
    /// `[index]`
    Index(i64),
}

/// Split a reference like `var.path[0].foo` into (`var`, `.path[0].foo`).
pub fn split_reference(reference: &str) -> (&str, &str) {
    match reference.find(['.', '[']) {
        Some(i) => reference.split_at(i),
        None => (reference, ""),
    }
}

/// Iterator over the steps of a path expression, parsed as it goes.
pub struct PathSteps<'a> {
    path: &'a str,
    rest: &'a str,
}

impl<'a> PathSteps<'a> {
    pub fn new(path: &'a str) -> Self {
        PathSteps { path, rest: path }
    }

    fn malformed(&mut self, reason: &'static str) -> PathError {
        self.rest = "";
        PathError::MalformedPath {
            path: self.path.to_string(),
            reason,
        }
    }
}

impl<'a> Iterator for PathSteps<'a> {
    type Item = Result<PathStep<'a>, PathError>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest;
        let first = rest.chars().next()?;
        match first {
            '.' => {
                let key_part = &rest[1..];
                let end = key_part.find(['.', '[', ']']).unwrap_or(key_part.len());
                if end == 0 {
                    return Some(Err(self.malformed("empty key")));
                }
                self.rest = &key_part[end..];
                Some(Ok(PathStep::Key(&key_part[..end])))
            }
            '[' => {
                let Some(close) = rest.find(']') else {
                    return Some(Err(self.malformed("unmatched '['")));
                };
                let index = match rest[1..close].parse::<i64>() {
                    Ok(index) => index,
                    Err(_) => return Some(Err(self.malformed("index is not an integer"))),
                };
                self.rest = &rest[close + 1..];
                Some(Ok(PathStep::Index(index)))
            }
            _ => Some(Err(self.malformed("expected '.' or '['"))),
        }
    }
}

/// Navigate `path` (e.g. `.field[2].sub`) through `value`.
///
/// An empty path yields the value itself.
pub fn resolve<'v>(value: &'v Value, path: &str) -> Result<&'v Value, PathError> {
    let mut current = value;
    for step in PathSteps::new(path) {
        current = match step? {
            PathStep::Key(key) => match current {
                Value::Mapping(map) => map.get(key).ok_or_else(|| PathError::KeyNotFound {
                    key: key.to_string(),
                })?,
                _ => {
                    return Err(PathError::NotAnObject {
                        key: key.to_string(),
                    })
                }
            },
            PathStep::Index(index) => match current {
                Value::Sequence(items) => usize::try_from(index)
                    .ok()
                    .and_then(|i| items.get(i))
                    .ok_or(PathError::IndexOutOfRange {
                        index,
                        len: items.len(),
                    })?,
                _ => return Err(PathError::NotASequence { index }),
            },
        };
    }
    Ok(current)
}
