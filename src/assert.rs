use crate::error::AssertionError;
use crate::render::{to_display, to_flow, to_yaml};
use crate::value::Value;

/// `Assert equals`: deep equality after trimming string operands.
pub fn assert_equals(actual: Value, expected: Value) -> Result<(), AssertionError> {
    let actual = actual.trimmed();
    let expected = expected.trimmed();
    if actual == expected {
        Ok(())
    } else {
        Err(AssertionError::NotEqual {
            expected: to_yaml(&expected),
            actual: to_yaml(&actual),
        })
    }
}

/// One decoded `Assert that` predicate.
///
/// Members of `all`, `any` and `not` stay raw and are decoded only when
/// evaluation reaches them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition<'a> {
    Empty(&'a Value),
    Equals { item: &'a Value, equals: &'a Value },
    In { item: &'a Value, container: &'a Value },
    All(&'a [Value]),
    Any(&'a [Value]),
    Not(&'a Value),
}

impl<'a> Condition<'a> {
    /// Decode a predicate mapping. When several shapes are present the first
    /// in the order `empty`, `item`+`equals`, `item`+`in`, `all`, `any`,
    /// `not` wins.
    pub fn from_value(value: &'a Value) -> Result<Condition<'a>, AssertionError> {
        let Value::Mapping(map) = value else {
            return Err(AssertionError::InvalidConditionShape(format!(
                "expected a mapping, found {}",
                to_flow(value)
            )));
        };

        if let Some(subject) = map.get("empty") {
            return Ok(Condition::Empty(subject));
        }
        if let Some(item) = map.get("item") {
            if let Some(equals) = map.get("equals") {
                return Ok(Condition::Equals { item, equals });
            }
            if let Some(container) = map.get("in") {
                return Ok(Condition::In { item, container });
            }
        }
        if let Some(all) = map.get("all") {
            return Ok(Condition::All(member_list("all", all)?));
        }
        if let Some(any) = map.get("any") {
            return Ok(Condition::Any(member_list("any", any)?));
        }
        if let Some(inner) = map.get("not") {
            return Ok(Condition::Not(inner));
        }
        Err(AssertionError::NoConditionSpecified)
    }

    /// Evaluate the condition, reporting why it does not hold.
    pub fn check(&self) -> Result<(), AssertionError> {
        match *self {
            Condition::Empty(subject) => {
                if subject.is_empty() {
                    Ok(())
                } else {
                    Err(AssertionError::ConditionFalse(format!(
                        "Empty: {}",
                        to_display(subject)
                    )))
                }
            }
            Condition::Equals { item, equals } => {
                if item == equals {
                    Ok(())
                } else {
                    Err(AssertionError::ConditionFalse(format!(
                        "Item: {}\nEquals: {}",
                        to_yaml(item),
                        to_yaml(equals)
                    )))
                }
            }
            Condition::In { item, container } => {
                if contains(container, item) {
                    Ok(())
                } else {
                    Err(AssertionError::ConditionFalse(format!(
                        "Item: {}\nIn: {}",
                        to_yaml(item),
                        to_display(container)
                    )))
                }
            }
            Condition::All(members) => members.iter().try_for_each(assert_that),
            Condition::Any(members) => {
                let mut last = None;
                for member in members {
                    match assert_that(member) {
                        Ok(()) => return Ok(()),
                        Err(err) => last = Some(Box::new(err)),
                    }
                }
                Err(AssertionError::AnyFailed { last })
            }
            // A member that cannot be decoded counts as not holding
            Condition::Not(inner) => match assert_that(inner) {
                Ok(()) => Err(AssertionError::NegationHeld(to_flow(inner))),
                Err(_) => Ok(()),
            },
        }
    }
}

fn member_list<'a>(key: &str, value: &'a Value) -> Result<&'a [Value], AssertionError> {
    match value {
        Value::Sequence(items) => Ok(items.as_slice()),
        _ => Err(AssertionError::InvalidConditionShape(format!(
            "'{}' must be a list of conditions",
            key
        ))),
    }
}

/// Membership test for `item` + `in`.
///
/// In a mapping, `item` must be a mapping whose every entry is present and
/// equal in the container. In a sequence, `item` must equal some element.
fn contains(container: &Value, item: &Value) -> bool {
    match container {
        Value::Mapping(entries) => match item {
            Value::Mapping(wanted) => wanted
                .iter()
                .all(|(key, value)| entries.get(key) == Some(value)),
            _ => false,
        },
        Value::Sequence(items) => items.contains(item),
        _ => false,
    }
}

/// `Assert that`: decode the resolved predicate and evaluate it.
pub fn assert_that(tree: &Value) -> Result<(), AssertionError> {
    Condition::from_value(tree)?.check()
}
