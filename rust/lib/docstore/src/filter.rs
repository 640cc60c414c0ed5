use serde_json::Value;

use crate::document::{values_equal, Document, ID_FIELD};
use crate::error::DocError;

/// Field-equality filter.
///
/// Every condition must hold. Paths may be dotted (`items.name`); when a
/// path runs through an array, the condition holds if any element
/// satisfies the rest of the path. A condition on an array-valued field
/// also holds when any element equals the expected value. An empty filter
/// matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter on the store-assigned identifier.
    pub fn by_id(id: &str) -> Self {
        Self::new().eq(ID_FIELD, id)
    }

    /// Add an equality condition.
    pub fn eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((path.into(), value.into()));
        self
    }

    /// Build a filter from a JSON body such as `{"name": "Zombie1"}`.
    pub fn from_value(value: Value) -> Result<Self, DocError> {
        match value {
            Value::Object(map) => {
                if let Some(key) = map.keys().find(|k| k.is_empty() || k.starts_with('$')) {
                    return Err(DocError::InvalidFilter(format!(
                        "unsupported filter key '{key}'"
                    )));
                }
                Ok(Self {
                    conditions: map.into_iter().collect(),
                })
            }
            other => Err(DocError::InvalidFilter(format!(
                "expected an object, got {}",
                type_name(&other)
            ))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The `_id` this filter pins, if any, so lookups can skip the scan.
    pub fn pinned_id(&self) -> Option<&str> {
        self.conditions
            .iter()
            .find(|(path, _)| path == ID_FIELD)
            .and_then(|(_, value)| value.as_str())
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|(path, expected)| {
            let segments: Vec<&str> = path.split('.').collect();
            match doc.get(segments[0]) {
                Some(value) => path_matches(value, &segments[1..], expected),
                None => expected.is_null(),
            }
        })
    }

    /// Match an array element. Non-object elements never match.
    pub fn matches_element(&self, element: &Value) -> bool {
        element.as_object().is_some_and(|map| self.matches(map))
    }
}

fn path_matches(current: &Value, rest: &[&str], expected: &Value) -> bool {
    let Some((head, tail)) = rest.split_first() else {
        return value_matches(current, expected);
    };

    match current {
        Value::Object(map) => match map.get(*head) {
            Some(next) => path_matches(next, tail, expected),
            None => tail.is_empty() && expected.is_null(),
        },
        Value::Array(elements) => {
            let by_index = head
                .parse::<usize>()
                .ok()
                .and_then(|i| elements.get(i))
                .is_some_and(|e| path_matches(e, tail, expected));
            by_index || elements.iter().any(|e| path_matches(e, rest, expected))
        }
        _ => false,
    }
}

fn value_matches(actual: &Value, expected: &Value) -> bool {
    if values_equal(actual, expected) {
        return true;
    }
    match actual {
        Value::Array(elements) => elements.iter().any(|e| values_equal(e, expected)),
        _ => false,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
