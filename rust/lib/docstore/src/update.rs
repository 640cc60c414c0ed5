use serde_json::Value;

use crate::document::{is_internal, values_equal, Document};
use crate::error::DocError;
use crate::filter::Filter;

/// A single update operator applied to one document.
///
/// Field names are top-level. Array operators treat a missing field as an
/// empty array and reject a field that holds anything other than an array.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Set a field, replacing any previous value.
    Set(String, Value),
    /// Remove a field.
    Unset(String),
    /// Append a value to an array field.
    Push(String, Value),
    /// Replace the first array element matching `matching` with `value`.
    ReplaceFirst {
        array: String,
        matching: Filter,
        value: Value,
    },
    /// Remove the first array element matching `matching`.
    RemoveFirst { array: String, matching: Filter },
}

impl Update {
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Update::Set(field.into(), value.into())
    }

    pub fn unset(field: impl Into<String>) -> Self {
        Update::Unset(field.into())
    }

    pub fn push(array: impl Into<String>, value: impl Into<Value>) -> Self {
        Update::Push(array.into(), value.into())
    }

    pub fn replace_first(array: impl Into<String>, matching: Filter, value: impl Into<Value>) -> Self {
        Update::ReplaceFirst {
            array: array.into(),
            matching,
            value: value.into(),
        }
    }

    pub fn remove_first(array: impl Into<String>, matching: Filter) -> Self {
        Update::RemoveFirst {
            array: array.into(),
            matching,
        }
    }

    fn field(&self) -> &str {
        match self {
            Update::Set(field, _) | Update::Unset(field) | Update::Push(field, _) => field,
            Update::ReplaceFirst { array, .. } | Update::RemoveFirst { array, .. } => array,
        }
    }

    /// Apply to `doc`. Returns whether the document changed.
    pub fn apply(&self, doc: &mut Document) -> Result<bool, DocError> {
        let field = self.field();
        if field.is_empty() || is_internal(field) {
            return Err(DocError::InvalidUpdate(format!(
                "field '{field}' cannot be updated"
            )));
        }

        match self {
            Update::Set(field, value) => {
                let changed = doc.get(field).is_none_or(|old| !values_equal(old, value));
                doc.insert(field.clone(), value.clone());
                Ok(changed)
            }
            Update::Unset(field) => Ok(doc.remove(field).is_some()),
            Update::Push(field, value) => {
                array_entry(doc, field)?.push(value.clone());
                Ok(true)
            }
            Update::ReplaceFirst {
                array,
                matching,
                value,
            } => {
                let Some(elements) = existing_array(doc, array)? else {
                    return Ok(false);
                };
                match elements.iter().position(|e| matching.matches_element(e)) {
                    Some(pos) => {
                        let changed = !values_equal(&elements[pos], value);
                        elements[pos] = value.clone();
                        Ok(changed)
                    }
                    None => Ok(false),
                }
            }
            Update::RemoveFirst { array, matching } => {
                let Some(elements) = existing_array(doc, array)? else {
                    return Ok(false);
                };
                match elements.iter().position(|e| matching.matches_element(e)) {
                    Some(pos) => {
                        elements.remove(pos);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
        }
    }
}

fn existing_array<'a>(
    doc: &'a mut Document,
    field: &str,
) -> Result<Option<&'a mut Vec<Value>>, DocError> {
    match doc.get_mut(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(elements)) => Ok(Some(elements)),
        Some(_) => Err(not_an_array(field)),
    }
}

fn array_entry<'a>(doc: &'a mut Document, field: &str) -> Result<&'a mut Vec<Value>, DocError> {
    let slot = doc.entry(field.to_string()).or_insert(Value::Null);
    if slot.is_null() {
        *slot = Value::Array(Vec::new());
    }
    slot.as_array_mut().ok_or_else(|| not_an_array(field))
}

fn not_an_array(field: &str) -> DocError {
    DocError::InvalidUpdate(format!("field '{field}' is not an array"))
}
