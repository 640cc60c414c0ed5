use serde_json::{Map, Value};

/// A stored document: a JSON object.
pub type Document = Map<String, Value>;

/// Store-assigned identifier field.
pub const ID_FIELD: &str = "_id";

/// Store-maintained version marker, bumped on every write.
pub const VERSION_FIELD: &str = "__v";

/// Whether `field` is maintained by the store and cannot be written by callers.
pub fn is_internal(field: &str) -> bool {
    field == ID_FIELD || field == VERSION_FIELD
}

/// Read the `_id` of a document.
pub fn id_of(doc: &Document) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

/// Read the `__v` of a document, treating a missing marker as 0.
pub fn version_of(doc: &Document) -> u64 {
    doc.get(VERSION_FIELD).and_then(Value::as_u64).unwrap_or(0)
}

/// Document-store equality: numbers compare by value so `999` equals
/// `999.0`; objects and arrays compare structurally with the same rule.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xm), Value::Object(ym)) => {
            xm.len() == ym.len()
                && xm
                    .iter()
                    .all(|(k, x)| ym.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Keep `_id` plus the listed top-level fields.
pub fn project(doc: &Document, fields: &[&str]) -> Document {
    let mut out = Document::new();
    if let Some(id) = doc.get(ID_FIELD) {
        out.insert(ID_FIELD.to_string(), id.clone());
    }
    for field in fields {
        if let Some(value) = doc.get(*field) {
            out.insert((*field).to_string(), value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_compare_by_value() {
        assert!(values_equal(&json!(999), &json!(999.0)));
        assert!(!values_equal(&json!(999), &json!(998.5)));
        assert!(values_equal(
            &json!({"name": "Hammer", "price": 100}),
            &json!({"price": 100.0, "name": "Hammer"})
        ));
        assert!(!values_equal(&json!([1, 2]), &json!([2, 1])));
    }

    #[test]
    fn projection_keeps_id_and_fields() {
        let doc = json!({"_id": "abc", "__v": 2, "name": "Z", "items": []});
        let doc = doc.as_object().unwrap();
        let projected = project(doc, &["items"]);
        assert_eq!(Value::Object(projected), json!({"_id": "abc", "items": []}));
    }
}
