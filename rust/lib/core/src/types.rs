use chrono::{DateTime, Utc};

/// Generate a new time-ordered ID (UUIDv7, no dashes).
///
/// IDs generated later sort after IDs generated earlier, so a key scan
/// returns records in insertion order.
pub fn new_id() -> String {
    uuid::Uuid::now_v7().simple().to_string()
}

/// Current UTC time.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Merge a JSON patch into a base value.
///
/// For each key in `patch`:
/// - If the value is `null`, the key is removed from `base`.
/// - Otherwise, the key is set to the patch value.
///
/// This follows RFC 7386 (JSON Merge Patch) semantics. Arrays are
/// replaced wholesale, never merged element-wise.
pub fn merge_patch(
    base: &mut serde_json::Value,
    patch: &serde_json::Value,
) {
    if let (Some(base_obj), Some(patch_obj)) = (base.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_obj {
            if value.is_null() {
                base_obj.remove(key);
            } else if value.is_object() {
                // Recursively merge nested objects.
                let entry = base_obj
                    .entry(key.clone())
                    .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
                merge_patch(entry, value);
            } else {
                base_obj.insert(key.clone(), value.clone());
            }
        }
    } else {
        *base = patch.clone();
    }
}
