use crate::error::KVError;

/// KVStore provides the byte-level key-value interface the document store
/// is built on.
///
/// Keys are namespaced by collection: `zombies:<id>`. Scans return entries
/// in ascending key order.
pub trait KVStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError>;

    /// Set a key-value pair, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError>;

    /// Delete a key. Returns whether the key existed.
    fn delete(&self, key: &str) -> Result<bool, KVError>;

    /// Scan all keys matching a prefix. Returns sorted (key, value) pairs.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError>;
}
