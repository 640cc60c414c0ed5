use std::sync::{Arc, Mutex, MutexGuard};

use horde_kv::KVStore;
use serde_json::Value;
use tracing::debug;

use crate::document::{self, Document, ID_FIELD, VERSION_FIELD};
use crate::error::DocError;
use crate::filter::Filter;
use crate::update::Update;

/// A named collection of documents inside a KV backend.
///
/// Documents live under `{name}:{_id}`. Because `_id` is time ordered, a
/// prefix scan yields documents in insertion order, which is the
/// collection's natural order.
///
/// Writes to a single document are atomic: every read-modify-write runs
/// under the collection's write lock. Nothing groups several calls.
pub struct Collection {
    kv: Arc<dyn KVStore>,
    name: String,
    prefix: String,
    unique: Vec<String>,
    updated_at: Option<String>,
    write_lock: Mutex<()>,
}

/// Result of [`Collection::find_one_and_update`].
#[derive(Debug, Clone, PartialEq)]
pub struct Updated {
    /// The document after the update.
    pub document: Document,
    /// Whether any operator changed the document.
    pub modified: bool,
}

impl Collection {
    pub fn new(kv: Arc<dyn KVStore>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kv,
            prefix: format!("{name}:"),
            name,
            unique: Vec::new(),
            updated_at: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Declare a unique index on a top-level field.
    pub fn unique(mut self, field: impl Into<String>) -> Self {
        self.unique.push(field.into());
        self
    }

    /// Stamp `field` with the current time whenever an update modifies a
    /// document.
    pub fn updated_at(mut self, field: impl Into<String>) -> Self {
        self.updated_at = Some(field.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn key(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, DocError> {
        self.write_lock
            .lock()
            .map_err(|_| DocError::Storage(format!("collection '{}' lock poisoned", self.name)))
    }

    fn decode(key: &str, bytes: &[u8]) -> Result<Document, DocError> {
        serde_json::from_slice(bytes).map_err(|e| DocError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    fn write(&self, doc: &Document) -> Result<(), DocError> {
        let id = document::id_of(doc)
            .ok_or_else(|| DocError::InvalidDocument("document has no _id".into()))?;
        let bytes = serde_json::to_vec(doc)
            .map_err(|e| DocError::InvalidDocument(format!("serialize: {e}")))?;
        self.kv.set(&self.key(id), &bytes)?;
        Ok(())
    }

    fn scan(&self) -> Result<Vec<Document>, DocError> {
        let entries = self.kv.scan(&self.prefix)?;
        let mut docs = Vec::with_capacity(entries.len());
        for (key, bytes) in entries {
            docs.push(Self::decode(&key, &bytes)?);
        }
        Ok(docs)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// All documents matching `filter`, in natural order.
    pub fn find(&self, filter: &Filter) -> Result<Vec<Document>, DocError> {
        let docs: Vec<Document> = self
            .scan()?
            .into_iter()
            .filter(|doc| filter.matches(doc))
            .collect();
        debug!(collection = %self.name, matched = docs.len(), "find");
        Ok(docs)
    }

    /// The first document matching `filter`.
    pub fn find_one(&self, filter: &Filter) -> Result<Option<Document>, DocError> {
        if let Some(id) = filter.pinned_id() {
            return Ok(self.find_by_id(id)?.filter(|doc| filter.matches(doc)));
        }
        Ok(self.scan()?.into_iter().find(|doc| filter.matches(doc)))
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<Document>, DocError> {
        let key = self.key(id);
        match self.kv.get(&key)? {
            Some(bytes) => Ok(Some(Self::decode(&key, &bytes)?)),
            None => Ok(None),
        }
    }

    /// Like [`find_one`](Self::find_one), keeping only `_id` and `fields`.
    pub fn find_one_projected(
        &self,
        filter: &Filter,
        fields: &[&str],
    ) -> Result<Option<Document>, DocError> {
        Ok(self
            .find_one(filter)?
            .map(|doc| document::project(&doc, fields)))
    }

    pub fn count(&self) -> Result<usize, DocError> {
        Ok(self.kv.scan(&self.prefix)?.len())
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a new document. The store assigns `_id` and `__v`; any values
    /// the caller supplied for them are discarded.
    pub fn insert_one(&self, mut doc: Document) -> Result<Document, DocError> {
        let _guard = self.lock()?;

        doc.remove(ID_FIELD);
        doc.remove(VERSION_FIELD);
        self.check_unique(&doc, None)?;

        let id = horde_core::new_id();
        let mut stored = Document::new();
        stored.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        stored.extend(doc);
        stored.insert(VERSION_FIELD.to_string(), Value::from(0u64));

        self.write(&stored)?;
        debug!(collection = %self.name, id = %id, "inserted document");
        Ok(stored)
    }

    /// Apply `updates` to the first document matching `filter` and return
    /// the document as it is after the update, or `None` when nothing
    /// matches. The version marker and the update timestamp only move when
    /// something changed.
    ///
    /// The write lock is a `std::sync::Mutex` held across blocking backend
    /// I/O. This assumes one process owns the store file and that each
    /// call is short; async callers run it inline on a runtime worker.
    /// Two pushes to the same document from different threads both land.
    pub fn find_one_and_update(
        &self,
        filter: &Filter,
        updates: &[Update],
    ) -> Result<Option<Updated>, DocError> {
        let _guard = self.lock()?;

        let Some(mut doc) = self.find_one(filter)? else {
            return Ok(None);
        };

        let mut modified = false;
        for update in updates {
            modified |= update.apply(&mut doc)?;
        }
        if !modified {
            return Ok(Some(Updated {
                document: doc,
                modified,
            }));
        }

        let id = document::id_of(&doc).map(str::to_string);
        self.check_unique(&doc, id.as_deref())?;

        if let Some(field) = &self.updated_at {
            let now = serde_json::to_value(horde_core::now_utc())
                .map_err(|e| DocError::InvalidDocument(format!("timestamp: {e}")))?;
            doc.insert(field.clone(), now);
        }
        let version = document::version_of(&doc) + 1;
        doc.insert(VERSION_FIELD.to_string(), Value::from(version));
        self.write(&doc)?;
        debug!(collection = %self.name, id = ?id, version, "updated document");
        Ok(Some(Updated {
            document: doc,
            modified,
        }))
    }

    /// Remove the first document matching `filter` and return it.
    pub fn find_one_and_delete(&self, filter: &Filter) -> Result<Option<Document>, DocError> {
        let _guard = self.lock()?;

        let Some(doc) = self.find_one(filter)? else {
            return Ok(None);
        };
        let id = document::id_of(&doc)
            .ok_or_else(|| DocError::InvalidDocument("document has no _id".into()))?;
        self.kv.delete(&self.key(id))?;
        debug!(collection = %self.name, id = %id, "deleted document");
        Ok(Some(doc))
    }

    fn check_unique(&self, doc: &Document, except_id: Option<&str>) -> Result<(), DocError> {
        if self.unique.is_empty() {
            return Ok(());
        }
        let existing = self.scan()?;
        for field in &self.unique {
            let Some(value) = doc.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            let clash = existing.iter().any(|other| {
                document::id_of(other) != except_id
                    && other
                        .get(field)
                        .is_some_and(|v| document::values_equal(v, value))
            });
            if clash {
                return Err(DocError::DuplicateKey {
                    field: field.clone(),
                    value: match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    },
                });
            }
        }
        Ok(())
    }
}
