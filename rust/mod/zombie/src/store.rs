use std::sync::Arc;

use horde_core::{ServiceError, merge_patch, now_utc};
use horde_docstore::{Collection, Document, Filter, Update};
use horde_kv::KVStore;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::model::{DeleteOutcome, DeleteTarget, NewZombie, Zombie};

/// Collection holding zombie documents.
pub const COLLECTION: &str = "zombies";

/// Zombie repository: maps logical operations onto the `zombies`
/// collection. Item operations live in [`crate::items`].
///
/// Lookups that find nothing return `Ok(None)`. Sequences that read and
/// then write (update, item operations) are not grouped; concurrent
/// writers to the same zombie can overwrite each other.
pub struct ZombieStore {
    pub(crate) zombies: Collection,
}

impl ZombieStore {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        let zombies = Collection::new(kv, COLLECTION)
            .unique("name")
            .updated_at("updated_at");
        Self { zombies }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Every zombie, in insertion order.
    pub fn find_all(&self) -> Result<Vec<Zombie>, ServiceError> {
        self.zombies
            .find(&Filter::new())?
            .into_iter()
            .map(decode)
            .collect()
    }

    /// Look up by the store-assigned `_id`.
    pub fn find_by_id(&self, id: &str) -> Result<Option<Zombie>, ServiceError> {
        self.zombies.find_by_id(id)?.map(decode).transpose()
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<Zombie>, ServiceError> {
        self.find_one_by(&by_name(name))
    }

    /// First zombie matching an arbitrary field-equality filter object.
    pub fn find_one(&self, filter: Value) -> Result<Option<Zombie>, ServiceError> {
        let filter = Filter::from_value(filter)?;
        self.find_one_by(&filter)
    }

    pub(crate) fn find_one_by(&self, filter: &Filter) -> Result<Option<Zombie>, ServiceError> {
        self.zombies.find_one(filter)?.map(decode).transpose()
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a new zombie. `created_at` is kept when supplied, otherwise
    /// set to now. Fails with `Conflict` when the name is taken.
    pub fn create(&self, input: NewZombie) -> Result<Zombie, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::Validation("name is required".into()));
        }

        let mut doc = Document::new();
        doc.insert("name".into(), Value::String(input.name));
        doc.insert("created_at".into(), to_json(input.created_at.unwrap_or_else(now_utc))?);
        doc.insert("items".into(), to_json(&input.items)?);

        let zombie: Zombie = decode(self.zombies.insert_one(doc)?)?;
        info!(id = %zombie.id, name = %zombie.name, "zombie created");
        Ok(zombie)
    }

    /// Merge `patch` into the zombie called `name` (RFC 7386 merge patch).
    ///
    /// `_id`, `__v` and `created_at` are preserved; `items` is replaced
    /// wholesale when present; unknown fields are dropped. `updated_at` is
    /// always stamped. Returns `None` when no zombie has that name.
    pub fn update(&self, name: &str, patch: Value) -> Result<Option<Zombie>, ServiceError> {
        if !patch.is_object() {
            return Err(ServiceError::Validation(
                "update body must be a JSON object".into(),
            ));
        }
        let Some(current) = self.find_by_name(name)? else {
            return Ok(None);
        };

        let mut base = to_json(&current)?;
        merge_patch(&mut base, &patch);
        // Force updated_at and preserve identity.
        base["_id"] = Value::String(current.id.clone());
        base["__v"] = Value::from(current.version);
        base["created_at"] = to_json(current.created_at)?;
        base["updated_at"] = to_json(now_utc())?;

        let merged: Zombie = serde_json::from_value(base)
            .map_err(|e| ServiceError::Validation(format!("invalid zombie: {e}")))?;
        if merged.name.trim().is_empty() {
            return Err(ServiceError::Validation("name is required".into()));
        }

        let updates = [
            Update::set("name", merged.name.clone()),
            Update::set("items", to_json(&merged.items)?),
            Update::set("updated_at", to_json(merged.updated_at)?),
        ];
        let updated = self
            .zombies
            .find_one_and_update(&Filter::by_id(&current.id), &updates)?;

        match updated {
            Some(updated) => {
                let zombie: Zombie = decode(updated.document)?;
                info!(id = %zombie.id, name = %zombie.name, "zombie updated");
                Ok(Some(zombie))
            }
            // Deleted between the read and the write.
            None => Ok(None),
        }
    }

    /// Remove the zombie called `name`. Store faults are reported in the
    /// outcome, never returned as errors.
    pub fn delete(&self, name: &str) -> DeleteOutcome {
        match self.zombies.find_one_and_delete(&by_name(name)) {
            Ok(removed) => {
                info!(name, matched = removed.is_some(), "zombie deleted");
                DeleteOutcome::done(DeleteTarget::Zombie, removed.is_some())
            }
            Err(e) => {
                warn!(name, error = %e, "zombie could not be deleted");
                DeleteOutcome::failed(DeleteTarget::Zombie, e.to_string())
            }
        }
    }
}

pub(crate) fn by_name(name: &str) -> Filter {
    Filter::new().eq("name", name)
}

pub(crate) fn decode<T: DeserializeOwned>(doc: Document) -> Result<T, ServiceError> {
    serde_json::from_value(Value::Object(doc))
        .map_err(|e| ServiceError::Internal(format!("deserialize: {e}")))
}

pub(crate) fn to_json<T: serde::Serialize>(value: T) -> Result<Value, ServiceError> {
    serde_json::to_value(value).map_err(|e| ServiceError::Internal(format!("serialize: {e}")))
}
