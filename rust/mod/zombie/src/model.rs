use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// A value embedded in a zombie's `items` sequence.
///
/// Items have no identity of their own. Within one zombie they are matched
/// by `name`, which is not required to be unique; item operations act on
/// the first match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub name: String,
    pub price: f64,
}

// ---------------------------------------------------------------------------
// Zombie
// ---------------------------------------------------------------------------

/// The root document of the `zombies` collection.
///
/// `name` is the natural key and unique across the collection. `_id` and
/// `__v` are assigned and maintained by the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Zombie {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "__v", default)]
    pub version: u64,

    pub name: String,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub items: Vec<Item>,
}

/// Request body for `POST /zombies`.
///
/// Fields other than these are ignored. `created_at` defaults to the
/// time of insertion.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewZombie {
    pub name: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub items: Vec<Item>,
}

impl NewZombie {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created_at: None,
            items: Vec::new(),
        }
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }
}

/// A zombie projected down to its items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ZombieItems {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub items: Vec<Item>,
}

// ---------------------------------------------------------------------------
// DeleteOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteTarget {
    Zombie,
    Item,
}

/// Outcome of a delete operation.
///
/// Deletes never fail the caller: store faults are captured in `error`.
/// `matched` tells whether anything was actually removed, which the legacy
/// status strings cannot express.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub target: DeleteTarget,
    pub success: bool,
    pub matched: bool,
    pub error: Option<String>,
}

impl DeleteOutcome {
    pub fn done(target: DeleteTarget, matched: bool) -> Self {
        Self {
            target,
            success: true,
            matched,
            error: None,
        }
    }

    pub fn failed(target: DeleteTarget, error: impl Into<String>) -> Self {
        Self {
            target,
            success: false,
            matched: false,
            error: Some(error.into()),
        }
    }

    /// Human-readable status line.
    pub fn status(&self) -> &'static str {
        match (self.target, self.success) {
            (DeleteTarget::Zombie, true) => "The zombie has been deleted",
            (DeleteTarget::Zombie, false) => "The zombie could not be deleted",
            (DeleteTarget::Item, true) => "The zombie item has been deleted",
            (DeleteTarget::Item, false) => "The zombie item could not be deleted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zombie_json_shape() {
        let json = serde_json::json!({
            "_id": "0190f5d1c0de7000a000000000000001",
            "__v": 3,
            "name": "Zombie1",
            "created_at": "2024-07-01T10:00:00Z",
            "items": [{"name": "Metal Hammer", "price": 999}]
        });
        let zombie: Zombie = serde_json::from_value(json).unwrap();
        assert_eq!(zombie.version, 3);
        assert!(zombie.updated_at.is_none());
        assert_eq!(zombie.items[0].price, 999.0);

        let back = serde_json::to_value(&zombie).unwrap();
        assert!(back.get("updated_at").is_none());
        assert_eq!(back["_id"], "0190f5d1c0de7000a000000000000001");
        assert_eq!(back["items"][0]["name"], "Metal Hammer");
    }

    #[test]
    fn new_zombie_defaults() {
        let input: NewZombie =
            serde_json::from_value(serde_json::json!({"name": "Zombie1", "color": "green"}))
                .unwrap();
        assert_eq!(input.name, "Zombie1");
        assert!(input.created_at.is_none());
        assert!(input.items.is_empty());
    }

    #[test]
    fn delete_status_strings() {
        assert_eq!(
            DeleteOutcome::done(DeleteTarget::Zombie, true).status(),
            "The zombie has been deleted"
        );
        assert_eq!(
            DeleteOutcome::failed(DeleteTarget::Item, "disk").status(),
            "The zombie item could not be deleted"
        );
        // A miss is still success-shaped.
        let miss = DeleteOutcome::done(DeleteTarget::Item, false);
        assert!(miss.success && !miss.matched);
        assert_eq!(miss.status(), "The zombie item has been deleted");
    }
}
