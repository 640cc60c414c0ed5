//! Embedded document store.
//!
//! Collections of JSON documents persisted in a [`horde_kv::KVStore`].
//! Each document gets a store-assigned `_id` and a `__v` version marker.
//! Reads take equality [`Filter`]s; writes take typed [`Update`] operators
//! and are atomic per document.
//!
//! ```ignore
//! let zombies = Collection::new(kv, "zombies").unique("name");
//! let doc = zombies.insert_one(json_object)?;
//! zombies.find_one_and_update(
//!     &Filter::new().eq("name", "Zombie1"),
//!     &[Update::push("items", item)],
//! )?;
//! ```

pub mod collection;
pub mod document;
pub mod error;
pub mod filter;
pub mod update;

pub use collection::{Collection, Updated};
pub use document::{Document, ID_FIELD, VERSION_FIELD};
pub use error::DocError;
pub use filter::Filter;
pub use update::Update;
