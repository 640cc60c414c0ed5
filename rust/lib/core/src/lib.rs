pub mod config;
pub mod error;
pub mod module;
pub mod types;

pub use config::{CacheConfig, ServiceConfig, StoreLocation};
pub use error::ServiceError;
pub use module::Module;
pub use types::{merge_patch, new_id, now_utc};
