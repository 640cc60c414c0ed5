use std::path::PathBuf;
use std::time::Duration;

use crate::ServiceError;

/// Common configuration shared by the server binary and its modules.
///
/// The binary parses these from command-line arguments or environment
/// variables, then passes them to storage and module initialization.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Connection string for the document store.
    ///
    /// Accepted forms: `redb:<path>`, `redb://<path>`, `memory:` or a bare
    /// filesystem path (treated as a redb file).
    pub database_url: String,

    /// Listen address for the HTTP server.
    pub listen: String,

    /// Read-through cache settings for GET routes.
    pub cache: CacheConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_url: "memory:".to_string(),
            listen: "0.0.0.0:8080".to_string(),
            cache: CacheConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Resolve the connection string into a concrete store location.
    pub fn store_location(&self) -> Result<StoreLocation, ServiceError> {
        StoreLocation::parse(&self.database_url)
    }
}

/// Short-lived response cache settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Time-to-live of a cached response.
    pub ttl: Duration,
    /// Maximum number of cached responses.
    pub capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(5),
            capacity: 10,
        }
    }
}

/// Where the document store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// A redb database file, created if missing.
    File(PathBuf),
    /// A volatile in-process database, discarded at shutdown.
    Memory,
}

impl StoreLocation {
    pub fn parse(url: &str) -> Result<Self, ServiceError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ServiceError::Validation("database url is empty".into()));
        }
        if url == "memory:" || url == "memory://" {
            return Ok(StoreLocation::Memory);
        }

        let path = match url.strip_prefix("redb://") {
            Some(rest) => rest,
            None => url.strip_prefix("redb:").unwrap_or(url),
        };
        if path.is_empty() {
            return Err(ServiceError::Validation(format!(
                "database url '{url}' has no path"
            )));
        }
        // Anything else with a scheme is a store we cannot open.
        if let Some((scheme, _)) = path.split_once("://") {
            return Err(ServiceError::Validation(format!(
                "unsupported database scheme '{scheme}'"
            )));
        }
        Ok(StoreLocation::File(PathBuf::from(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locations() {
        assert_eq!(StoreLocation::parse("memory:").unwrap(), StoreLocation::Memory);
        assert_eq!(
            StoreLocation::parse("redb:///var/lib/horde/data.redb").unwrap(),
            StoreLocation::File(PathBuf::from("/var/lib/horde/data.redb"))
        );
        assert_eq!(
            StoreLocation::parse("redb:data.redb").unwrap(),
            StoreLocation::File(PathBuf::from("data.redb"))
        );
        assert_eq!(
            StoreLocation::parse("./local.redb").unwrap(),
            StoreLocation::File(PathBuf::from("./local.redb"))
        );
    }

    #[test]
    fn test_parse_rejects_bad_urls() {
        assert!(StoreLocation::parse("").is_err());
        assert!(StoreLocation::parse("redb:").is_err());
        assert!(StoreLocation::parse("mongodb://localhost:27017/zombies").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.listen, "0.0.0.0:8080");
        assert_eq!(config.cache.ttl, Duration::from_secs(5));
        assert_eq!(config.cache.capacity, 10);
        assert!(config.cache.enabled);
        assert_eq!(config.store_location().unwrap(), StoreLocation::Memory);
    }
}
