use axum::Router;

/// A service module that contributes HTTP routes.
///
/// The binary entry point collects all modules and merges their routers
/// into one. Each module owns its full paths.
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// Return the module's routes.
    fn routes(&self) -> Router;
}
