//! Route registration: module routes plus system endpoints.

use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tracing::info;
use utoipa::openapi::OpenApi;

/// Build the complete router from each module's routes. `api_doc` is
/// served as-is at `/api-docs/openapi.json`.
pub fn build_router(module_routes: Vec<(&str, Router)>, api_doc: OpenApi) -> Router {
    // System endpoints, never cached.
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api_doc) }),
        );

    // Modules carry their full paths, so they are merged rather than nested.
    for (name, router) in module_routes {
        info!("Mounting {} routes", name);
        app = app.merge(router);
    }
    app
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "horded",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use horde_core::{CacheConfig, Module};
    use horde_kv::{KVStore, RedbStore};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app() -> Router {
        let kv: Arc<dyn KVStore> = Arc::new(RedbStore::open_in_memory().unwrap());
        let module = zombie::ZombieModule::new(kv, &CacheConfig::default());
        build_router(vec![(module.name(), module.routes())], zombie::api::openapi())
    }

    async fn get_json(router: &Router, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn system_endpoints() {
        let router = app();
        let (status, body) = get_json(&router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));

        let (_, body) = get_json(&router, "/version").await;
        assert_eq!(body["name"], "horded");
    }

    #[tokio::test]
    async fn module_routes_are_mounted() {
        let router = app();
        let (status, body) = get_json(&router, "/zombies").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, _) = get_json(&router, "/nothing-here").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let router = app();
        let (status, body) = get_json(&router, "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["openapi"].as_str().unwrap().starts_with("3."));
        assert!(body["paths"]["/zombies"]["post"].is_object());
        assert!(body["paths"]["/zombies/items/{name}/{item}"]["delete"].is_object());
        assert!(body["components"]["schemas"]["Item"].is_object());
    }
}
