//! Read-through response cache for GET routes.
//!
//! Successful GET responses are kept for a short TTL, keyed by method,
//! path and query. Entries are never invalidated by writes, so a read
//! may return data up to one TTL stale.

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use horde_core::CacheConfig;
use moka::future::Cache;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct CachedResponse {
    content_type: Option<HeaderValue>,
    body: Bytes,
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        if let Some(content_type) = self.content_type {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, content_type);
        }
        response
    }
}

/// Bounded TTL cache of rendered GET responses. Cloning shares the
/// underlying cache.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Cache<String, CachedResponse>,
}

impl ResponseCache {
    /// Build from config, or `None` when caching is disabled.
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        if !config.enabled || config.capacity == 0 {
            return None;
        }
        let inner = Cache::builder()
            .max_capacity(config.capacity)
            .time_to_live(config.ttl)
            .build();
        Some(Self { inner })
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

fn cache_key(request: &Request) -> String {
    let uri = request.uri();
    match uri.query() {
        Some(query) => format!("{} {}?{}", request.method(), uri.path(), query),
        None => format!("{} {}", request.method(), uri.path()),
    }
}

/// Middleware serving GET requests from the cache and storing fresh 200
/// responses. Other methods pass straight through.
pub async fn read_through(
    State(cache): State<ResponseCache>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = cache_key(&request);
    if let Some(hit) = cache.inner.get(&key).await {
        debug!(key = %key, "cache hit");
        return hit.into_response();
    }

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(key = %key, error = %e, "could not buffer response for caching");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let cached = CachedResponse {
        content_type: parts.headers.get(header::CONTENT_TYPE).cloned(),
        body: body.clone(),
    };
    cache.inner.insert(key, cached).await;
    Response::from_parts(parts, Body::from(body))
}
