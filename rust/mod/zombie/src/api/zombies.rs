use std::sync::{Arc, LazyLock};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use regex::Regex;
use serde_json::Value;

use horde_core::ServiceError;

use crate::model::{NewZombie, Zombie};
use crate::store::ZombieStore;

use super::{JsonBody, StoreState, delete_response};

/// Characters accepted in an `_id` path parameter.
static ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_.-]*$").expect("valid id regex"));

pub fn router(store: Arc<ZombieStore>) -> Router {
    Router::new()
        .route("/zombies", get(list_zombies).post(create_zombie))
        .route("/zombies/id/{id}", get(get_zombie_by_id))
        .route(
            "/zombies/name/{name}",
            get(get_zombie_by_name)
                .patch(update_zombie)
                .delete(delete_zombie),
        )
        .route("/zombies/find", post(find_zombie))
        .with_state(store)
}

// ---------------------------------------------------------------------------
// GET /zombies
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/zombies",
    tag = "zombies",
    responses((status = 200, description = "Every zombie, in insertion order", body = [Zombie]))
)]
pub(super) async fn list_zombies(
    State(store): State<StoreState>,
) -> Result<Json<Vec<Zombie>>, ServiceError> {
    Ok(Json(store.find_all()?))
}

// ---------------------------------------------------------------------------
// GET /zombies/id/:id
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/zombies/id/{id}",
    tag = "zombies",
    params(("id" = String, Path, description = "Store-assigned `_id`")),
    responses(
        (status = 200, description = "The zombie, or null", body = Zombie),
        (status = 400, description = "`id` has characters outside `[a-zA-Z0-9_.-]`; empty body")
    )
)]
pub(super) async fn get_zombie_by_id(
    State(store): State<StoreState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    if !ID_PATTERN.is_match(&id) {
        return Ok(StatusCode::BAD_REQUEST.into_response());
    }
    Ok(Json(store.find_by_id(&id)?).into_response())
}

// ---------------------------------------------------------------------------
// GET /zombies/name/:name
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/zombies/name/{name}",
    tag = "zombies",
    params(("name" = String, Path, description = "Zombie name")),
    responses((status = 200, description = "The zombie, or null", body = Zombie))
)]
pub(super) async fn get_zombie_by_name(
    State(store): State<StoreState>,
    Path(name): Path<String>,
) -> Result<Json<Option<Zombie>>, ServiceError> {
    Ok(Json(store.find_by_name(&name)?))
}

// ---------------------------------------------------------------------------
// POST /zombies/find
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/zombies/find",
    tag = "zombies",
    request_body(content = serde_json::Value, description = "Field-equality filter; dotted paths such as `items.name` are allowed"),
    responses(
        (status = 200, description = "First matching zombie, or null", body = Zombie),
        (status = 400, description = "Filter is not an object")
    )
)]
pub(super) async fn find_zombie(
    State(store): State<StoreState>,
    JsonBody(filter): JsonBody<Value>,
) -> Result<Json<Option<Zombie>>, ServiceError> {
    Ok(Json(store.find_one(filter)?))
}

// ---------------------------------------------------------------------------
// POST /zombies
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/zombies",
    tag = "zombies",
    request_body = NewZombie,
    responses(
        (status = 200, description = "The stored zombie", body = Zombie),
        (status = 400, description = "Missing or empty name, or a malformed body"),
        (status = 409, description = "Name already taken")
    )
)]
pub(super) async fn create_zombie(
    State(store): State<StoreState>,
    JsonBody(input): JsonBody<NewZombie>,
) -> Result<Json<Zombie>, ServiceError> {
    Ok(Json(store.create(input)?))
}

// ---------------------------------------------------------------------------
// PATCH /zombies/name/:name
// ---------------------------------------------------------------------------

#[utoipa::path(
    patch,
    path = "/zombies/name/{name}",
    tag = "zombies",
    params(("name" = String, Path, description = "Zombie name")),
    request_body(content = serde_json::Value, description = "Partial zombie, merged as a JSON merge patch"),
    responses(
        (status = 200, description = "The updated zombie, or null", body = Zombie),
        (status = 400, description = "Patch leaves the zombie invalid"),
        (status = 409, description = "Renamed onto an existing name")
    )
)]
pub(super) async fn update_zombie(
    State(store): State<StoreState>,
    Path(name): Path<String>,
    JsonBody(patch): JsonBody<Value>,
) -> Result<Json<Option<Zombie>>, ServiceError> {
    Ok(Json(store.update(&name, patch)?))
}

// ---------------------------------------------------------------------------
// DELETE /zombies/name/:name
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/zombies/name/{name}",
    tag = "zombies",
    params(("name" = String, Path, description = "Zombie name")),
    responses((status = 200, description = "Always `Deleted`", body = String, content_type = "text/plain"))
)]
pub(super) async fn delete_zombie(State(store): State<StoreState>, Path(name): Path<String>) -> Response {
    delete_response(store.delete(&name))
}
