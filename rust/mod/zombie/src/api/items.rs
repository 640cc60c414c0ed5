use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{delete, get};
use axum::{Json, Router};

use horde_core::ServiceError;

use crate::model::{Item, Zombie, ZombieItems};
use crate::store::ZombieStore;

use super::{JsonBody, StoreState, delete_response};

pub fn router(store: Arc<ZombieStore>) -> Router {
    Router::new()
        .route(
            "/zombies/items/{name}",
            get(list_items).post(create_item).patch(update_item),
        )
        .route("/zombies/items/{name}/{item}", delete(delete_item))
        .with_state(store)
}

// ---------------------------------------------------------------------------
// GET /zombies/items/:name
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/zombies/items/{name}",
    tag = "zombies",
    params(("name" = String, Path, description = "Zombie name")),
    responses((status = 200, description = "The zombie's `_id` and items, or null", body = ZombieItems))
)]
pub(super) async fn list_items(
    State(store): State<StoreState>,
    Path(name): Path<String>,
) -> Result<Json<Option<ZombieItems>>, ServiceError> {
    Ok(Json(store.find_items(&name)?))
}

// ---------------------------------------------------------------------------
// POST /zombies/items/:name
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/zombies/items/{name}",
    tag = "zombies",
    params(("name" = String, Path, description = "Zombie name")),
    request_body = Item,
    responses(
        (status = 200, description = "The zombie after the append, or null", body = Zombie),
        (status = 400, description = "Missing or mistyped `name`/`price`")
    )
)]
pub(super) async fn create_item(
    State(store): State<StoreState>,
    Path(name): Path<String>,
    JsonBody(item): JsonBody<Item>,
) -> Result<Json<Option<Zombie>>, ServiceError> {
    Ok(Json(store.create_item(&name, item)?))
}

// ---------------------------------------------------------------------------
// PATCH /zombies/items/:name
// ---------------------------------------------------------------------------

#[utoipa::path(
    patch,
    path = "/zombies/items/{name}",
    tag = "zombies",
    params(("name" = String, Path, description = "Zombie name")),
    request_body = Item,
    responses(
        (status = 200, description = "The zombie with the first same-named item replaced, or null", body = Zombie),
        (status = 400, description = "Missing or mistyped `name`/`price`")
    )
)]
pub(super) async fn update_item(
    State(store): State<StoreState>,
    Path(name): Path<String>,
    JsonBody(item): JsonBody<Item>,
) -> Result<Json<Option<Zombie>>, ServiceError> {
    Ok(Json(store.update_item(&name, item)?))
}

// ---------------------------------------------------------------------------
// DELETE /zombies/items/:name/:item
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/zombies/items/{name}/{item}",
    tag = "zombies",
    params(
        ("name" = String, Path, description = "Zombie name"),
        ("item" = String, Path, description = "Item name")
    ),
    responses((status = 200, description = "Always `Deleted`", body = String, content_type = "text/plain"))
)]
pub(super) async fn delete_item(
    State(store): State<StoreState>,
    Path((name, item)): Path<(String, String)>,
) -> Response {
    delete_response(store.delete_item(&name, &item))
}
