mod items;
mod zombies;

use std::sync::Arc;

use axum::Router;
use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};
use horde_core::ServiceError;
use tracing::debug;
use utoipa::OpenApi;

use crate::cache::{self, ResponseCache};
use crate::model::{DeleteOutcome, Item, NewZombie, Zombie, ZombieItems};
use crate::store::ZombieStore;

type StoreState = Arc<ZombieStore>;

/// JSON request body whose rejections render as `ServiceError` (400 with
/// a `{"code","message"}` body) instead of axum's plain-text 4xx.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ServiceError))]
struct JsonBody<T>(T);

/// OpenAPI description of the zombie routes.
#[derive(OpenApi)]
#[openapi(
    paths(
        zombies::list_zombies,
        zombies::create_zombie,
        zombies::get_zombie_by_id,
        zombies::get_zombie_by_name,
        zombies::update_zombie,
        zombies::delete_zombie,
        zombies::find_zombie,
        items::list_items,
        items::create_item,
        items::update_item,
        items::delete_item,
    ),
    components(schemas(Zombie, NewZombie, Item, ZombieItems)),
    tags((name = "zombies", description = "Zombies and the items they carry"))
)]
pub struct ApiDoc;

/// Generated OpenAPI document for [`router`].
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// Build the complete zombie module router.
///
/// Routes:
/// - `GET    /zombies`: list zombies
/// - `POST   /zombies`: create zombie
/// - `GET    /zombies/id/:id`: get by `_id`
/// - `GET    /zombies/name/:name`: get by name
/// - `PATCH  /zombies/name/:name`: update by name
/// - `DELETE /zombies/name/:name`: delete by name
/// - `POST   /zombies/find`: first zombie matching a filter
/// - `GET    /zombies/items/:name`: items of a zombie
/// - `POST   /zombies/items/:name`: add item
/// - `PATCH  /zombies/items/:name`: replace item by name
/// - `DELETE /zombies/items/:name/:item`: remove item
///
/// With a cache, GET responses are served read-through.
pub fn router(store: Arc<ZombieStore>, cache: Option<ResponseCache>) -> Router {
    let router = Router::new()
        .merge(zombies::router(Arc::clone(&store)))
        .merge(items::router(store));
    match cache {
        Some(cache) => router.layer(axum::middleware::from_fn_with_state(
            cache,
            cache::read_through,
        )),
        None => router,
    }
}

/// Deletes always answer `Deleted`. Whether anything matched, and any
/// store fault, stay in the outcome; faults are logged by the store.
fn delete_response(outcome: DeleteOutcome) -> Response {
    debug!(status = outcome.status(), matched = outcome.matched, "delete finished");
    "Deleted".into_response()
}
