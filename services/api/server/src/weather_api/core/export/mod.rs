pub mod errors;
pub mod handler;

use axum::Router;
use axum::routing::get;

pub fn get_routes(state: crate::AppState) -> Router {
    Router::new()
        .route("/{format}", get(handler::handler))
        .with_state(state)
}
