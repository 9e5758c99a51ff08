use axum::Router;
use axum::routing::get;

pub mod errors;
pub mod forecast;
pub mod live;
pub mod lookup;
pub mod query;

pub fn get_routes(state: crate::AppState) -> Router {
    Router::new()
        .route("/live", get(live::handler::handler))
        .route("/forecast", get(forecast::handler::handler))
        .route(
            "/query",
            get(query::handler::list).post(query::handler::create),
        )
        .route(
            "/query/{id}",
            get(query::handler::get)
                .put(query::handler::update)
                .delete(query::handler::delete),
        )
        .with_state(state)
}
