use axum::Json;
use axum::Router;
use serde::Serialize;
use utoipa::ToSchema;

pub(crate) mod export;
pub(crate) mod weather;

#[derive(Debug, Serialize, ToSchema)]
pub struct BannerResponse {
    #[schema(example = "Weather App API")]
    pub message: &'static str,
}

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = BannerResponse)),
    tag = "service",
)]
pub async fn banner() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "Weather App API",
    })
}

/// Routes served under `/api`.
pub fn get_routes(state: crate::AppState) -> Router {
    Router::new()
        .nest("/weather", weather::get_routes(state.clone()))
        .nest("/export", export::get_routes(state))
}
