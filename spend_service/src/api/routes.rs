use axum::routing::get;
use axum::Router;

use super::{handlers, AppState};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/ai/predict/:user_id", get(handlers::predict))
        .route("/v1/ai/predict/:user_id/insights", get(handlers::insights))
}
