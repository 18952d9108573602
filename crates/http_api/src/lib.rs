mod errors;
mod handlers;
mod middleware;
mod state;

use axum::{Router, middleware as axum_middleware, routing::post};

pub use state::HttpState;

pub fn router(state: HttpState) -> Router<()> {
    let api = Router::new()
        .route("/analyze", post(handlers::analyze))
        .route("/quota_get", post(handlers::quota_get))
        .route(
            "/subscription_upgrade",
            post(handlers::subscription_upgrade),
        )
        .route("/scans_recent", post(handlers::scans_recent))
        .route("/insights_get", post(handlers::insights_get))
        .route_layer(axum_middleware::from_fn(middleware::require_local_origin));

    Router::new().nest("/api", api).with_state(state)
}
