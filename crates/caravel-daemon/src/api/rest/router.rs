//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState, enable_cors: bool) -> Router {
    let routes = Router::new()
        // Health
        .route("/health", get(handlers::health_check))
        // Delivery configs
        .route("/delivery-configs", post(handlers::upsert_delivery_config))
        .route("/delivery-configs/diff", post(handlers::diff_delivery_config))
        .route(
            "/delivery-configs/validate",
            post(handlers::validate_delivery_config),
        )
        .route("/delivery-configs/:name", get(handlers::get_delivery_config))
        .route(
            "/delivery-configs/:name",
            delete(handlers::delete_delivery_config),
        )
        // Constraints
        .route(
            "/delivery-configs/:name/environment/:environment/constraints",
            get(handlers::get_constraint_state),
        )
        .route(
            "/delivery-configs/:name/environment/:environment/constraint",
            post(handlers::update_constraint_status),
        );

    let mut router = routes.layer(TraceLayer::new_for_http());

    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}
