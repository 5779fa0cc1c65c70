//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState, enable_cors: bool) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health_check))
        // Campaigns
        .route(
            "/bia-campaigns",
            get(handlers::list_campaigns).post(handlers::create_campaign),
        )
        .route("/bia-campaigns/:id", get(handlers::get_campaign))
        .route("/bia-campaigns/:id/launch", post(handlers::launch_campaign))
        .route(
            "/bia-campaigns/:id/update-progress",
            post(handlers::update_campaign_progress),
        )
        // Workflows
        .route("/workflows", get(handlers::list_entity_workflows))
        .route("/workflows/:id", get(handlers::get_workflow))
        .route(
            "/workflows/:id/steps/:step_id/complete",
            post(handlers::complete_step),
        )
        .route("/workflows/:id/cancel", post(handlers::cancel_workflow))
        // Governance
        .route("/governance/policies", post(handlers::create_policy))
        .route("/governance/policies/:id", get(handlers::get_policy))
        .route("/governance/policies/:id/submit", post(handlers::submit_policy))
        .route("/governance/policies/:id/approve", post(handlers::approve_policy))
        .route("/governance/policies/:id/publish", post(handlers::publish_policy))
        // Risk
        .route("/risk-assessments", post(handlers::create_risk_assessment))
        .route("/risk-assessments/:id", get(handlers::get_risk_assessment))
        .route("/risk-controls", post(handlers::create_control))
        .route(
            "/risk-controls/:id",
            put(handlers::update_control).delete(handlers::delete_control),
        )
        .route(
            "/risk-controls/calculate-residual/:risk_id",
            post(handlers::calculate_residual),
        )
        // Records read by campaigns
        .route("/processes", post(handlers::register_process))
        .route("/processes/:id", axum::routing::delete(handlers::remove_process))
        .route("/bia-assessments", post(handlers::record_bia_assessment));

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http());

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
