//! Route table and middleware stack.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// All versioned API endpoints.
fn v1_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reading-logs",
            get(handlers::list_reading_logs).post(handlers::create_reading_log),
        )
        .route("/reading-logs/recent", get(handlers::recent_reading_logs))
        .route("/reading-logs/range", get(handlers::reading_logs_in_range))
        .route(
            "/reading-logs/juz/{juz_number}",
            get(handlers::reading_logs_by_juz),
        )
        .route("/stats", get(handlers::get_reading_stats))
        .route("/juz-map", get(handlers::get_juz_map))
        .route("/reading-goals", post(handlers::create_reading_goal))
        .route("/reading-goals/active", get(handlers::get_active_goal))
        .route(
            "/reading-goals/{goal_id}",
            put(handlers::update_reading_goal),
        )
        .route("/clear-data", post(handlers::clear_data))
}

/// Assemble the application router: health probe at the root, the v1 API
/// nested under `/v1`, and the middleware stack around everything.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS; deployments that need restrictions terminate them in
    // front of this server.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", v1_routes())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
