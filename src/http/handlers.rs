//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    ClearDataResponse, CreateReadingGoalRequest, CreateReadingLogRequest, GoalProgress,
    HealthResponse, JuzMapResponse, RangeQuery, ReadingGoal, ReadingLog, ReadingLogListResponse,
    ReadingStats, RecentLogsQuery, UpdateReadingGoal, UserQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::models::{ReadingGoalId, UserId};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn resolve_user(state: &AppState, user_id: Option<i32>) -> UserId {
    user_id.map(UserId::new).unwrap_or(state.default_user)
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Reading Logs
// =============================================================================

/// GET /v1/reading-logs
///
/// List every reading log of the user, newest first.
pub async fn list_reading_logs(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> HandlerResult<ReadingLogListResponse> {
    let user_id = resolve_user(&state, query.user_id);
    let logs = db_services::get_reading_logs(state.repository.as_ref(), user_id).await?;
    let total = logs.len();

    Ok(Json(ReadingLogListResponse { logs, total }))
}

/// GET /v1/reading-logs/recent?limit=
///
/// The most recent reading logs, newest first. `limit` defaults to 5.
pub async fn recent_reading_logs(
    State(state): State<AppState>,
    Query(query): Query<RecentLogsQuery>,
) -> HandlerResult<ReadingLogListResponse> {
    let user_id = resolve_user(&state, query.user_id);
    let limit = query.limit.unwrap_or(db_services::DEFAULT_RECENT_LOG_LIMIT);
    let logs =
        db_services::get_recent_reading_logs(state.repository.as_ref(), user_id, limit).await?;
    let total = logs.len();

    Ok(Json(ReadingLogListResponse { logs, total }))
}

/// GET /v1/reading-logs/range?start_date=&end_date=
///
/// Reading logs within an inclusive date range, oldest first.
pub async fn reading_logs_in_range(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> HandlerResult<ReadingLogListResponse> {
    let user_id = resolve_user(&state, query.user_id);
    let logs = db_services::get_reading_logs_in_range(
        state.repository.as_ref(),
        user_id,
        query.start_date,
        query.end_date,
    )
    .await?;
    let total = logs.len();

    Ok(Json(ReadingLogListResponse { logs, total }))
}

/// GET /v1/reading-logs/juz/{juz_number}
///
/// Reading logs whose declared juz matches, newest first.
pub async fn reading_logs_by_juz(
    State(state): State<AppState>,
    Path(juz_number): Path<i32>,
    Query(query): Query<UserQuery>,
) -> HandlerResult<ReadingLogListResponse> {
    let user_id = resolve_user(&state, query.user_id);
    let logs =
        db_services::get_reading_logs_by_juz(state.repository.as_ref(), user_id, juz_number)
            .await?;
    let total = logs.len();

    Ok(Json(ReadingLogListResponse { logs, total }))
}

/// POST /v1/reading-logs
///
/// Record a reading session. Returns the persisted log with its id.
pub async fn create_reading_log(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    Json(request): Json<CreateReadingLogRequest>,
) -> Result<(StatusCode, Json<ReadingLog>), AppError> {
    let user_id = resolve_user(&state, query.user_id);
    let new_log = request.into_new_log(user_id);
    let created = db_services::create_reading_log(state.repository.as_ref(), &new_log).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

// =============================================================================
// Progress & Statistics
// =============================================================================

/// GET /v1/stats
///
/// Aggregate reading statistics for the user.
pub async fn get_reading_stats(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> HandlerResult<ReadingStats> {
    let user_id = resolve_user(&state, query.user_id);
    let stats = db_services::get_reading_stats(state.repository.as_ref(), user_id).await?;

    Ok(Json(stats))
}

/// GET /v1/juz-map
///
/// Per-juz completion map of the user's current khatma.
pub async fn get_juz_map(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> HandlerResult<JuzMapResponse> {
    let user_id = resolve_user(&state, query.user_id);
    let juz_map = db_services::get_juz_map(state.repository.as_ref(), user_id).await?;

    Ok(Json(JuzMapResponse { juz_map }))
}

// =============================================================================
// Reading Goals
// =============================================================================

/// GET /v1/reading-goals/active
///
/// The user's active goal with progress percentages. 404 when no goal is active.
pub async fn get_active_goal(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> HandlerResult<GoalProgress> {
    let user_id = resolve_user(&state, query.user_id);
    let progress = db_services::get_active_goal_progress(state.repository.as_ref(), user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No active reading goal".to_string()))?;

    Ok(Json(progress))
}

/// POST /v1/reading-goals
///
/// Create a reading goal. An active goal supersedes every sibling.
pub async fn create_reading_goal(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    Json(request): Json<CreateReadingGoalRequest>,
) -> Result<(StatusCode, Json<ReadingGoal>), AppError> {
    let user_id = resolve_user(&state, query.user_id);
    let new_goal = request.into_new_goal(user_id);
    let created = db_services::create_reading_goal(state.repository.as_ref(), &new_goal).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /v1/reading-goals/{goal_id}
///
/// Apply a partial update to an existing goal.
pub async fn update_reading_goal(
    State(state): State<AppState>,
    Path(goal_id): Path<i32>,
    Json(changes): Json<UpdateReadingGoal>,
) -> HandlerResult<ReadingGoal> {
    let updated = db_services::update_reading_goal(
        state.repository.as_ref(),
        ReadingGoalId::new(goal_id),
        &changes,
    )
    .await?;

    Ok(Json(updated))
}

// =============================================================================
// Data Management
// =============================================================================

/// POST /v1/clear-data
///
/// Wipe the user's logs and reset their goal configuration.
pub async fn clear_data(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> HandlerResult<ClearDataResponse> {
    let user_id = resolve_user(&state, query.user_id);
    let deleted_logs = db_services::clear_all_data(state.repository.as_ref(), user_id).await?;

    Ok(Json(ClearDataResponse {
        message: format!("All reading data cleared for user {}", user_id),
        deleted_logs,
    }))
}
