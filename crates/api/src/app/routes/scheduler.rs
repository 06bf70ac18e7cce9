use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use postpilot_core::ContentItemId;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

/// Scheduler routes except `POST /scheduler/run`, which is wired separately
/// behind the trigger credential.
pub fn router() -> Router {
    Router::new()
        .route("/schedule", post(schedule))
        .route("/ready", get(ready))
}

/// Assign publication slots to a content item's draft posts. Called after a
/// batch of drafts is created for the item.
pub async fn schedule(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::SchedulePostsRequest>,
) -> axum::response::Response {
    let item_id: ContentItemId = match body.content_item_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id")
        }
    };

    match services.schedule_posts(item_id) {
        Ok(report) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "assigned": report.assigned,
                "channels": report.channels,
            })),
        )
            .into_response(),
        Err(e) => errors::scheduler_error_to_response(e),
    }
}

/// Posts whose scheduled time has passed (read-only; what the next trigger
/// cycle would pick up).
pub async fn ready(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.posts_ready_to_publish() {
        Ok(posts) => {
            let body: Vec<_> = posts.iter().map(dto::post_to_json).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::scheduler_error_to_response(e),
    }
}

/// One publish trigger cycle: claim due posts, publish, record outcomes.
/// Invoked by an external cron (e.g. once per minute).
pub async fn run(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.run_publish_cycle().await {
        Ok(report) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "processed": report.processed,
                "results": report.results,
            })),
        )
            .into_response(),
        Err(e) => errors::scheduler_error_to_response(e),
    }
}
