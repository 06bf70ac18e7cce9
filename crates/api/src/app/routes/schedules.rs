use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use postpilot_core::{CompanyId, ScheduleId};
use postpilot_infra::{ContentStore, ScheduleStore};
use postpilot_scheduling::{Cadence, Schedule};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(upsert_schedule).get(list_schedules))
        .route("/:id", get(get_schedule).delete(delete_schedule))
}

/// Create or replace the schedule for a (company, channel) pair.
pub async fn upsert_schedule(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::UpsertScheduleRequest>,
) -> axum::response::Response {
    let company_id: CompanyId = match body.company_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid company id")
        }
    };

    match services.content().get_company(company_id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "company not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    }

    let cadence = match Cadence::from_parts(
        body.posts_per_week,
        body.preferred_days,
        body.preferred_hours,
        &body.timezone,
        body.randomize,
    ) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let schedule = Schedule::new(
        ScheduleId::new(),
        company_id,
        body.channel,
        body.enabled,
        cadence,
        services.now(),
    );

    let json = dto::schedule_to_json(&schedule);
    if let Err(e) = services.schedules().upsert(schedule) {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(json)).into_response()
}

pub async fn list_schedules(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::CompanyScopedQuery>,
) -> axum::response::Response {
    let company_id: CompanyId = match query.company_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid company id")
        }
    };

    match services.schedules().list_for_company(company_id) {
        Ok(schedules) => {
            let body: Vec<_> = schedules.iter().map(dto::schedule_to_json).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_schedule(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ScheduleId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid schedule id")
        }
    };

    match services.schedules().get(id) {
        Ok(Some(schedule)) => {
            (StatusCode::OK, Json(dto::schedule_to_json(&schedule))).into_response()
        }
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "schedule not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_schedule(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ScheduleId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid schedule id")
        }
    };

    match services.schedules().delete(id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
