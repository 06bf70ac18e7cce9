use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use postpilot_core::CompanyId;
use postpilot_content::Company;
use postpilot_infra::ContentStore;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_company).get(list_companies))
        .route("/:id", get(get_company))
}

pub async fn create_company(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateCompanyRequest>,
) -> axum::response::Response {
    let company = match Company::new(
        CompanyId::new(),
        body.name,
        body.website,
        body.description,
        services.now(),
    ) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let json = dto::company_to_json(&company);
    if let Err(e) = services.content().insert_company(company) {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(json)).into_response()
}

pub async fn list_companies(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.content().list_companies() {
        Ok(companies) => {
            let body: Vec<_> = companies.iter().map(dto::company_to_json).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_company(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: CompanyId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid company id")
        }
    };

    match services.content().get_company(id) {
        Ok(Some(company)) => (StatusCode::OK, Json(dto::company_to_json(&company))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "company not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
