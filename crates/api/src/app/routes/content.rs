use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use postpilot_core::{CompanyId, ContentItemId, ProductId};
use postpilot_content::ContentItem;
use postpilot_infra::{ContentStore, PostStore};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/items", post(create_item).get(list_items))
        .route("/items/:id", get(get_item))
        .route("/items/:id/posts", get(list_item_posts))
}

pub async fn create_item(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateContentItemRequest>,
) -> axum::response::Response {
    let company_id: CompanyId = match body.company_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid company id")
        }
    };

    let product_id = match body.product_id.as_deref().map(str::parse::<ProductId>) {
        None => None,
        Some(Ok(v)) => Some(v),
        Some(Err(_)) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
        }
    };

    let item = match ContentItem::new(
        ContentItemId::new(),
        company_id,
        product_id,
        body.title,
        body.brief,
        services.now(),
    ) {
        Ok(i) => i,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let json = dto::item_to_json(&item);
    if let Err(e) = services.content().insert_item(item) {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(json)).into_response()
}

pub async fn list_items(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::CompanyScopedQuery>,
) -> axum::response::Response {
    let company_id: CompanyId = match query.company_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid company id")
        }
    };

    match services.content().list_items(company_id) {
        Ok(items) => {
            let body: Vec<_> = items.iter().map(dto::item_to_json).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_item(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ContentItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id")
        }
    };

    match services.content().get_item(id) {
        Ok(Some(item)) => (StatusCode::OK, Json(dto::item_to_json(&item))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "content item not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn list_item_posts(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ContentItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id")
        }
    };

    match services.content().get_item(id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "content item not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    }

    match services.posts().list_for_content_item(id) {
        Ok(posts) => {
            let body: Vec<_> = posts.iter().map(dto::post_to_json).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
