use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use postpilot_core::{ContentItemId, SocialPostId};
use postpilot_content::SocialPost;
use postpilot_infra::{ContentStore, PostStore};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_post))
        .route("/:id", get(get_post))
}

/// Create a draft post for a content item (the shape the content generator
/// produces).
pub async fn create_post(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreatePostRequest>,
) -> axum::response::Response {
    let item_id: ContentItemId = match body.content_item_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid item id")
        }
    };

    match services.content().get_item(item_id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return errors::json_error(StatusCode::NOT_FOUND, "not_found", "content item not found")
        }
        Err(e) => return errors::store_error_to_response(e),
    }

    let post = match SocialPost::new_draft(
        SocialPostId::new(),
        item_id,
        body.channel,
        body.body,
        body.cta_text,
        body.cta_url,
        body.hashtags,
        services.now(),
    ) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let json = dto::post_to_json(&post);
    if let Err(e) = services.posts().insert(post) {
        return errors::store_error_to_response(e);
    }

    (StatusCode::CREATED, Json(json)).into_response()
}

pub async fn get_post(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SocialPostId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid post id")
        }
    };

    match services.posts().get(id) {
        Ok(Some(post)) => (StatusCode::OK, Json(dto::post_to_json(&post))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "post not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}
