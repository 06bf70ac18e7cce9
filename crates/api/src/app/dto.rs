use serde::Deserialize;

use postpilot_content::{Channel, Company, ContentItem, Product, SocialPost};
use postpilot_scheduling::Schedule;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    pub website: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub company_id: String,
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateContentItemRequest {
    pub company_id: String,
    pub product_id: Option<String>,
    pub title: String,
    pub brief: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content_item_id: String,
    pub channel: Channel,
    pub body: String,
    pub cta_text: Option<String>,
    pub cta_url: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertScheduleRequest {
    pub company_id: String,
    pub channel: Channel,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub posts_per_week: u8,
    #[serde(default)]
    pub preferred_days: Vec<u8>,
    #[serde(default)]
    pub preferred_hours: Vec<u8>,
    pub timezone: String,
    #[serde(default)]
    pub randomize: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SchedulePostsRequest {
    pub content_item_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CompanyScopedQuery {
    pub company_id: String,
}

// -------------------------
// Response JSON mapping
// -------------------------

pub fn company_to_json(company: &Company) -> serde_json::Value {
    serde_json::json!({
        "id": company.id_typed().to_string(),
        "name": company.name(),
        "website": company.website(),
        "description": company.description(),
        "created_at": company.created_at(),
    })
}

pub fn product_to_json(product: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": product.id_typed().to_string(),
        "company_id": product.company_id().to_string(),
        "name": product.name(),
        "description": product.description(),
        "url": product.url(),
        "created_at": product.created_at(),
    })
}

pub fn item_to_json(item: &ContentItem) -> serde_json::Value {
    serde_json::json!({
        "id": item.id_typed().to_string(),
        "company_id": item.company_id().to_string(),
        "product_id": item.product_id().map(|p| p.to_string()),
        "title": item.title(),
        "brief": item.brief(),
        "created_at": item.created_at(),
    })
}

pub fn post_to_json(post: &SocialPost) -> serde_json::Value {
    serde_json::json!({
        "id": post.id_typed().to_string(),
        "content_item_id": post.content_item_id().to_string(),
        "channel": post.channel().as_str(),
        "body": post.body(),
        "cta_text": post.cta_text(),
        "cta_url": post.cta_url(),
        "hashtags": post.hashtags(),
        "status": post.status().as_str(),
        "scheduled_for": post.scheduled_for(),
        "published_at": post.published_at(),
        "created_at": post.created_at(),
    })
}

pub fn schedule_to_json(schedule: &Schedule) -> serde_json::Value {
    let cadence = schedule.cadence();
    serde_json::json!({
        "id": schedule.id_typed().to_string(),
        "company_id": schedule.company_id().to_string(),
        "channel": schedule.channel().as_str(),
        "enabled": schedule.is_enabled(),
        "posts_per_week": cadence.posts_per_week(),
        "preferred_days": cadence.preferred_days(),
        "preferred_hours": cadence.preferred_hours(),
        "timezone": cadence.timezone().name(),
        "randomize": cadence.randomize(),
        "created_at": schedule.created_at(),
    })
}
