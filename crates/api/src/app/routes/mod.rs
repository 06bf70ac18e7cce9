use axum::Router;

pub mod companies;
pub mod content;
pub mod posts;
pub mod products;
pub mod scheduler;
pub mod schedules;
pub mod system;

/// Router for all application endpoints (the guarded trigger route is wired
/// separately in `app::build_app`).
pub fn router() -> Router {
    Router::new()
        .nest("/companies", companies::router())
        .nest("/products", products::router())
        .nest("/content", content::router())
        .nest("/posts", posts::router())
        .nest("/schedules", schedules::router())
        .nest("/scheduler", scheduler::router())
}
