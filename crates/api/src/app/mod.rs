//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: store wiring + the scheduler services
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// `trigger_api_key` guards `POST /scheduler/run`; `None` leaves it open.
pub async fn build_app(trigger_api_key: Option<String>) -> Router {
    let services = Arc::new(services::build_services().await);

    let auth_state = middleware::TriggerAuthState {
        api_key: trigger_api_key,
    };

    // The trigger endpoint is the only guarded route: it is what the external
    // cron hits.
    let trigger = Router::new()
        .route("/scheduler/run", post(routes::scheduler::run))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::trigger_auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .merge(trigger)
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}
