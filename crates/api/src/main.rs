#[tokio::main]
async fn main() {
    postpilot_observability::init();

    let trigger_key = std::env::var("SCHEDULER_API_KEY").ok();
    if trigger_key.is_none() {
        tracing::warn!("SCHEDULER_API_KEY not set; scheduler trigger endpoint is unauthenticated");
    }

    let app = postpilot_api::app::build_app(trigger_key).await;

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
