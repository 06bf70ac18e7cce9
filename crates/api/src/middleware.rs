use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

/// Static bearer credential protecting the scheduler trigger endpoint.
///
/// With no key configured the trigger is open (dev); with a key, callers must
/// present exactly `Authorization: Bearer <key>`.
#[derive(Clone, Default)]
pub struct TriggerAuthState {
    pub api_key: Option<String>,
}

pub async fn trigger_auth_middleware(
    State(state): State<TriggerAuthState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(expected) = state.api_key.as_deref() {
        let token = extract_bearer(req.headers())?;
        if token != expected {
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
