use crate::error::ServerError;
use crate::state::AppState;
use axum::{
    BoxError, Json,
    body::{Body, Bytes, HttpBody},
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{BodyExt, Limited};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

pub static X_TRACE_ID: &str = "x-trace-id";

/// Only JSON bodies whose declared size fits here are buffered and logged.
const MAX_LOGGED_BODY: usize = 1024;

/// Wrap every request in a span carrying a trace id.
///
/// The id is taken from an incoming `x-trace-id` header when it is a valid
/// UUID, generated otherwise, and echoed on the response. Small JSON bodies
/// are logged at debug level; everything else streams through untouched.
pub async fn trace_middleware(
    State(_state): State<Arc<AppState>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let start_time = Instant::now();

    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %method,
        path = %path,
    );

    async move {
        info!("request started");
        let header_value = HeaderValue::from_str(&trace_id.to_string()).ok();

        let (parts, body) = req.into_parts();
        let body = if is_loggable(&parts.headers, &body) {
            match collect_limited(body).await {
                Ok(bytes) => {
                    log_body("request", &bytes);
                    Body::from(bytes)
                }
                Err(e) => {
                    warn!(error = %e, "failed to read request body");
                    let mut response = read_failure(&e);
                    if let Some(value) = header_value {
                        response.headers_mut().insert(X_TRACE_ID, value);
                    }
                    return response;
                }
            }
        } else {
            body
        };

        let mut req = Request::from_parts(parts, body);
        if let Some(value) = header_value.clone() {
            req.headers_mut().insert(X_TRACE_ID, value);
        }

        let response = next.run(req).await;

        let (parts, body) = response.into_parts();
        let mut response = if is_loggable(&parts.headers, &body) {
            match collect_limited(body).await {
                Ok(bytes) => {
                    log_body("response", &bytes);
                    Response::from_parts(parts, Body::from(bytes))
                }
                Err(e) => {
                    warn!(error = %e, "failed to read response body");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "Failed to read response body" })),
                    )
                        .into_response()
                }
            }
        } else {
            Response::from_parts(parts, body)
        };
        if let Some(value) = header_value {
            response.headers_mut().insert(X_TRACE_ID, value);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            "request finished"
        );

        response
    }
    .instrument(span)
    .await
}

/// JSON with a known length no larger than [`MAX_LOGGED_BODY`].
///
/// Streaming bodies report no upper bound and are never buffered here.
fn is_loggable(headers: &HeaderMap, body: &Body) -> bool {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    is_json
        && body
            .size_hint()
            .upper()
            .is_some_and(|n| n <= MAX_LOGGED_BODY as u64)
}

/// Collect at most [`MAX_LOGGED_BODY`] bytes; a longer body is an error.
async fn collect_limited(body: Body) -> Result<Bytes, BoxError> {
    Ok(Limited::new(body, MAX_LOGGED_BODY).collect().await?.to_bytes())
}

fn log_body(direction: &str, bytes: &Bytes) {
    match std::str::from_utf8(bytes) {
        Ok(text) => debug!(direction, body = %text, "body"),
        Err(_) => debug!(direction, size = bytes.len(), "body is not utf-8"),
    }
}

fn read_failure(e: &BoxError) -> Response {
    ServerError::BadRequest(format!("Failed to read request body: {e}")).into_response()
}
