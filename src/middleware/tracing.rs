use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::{info_span, Instrument};

/// Request observability middleware: every request runs inside a span
/// carrying a fresh request id, and its outcome is logged with latency.
pub async fn observability_middleware(
    matched_path: MatchedPath,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let route = matched_path.as_str().to_string();
    let start_time = Instant::now();

    let span = info_span!(
        "http_request",
        method = %method,
        uri = %uri,
        route = %route,
        request_id = %uuid::Uuid::now_v7(),
    );

    let response = next.run(request).instrument(span).await;

    let duration = start_time.elapsed();
    let status_code = response.status().as_u16();

    if status_code >= 500 {
        tracing::error!(
            method = %method,
            route = %route,
            status = status_code,
            latency_ms = duration.as_millis() as u64,
            "request failed"
        );
    } else {
        tracing::info!(
            method = %method,
            route = %route,
            status = status_code,
            latency_ms = duration.as_millis() as u64,
            "request completed"
        );
    }

    response
}
