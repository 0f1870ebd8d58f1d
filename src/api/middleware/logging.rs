use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{info, warn};

/// Logs one line per request under the `http` stage.
///
/// Server errors are raised to `warn` so a failing chat pipeline stands out
/// from routine traffic.
pub async fn request_logger(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;

    let elapsed_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    if response.status().is_server_error() {
        warn!(stage = "http", %method, %path, status, elapsed_ms, "request failed");
    } else {
        info!(stage = "http", %method, %path, status, elapsed_ms, "request served");
    }

    response
}
