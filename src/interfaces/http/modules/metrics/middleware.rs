//! HTTP request metrics middleware
//!
//! - `http_requests_total`: counter labelled `method`, `path`, `status`
//! - `http_request_duration_seconds`: histogram labelled `method`, `path`
//!
//! `path` is the route template (`/api/seller/products/{id}`), so ids do
//! not create new series. Install it with `route_layer` so the template is
//! known. Scrapes of `/metrics` are not recorded.

use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};

const SCRAPE_PATH: &str = "/metrics";

pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    if path == SCRAPE_PATH {
        return next.run(request).await;
    }
    let method = request.method().to_string();

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);
    metrics::histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(elapsed);

    response
}
