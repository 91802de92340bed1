//! Cross-cutting layers for the API router.
use axum::middleware::Next;
use axum::{body::Body, http::HeaderValue, http::Request, response::Response};
use tower_http::cors::CorsLayer;
use wqc_core::WQC_VERSION;

pub const VERSION_HEADER: &str = "x-wqc-version";

/// The console page is served from a different origin than the API.
pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Stamp every response with the engine version.
pub async fn version_header(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(VERSION_HEADER, HeaderValue::from_static(WQC_VERSION));
    response
}
