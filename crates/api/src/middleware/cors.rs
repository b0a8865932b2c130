//! Permissive CORS headers.
//!
//! The admin panel and the storefront are static sites on other origins, so
//! every response (errors and preflights included) carries these headers.

use axum::{
    extract::Request,
    http::{
        HeaderValue,
        header::{ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN},
    },
    middleware::Next,
    response::Response,
};

pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Add `Access-Control-Allow-Origin: *` and the allowed request headers.
pub async fn cors_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );

    response
}
