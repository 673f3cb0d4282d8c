use axum::{
    body::Body,
    http::{HeaderValue, Request, Response, header},
    middleware::Next,
};

/// Paths served from embedded assets or the site root.
const STATIC_PATHS: [&str; 5] = [
    "/favicon.ico",
    "/favicon",
    "/mark.png",
    "/style.css",
    "/letter.pdf",
];

/// Middleware to set cache control headers
/// - Static files: cached for a day
/// - Everything else, the contact page included: never cached
pub async fn cache_control_middleware(req: Request<Body>, next: Next) -> Response<Body> {
    let is_static_file = STATIC_PATHS.contains(&req.uri().path());
    let mut response = next.run(req).await;

    let is_success = response.status().is_success();
    let headers = response.headers_mut();

    if is_static_file && is_success {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=86400"),
        );
    } else {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, proxy-revalidate"),
        );
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    }

    response
}
