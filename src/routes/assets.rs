use axum::{
    body::Body,
    extract::{Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;
use std::{
    convert::Infallible,
    future::{Ready, ready},
    task::{Context, Poll},
};
use tower::{Service, ServiceExt};
use tower_http::services::ServeFile;

use crate::routes::AppState;

#[derive(RustEmbed)]
#[folder = "static/"]
#[prefix = "/"]
struct Assets;

/// Serves files embedded from `static/`, either by request path or a fixed file.
#[derive(Default, Clone)]
pub struct AssetsService {
    file: Option<&'static str>,
}

impl AssetsService {
    pub fn new() -> Self {
        Self { file: None }
    }

    /// Always answers with `path`, whatever the request uri.
    pub fn file(path: &'static str) -> Self {
        Self { file: Some(path) }
    }
}

impl Service<Request> for AssetsService {
    type Response = Response;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let path = self.file.unwrap_or(req.uri().path());

        ready(Ok(embedded(path)))
    }
}

fn embedded(path: &str) -> Response {
    let Some(content) = Assets::get(path) else {
        return (StatusCode::NOT_FOUND, "404 Not Found").into_response();
    };

    let mime = mime_guess::from_path(path).first_or_octet_stream();

    ([(header::CONTENT_TYPE, mime.as_ref())], Body::from(content.data)).into_response()
}

/// GET /letter.pdf - served from the site root, not embedded.
pub async fn letter(State(app_state): State<AppState>, req: Request) -> Response {
    let path = app_state.config.site.root.join("letter.pdf");

    let response = match ServeFile::new(&path).oneshot(req).await {
        Ok(response) => response,
        Err(err) => match err {},
    };

    if response.status() == StatusCode::NOT_FOUND {
        tracing::error!(path = %path.display(), "letter not found");
    }

    response.map(Body::new)
}
