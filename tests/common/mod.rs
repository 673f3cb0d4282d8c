#![allow(dead_code)]

use std::{
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use irilabs::{
    AppState,
    config::{Config, ContactConfig, ObservabilityConfig, ServerConfig, SiteConfig},
};
use irilabs_contact::{ContactRequest, Relay, SubmissionLog, default_topics};
use irilabs_relay::RelayConfig;
use temp_dir::TempDir;
use tower::ServiceExt;

pub const PEER: &str = "203.0.113.7:51234";

/// Relay that only records what it was given.
#[derive(Default)]
pub struct RecordingRelay {
    pub requests: Mutex<Vec<ContactRequest>>,
}

#[async_trait]
impl Relay for RecordingRelay {
    async fn relay(&self, request: &ContactRequest) -> anyhow::Result<()> {
        self.requests.lock().unwrap().push(request.clone());

        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub root: TempDir,
    pub config: Config,
}

impl TestApp {
    pub fn log_path(&self) -> PathBuf {
        self.config.log_path()
    }

    pub async fn log_entries(&self) -> Vec<ContactRequest> {
        let content = tokio::fs::read_to_string(self.log_path())
            .await
            .unwrap_or_default();

        content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    pub async fn get(&self, uri: &str, language: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(language) = language {
            request = request.header(header::ACCEPT_LANGUAGE, language);
        }

        self.router
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_contact(&self, content_type: &str, body: impl Into<Body>) -> Response<Body> {
        self.post_contact_as(None, content_type, body).await
    }

    pub async fn post_contact_to(
        &self,
        uri: &str,
        content_type: &str,
        body: impl Into<Body>,
    ) -> Response<Body> {
        self.post(uri, None, content_type, body).await
    }

    pub async fn post_contact_as(
        &self,
        language: Option<&str>,
        content_type: &str,
        body: impl Into<Body>,
    ) -> Response<Body> {
        self.post("/contact", language, content_type, body).await
    }

    /// Posts from [`PEER`].
    async fn post(
        &self,
        uri: &str,
        language: Option<&str>,
        content_type: &str,
        body: impl Into<Body>,
    ) -> Response<Body> {
        let peer: SocketAddr = PEER.parse().unwrap();

        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .extension(ConnectInfo(peer));
        if let Some(language) = language {
            request = request.header(header::ACCEPT_LANGUAGE, language);
        }

        self.router
            .clone()
            .oneshot(request.body(body.into()).unwrap())
            .await
            .unwrap()
    }
}

pub fn test_config(root: &TempDir, relay: RelayConfig) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        site: SiteConfig {
            root: root.path().to_path_buf(),
        },
        contact: ContactConfig {
            log_path: PathBuf::from("contact.log"),
            topics: default_topics(),
        },
        relay,
        observability: ObservabilityConfig::default(),
    }
}

/// App backed by a temporary site root and the given relay.
pub fn create_test_app(relay: Arc<dyn Relay>) -> TestApp {
    let root = TempDir::new().unwrap();
    let config = test_config(&root, RelayConfig::default());
    let journal = Arc::new(SubmissionLog::new(config.log_path()));
    let state = AppState::with_contact(config.clone(), journal, relay);

    TestApp {
        router: irilabs::router(state),
        root,
        config,
    }
}

/// App wired exactly like the server, talking SMTP to `relay`.
pub fn create_smtp_app(relay: RelayConfig) -> TestApp {
    let root = TempDir::new().unwrap();
    let config = test_config(&root, relay);
    let state = AppState::new(config.clone()).unwrap();

    TestApp {
        router: irilabs::router(state),
        root,
        config,
    }
}

pub async fn body_string(response: Response<Body>) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();

    String::from_utf8(body.to_vec()).unwrap()
}
