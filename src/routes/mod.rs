use std::sync::Arc;

use axum::{Router, response::IntoResponse, routing::get};
use irilabs_contact::{ContactService, Journal, Relay, SubmissionLog, Topics};
use irilabs_relay::MailRelay;

use crate::template::{NotFoundTemplate, Template};

mod assets;
mod contact;
mod health;
mod pages;

pub use assets::AssetsService;
pub use contact::RemoteAddr;

#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub contact: ContactService,
}

impl AppState {
    /// Wires the submission log and the SMTP relay from configuration.
    pub fn new(config: crate::config::Config) -> anyhow::Result<Self> {
        let journal = Arc::new(SubmissionLog::new(config.log_path()));
        let relay = Arc::new(MailRelay::new(&config.relay)?);

        Ok(Self::with_contact(config, journal, relay))
    }

    pub fn with_contact(
        config: crate::config::Config,
        journal: Arc<dyn Journal>,
        relay: Arc<dyn Relay>,
    ) -> Self {
        let topics = Topics::new(config.contact.topics.iter().cloned());

        Self {
            contact: ContactService::new(journal, relay, topics),
            config,
        }
    }
}

pub async fn fallback(template: Template) -> impl IntoResponse {
    (
        axum::http::StatusCode::NOT_FOUND,
        template.render(NotFoundTemplate {
            layout: template.layout(""),
        }),
    )
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/", get(pages::root))
        .route("/mission", get(pages::mission))
        .route("/womb", get(pages::womb))
        .route("/about", get(pages::about))
        .route("/jobs", get(pages::jobs))
        .route("/contact", get(contact::page).post(contact::action))
        .route_service("/favicon.ico", AssetsService::file("/favicon.ico"))
        .route_service("/favicon", AssetsService::file("/favicon.ico"))
        .route_service("/mark.png", AssetsService::new())
        .route_service("/style.css", AssetsService::new())
        .route("/letter.pdf", get(assets::letter))
        .fallback(fallback)
        .with_state(app_state)
}
