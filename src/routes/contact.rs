use std::{convert::Infallible, net::SocketAddr};

use axum::{
    extract::{ConnectInfo, Form, FromRequest, FromRequestParts, Multipart, Query, Request, State},
    http::{header, request::Parts},
    response::IntoResponse,
};
use irilabs_contact::{Acknowledgement, ContactForm, Inbound};

use crate::{
    routes::AppState,
    template::{Layout, Template, filters},
};

#[derive(askama::Template)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub layout: Layout,
    pub thanks: bool,
    /// `(key, label)` pairs in registry order.
    pub topics: Vec<(String, String)>,
}

impl ContactTemplate {
    fn new(layout: Layout, ack: Acknowledgement) -> Self {
        Self {
            layout,
            thanks: ack.thanks,
            topics: ack
                .topics
                .iter()
                .map(|topic| (topic.key.to_owned(), topic.label.to_owned()))
                .collect(),
        }
    }
}

/// Peer address of the connection as `ip:port`, empty when unknown.
pub struct RemoteAddr(pub String);

impl<S: Send + Sync> FromRequestParts<S> for RemoteAddr {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string())
            .unwrap_or_default();

        Ok(Self(addr))
    }
}

pub async fn page(template: Template, State(app_state): State<AppState>) -> impl IntoResponse {
    let ack = app_state.contact.handle(Inbound::View).await;

    template.render(ContactTemplate::new(template.layout("contact"), ack))
}

pub async fn action(
    template: Template,
    State(app_state): State<AppState>,
    RemoteAddr(net_addr): RemoteAddr,
    request: Request,
) -> impl IntoResponse {
    let form = ContactForm::from_fields(form_fields(request, &app_state, &net_addr).await);

    let ack = app_state
        .contact
        .handle(Inbound::Submission { form, net_addr })
        .await;

    template.render(ContactTemplate::new(template.layout("contact"), ack))
}

type Fields = Vec<(String, String)>;

/// Body and query fields in lookup order: a urlencoded body before the query,
/// the query before multipart fields. Unreadable parts contribute nothing.
async fn form_fields(request: Request, state: &AppState, net_addr: &str) -> Fields {
    let query = match Query::<Fields>::try_from_uri(request.uri()) {
        Ok(Query(fields)) => fields,
        Err(err) => {
            tracing::warn!(err = %err, net_addr, "unreadable contact query");
            vec![]
        }
    };

    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    if is_multipart {
        let body = multipart_fields(request, state).await.unwrap_or_else(|err| {
            tracing::warn!(err = %err, net_addr, "unreadable contact form");
            vec![]
        });

        return query.into_iter().chain(body).collect();
    }

    if request.headers().get(header::CONTENT_TYPE).is_none() {
        return query;
    }

    let body = match Form::<Fields>::from_request(request, state).await {
        Ok(Form(fields)) => fields,
        Err(err) => {
            tracing::warn!(err = %err, net_addr, "unreadable contact form");
            vec![]
        }
    };

    body.into_iter().chain(query).collect()
}

/// Text fields of a multipart body, file parts skipped.
async fn multipart_fields(request: Request, state: &AppState) -> anyhow::Result<Fields> {
    let mut multipart = Multipart::from_request(request, state).await?;
    let mut fields = vec![];

    while let Some(field) = multipart.next_field().await? {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        fields.push((name, field.text().await?));
    }

    Ok(fields)
}
