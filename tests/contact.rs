use std::sync::Arc;

use axum::http::StatusCode;
use irilabs_relay::{
    MailRelay,
    testing::{Script, ScriptedRelay},
};

mod common;

const FORM: &str = "application/x-www-form-urlencoded";

fn ada() -> String {
    serde_urlencoded::to_string([
        ("name", "Ada"),
        ("institute", "Acme"),
        ("phone", "+44 20 0000"),
        ("country", "UK"),
        ("subject", "jobs"),
        ("body", "Hello & welcome"),
    ])
    .unwrap()
}

#[tokio::test]
async fn test_contact_page_lists_topics() {
    let relay = Arc::new(common::RecordingRelay::default());
    let test_app = common::create_test_app(relay.clone());

    let response = test_app.get("/contact", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_string(response).await;
    assert!(body.contains("<form method=\"post\" action=\"/contact\">"));
    assert!(body.contains("<option value=\"jobs\">Jobs</option>"));
    assert!(body.contains("<option value=\"join\">Join our network</option>"));
    assert!(!body.contains("Thank you for your message"));

    assert!(relay.requests.lock().unwrap().is_empty());
    assert!(!test_app.log_path().exists());
}

#[tokio::test]
async fn test_submission_is_logged_relayed_and_thanked() {
    let relay = Arc::new(common::RecordingRelay::default());
    let test_app = common::create_test_app(relay.clone());

    let response = test_app.post_contact(FORM, ada()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = common::body_string(response).await;
    assert!(body.contains("Thank you for your message"));
    assert!(body.contains("<option value=\"jobs\">Jobs</option>"));

    let entries = test_app.log_entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].net_addr, common::PEER);
    assert_eq!(entries[0].name, "Ada");
    assert_eq!(entries[0].phone, "+44 20 0000");
    assert_eq!(entries[0].subject, "jobs");
    assert_eq!(entries[0].body, "Hello & welcome");

    let relayed = relay.requests.lock().unwrap().clone();
    assert_eq!(relayed, entries);
}

#[tokio::test]
async fn test_thanks_are_translated() {
    let test_app = common::create_test_app(Arc::new(common::RecordingRelay::default()));

    let response = test_app.post_contact_as(Some("fr"), FORM, ada()).await;

    let body = common::body_string(response).await;
    assert!(body.contains("Merci pour votre message"));
}

#[tokio::test]
async fn test_unreadable_form_is_logged_with_empty_fields() {
    let relay = Arc::new(common::RecordingRelay::default());
    let test_app = common::create_test_app(relay.clone());

    let response = test_app
        .post_contact("application/json", r#"{"name":"Ada"}"#)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::body_string(response).await.contains("Thank you for your message"));

    let entries = test_app.log_entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].net_addr, common::PEER);
    assert_eq!(entries[0].name, "");
    assert_eq!(entries[0].body, "");
    assert_eq!(relay.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_multipart_fields_are_read() {
    let test_app = common::create_test_app(Arc::new(common::RecordingRelay::default()));

    let body = [
        "--XyZ",
        "Content-Disposition: form-data; name=\"name\"",
        "",
        "Ada",
        "--XyZ",
        "Content-Disposition: form-data; name=\"attachment\"; filename=\"cv.txt\"",
        "Content-Type: text/plain",
        "",
        "ignored",
        "--XyZ",
        "Content-Disposition: form-data; name=\"body\"",
        "",
        "Hello from a multipart form",
        "--XyZ--",
        "",
    ]
    .join("\r\n");

    let response = test_app
        .post_contact("multipart/form-data; boundary=XyZ", body)
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let entries = test_app.log_entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Ada");
    assert_eq!(entries[0].body, "Hello from a multipart form");
    assert_eq!(entries[0].institute, "");
}

#[tokio::test]
async fn test_query_fields_complete_the_body() {
    let test_app = common::create_test_app(Arc::new(common::RecordingRelay::default()));

    test_app
        .post_contact_to("/contact?subject=triage&name=ignored", FORM, "name=Ada")
        .await;

    let entries = test_app.log_entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Ada");
    assert_eq!(entries[0].subject, "triage");
}

#[tokio::test]
async fn test_repeated_and_unknown_fields() {
    let test_app = common::create_test_app(Arc::new(common::RecordingRelay::default()));

    test_app
        .post_contact(FORM, "name=first&name=second&referrer=ad&body=hi")
        .await;

    let entries = test_app.log_entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "first");
    assert_eq!(entries[0].body, "hi");
    assert_eq!(entries[0].country, "");
}

#[tokio::test]
async fn test_submission_reaches_smtp_relay() {
    let fake = ScriptedRelay::spawn(Script::default()).await.unwrap();
    let test_app = common::create_smtp_app(fake.config());

    let response = test_app.post_contact(FORM, ada()).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(fake.verbs(), ["EHLO", "MAIL", "RCPT", "DATA", ".", "QUIT"]);
    assert!(fake.message().contains("\"Name\": \"Ada\""));
    assert!(fake.message().contains("\"NetAddr\": \"203.0.113.7:51234\""));
    assert_eq!(test_app.log_entries().await.len(), 1);
}

#[tokio::test]
async fn test_refused_starttls_still_thanks_and_logs() {
    let fake = ScriptedRelay::spawn(Script::default()).await.unwrap();
    let test_app = common::create_smtp_app(irilabs_relay::RelayConfig {
        starttls: true,
        ..fake.config()
    });

    let response = test_app.post_contact(FORM, ada()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::body_string(response).await.contains("Thank you for your message"));

    assert_eq!(fake.verbs(), ["EHLO", "STARTTLS"]);

    let entries = test_app.log_entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Ada");
}

#[tokio::test]
async fn test_submission_reaches_relay_over_starttls() {
    let fake = ScriptedRelay::spawn(Script::tls()).await.unwrap();
    let relay = MailRelay::new(&fake.config())
        .unwrap()
        .with_tls_config(fake.tls_config());
    let test_app = common::create_test_app(Arc::new(relay));

    let response = test_app.post_contact(FORM, ada()).await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        fake.verbs(),
        ["EHLO", "STARTTLS", "EHLO", "MAIL", "RCPT", "DATA", ".", "QUIT"]
    );
    assert!(fake.message().contains("\"Name\": \"Ada\""));
    assert_eq!(test_app.log_entries().await.len(), 1);
}
