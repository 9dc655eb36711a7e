use serde_json::json;
use wedding_rsvp::configuration::SmtpEnv;
use wedding_rsvp::routes::MAX_BODY_BYTES;

use crate::helpers::smtp_env;
use crate::helpers::spawn_app;

#[tokio::test]
async fn event_is_delivered() {
    let app = spawn_app(smtp_env()).await;

    let event = json!({
        "payload": {
            "form_name": "rsvp",
            "data": {
                "name": "Jane Doe",
                "email": "jane@example.com",
                "attendance": "accept",
                "plusOne": "John Doe",
            },
        },
    });
    let resp = app
        .post_raw("submission-created", event.to_string())
        .await;
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "delivered": true }));

    let email = app.transport.emails().remove(0);
    assert_eq!(email.subject, "New RSVP submission from Jane Doe");
    assert!(email.text.contains("Plus One: John Doe"));
    assert!(email.html.contains("John Doe"));
}

#[tokio::test]
async fn form_name_in_subject() {
    let app = spawn_app(smtp_env()).await;

    let event = json!({ "form_name": "guests", "data": { "name": "Jane" } });
    let resp = app
        .post_raw("submission-created", event.to_string())
        .await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        app.transport.emails()[0].subject,
        "New GUESTS submission from Jane"
    );
}

#[tokio::test]
async fn non_post_is_405() {
    let app = spawn_app(smtp_env()).await;
    let resp = reqwest::Client::new()
        .get(format!("{}/submission-created", app.addr))
        .send()
        .await
        .expect("execute request");
    assert_eq!(resp.status().as_u16(), 405);
}

#[tokio::test]
async fn missing_config_is_not_delivered() {
    let app = spawn_app(SmtpEnv {
        smtp_host: None,
        ..smtp_env()
    })
    .await;

    let resp = app
        .post_raw("submission-created", json!({ "data": {} }).to_string())
        .await;
    assert_eq!(resp.status().as_u16(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["delivered"], false);
    assert_eq!(
        body["message"],
        "Missing required SMTP environment variables: SMTP_HOST"
    );
    assert!(app.transport.emails().is_empty());
}

#[tokio::test]
async fn missing_body() {
    let app = spawn_app(smtp_env()).await;
    let resp = app
        .post_raw("submission-created", String::new())
        .await;
    assert_eq!(resp.status().as_u16(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Missing request body");
}

#[tokio::test]
async fn oversized_event_is_rejected() {
    let app = spawn_app(smtp_env()).await;

    let event = json!({
        "payload": { "data": { "name": "Jane", "dietary": "x".repeat(MAX_BODY_BYTES) } },
    });
    let resp = app
        .post_raw("submission-created", event.to_string())
        .await;
    assert_eq!(resp.status().as_u16(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["delivered"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .starts_with("Request body exceeds"));
    assert!(app.transport.emails().is_empty());
}
