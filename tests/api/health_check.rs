use crate::helpers::smtp_env;
use crate::helpers::spawn_app;

#[tokio::test]
async fn health_check() {
    let app = spawn_app(smtp_env()).await;
    let resp = reqwest::Client::new()
        .get(format!("{}/health_check", app.addr))
        .send()
        .await
        .expect("execute request");
    assert!(resp.status().is_success());
    assert_eq!(resp.content_length().unwrap(), 0); // empty body
}

/// Mail configuration is not needed to serve anything else
#[tokio::test]
async fn health_check_without_mail_config() {
    let app = spawn_app(Default::default()).await;
    let resp = reqwest::Client::new()
        .get(format!("{}/health_check", app.addr))
        .send()
        .await
        .expect("execute request");
    assert!(resp.status().is_success());
}
