use std::net::TcpListener;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use secrecy::Secret;
use wedding_rsvp::configuration::ApplicationSettings;
use wedding_rsvp::configuration::Settings;
use wedding_rsvp::configuration::SmtpEnv;
use wedding_rsvp::configuration::SmtpSettings;
use wedding_rsvp::email_client::Email;
use wedding_rsvp::email_client::MailError;
use wedding_rsvp::email_client::MailTransport;
use wedding_rsvp::email_client::SmtpMailTransport;
use wedding_rsvp::startup::Application;
use wedding_rsvp::telemetry::get_subscriber;
use wedding_rsvp::telemetry::init_subscriber;

/// To opt in to verbose logging, use the env var `TEST_LOG`:
///
/// ```sh
///      TEST_LOG=true cargo test [test_name] | bunyan
/// ```
static TRACING: Lazy<()> = Lazy::new(|| {
    // the two sinks are different closure types, hence the duplicated arms
    let installed = match std::env::var("TEST_LOG") {
        Ok(_) => init_subscriber(get_subscriber("test", "debug", std::io::stdout)),
        Err(_) => init_subscriber(get_subscriber("test", "debug", std::io::sink)),
    };
    installed.expect("install test subscriber");
});

/// Records what would have been sent instead of talking to a relay
#[derive(Default)]
pub struct StubTransport {
    pub delivered: Mutex<Vec<(SmtpSettings, Email)>>,
}

#[async_trait]
impl MailTransport for StubTransport {
    async fn deliver(
        &self,
        settings: &SmtpSettings,
        email: &Email,
    ) -> Result<(), MailError> {
        self.delivered
            .lock()
            .unwrap()
            .push((settings.clone(), email.clone()));
        Ok(())
    }
}

impl StubTransport {
    pub fn emails(&self) -> Vec<Email> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .map(|(_, e)| e.clone())
            .collect()
    }
}

/// Complete mail configuration, pointing nowhere in particular
pub fn smtp_env() -> SmtpEnv {
    SmtpEnv {
        smtp_host: Some("smtp.example.com".to_string()),
        smtp_user: Some("hosts@example.com".to_string()),
        smtp_password: Some(Secret::new("hunter2".to_string())),
        ..Default::default()
    }
}

pub struct TestApp {
    pub addr: String,
    pub transport: Arc<StubTransport>,
}

impl TestApp {
    pub async fn post_rsvp(
        &self,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.post_raw("rsvp", body.to_string()).await
    }

    /// Arbitrary body, sent as-is
    pub async fn post_raw(
        &self,
        path: &str,
        body: String,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/{path}", self.addr))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .expect("execute request")
    }
}

async fn spawn(
    smtp: SmtpEnv,
    transport: Arc<dyn MailTransport>,
) -> String {
    Lazy::force(&TRACING);

    let cfg = Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            // random available port
            port: 0,
        },
        smtp,
    };

    let app = Application::build_with_transport(cfg, transport)
        .await
        .expect("build app");
    let addr = format!("http://127.0.0.1:{}", app.get_port());
    tokio::spawn(app.run_until_stopped());
    addr
}

/// Spawn the app on a random port, with a stub transport that records every
/// delivery.
pub async fn spawn_app(smtp: SmtpEnv) -> TestApp {
    let transport = Arc::new(StubTransport::default());
    let addr = spawn(smtp, transport.clone()).await;
    TestApp { addr, transport }
}

/// Spawn the app with the real SMTP transport, aimed at a local port nobody
/// listens on, so every delivery fails.
pub async fn spawn_app_with_dead_relay() -> TestApp {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let smtp = SmtpEnv {
        smtp_host: Some("127.0.0.1".to_string()),
        smtp_port: Some(port.to_string()),
        ..smtp_env()
    };
    let addr = spawn(smtp, Arc::new(SmtpMailTransport)).await;
    TestApp {
        addr,
        // stays empty
        transport: Arc::new(StubTransport::default()),
    }
}
