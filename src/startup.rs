use std::net::TcpListener;
use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::web;
use actix_web::web::Data;
use actix_web::App;
use actix_web::HttpServer;
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::configuration::SmtpEnv;
use crate::email_client::MailTransport;
use crate::email_client::SmtpMailTransport;
use crate::routes::health_check;
use crate::routes::method_not_allowed;
use crate::routes::rsvp;
use crate::routes::submission_created;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Bind to the configured address and deliver over SMTP
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        Self::build_with_transport(cfg, Arc::new(SmtpMailTransport)).await
    }

    /// Like `build`, but with any `MailTransport` (tests use a stub)
    pub async fn build_with_transport(
        cfg: Settings,
        transport: Arc<dyn MailTransport>,
    ) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;

        // with port 0, this is the port the OS picked
        let port = listener.local_addr()?.port();

        let server = run(listener, cfg.smtp, transport)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all API endpoints.
pub fn run(
    listener: TcpListener,
    smtp_env: SmtpEnv,
    transport: Arc<dyn MailTransport>,
) -> Result<Server, anyhow::Error> {
    // `Data` is an `Arc` internally; `Data::from` reuses ours, which is what
    // allows an unsized `dyn MailTransport`
    let smtp_env = Data::new(smtp_env);
    let transport: Data<dyn MailTransport> = Data::from(transport);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            // anything but POST gets a 405 rather than actix's default 404
            .service(
                web::resource("/rsvp")
                    .route(web::post().to(rsvp))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(
                web::resource("/submission-created")
                    .route(web::post().to(submission_created))
                    .default_service(web::to(method_not_allowed)),
            )
            .app_data(smtp_env.clone())
            .app_data(transport.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
