use wedding_rsvp::configuration::get_configuration;
use wedding_rsvp::startup::Application;
use wedding_rsvp::telemetry::get_subscriber;
use wedding_rsvp::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the server
#[tokio::main] // requires tokio features: macros, rt-multi-thread
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("wedding-rsvp", "info", std::io::stdout);
    init_subscriber(subscriber)?;

    let cfg = get_configuration()?;

    // mail settings are only enforced per request, but an operator should
    // still hear about it at startup
    if let Err(e) = cfg.smtp.validate() {
        tracing::warn!(error.message = %e, "submissions will fail until this is fixed");
    }

    let app = Application::build(cfg).await?;
    tracing::info!(port = app.get_port(), "listening");
    app.run_until_stopped().await?;

    Ok(())
}
