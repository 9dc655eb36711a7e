use anyhow::Context;
use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_bunyan_formatter::BunyanFormattingLayer;
use tracing_bunyan_formatter::JsonStorageLayer;
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

/// One bunyan JSON line per event, tagged with `name`. Fields recorded on the
/// request span (guest name, email, attendance) are repeated on every event
/// inside it, so `RSVP email sent` carries who it was for.
///
/// `RUST_LOG` wins over `filter_level`. `sink` is a writer factory such as
/// `std::io::stdout`.
pub fn get_subscriber<Sink>(
    name: &str,
    filter_level: &str,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_level));
    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(BunyanFormattingLayer::new(name.to_string(), sink))
}

/// Install `subscriber` for the whole process. Fails if a logger or
/// subscriber is already installed.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> anyhow::Result<()> {
    // actix and lettre log through `log`
    LogTracer::init().context("failed to bridge `log` records")?;
    set_global_default(subscriber).context("failed to install tracing subscriber")?;
    Ok(())
}
