use std::env;
use std::env::current_dir;
use std::fmt::Display;

use config::Config;
use config::ConfigError;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

/// Used when `SMTP_PORT` is unset or does not parse as a port
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Global configuration. See `get_configuration`.
#[derive(Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub smtp: SmtpEnv,
}

/// Server configuration
#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    /// Should be localhost on dev machine, 0.0.0.0 on prod
    pub host: String,

    /// Port 0 lets the OS pick one (tests)
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

/// Raw mail configuration, exactly as found in the process environment.
///
/// Every field is optional so that the server can start even when mail is not
/// configured; each request calls `validate` before doing anything else, and
/// fails if a required variable is missing.
#[derive(Deserialize, Clone, Default)]
pub struct SmtpEnv {
    pub smtp_host: Option<String>,
    pub smtp_port: Option<String>,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<Secret<String>>,
    pub smtp_secure: Option<String>,
    pub recipient_email: Option<String>,
    pub rsvp_email_subject: Option<String>,
}

/// Mail configuration with all defaults applied. Only obtainable through
/// `SmtpEnv::validate`.
#[derive(Clone, Debug)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Secret<String>,
    /// Implicit TLS from the first byte (usually port 465); otherwise STARTTLS
    /// is used when the relay offers it
    pub secure: bool,
    pub recipient: String,
    pub subject: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("Missing required SMTP environment variables: {}", .0.join(", "))]
pub struct MissingConfiguration(pub Vec<&'static str>);

/// Empty and whitespace-only values are as good as unset
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl SmtpEnv {
    /// Read the unprefixed `SMTP_*`, `RECIPIENT_EMAIL` and `RSVP_EMAIL_SUBJECT`
    /// env vars. Unrelated env vars are ignored.
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_source(config::Environment::default()) }

    /// As `from_env`, from any env-like source (e.g. a `config::Environment`
    /// fed a fixed map)
    pub fn from_source(source: config::Environment) -> Result<Self, ConfigError> {
        Config::builder()
            // keys are lowercased: `SMTP_HOST` -> `smtp_host`
            .add_source(source)
            .build()?
            .try_deserialize::<Self>()
    }

    /// Check that `SMTP_HOST`, `SMTP_USER` and `SMTP_PASSWORD` are all set,
    /// reporting every missing one at once, and resolve the optional values.
    ///
    /// No I/O is performed.
    pub fn validate(&self) -> Result<SmtpSettings, MissingConfiguration> {
        use secrecy::ExposeSecret;

        let host = present(&self.smtp_host);
        let username = present(&self.smtp_user);
        let password = self
            .smtp_password
            .as_ref()
            .filter(|p| !p.expose_secret().trim().is_empty())
            .cloned();

        let (host, username, password) = match (host, username, password) {
            (Some(h), Some(u), Some(p)) => (h, u, p),
            (h, u, p) => {
                let missing = [
                    ("SMTP_HOST", h.is_none()),
                    ("SMTP_USER", u.is_none()),
                    ("SMTP_PASSWORD", p.is_none()),
                ]
                .into_iter()
                .filter_map(|(key, missing)| missing.then_some(key))
                .collect();
                return Err(MissingConfiguration(missing));
            }
        };

        let port = present(&self.smtp_port)
            .and_then(|p| p.parse::<u16>().ok())
            .filter(|p| *p != 0)
            .unwrap_or(DEFAULT_SMTP_PORT);

        let secure = matches!(present(&self.smtp_secure).as_deref(), Some("true" | "1"));

        let recipient = present(&self.recipient_email).unwrap_or_else(|| username.clone());

        Ok(SmtpSettings {
            host,
            port,
            username,
            password,
            secure,
            recipient,
            subject: present(&self.rsvp_email_subject),
        })
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Display for Environment {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Environment::Local => "local",
                Environment::Production => "production",
            }
        )
    }
}

impl TryFrom<String> for Environment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            e => Err(format!("Invalid environment: {e}")),
        }
    }
}

/// Load yaml configuration files at `<project_root>/configuration`, then the
/// mail env vars.
///
/// Application settings must all be present, otherwise initialisation fails
/// and the server does not start. Mail settings are only checked per request.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let cfg_dir = current_dir()
        .map_err(|e| ConfigError::Message(format!("could not get current dir: {e}")))?
        .join("configuration");

    let env: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".to_string())
        .try_into()
        .map_err(ConfigError::Message)?;

    tracing::info!("loading config for {env} env");

    let application = Config::builder()
        .add_source(config::File::from(cfg_dir.join("base.yaml")))
        .add_source(config::File::from(cfg_dir.join(format!("{env}.yaml"))))
        .add_source(
            // env vars are -always- parsed as String, hence `serde-aux` for the port
            //
            // `APP_APPLICATION__PORT=5001` -> `Settings.application.port`
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .get::<ApplicationSettings>("application")?;

    let smtp = SmtpEnv::from_env()?;

    Ok(Settings { application, smtp })
}
