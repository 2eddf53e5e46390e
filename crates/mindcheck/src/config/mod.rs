use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::workflows::assessment::{MissingFeaturePolicy, SeverityPreset};

const DEFAULT_MODEL_PATH: &str = "models/risk_forest.json";
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_SMTP_TIMEOUT_SECS: u64 = 10;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
    pub model: ModelConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig::from_env()?,
            model: ModelConfig::from_env(),
            mail: MailConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Rule-based scoring dials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringConfig {
    pub severity_preset: SeverityPreset,
    pub missing_features: MissingFeaturePolicy,
}

impl ScoringConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let severity_preset = match env::var("MINDCHECK_SEVERITY_PRESET") {
            Ok(raw) => SeverityPreset::parse(&raw).ok_or(ConfigError::UnknownSeverityPreset(raw))?,
            Err(_) => SeverityPreset::default(),
        };

        let missing_features = match env::var("MINDCHECK_MISSING_FEATURES") {
            Ok(raw) => MissingFeaturePolicy::parse(&raw)
                .ok_or(ConfigError::UnknownMissingFeaturePolicy(raw))?,
            Err(_) => MissingFeaturePolicy::default(),
        };

        Ok(Self {
            severity_preset,
            missing_features,
        })
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            severity_preset: SeverityPreset::default(),
            missing_features: MissingFeaturePolicy::default(),
        }
    }
}

/// Location of the trained classifier artifact.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub artifact_path: PathBuf,
}

impl ModelConfig {
    fn from_env() -> Self {
        let artifact_path = env::var("MINDCHECK_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_MODEL_PATH));
        Self { artifact_path }
    }
}

/// Outbound report mail. `smtp` stays empty until credentials are supplied.
#[derive(Debug, Clone, Default)]
pub struct MailConfig {
    pub smtp: Option<SmtpSettings>,
}

impl MailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let username = env::var("MINDCHECK_SMTP_USERNAME").ok();
        let password = env::var("MINDCHECK_SMTP_PASSWORD").ok();

        let (username, password) = match (username, password) {
            (Some(username), Some(password))
                if !username.trim().is_empty() && !password.is_empty() =>
            {
                (username, password)
            }
            _ => return Ok(Self { smtp: None }),
        };

        let host = env::var("MINDCHECK_SMTP_HOST").unwrap_or_else(|_| DEFAULT_SMTP_HOST.into());
        let port = match env::var("MINDCHECK_SMTP_PORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidSmtpPort)?,
            Err(_) => DEFAULT_SMTP_PORT,
        };
        let timeout_secs = match env::var("MINDCHECK_SMTP_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidSmtpTimeout)?,
            Err(_) => DEFAULT_SMTP_TIMEOUT_SECS,
        };
        let sender = env::var("MINDCHECK_SMTP_SENDER").unwrap_or_else(|_| username.clone());

        Ok(Self {
            smtp: Some(SmtpSettings {
                host,
                port,
                username,
                password,
                sender,
                timeout: Duration::from_secs(timeout_secs),
            }),
        })
    }
}

/// Connection and identity settings for the SMTP relay.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
    pub timeout: Duration,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sender", &self.sender)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    UnknownSeverityPreset(String),
    UnknownMissingFeaturePolicy(String),
    InvalidSmtpPort,
    InvalidSmtpTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must be an IP address or 'localhost'")
            }
            ConfigError::UnknownSeverityPreset(value) => write!(
                f,
                "MINDCHECK_SEVERITY_PRESET '{value}' is not one of standard, clinical, brief"
            ),
            ConfigError::UnknownMissingFeaturePolicy(value) => write!(
                f,
                "MINDCHECK_MISSING_FEATURES '{value}' is not one of default-to-zero, require-safety-critical"
            ),
            ConfigError::InvalidSmtpPort => write!(f, "MINDCHECK_SMTP_PORT must be a valid u16"),
            ConfigError::InvalidSmtpTimeout => {
                write!(f, "MINDCHECK_SMTP_TIMEOUT_SECS must be a positive integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
