use std::error::Error;
use std::io::{self, ErrorKind};

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, warn};

use super::notifier::{MailTransport, ReportMessage, TransportError};
use crate::config::{MailConfig, SmtpSettings};

/// Authentication failure replies (530, 534, 535).
const AUTH_FAILURE_CODES: [&str; 3] = ["530", "534", "535"];

/// SMTP submission over implicit TLS with a bounded connection timeout.
#[derive(Clone)]
pub struct SmtpMailTransport {
    mailer: SmtpTransport,
    sender: Mailbox,
}

impl SmtpMailTransport {
    pub fn new(settings: &SmtpSettings) -> Result<Self, TransportError> {
        let sender: Mailbox = settings.sender.parse().map_err(|err| {
            TransportError::Message(format!("invalid sender '{}': {err}", settings.sender))
        })?;

        let mailer = SmtpTransport::relay(&settings.host)
            .map_err(classify_smtp_error)?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self { mailer, sender })
    }
}

impl MailTransport for SmtpMailTransport {
    fn send(&self, message: &ReportMessage) -> Result<(), TransportError> {
        let recipient: Mailbox = message
            .to
            .as_str()
            .parse()
            .map_err(|err| TransportError::Message(format!("invalid recipient: {err}")))?;

        let email = Message::builder()
            .from(self.sender.clone())
            .to(recipient)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|err| TransportError::Message(err.to_string()))?;

        self.mailer
            .send(&email)
            .map(|_| ())
            .map_err(classify_smtp_error)
    }
}

fn classify_smtp_error(err: lettre::transport::smtp::Error) -> TransportError {
    if err.is_timeout() || io_timed_out(&err) {
        return TransportError::Timeout;
    }

    match err.status() {
        Some(code) if AUTH_FAILURE_CODES.contains(&code.to_string().as_str()) => {
            TransportError::Authentication(err.to_string())
        }
        Some(_) => TransportError::Rejected(err.to_string()),
        None => TransportError::Network(err.to_string()),
    }
}

/// Socket read timeouts surface as `WouldBlock` on Unix and `TimedOut` elsewhere.
fn io_timed_out(err: &(dyn Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(cause) = current {
        if let Some(io) = cause.downcast_ref::<io::Error>() {
            if matches!(io.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) {
                return true;
            }
        }
        current = cause.source();
    }
    false
}

/// Transport used when no SMTP credentials were configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTransport;

impl MailTransport for DisabledTransport {
    fn send(&self, _message: &ReportMessage) -> Result<(), TransportError> {
        Err(TransportError::NotConfigured)
    }
}

/// Transport selected from [`MailConfig`] at startup.
#[derive(Clone)]
pub enum ReportTransport {
    Smtp(SmtpMailTransport),
    Disabled(DisabledTransport),
}

impl ReportTransport {
    pub fn from_config(config: &MailConfig) -> Result<Self, TransportError> {
        match &config.smtp {
            Some(settings) => {
                let transport = SmtpMailTransport::new(settings)?;
                info!(
                    host = %settings.host,
                    port = settings.port,
                    timeout_secs = settings.timeout.as_secs(),
                    "smtp report delivery enabled"
                );
                Ok(Self::Smtp(transport))
            }
            None => {
                warn!("smtp credentials not configured; email reports disabled");
                Ok(Self::Disabled(DisabledTransport))
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, ReportTransport::Smtp(_))
    }
}

impl MailTransport for ReportTransport {
    fn send(&self, message: &ReportMessage) -> Result<(), TransportError> {
        match self {
            ReportTransport::Smtp(transport) => transport.send(message),
            ReportTransport::Disabled(transport) => transport.send(message),
        }
    }
}
