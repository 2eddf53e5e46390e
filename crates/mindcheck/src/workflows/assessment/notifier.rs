use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

pub const REPORT_SUBJECT: &str = "Mental Health Assessment Report";

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@]+@[^@]+\.[^@]+").expect("email pattern compiles"));

/// Recipient that passed the basic `local@domain.tld` check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> Result<Self, NotifyError> {
        let has_separator = raw
            .chars()
            .any(|c| c.is_whitespace() || c.is_control());
        if raw.is_empty() || has_separator || !EMAIL_PATTERN.is_match(raw) {
            return Err(NotifyError::InvalidAddress);
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn domain(&self) -> &str {
        self.0.split_once('@').map(|(_, domain)| domain).unwrap_or("")
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Plaintext report handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMessage {
    pub to: EmailAddress,
    pub subject: String,
    pub body: String,
}

/// Facts included in the emailed report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary<'a> {
    pub assessment: &'a str,
    pub severity: &'a str,
    pub score: u32,
}

impl ReportSummary<'_> {
    pub fn render(&self) -> String {
        format!(
            "Hello,

Your Mental Health Assessment is complete.

Assessment Type : {}
Severity Level  : {}
Score           : {}

This report is for educational purposes only.
It is not a medical diagnosis.

If you are feeling unsafe or distressed,
please seek professional help immediately.

Regards,
Mental Health Prediction Portal
",
            self.assessment, self.severity, self.score
        )
    }
}

/// Outbound mail seam (SMTP in production, recorders in tests).
pub trait MailTransport: Send + Sync {
    fn send(&self, message: &ReportMessage) -> Result<(), TransportError>;
}

impl<T: MailTransport + ?Sized> MailTransport for Arc<T> {
    fn send(&self, message: &ReportMessage) -> Result<(), TransportError> {
        (**self).send(message)
    }
}

/// Classified delivery failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("mail transport is not configured")]
    NotConfigured,
    #[error("message could not be built: {0}")]
    Message(String),
    #[error("mail server rejected credentials: {0}")]
    Authentication(String),
    #[error("mail server unreachable: {0}")]
    Network(String),
    #[error("mail server did not respond in time")]
    Timeout,
    #[error("mail server rejected the message: {0}")]
    Rejected(String),
}

impl TransportError {
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::NotConfigured => "not_configured",
            TransportError::Message(_) => "message",
            TransportError::Authentication(_) => "authentication",
            TransportError::Network(_) => "network",
            TransportError::Timeout => "timeout",
            TransportError::Rejected(_) => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    #[error("recipient address is empty or malformed")]
    InvalidAddress,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl NotifyError {
    pub fn kind(&self) -> &'static str {
        match self {
            NotifyError::InvalidAddress => "validation",
            NotifyError::Transport(err) => err.kind(),
        }
    }
}

/// Best-effort report delivery. Never propagates a failure to the caller.
#[derive(Debug, Clone)]
pub struct ReportNotifier<T> {
    transport: T,
}

impl<T: MailTransport> ReportNotifier<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns `true` only when the transport accepted the report.
    pub fn notify(&self, to: &str, assessment: &str, severity: &str, score: u32) -> bool {
        let summary = ReportSummary {
            assessment,
            severity,
            score,
        };

        match self.deliver(to, &summary) {
            Ok(recipient) => {
                info!(
                    recipient_domain = recipient.domain(),
                    assessment, "assessment report emailed"
                );
                true
            }
            Err(err) => {
                warn!(kind = err.kind(), error = %err, assessment, "assessment report not sent");
                false
            }
        }
    }

    fn deliver(&self, to: &str, summary: &ReportSummary<'_>) -> Result<EmailAddress, NotifyError> {
        let recipient = EmailAddress::parse(to)?;
        let message = ReportMessage {
            to: recipient.clone(),
            subject: REPORT_SUBJECT.to_string(),
            body: summary.render(),
        };
        self.transport.send(&message)?;
        Ok(recipient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<ReportMessage>>,
        failure: Option<TransportError>,
    }

    impl RecordingTransport {
        fn failing(failure: TransportError) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                failure: Some(failure),
            }
        }

        fn invocations(&self) -> usize {
            self.sent.lock().expect("transport mutex poisoned").len()
        }
    }

    impl MailTransport for RecordingTransport {
        fn send(&self, message: &ReportMessage) -> Result<(), TransportError> {
            self.sent
                .lock()
                .expect("transport mutex poisoned")
                .push(message.clone());
            match &self.failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn invalid_addresses_never_reach_transport() {
        let notifier = ReportNotifier::new(Arc::new(RecordingTransport::default()));

        for address in ["not-an-email", "", "user@localhost", "@example.com", "user@.com"] {
            assert!(!notifier.notify(address, "Stress Test", "High", 14), "{address}");
        }
        assert_eq!(notifier.transport().invocations(), 0);
    }

    #[test]
    fn transport_failures_become_false() {
        for failure in [
            TransportError::Authentication("535 bad credentials".to_string()),
            TransportError::Network("connection refused".to_string()),
            TransportError::Timeout,
            TransportError::NotConfigured,
        ] {
            let notifier = ReportNotifier::new(RecordingTransport::failing(failure));
            assert!(!notifier.notify("user@example.com", "Anxiety Test", "Low", 3));
            assert_eq!(notifier.transport().invocations(), 1);
        }
    }

    #[test]
    fn delivers_plaintext_report_to_single_recipient() {
        let notifier = ReportNotifier::new(RecordingTransport::default());

        assert!(notifier.notify("user@example.com", "Depression Test", "Moderate", 9));

        let sent = notifier.transport().sent.lock().expect("transport mutex poisoned");
        assert_eq!(sent.len(), 1);
        let message = &sent[0];
        assert_eq!(message.to.as_str(), "user@example.com");
        assert_eq!(message.subject, REPORT_SUBJECT);
        assert!(message.body.contains("Assessment Type : Depression Test"));
        assert!(message.body.contains("Severity Level  : Moderate"));
        assert!(message.body.contains("Score           : 9"));
        assert!(message.body.contains("not a medical diagnosis"));
    }

    #[test]
    fn header_injection_never_reaches_transport() {
        let notifier = ReportNotifier::new(RecordingTransport::default());

        for address in [
            "a@b.c\r\nBcc: victim@example.com",
            "user@example.com\n",
            "user name@example.com",
            "user@example.com\tx",
        ] {
            assert_eq!(
                EmailAddress::parse(address),
                Err(NotifyError::InvalidAddress),
                "{address:?}"
            );
            assert!(!notifier.notify(address, "Stress Test", "Low", 1));
        }
        assert_eq!(notifier.transport().invocations(), 0);
    }

    #[test]
    fn address_validation_matches_basic_pattern() {
        assert!(EmailAddress::parse("first.last+tag@mail.example.org").is_ok());
        assert_eq!(
            EmailAddress::parse("user@example").expect_err("no tld"),
            NotifyError::InvalidAddress
        );
        assert_eq!(
            EmailAddress::parse("user@example.com")
                .expect("valid")
                .domain(),
            "example.com"
        );
    }
}
