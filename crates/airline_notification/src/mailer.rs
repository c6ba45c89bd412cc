// --- File: crates/airline_notification/src/mailer.rs ---
//! Outgoing mail. [`SmtpMailer`] talks to a real relay; [`LogMailer`] only writes the
//! message to the log and is used whenever SMTP credentials are missing.

use std::sync::Arc;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, warn};

use airline_common::models::EmailMessage;
use airline_config::{AppConfig, SmtpConfig};

use crate::error::MailError;

/// Implicit-TLS submission port; every other port negotiates STARTTLS.
const SMTPS_PORT: u16 = 465;

/// Blocking mail transport. Call through [`deliver`] from async code.
#[cfg_attr(test, mockall::automock)]
pub trait Mailer: Send + Sync {
    fn send(&self, message: &EmailMessage) -> Result<(), MailError>;

    /// Short label for logs and the status endpoint.
    fn name(&self) -> &'static str;
}

/// Sends `message` on the blocking pool.
pub async fn deliver(mailer: Arc<dyn Mailer>, message: EmailMessage) -> Result<(), MailError> {
    tokio::task::spawn_blocking(move || mailer.send(&message))
        .await
        .map_err(|e| MailError::Task(e.to_string()))?
}

#[derive(Clone)]
pub struct SmtpMailer {
    transport: SmtpTransport,
    from_email: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let builder = if config.port == SMTPS_PORT {
            SmtpTransport::relay(&config.host)
        } else {
            SmtpTransport::starttls_relay(&config.host)
        }
        .map_err(|e| MailError::Transport(format!("SMTP relay error: {}", e)))?;

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from_email: config.from_email.clone(),
        })
    }

    fn build_message(&self, message: &EmailMessage) -> Result<Message, MailError> {
        let from: Mailbox = self
            .from_email
            .parse()
            .map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
                address: self.from_email.clone(),
                message: e.to_string(),
            })?;
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e: lettre::address::AddressError| MailError::InvalidAddress {
                address: message.to.clone(),
                message: e.to_string(),
            })?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_PLAIN)
            .body(message.body.clone())
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let email = self.build_message(message)?;
        self.transport
            .send(&email)
            .map_err(|e| MailError::Transport(e.to_string()))?;
        info!("Email '{}' sent to {}", message.subject, message.to);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

/// Writes every message to the log and reports success.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "SMTP not configured, email not sent:\n{}",
            message.body
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// SMTP when credentials are configured, the log otherwise.
pub fn mailer_from_config(config: &AppConfig) -> Arc<dyn Mailer> {
    match config.smtp.as_ref().filter(|smtp| smtp.is_configured()) {
        Some(smtp) => match SmtpMailer::new(smtp) {
            Ok(mailer) => {
                info!("Sending mail through {}:{}", smtp.host, smtp.port);
                Arc::new(mailer)
            }
            Err(e) => {
                warn!("{}; falling back to logging emails", e);
                Arc::new(LogMailer)
            }
        },
        None => Arc::new(LogMailer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            to: "ana@example.com".to_string(),
            subject: "Hello".to_string(),
            body: "Body".to_string(),
        }
    }

    #[tokio::test]
    async fn deliver_runs_the_mailer() {
        let mut mock = MockMailer::new();
        mock.expect_send()
            .withf(|m| m.to == "ana@example.com" && m.subject == "Hello")
            .times(1)
            .returning(|_| Ok(()));

        deliver(Arc::new(mock), message()).await.unwrap();
    }

    #[tokio::test]
    async fn deliver_passes_failures_through() {
        let mut mock = MockMailer::new();
        mock.expect_send()
            .returning(|_| Err(MailError::Transport("connection refused".to_string())));

        let err = deliver(Arc::new(mock), message()).await.unwrap_err();
        assert!(matches!(err, MailError::Transport(_)));
    }

    #[test]
    fn missing_credentials_select_the_log_mailer() {
        let config = AppConfig {
            smtp: Some(SmtpConfig::default()),
            ..AppConfig::default()
        };
        assert_eq!(mailer_from_config(&config).name(), "log");
        assert_eq!(mailer_from_config(&AppConfig::default()).name(), "log");
    }
}
