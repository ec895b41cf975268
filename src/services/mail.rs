//! Outgoing email
//!
//! Magic-link login codes are delivered through a [`Mailer`]. SMTP is used
//! when a relay is configured; otherwise messages are written to the log.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use parking_lot::Mutex;

use crate::config::mail::MailConfig;
use crate::error::{AppError, Result};

/// A plain-text email
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<()>;
}

/// Build the mailer described by the configuration
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>> {
    match &config.smtp_host {
        Some(host) => {
            tracing::info!(host = %host, "Using SMTP mailer");
            Ok(Arc::new(SmtpMailer::new(config, host)?))
        }
        None => {
            tracing::info!("No SMTP host configured, outgoing mail will be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig, host: &str) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| AppError::Mail(format!("Failed to create SMTP transport: {}", e)))?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        let from: Mailbox = self
            .from_address
            .parse()
            .map_err(|_| AppError::Mail("Invalid from email address".to_string()))?;
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|_| AppError::Mail("Invalid recipient email address".to_string()))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body)
            .map_err(|e| AppError::Mail(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Mail(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

/// Writes messages to the log instead of delivering them
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        tracing::info!(to = %mail.to, subject = %mail.subject, "Outgoing mail");
        // The body may carry a live login code
        tracing::debug!(to = %mail.to, body = %mail.body, "Outgoing mail body");
        Ok(())
    }
}

/// Keeps every message in memory; used by tests to read magic links back
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().clone()
    }

    pub fn last_to(&self, to: &str) -> Option<OutgoingMail> {
        self.sent.lock().iter().rev().find(|m| m.to == to).cloned()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<()> {
        self.sent.lock().push(mail);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(to: &str) -> OutgoingMail {
        OutgoingMail {
            to: to.to_string(),
            subject: "Your Curio login link".to_string(),
            body: "link".to_string(),
        }
    }

    #[tokio::test]
    async fn test_recording_mailer_keeps_messages() {
        let mailer = RecordingMailer::default();
        mailer.send(mail("a@example.com")).await.unwrap();
        mailer.send(mail("b@example.com")).await.unwrap();

        assert_eq!(mailer.sent().len(), 2);
        assert_eq!(mailer.last_to("b@example.com").unwrap().to, "b@example.com");
        assert!(mailer.last_to("c@example.com").is_none());
    }

    #[tokio::test]
    async fn test_log_mailer_accepts_everything() {
        assert!(LogMailer.send(mail("a@example.com")).await.is_ok());
    }

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    async fn log_mailer_output(level: tracing::Level) -> String {
        use tracing::instrument::WithSubscriber;

        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let login_mail = OutgoingMail {
            to: "a@example.com".to_string(),
            subject: "Your Curio login link".to_string(),
            body: "http://localhost:8000/auth/callback?code=secret-login-code".to_string(),
        };
        LogMailer
            .send(login_mail)
            .with_subscriber(subscriber)
            .await
            .unwrap();

        let output = log.0.lock().clone();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_log_mailer_keeps_body_out_of_info_logs() {
        let info = log_mailer_output(tracing::Level::INFO).await;
        assert!(info.contains("a@example.com"));
        assert!(info.contains("Your Curio login link"));
        assert!(!info.contains("secret-login-code"));

        let debug = log_mailer_output(tracing::Level::DEBUG).await;
        assert!(debug.contains("secret-login-code"));
    }

    #[test]
    fn test_build_mailer_without_smtp_host() {
        let config = MailConfig {
            smtp_host: None,
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            from_address: "Curio <no-reply@curio.local>".to_string(),
        };
        assert!(build_mailer(&config).is_ok());
    }
}
