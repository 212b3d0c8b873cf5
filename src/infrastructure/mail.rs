//! Outgoing e-mail
//!
//! [`SmtpMailer`] delivers through an SMTP relay with STARTTLS.
//! [`LogMailer`] stands in when mail is disabled and only logs.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::application::ports::Mailer;
use crate::config::MailConfig;
use crate::domain::{DomainError, DomainResult};

#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> DomainResult<Self> {
        let credentials =
            Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| DomainError::Internal(format!("SMTP relay setup failed: {}", e)))?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> DomainResult<()> {
        let email = Message::builder()
            .from(self.from_address.parse().map_err(|_| {
                DomainError::Internal(format!("Invalid sender address: {}", self.from_address))
            })?)
            .to(to
                .parse()
                .map_err(|_| DomainError::validation(format!("Invalid email address: {}", to)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DomainError::Internal(format!("Failed to build message: {}", e)))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| DomainError::Internal(format!("SMTP error: {}", e)))?;

        info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Logs messages instead of sending them
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> DomainResult<()> {
        info!(to = %to, subject = %subject, body = %body, "📧 Mail delivery disabled, message logged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_accepts_everything() {
        assert!(LogMailer.send("a@example.com", "Hi", "Body").await.is_ok());
    }

    #[tokio::test]
    async fn test_smtp_mailer_rejects_bad_recipient() {
        let mailer = SmtpMailer::new(&MailConfig {
            enabled: true,
            smtp_host: "localhost".to_string(),
            ..MailConfig::default()
        })
        .unwrap();

        let err = mailer.send("not-an-address", "Hi", "Body").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
