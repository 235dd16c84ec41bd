// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email alerts to the sales team when a customer texts in.

pub mod content;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use leadline_config::model::NotifyConfig;
use leadline_core::types::InboundNotification;
use leadline_core::{AdapterType, HealthStatus, LeadlineError, Notifier, PluginAdapter};

pub use content::{EmailContent, compose};

fn notification_error(message: impl Into<String>) -> LeadlineError {
    LeadlineError::Notification {
        message: message.into(),
    }
}

/// Sends one multipart (text + HTML) email per inbound SMS over SMTP
/// with STARTTLS.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    crm_url: String,
}

impl SmtpNotifier {
    /// Build from `[notify]`. Host, sender, and recipient are required.
    pub fn from_config(config: &NotifyConfig) -> Result<Self, LeadlineError> {
        let host = config
            .smtp_host
            .as_deref()
            .ok_or_else(|| LeadlineError::Config("notify.smtp_host is required".into()))?;
        let from: Mailbox = config
            .from
            .as_deref()
            .ok_or_else(|| LeadlineError::Config("notify.from is required".into()))?
            .parse()
            .map_err(|e| LeadlineError::Config(format!("notify.from: {e}")))?;
        let to: Mailbox = config
            .to
            .as_deref()
            .ok_or_else(|| LeadlineError::Config("notify.to is required".into()))?
            .parse()
            .map_err(|e| LeadlineError::Config(format!("notify.to: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| LeadlineError::Config(format!("notify.smtp_host: {e}")))?
            .port(config.smtp_port);
        if let (Some(user), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
            to,
            crm_url: config.crm_url.clone(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SmtpNotifier {
    fn name(&self) -> &str {
        "smtp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadlineError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(HealthStatus::Healthy),
            Ok(false) => Ok(HealthStatus::Degraded("SMTP server did not respond".into())),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("SMTP unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), LeadlineError> {
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify_inbound(&self, notification: &InboundNotification) -> Result<(), LeadlineError> {
        let content = compose(notification, &self.crm_url);
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(content.subject)
            .multipart(MultiPart::alternative_plain_html(content.text, content.html))
            .map_err(|e| notification_error(format!("failed to build email: {e}")))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| notification_error(format!("SMTP send failed: {e}")))?;
        debug!(conversation_id = %notification.conversation_id, "inbound notification emailed");
        Ok(())
    }
}
