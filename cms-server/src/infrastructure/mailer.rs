use async_trait::async_trait;
use tracing::info;

use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct MailMessage {
    pub(crate) to: String,
    pub(crate) subject: String,
    pub(crate) body: String,
}

/// Transactional mail delivery. The server only depends on this interface;
/// actual SMTP delivery is a deployment concern.
#[async_trait]
pub(crate) trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), DomainError>;
}

/// Writes outgoing mail to the log instead of delivering it.
#[derive(Debug, Clone)]
pub(crate) struct LogMailer {
    from: String,
}

impl LogMailer {
    pub(crate) fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<(), DomainError> {
        info!(
            from = %self.from,
            to = %message.to,
            subject = %message.subject,
            "outgoing mail: {}",
            message.body
        );
        Ok(())
    }
}

pub(crate) fn admin_created_message(email: &str, username: &str) -> MailMessage {
    MailMessage {
        to: email.to_string(),
        subject: "Your admin account is ready".to_string(),
        body: format!("Hi {username}, an administrator account was created for this address."),
    }
}
