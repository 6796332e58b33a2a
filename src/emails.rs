use lettre::{
    message::{header::ContentType, Mailbox},
    Message,
};
use thiserror::Error;

use crate::{app::App, config::EmailConfig, jobs::JobError};

const MOCK_SENDER: &str = "noreply@example.com";

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] lettre::address::AddressError),
    #[error("Failed to build email: {0}")]
    BuilderError(#[from] lettre::error::Error),
    #[error("Mailer error: {0}")]
    MailerError(String),
}

impl From<EmailError> for JobError {
    fn from(error: EmailError) -> Self {
        match error {
            EmailError::InvalidAddress(e) => JobError::InvalidPayload(e.to_string()),
            EmailError::BuilderError(e) => JobError::ExecutionFailed(e.to_string()),
            EmailError::MailerError(e) => JobError::ExecutionFailed(e),
        }
    }
}

fn sender(config: &EmailConfig) -> Result<Mailbox, EmailError> {
    match config {
        EmailConfig::Smtp { sender, .. } => Ok(sender.clone()),
        EmailConfig::Mock => Ok(MOCK_SENDER.parse()?),
    }
}

/// Sends a plain-text email from the configured sender.
pub async fn send_text_email(
    app: &App,
    recipient: &str,
    subject: &str,
    body: String,
) -> Result<(), EmailError> {
    let email = Message::builder()
        .from(sender(&app.config.email)?)
        .to(recipient.parse()?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body)?;

    app.mailer
        .send(email)
        .await
        .map_err(|e| EmailError::MailerError(e.to_string()))?;

    Ok(())
}
