use std::{
    fmt::{self, Debug},
    sync::{Arc, Mutex, PoisonError},
};

use lettre::{
    transport::smtp::authentication::Credentials, AsyncSmtpTransport, AsyncTransport, Message,
    Tokio1Executor,
};

use crate::config::EmailConfig;

/// In-memory transport that keeps every message it is asked to send.
#[derive(Clone, Default)]
pub struct MockTransport {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn store_message(&self, message: Message) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Mailer that can be either a real SMTP transport or a mock for testing.
#[derive(Clone)]
pub enum Mailer {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Mock(MockTransport),
}

impl Debug for Mailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Smtp(_) => f.debug_tuple("Mailer::Smtp").finish(),
            Self::Mock(_) => f.debug_tuple("Mailer::Mock").finish(),
        }
    }
}

impl Mailer {
    pub fn mock() -> Self {
        Self::Mock(MockTransport::new())
    }

    pub fn smtp(transport: AsyncSmtpTransport<Tokio1Executor>) -> Self {
        Self::Smtp(transport)
    }

    /// Builds the transport described by `config`.
    pub fn from_config(config: &EmailConfig) -> Result<Self, lettre::transport::smtp::Error> {
        match config {
            EmailConfig::Mock => Ok(Self::mock()),
            EmailConfig::Smtp {
                host,
                port,
                username,
                password,
                use_tls,
                ..
            } => {
                let mut builder = if *use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::relay(host)?.port(*port)
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(*port)
                };

                if let (Some(username), Some(password)) = (username, password) {
                    builder =
                        builder.credentials(Credentials::new(username.clone(), password.clone()));
                }

                Ok(Self::smtp(builder.build()))
            }
        }
    }

    /// Send an email. For mock transport, stores the message for later inspection.
    pub async fn send(
        &self,
        message: Message,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match self {
            Self::Smtp(transport) => {
                transport.send(message).await?;
                Ok(())
            }
            Self::Mock(mock) => {
                mock.store_message(message);
                Ok(())
            }
        }
    }

    /// Sent emails, or `None` for the SMTP mailer.
    pub fn messages(&self) -> Option<Vec<Message>> {
        match self {
            Self::Mock(transport) => Some(transport.messages()),
            Self::Smtp(_) => None,
        }
    }

    pub fn clear_messages(&self) {
        if let Self::Mock(transport) = self {
            transport.clear();
        }
    }
}
