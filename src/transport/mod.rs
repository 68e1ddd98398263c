//! Outbound mail delivery.
//!
//! [`MailTransport`] is the seam between the API service and the SMTP relay.
//! [`SmtpMailTransport`] opens one lettre session per call, authenticates with
//! the caller's own credentials and closes the session before returning.
//! Failures are mapped to [`MailError`] by a pluggable [`ErrorClassifier`].

mod classify;
mod message;
mod smtp;

pub use classify::{ErrorClassifier, FailureSignal, SmtpErrorClassifier, classify_signal};
pub use message::{OutgoingEmail, build_message, html_to_text};
pub use smtp::SmtpMailTransport;

use async_trait::async_trait;

/// SMTP login supplied with a single request. Never stored.
#[derive(Clone)]
pub struct SmtpCredentials {
    pub username: String,
    pub password: String,
}

impl SmtpCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Outcome of a delivery accepted by the relay.
#[derive(Debug, Clone)]
pub struct SendResult {
    pub success: bool,
    pub message_id: String,
    pub accepted: Vec<String>,
    pub rejected: Vec<String>,
    /// Final response text from the relay
    pub response: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("SMTP Authentication failed. Please check your email credentials.")]
    Auth,

    #[error("Failed to connect to SMTP server. Please check your internet connection.")]
    Connection,

    #[error("SMTP connection timed out. Please try again.")]
    Timeout,

    #[error("SMTP server not found. Please check the server configuration.")]
    Resolution,

    #[error("Recipient email address was rejected by the server.")]
    RecipientRejected,

    #[error("Email rejected due to policy reasons. Please check the content.")]
    ContentRejected,

    #[error("{0}")]
    Transport(String),

    #[error("Invalid email address format: {0}")]
    AddressFormat(#[from] lettre::address::AddressError),

    #[error("Failed to build email message: {0}")]
    MessageBuild(#[from] lettre::error::Error),
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Delivers one message through a fresh session.
    async fn send(
        &self,
        email: OutgoingEmail,
        credentials: SmtpCredentials,
    ) -> Result<SendResult, MailError>;

    /// Opens and closes a session to check the credentials. Sends nothing.
    async fn test_connection(&self, credentials: SmtpCredentials) -> bool;
}
