use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};

use std::{sync::Arc, time::Duration};

use super::{
    ErrorClassifier, MailError, MailTransport, OutgoingEmail, SendResult, SmtpCredentials,
    SmtpErrorClassifier,
    message::{build_message, generate_message_id},
};
use crate::config::{SmtpConfig, TlsMode};

pub struct SmtpMailTransport {
    config: SmtpConfig,
    classifier: Arc<dyn ErrorClassifier>,
}

impl SmtpMailTransport {
    pub fn new(config: SmtpConfig) -> Self {
        Self {
            config,
            classifier: Arc::new(SmtpErrorClassifier),
        }
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    fn classify(&self, error: &lettre::transport::smtp::Error) -> MailError {
        self.classifier.classify(error)
    }

    /// Connect and greeting budget for opening a session.
    fn handshake_timeout(&self) -> Duration {
        self.config.connect_timeout + self.config.greeting_timeout
    }

    /// Builds a single-use session. Connection pooling is compiled out, so
    /// every send or verify opens its own connection and quits it afterwards.
    fn session(
        &self,
        credentials: &SmtpCredentials,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let host = self.config.host.as_str();

        let builder = match self.config.tls {
            TlsMode::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
            TlsMode::Opportunistic => {
                let parameters =
                    TlsParameters::new(host.to_string()).map_err(|e| self.classify(&e))?;
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
                    .tls(Tls::Opportunistic(parameters))
            }
            TlsMode::Required => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| self.classify(&e))?,
            TlsMode::Wrapper => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| self.classify(&e))?,
        };

        Ok(builder
            .port(self.config.port)
            .timeout(Some(self.config.socket_timeout))
            .credentials(Credentials::new(
                credentials.username.clone(),
                credentials.password.clone(),
            ))
            .build())
    }

    async fn verify(
        &self,
        transport: &AsyncSmtpTransport<Tokio1Executor>,
    ) -> Result<(), MailError> {
        match tokio::time::timeout(self.handshake_timeout(), transport.test_connection()).await {
            Ok(Ok(true)) => Ok(()),
            Ok(Ok(false)) => Err(MailError::Connection),
            Ok(Err(e)) => Err(self.classify(&e)),
            Err(_) => Err(MailError::Timeout),
        }
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(
        &self,
        email: OutgoingEmail,
        credentials: SmtpCredentials,
    ) -> Result<SendResult, MailError> {
        let message_id = generate_message_id(&email.from_email);
        let message = build_message(&email, &message_id, &self.config.mailer_name)?;
        let accepted: Vec<String> = message
            .envelope()
            .to()
            .iter()
            .map(ToString::to_string)
            .collect();

        let transport = self.session(&credentials)?;

        tracing::info!(
            "Verifying SMTP connection to {}:{}",
            self.config.host,
            self.config.port
        );
        self.verify(&transport).await?;
        tracing::info!("SMTP connection verified successfully");

        tracing::info!(
            "Sending email from {} to {} with subject '{}'",
            email.from_email,
            email.to,
            email.subject
        );

        let deadline = self.handshake_timeout() + self.config.socket_timeout;
        let response = tokio::time::timeout(deadline, transport.send(message))
            .await
            .map_err(|_| MailError::Timeout)?
            .map_err(|e| self.classify(&e))?;

        let result = SendResult {
            success: response.is_positive(),
            message_id,
            accepted,
            rejected: Vec::new(),
            response: response
                .message()
                .map(|line| line.to_string())
                .collect::<Vec<_>>()
                .join(" "),
        };

        tracing::info!(
            message_id = %result.message_id,
            accepted = ?result.accepted,
            "Email sent successfully"
        );

        Ok(result)
    }

    async fn test_connection(&self, credentials: SmtpCredentials) -> bool {
        let transport = match self.session(&credentials) {
            Ok(transport) => transport,
            Err(e) => {
                tracing::error!(
                    "SMTP connection test failed for {}: {e}",
                    credentials.username
                );
                return false;
            }
        };

        match self.verify(&transport).await {
            Ok(()) => {
                tracing::info!("SMTP connection test successful for {}", credentials.username);
                true
            }
            Err(e) => {
                tracing::error!(
                    "SMTP connection test failed for {}: {e}",
                    credentials.username
                );
                false
            }
        }
    }
}
