use crate::{
    dto::{
        SendEmailRequest, SendEmailResponse, TemplateRequest, TemplateResponse,
        TestConnectionRequest, TestConnectionResponse,
    },
    template::{TemplateError, render_email},
    transport::{MailError, MailTransport, OutgoingEmail, SmtpCredentials},
    validation::{ValidationError, validate_send_request, validate_test_connection_request},
};

use std::sync::Arc;

pub const SEND_SUCCESS_MESSAGE: &str = "Email sent successfully!";

pub struct EmailService {
    transport: Arc<dyn MailTransport>,
}

#[derive(Debug, thiserror::Error)]
pub enum EmailServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to render email template: {0}")]
    Render(askama::Error),

    #[error(transparent)]
    Mail(#[from] MailError),
}

impl From<TemplateError> for EmailServiceError {
    fn from(error: TemplateError) -> Self {
        match error {
            TemplateError::Validation(e) => Self::Validation(e),
            TemplateError::Render(e) => Self::Render(e),
        }
    }
}

impl EmailService {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    pub fn generate_template(
        &self,
        request: &TemplateRequest,
    ) -> Result<TemplateResponse, EmailServiceError> {
        let html_template = render_email(request)?;
        Ok(TemplateResponse { html_template })
    }

    pub async fn send_email(
        &self,
        request: SendEmailRequest,
    ) -> Result<SendEmailResponse, EmailServiceError> {
        validate_send_request(&request)?;

        let credentials = SmtpCredentials::new(
            request.sender_email.trim(),
            request.sender_password.clone(),
        );
        let email = OutgoingEmail {
            from_name: request.sender_name,
            from_email: request.sender_email,
            to: request.recipient_email,
            subject: request.subject,
            html: request.message_body,
        };

        tracing::info!(
            "Sending email from '{} <{}>' to '{}'",
            email.from_name,
            email.from_email,
            email.to
        );

        let result = self.transport.send(email, credentials).await?;
        if !result.success {
            return Err(MailError::Transport(result.response).into());
        }

        tracing::info!("Message {} accepted by relay", result.message_id);

        Ok(SendEmailResponse {
            message: SEND_SUCCESS_MESSAGE.to_string(),
        })
    }

    pub async fn test_connection(
        &self,
        request: TestConnectionRequest,
    ) -> Result<TestConnectionResponse, EmailServiceError> {
        validate_test_connection_request(&request)?;

        let credentials =
            SmtpCredentials::new(request.sender_email.trim(), request.sender_password);
        let valid = self.transport.test_connection(credentials).await;

        Ok(TestConnectionResponse { valid })
    }
}
