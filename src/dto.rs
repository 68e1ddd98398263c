use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Request fields default to empty strings so that missing fields reach
// validation and get a 400 with a field list instead of a framework rejection.

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateRequest {
    /// Name used in the greeting line
    pub recipient_name: String,
    /// Name used in the introduction and sign-off
    pub sender_name: String,
    /// Main paragraph of the email
    pub message_body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    /// Complete rendered HTML document
    pub html_template: String,
}

#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SendEmailRequest {
    /// Sender address, also used as the SMTP username
    pub sender_email: String,
    /// SMTP password, used for this request only
    pub sender_password: String,
    pub recipient_email: String,
    pub recipient_name: String,
    #[serde(rename = "emailSubject")]
    pub subject: String,
    pub message_body: String,
    pub sender_name: String,
}

// Hand-written so the password never reaches the logs.
impl std::fmt::Debug for SendEmailRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendEmailRequest")
            .field("sender_email", &self.sender_email)
            .field("sender_password", &"<redacted>")
            .field("recipient_email", &self.recipient_email)
            .field("recipient_name", &self.recipient_name)
            .field("subject", &self.subject)
            .field("message_body", &self.message_body)
            .field("sender_name", &self.sender_name)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SendEmailResponse {
    /// Human readable confirmation
    pub message: String,
}

#[derive(Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TestConnectionRequest {
    pub sender_email: String,
    pub sender_password: String,
}

impl std::fmt::Debug for TestConnectionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestConnectionRequest")
            .field("sender_email", &self.sender_email)
            .field("sender_password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TestConnectionResponse {
    /// Whether the relay accepted the credentials
    pub valid: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
