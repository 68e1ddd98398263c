//! Form client for the mailer API.
//!
//! [`FormClient`] holds the state of the email form, talks to the two API
//! endpoints and keeps non-secret field values in an injected
//! [`KeyValueStore`] so they survive between sessions. The password is held
//! in memory only.

mod store;

pub use store::{JsonFileStore, KeyValueStore, MemoryStore};

use std::collections::HashMap;

use crate::{
    dto::{ErrorResponse, SendEmailRequest, SendEmailResponse, TemplateRequest, TemplateResponse},
    validation::{validate_send_request, validate_template_request},
};

const PREVIEW_MISSING_FIELDS: &str =
    "Please fill in recipient name, sender name, and email body to preview.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    SenderEmail,
    SenderPassword,
    RecipientEmail,
    RecipientName,
    EmailSubject,
    MessageBody,
    SenderName,
}

impl FormField {
    pub const ALL: [Self; 7] = [
        Self::SenderEmail,
        Self::SenderPassword,
        Self::RecipientEmail,
        Self::RecipientName,
        Self::EmailSubject,
        Self::MessageBody,
        Self::SenderName,
    ];

    /// Storage key, identical to the JSON field name.
    pub const fn key(self) -> &'static str {
        match self {
            Self::SenderEmail => "senderEmail",
            Self::SenderPassword => "senderPassword",
            Self::RecipientEmail => "recipientEmail",
            Self::RecipientName => "recipientName",
            Self::EmailSubject => "emailSubject",
            Self::MessageBody => "messageBody",
            Self::SenderName => "senderName",
        }
    }

    pub const fn is_secret(self) -> bool {
        matches!(self, Self::SenderPassword)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("Request to mailer API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mailer API responded with {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Failed to access saved form data: {0}")]
    Store(#[from] std::io::Error),

    #[error("Saved form data is not valid JSON: {0}")]
    StoreFormat(#[from] serde_json::Error),
}

pub struct FormClient<S: KeyValueStore> {
    base_url: String,
    http: reqwest::Client,
    store: S,
    fields: HashMap<FormField, String>,
    preview: Option<String>,
    status: Option<Status>,
}

impl<S: KeyValueStore> FormClient<S> {
    pub fn new(base_url: impl Into<String>, store: S) -> Self {
        Self::with_http_client(base_url, store, reqwest::Client::new())
    }

    pub fn with_http_client(base_url: impl Into<String>, store: S, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            http,
            store,
            fields: HashMap::new(),
            preview: None,
            status: None,
        }
    }

    /// Restores saved values into the form. Secret keys found in the store
    /// are ignored.
    pub fn load_saved(&mut self) -> Result<(), ClientError> {
        for (key, value) in self.store.load()? {
            match FormField::from_key(&key) {
                Some(field) if !field.is_secret() => {
                    self.fields.insert(field, value);
                }
                _ => tracing::debug!("Ignoring saved value for key '{key}'"),
            }
        }
        Ok(())
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) -> Result<(), ClientError> {
        let value = value.into();
        if !field.is_secret() {
            self.store.set(field.key(), &value)?;
        }
        self.fields.insert(field, value);
        Ok(())
    }

    pub fn field(&self, field: FormField) -> &str {
        self.fields.get(&field).map_or("", String::as_str)
    }

    pub fn preview_html(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub const fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn close_preview(&mut self) {
        self.preview = None;
    }

    /// Forgets every saved value. The current form contents stay as they are.
    pub fn clear_saved_data(&mut self) -> Result<(), ClientError> {
        self.store.clear()?;
        self.set_status(StatusKind::Info, "Saved data cleared.");
        Ok(())
    }

    fn set_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.status = Some(Status {
            kind,
            message: message.into(),
        });
    }

    fn fail(&mut self, message: impl Into<String>) -> ClientError {
        let message = message.into();
        self.set_status(StatusKind::Error, message.clone());
        ClientError::Validation(message)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn value(&self, field: FormField) -> String {
        self.field(field).to_string()
    }

    fn template_request(&self) -> TemplateRequest {
        TemplateRequest {
            recipient_name: self.value(FormField::RecipientName),
            sender_name: self.value(FormField::SenderName),
            message_body: self.value(FormField::MessageBody),
        }
    }

    fn send_request(&self) -> SendEmailRequest {
        SendEmailRequest {
            sender_email: self.value(FormField::SenderEmail),
            sender_password: self.value(FormField::SenderPassword),
            recipient_email: self.value(FormField::RecipientEmail),
            recipient_name: self.value(FormField::RecipientName),
            subject: self.value(FormField::EmailSubject),
            message_body: self.value(FormField::MessageBody),
            sender_name: self.value(FormField::SenderName),
        }
    }

    async fn error_text(response: reqwest::Response, fallback: &str) -> String {
        response
            .json::<ErrorResponse>()
            .await
            .ok()
            .map(|body| body.error)
            .filter(|error| !error.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Asks the API for the rendered template and keeps it as the preview.
    pub async fn preview(&mut self) -> Result<(), ClientError> {
        let request = self.template_request();
        if validate_template_request(&request).is_err() {
            return Err(self.fail(PREVIEW_MISSING_FIELDS));
        }

        self.set_status(StatusKind::Info, "Generating preview...");

        let sent = self
            .http
            .post(self.endpoint("generate-email-template"))
            .json(&request)
            .send()
            .await;
        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Preview request failed: {e}");
                self.set_status(
                    StatusKind::Error,
                    "An error occurred while generating preview.",
                );
                return Err(e.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_text(response, "Failed to generate preview.").await;
            self.set_status(StatusKind::Error, message.clone());
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body: TemplateResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                self.set_status(
                    StatusKind::Error,
                    "An error occurred while generating preview.",
                );
                return Err(e.into());
            }
        };

        self.preview = Some(body.html_template);
        self.set_status(StatusKind::Success, "Preview generated successfully!");
        Ok(())
    }

    /// Submits the form. On success the form is reset and the preview hidden.
    pub async fn send(&mut self) -> Result<(), ClientError> {
        let request = self.send_request();
        if let Err(e) = validate_send_request(&request) {
            return Err(self.fail(e.to_string()));
        }

        self.set_status(StatusKind::Info, "Sending email...");

        let sent = self
            .http
            .post(self.endpoint("send-email"))
            .json(&request)
            .send()
            .await;
        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Send request failed: {e}");
                self.set_status(StatusKind::Error, "An error occurred while sending email.");
                return Err(e.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_text(response, "Failed to send email.").await;
            self.set_status(StatusKind::Error, message.clone());
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let message = response
            .json::<SendEmailResponse>()
            .await
            .map_or_else(|_| "Email sent successfully!".to_string(), |body| body.message);

        self.fields.clear();
        self.preview = None;
        self.set_status(StatusKind::Success, message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FormClient<MemoryStore> {
        // Nothing listens on port 9; requests are never expected to leave.
        FormClient::new("http://127.0.0.1:9", MemoryStore::new())
    }

    #[test]
    fn password_is_never_saved() {
        let mut client = client();
        client.set_field(FormField::SenderEmail, "lee@vidpace.com").unwrap();
        client.set_field(FormField::SenderPassword, "secret").unwrap();

        assert_eq!(client.store().get("senderEmail"), Some("lee@vidpace.com"));
        assert_eq!(client.store().get("senderPassword"), None);
        assert_eq!(client.field(FormField::SenderPassword), "secret");
    }

    #[test]
    fn saved_values_are_restored_except_secrets() {
        let mut store = MemoryStore::new();
        store.set("senderName", "Lee").unwrap();
        store.set("senderPassword", "leaked").unwrap();
        store.set("unrelated", "x").unwrap();

        let mut client = FormClient::new("http://127.0.0.1:9", store);
        client.load_saved().unwrap();

        assert_eq!(client.field(FormField::SenderName), "Lee");
        assert_eq!(client.field(FormField::SenderPassword), "");
    }

    #[test]
    fn clearing_saved_data_keeps_the_form() {
        let mut client = client();
        client.set_field(FormField::RecipientName, "Ana").unwrap();
        client.clear_saved_data().unwrap();

        assert!(client.store().is_empty());
        assert_eq!(client.field(FormField::RecipientName), "Ana");
        assert_eq!(client.status().unwrap().kind, StatusKind::Info);
    }

    #[test]
    fn field_keys_round_trip() {
        for field in FormField::ALL {
            assert_eq!(FormField::from_key(field.key()), Some(field));
        }
        assert_eq!(FormField::from_key("nope"), None);
    }

    #[tokio::test]
    async fn preview_requires_names_and_body() {
        let mut client = client();
        client.set_field(FormField::RecipientName, "Ana").unwrap();

        let err = client.preview().await.unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        let status = client.status().unwrap();
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.message, PREVIEW_MISSING_FIELDS);
    }

    #[tokio::test]
    async fn send_checks_email_shape_before_calling_out() {
        let mut client = client();
        for (field, value) in [
            (FormField::SenderEmail, "lee-at-vidpace"),
            (FormField::SenderPassword, "secret"),
            (FormField::RecipientEmail, "ana@example.com"),
            (FormField::RecipientName, "Ana"),
            (FormField::EmailSubject, "Hi"),
            (FormField::MessageBody, "Hello"),
            (FormField::SenderName, "Lee"),
        ] {
            client.set_field(field, value).unwrap();
        }

        let err = client.send().await.unwrap_err();

        assert!(matches!(err, ClientError::Validation(_)));
        assert!(client.status().unwrap().message.contains("senderEmail"));
    }
}
