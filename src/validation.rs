use regex::Regex;

use std::sync::LazyLock;

use crate::dto::{SendEmailRequest, TemplateRequest, TestConnectionRequest};

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("All required fields must be provided. Missing: {}.", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid email address format for {0}.")]
    InvalidEmail(&'static str),
}

pub fn is_email_shaped(value: &str) -> bool {
    EMAIL_SHAPE.is_match(value.trim())
}

fn missing<'a>(fields: impl IntoIterator<Item = (&'static str, &'a str)>) -> Vec<&'static str> {
    fields
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
}

fn require(fields: Vec<&'static str>) -> Result<(), ValidationError> {
    if fields.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(fields))
    }
}

pub fn validate_template_request(request: &TemplateRequest) -> Result<(), ValidationError> {
    require(missing([
        ("recipientName", request.recipient_name.as_str()),
        ("senderName", request.sender_name.as_str()),
        ("messageBody", request.message_body.as_str()),
    ]))
}

pub fn validate_send_request(request: &SendEmailRequest) -> Result<(), ValidationError> {
    require(missing([
        ("senderEmail", request.sender_email.as_str()),
        ("senderPassword", request.sender_password.as_str()),
        ("recipientEmail", request.recipient_email.as_str()),
        ("recipientName", request.recipient_name.as_str()),
        ("emailSubject", request.subject.as_str()),
        ("messageBody", request.message_body.as_str()),
        ("senderName", request.sender_name.as_str()),
    ]))?;

    if !is_email_shaped(&request.sender_email) {
        return Err(ValidationError::InvalidEmail("senderEmail"));
    }
    if !is_email_shaped(&request.recipient_email) {
        return Err(ValidationError::InvalidEmail("recipientEmail"));
    }
    Ok(())
}

pub fn validate_test_connection_request(
    request: &TestConnectionRequest,
) -> Result<(), ValidationError> {
    require(missing([
        ("senderEmail", request.sender_email.as_str()),
        ("senderPassword", request.sender_password.as_str()),
    ]))?;

    if !is_email_shaped(&request.sender_email) {
        return Err(ValidationError::InvalidEmail("senderEmail"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_request() -> SendEmailRequest {
        SendEmailRequest {
            sender_email: "lee@vidpace.com".to_string(),
            sender_password: "secret".to_string(),
            recipient_email: "ana@example.com".to_string(),
            recipient_name: "Ana".to_string(),
            subject: "Meeting".to_string(),
            message_body: "Hello".to_string(),
            sender_name: "Lee".to_string(),
        }
    }

    #[test]
    fn email_shape() {
        assert!(is_email_shaped("ana@example.com"));
        assert!(is_email_shaped("  ana@mail.example.co.uk "));
        assert!(!is_email_shaped("ana@example"));
        assert!(!is_email_shaped("ana example@x.com"));
        assert!(!is_email_shaped("@example.com"));
        assert!(!is_email_shaped(""));
    }

    #[test]
    fn complete_send_request_passes() {
        assert_eq!(validate_send_request(&complete_request()), Ok(()));
    }

    #[test]
    fn send_request_lists_every_missing_field() {
        let request = SendEmailRequest {
            sender_password: String::new(),
            subject: "   ".to_string(),
            ..complete_request()
        };

        let err = validate_send_request(&request).unwrap_err();

        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["senderPassword", "emailSubject"])
        );
        assert_eq!(
            err.to_string(),
            "All required fields must be provided. Missing: senderPassword, emailSubject."
        );
    }

    #[test]
    fn send_request_rejects_malformed_addresses() {
        let request = SendEmailRequest {
            recipient_email: "not-an-address".to_string(),
            ..complete_request()
        };

        assert_eq!(
            validate_send_request(&request),
            Err(ValidationError::InvalidEmail("recipientEmail"))
        );
    }

    #[test]
    fn template_request_requires_all_three_fields() {
        let err = validate_template_request(&TemplateRequest::default()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::MissingFields(vec!["recipientName", "senderName", "messageBody"])
        );
    }
}
