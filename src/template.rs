use askama::Template;
use chrono::{Datelike, Utc};

use crate::{
    dto::TemplateRequest,
    validation::{ValidationError, validate_template_request},
};

/// Fixed Vidpace outreach layout. Interpolated fields are HTML-escaped.
#[derive(Template)]
#[template(path = "email.html")]
struct EmailTemplate<'a> {
    recipient_name: &'a str,
    sender_name: &'a str,
    message_body: &'a str,
    year: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to render email template: {0}")]
    Render(#[from] askama::Error),
}

pub fn render_email(request: &TemplateRequest) -> Result<String, TemplateError> {
    render_email_for_year(request, Utc::now().year())
}

fn render_email_for_year(request: &TemplateRequest, year: i32) -> Result<String, TemplateError> {
    validate_template_request(request)?;

    let template = EmailTemplate {
        recipient_name: request.recipient_name.trim(),
        sender_name: request.sender_name.trim(),
        message_body: request.message_body.trim(),
        year,
    };
    Ok(template.render()?)
}
