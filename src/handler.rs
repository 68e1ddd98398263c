use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_macros::debug_handler;
use utoipa::OpenApi;

use std::sync::Arc;

use crate::{
    dto::{
        ErrorResponse, SendEmailRequest, SendEmailResponse, TemplateRequest, TemplateResponse,
        TestConnectionRequest, TestConnectionResponse,
    },
    service::{EmailService, EmailServiceError},
    transport::MailError,
};

#[derive(OpenApi)]
#[openapi(
    paths(generate_email_template, send_email, test_connection),
    components(schemas(
        TemplateRequest,
        TemplateResponse,
        SendEmailRequest,
        SendEmailResponse,
        TestConnectionRequest,
        TestConnectionResponse,
        ErrorResponse
    )),
    tags(
        (name = "email", description = "Email template and delivery API")
    )
)]
pub struct ApiDoc;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

fn bad_json(rejection: &JsonRejection) -> Response {
    tracing::warn!("Rejected request body: {rejection}");
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Invalid request body: {}", rejection.body_text()),
    )
}

fn service_error_response(error: EmailServiceError) -> Response {
    match error {
        EmailServiceError::Validation(e) => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        EmailServiceError::Mail(MailError::AddressFormat(_)) => {
            error_response(StatusCode::BAD_REQUEST, "Invalid address format")
        }
        EmailServiceError::Render(_) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to render email template.",
        ),
        EmailServiceError::Mail(e) => {
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[utoipa::path(
    post,
    path = "/generate-email-template",
    request_body = TemplateRequest,
    responses(
        (status = 200, description = "Template rendered", body = TemplateResponse),
        (status = 400, description = "Missing fields", body = ErrorResponse)
    ),
    tag = "email"
)]
#[debug_handler]
pub async fn generate_email_template(
    State(service): State<Arc<EmailService>>,
    payload: Result<Json<TemplateRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_json(&rejection),
    };

    match service.generate_template(&payload) {
        Ok(r) => (StatusCode::OK, Json(r)).into_response(),
        Err(e) => {
            tracing::warn!("Failed to generate email template: {e}");
            service_error_response(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/send-email",
    request_body = SendEmailRequest,
    responses(
        (status = 200, description = "Email accepted by the relay", body = SendEmailResponse),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Delivery failed", body = ErrorResponse)
    ),
    tag = "email"
)]
#[debug_handler]
pub async fn send_email(
    State(service): State<Arc<EmailService>>,
    payload: Result<Json<SendEmailRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_json(&rejection),
    };

    match service.send_email(payload).await {
        Ok(r) => (StatusCode::OK, Json(r)).into_response(),
        Err(e) => {
            match &e {
                EmailServiceError::Validation(_) => tracing::warn!("Rejected send request: {e}"),
                _ => tracing::error!("Failed to send email: {e}"),
            }
            service_error_response(e)
        }
    }
}

#[utoipa::path(
    post,
    path = "/test-connection",
    request_body = TestConnectionRequest,
    responses(
        (status = 200, description = "Verification outcome", body = TestConnectionResponse),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse)
    ),
    tag = "email"
)]
#[debug_handler]
pub async fn test_connection(
    State(service): State<Arc<EmailService>>,
    payload: Result<Json<TestConnectionRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return bad_json(&rejection),
    };

    match service.test_connection(payload).await {
        Ok(r) => (StatusCode::OK, Json(r)).into_response(),
        Err(e) => {
            tracing::warn!("Rejected connection test: {e}");
            service_error_response(e)
        }
    }
}

#[debug_handler]
pub async fn health_check() -> Response {
    (StatusCode::OK, "Hello from vidpace mailer!").into_response()
}
