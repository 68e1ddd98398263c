pub mod client;
pub mod config;
pub mod dto;
pub mod handler;
pub mod rate_limit;
pub mod service;
pub mod template;
pub mod transport;
pub mod validation;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

use rate_limit::RateLimit;
use service::EmailService;

fn api_router(service: Arc<EmailService>, rate_limit: RateLimit) -> Router {
    let limited = Router::new()
        .route("/send-email", post(handler::send_email))
        .route("/test-connection", post(handler::test_connection))
        .route_layer(middleware::from_fn_with_state(
            rate_limit,
            RateLimit::middleware,
        ));

    Router::new()
        .route(
            "/generate-email-template",
            post(handler::generate_email_template),
        )
        .merge(limited)
        .with_state(service)
}

fn security_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
}

/// Full application router. Endpoints are served both at the root and under `/api`.
pub fn router(service: Arc<EmailService>, rate_limit: RateLimit) -> Router {
    let api = api_router(service, rate_limit);

    Router::new()
        .route("/", get(handler::health_check))
        .merge(api.clone())
        .nest("/api", api)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-doc/openapi.json", handler::ApiDoc::openapi()),
        )
        .layer(security_header(header::X_CONTENT_TYPE_OPTIONS, "nosniff"))
        .layer(security_header(header::X_FRAME_OPTIONS, "SAMEORIGIN"))
        .layer(security_header(header::REFERRER_POLICY, "no-referrer"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
