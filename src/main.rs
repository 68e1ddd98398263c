use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::EnvFilter;

use vidpace_mailer::{
    config, rate_limit::RateLimit, router, service::EmailService,
    transport::SmtpMailTransport,
};

#[tokio::main]
async fn main() {
    // Log setup
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {e}");
        panic!("failed to load config: {e}");
    });
    tracing::info!(
        "Using SMTP relay {}:{} ({:?} TLS)",
        cfg.smtp.host,
        cfg.smtp.port,
        cfg.smtp.tls
    );

    // Setup service
    let transport = Arc::new(SmtpMailTransport::new(cfg.smtp.clone()));
    let service = Arc::new(EmailService::new(transport));
    let rate_limit = RateLimit::new(cfg.rate_limit.clone());

    // Setup router
    let app = router(service, rate_limit);

    // Start server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", cfg.port))
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to bind to port {}: {e}", cfg.port);
            panic!("failed to bind to port {}: {e}", cfg.port);
        });

    match listener.local_addr() {
        Ok(addr) => tracing::info!("Server running, listening on {}", addr),
        Err(e) => tracing::warn!("Server running, local address unavailable: {e}"),
    }

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!("HTTP server error: {e}");
        panic!("failed to start HTTP server: {e}");
    }
}
