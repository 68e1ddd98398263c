#![allow(dead_code)]

use async_trait::async_trait;

use std::{
    net::SocketAddr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::Router;
use vidpace_mailer::{
    config::RateLimitConfig,
    rate_limit::RateLimit,
    router,
    service::EmailService,
    transport::{MailError, MailTransport, OutgoingEmail, SendResult, SmtpCredentials},
};

/// Records every call and answers with a canned outcome.
pub struct StubTransport {
    failure: Option<fn() -> MailError>,
    credentials_valid: bool,
    sends: AtomicUsize,
    verifications: AtomicUsize,
    sent: Mutex<Vec<(OutgoingEmail, String)>>,
}

impl StubTransport {
    pub fn delivering() -> Self {
        Self {
            failure: None,
            credentials_valid: true,
            sends: AtomicUsize::new(0),
            verifications: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(failure: fn() -> MailError) -> Self {
        Self {
            failure: Some(failure),
            credentials_valid: false,
            ..Self::delivering()
        }
    }

    pub fn send_count(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn verification_count(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }

    /// Emails handed to the transport, paired with the SMTP username used.
    pub fn sent(&self) -> Vec<(OutgoingEmail, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for StubTransport {
    async fn send(
        &self,
        email: OutgoingEmail,
        credentials: SmtpCredentials,
    ) -> Result<SendResult, MailError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.failure {
            return Err(failure());
        }

        let to = email.to.clone();
        self.sent
            .lock()
            .unwrap()
            .push((email, credentials.username));

        Ok(SendResult {
            success: true,
            message_id: "<stub@vidpace.com>".to_string(),
            accepted: vec![to],
            rejected: Vec::new(),
            response: "2.0.0 Ok: queued".to_string(),
        })
    }

    async fn test_connection(&self, _credentials: SmtpCredentials) -> bool {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        self.credentials_valid
    }
}

pub fn app_with_limit(transport: Arc<StubTransport>, max_requests: u32) -> Router {
    let service = Arc::new(EmailService::new(transport));
    let rate_limit = RateLimit::new(RateLimitConfig {
        max_requests,
        window: Duration::from_secs(15 * 60),
    });
    router(service, rate_limit)
}

pub fn app(transport: Arc<StubTransport>) -> Router {
    app_with_limit(transport, 10)
}

/// Serves the app on an ephemeral port and returns its base URL.
pub async fn spawn_app(transport: Arc<StubTransport>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app(transport);

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    format!("http://{addr}")
}

pub fn valid_send_payload() -> serde_json::Value {
    serde_json::json!({
        "senderEmail": "lee@vidpace.com",
        "senderPassword": "secret",
        "recipientEmail": "ana@example.com",
        "recipientName": "Ana",
        "emailSubject": "Quick meeting",
        "messageBody": "Hello",
        "senderName": "Lee"
    })
}
