//! Fixed-window rate limiting keyed by client address.
//!
//! Each address gets `max_requests` per `window`. The window starts with the
//! first request from that address and the counter resets once it has
//! elapsed. Expired entries are dropped whenever the table is touched.

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::Mutex;

use crate::{config::RateLimitConfig, dto::ErrorResponse};

pub const RATE_LIMIT_MESSAGE: &str =
    "Too many email requests from this IP, please try again later.";

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32, reset: Duration },
    Limited { reset: Duration },
}

#[derive(Clone)]
pub struct RateLimit {
    config: RateLimitConfig,
    store: Arc<Mutex<HashMap<String, RateLimitEntry>>>,
}

impl RateLimit {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            store: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> Decision {
        let window = self.config.window;
        let mut store = self.store.lock().await;

        store.retain(|_, entry| now.saturating_duration_since(entry.window_start) < window);

        let entry = store.entry(key.to_string()).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });
        let reset = window.saturating_sub(now.saturating_duration_since(entry.window_start));

        if entry.count >= self.config.max_requests {
            return Decision::Limited { reset };
        }

        entry.count += 1;
        Decision::Allowed {
            remaining: self.config.max_requests - entry.count,
            reset,
        }
    }

    fn write_headers(&self, headers: &mut HeaderMap, remaining: u32, reset: Duration) {
        let reset_secs = reset.as_secs() + u64::from(reset.subsec_nanos() > 0);
        headers.insert("ratelimit-limit", HeaderValue::from(self.config.max_requests));
        headers.insert("ratelimit-remaining", HeaderValue::from(remaining));
        headers.insert("ratelimit-reset", HeaderValue::from(reset_secs));
    }

    pub async fn middleware(State(rate_limit): State<Self>, request: Request, next: Next) -> Response {
        let key = request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.ip().to_string());

        match rate_limit.check(&key).await {
            Decision::Allowed { remaining, reset } => {
                tracing::debug!(key = %key, remaining, "Rate limit check passed");
                let mut response = next.run(request).await;
                rate_limit.write_headers(response.headers_mut(), remaining, reset);
                response
            }
            Decision::Limited { reset } => {
                tracing::warn!(key = %key, path = %request.uri().path(), "Rate limit exceeded");
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorResponse::new(RATE_LIMIT_MESSAGE)),
                )
                    .into_response();
                rate_limit.write_headers(response.headers_mut(), 0, reset);
                if let Some(value) = response.headers().get("ratelimit-reset").cloned() {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
                response
            }
        }
    }
}
