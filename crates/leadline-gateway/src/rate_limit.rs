// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request rate limiting for the agent API.
//!
//! [`FixedWindowLimiter`] keeps its counters in process memory, so limits
//! are per instance: several instances behind a load balancer each allow
//! the full quota. A shared store can be plugged in behind [`RateLimiter`].

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::error::ErrorResponse;

/// A request over the limit. `retry_after` is the time left in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limited {
    pub retry_after: Duration,
}

/// Admission check for one request from `key`.
pub trait RateLimiter: Send + Sync {
    fn check(&self, key: &str) -> Result<(), Limited>;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter per key with lazy eviction of expired windows.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    windows: DashMap<String, Window>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            windows: DashMap::new(),
        }
    }

    /// Drop windows that have expired. Called on every check once the map
    /// holds more than a handful of keys.
    pub fn evict_expired(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
    }

    /// Number of keys currently tracked.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), Limited> {
        if self.windows.len() > 64 {
            self.evict_expired();
        }

        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        if entry.count >= self.max_requests {
            let left = self
                .window
                .saturating_sub(now.saturating_duration_since(entry.started));
            return Err(Limited { retry_after: left });
        }
        entry.count += 1;
        Ok(())
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, key: &str) -> Result<(), Limited> {
        self.check_at(key, Instant::now())
    }
}

/// Client key: first `X-Forwarded-For` entry, else the peer address.
fn client_key(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware answering 429 with `Retry-After` once a client is over quota.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<dyn RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);
    match limiter.check(&key) {
        Ok(()) => next.run(request).await,
        Err(limited) => {
            let secs = limited.retry_after.as_secs().max(1);
            tracing::warn!(client = %key, retry_after_secs = secs, "rate limit exceeded");
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(ErrorResponse {
                    error: format!("rate limit exceeded; retry after {secs}s"),
                }),
            )
                .into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
            response
        }
    }
}
