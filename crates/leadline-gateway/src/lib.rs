// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Leadline CRM.
//!
//! Serves three groups of routes:
//! - provider webhooks under `/webhooks`, always acknowledged with 200
//! - the bearer-authenticated, rate-limited agent API under `/v1`
//! - an unauthenticated `/health` check

pub mod api;
pub mod auth;
pub mod error;
pub mod installations;
pub mod rate_limit;
pub mod server;
pub mod webhooks;

pub use auth::AuthConfig;
pub use rate_limit::{FixedWindowLimiter, RateLimiter};
pub use server::{GatewayState, ServerConfig, WebhookSettings, build_router, start_server};
