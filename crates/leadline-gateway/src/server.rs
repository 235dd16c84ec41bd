// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use leadline_core::LeadlineError;
use leadline_intake::{InstallationService, IntakeService};

use crate::api;
use crate::auth::{AuthConfig, auth_middleware};
use crate::installations;
use crate::rate_limit::{RateLimiter, rate_limit_middleware};
use crate::webhooks;

/// How provider webhooks are verified and acknowledged.
#[derive(Clone)]
pub struct WebhookSettings {
    pub twilio_auth_token: Option<String>,
    /// Require a valid `X-Twilio-Signature` on `/webhooks/twilio`.
    pub validate_signatures: bool,
    /// Externally visible base URL; the signed URL is rebuilt from it.
    pub public_url: Option<String>,
    /// How long a webhook waits for the pipeline before acknowledging.
    pub ack_timeout: Duration,
}

impl std::fmt::Debug for WebhookSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookSettings")
            .field(
                "twilio_auth_token",
                &self.twilio_auth_token.as_ref().map(|_| "[redacted]"),
            )
            .field("validate_signatures", &self.validate_signatures)
            .field("public_url", &self.public_url)
            .field("ack_timeout", &self.ack_timeout)
            .finish()
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub intake: IntakeService,
    pub installations: InstallationService,
    pub webhooks: WebhookSettings,
    pub auth: AuthConfig,
    /// `None` disables rate limiting.
    pub limiter: Option<Arc<dyn RateLimiter>>,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Build the full route table.
///
/// - `GET /health` (public)
/// - `GET|POST /webhooks/{twilio,telnyx,sms}` (public, Twilio optionally signed)
/// - `/v1/...` agent API (bearer auth, rate limited)
pub fn build_router(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(api::get_health))
        .route(
            "/webhooks/twilio",
            get(webhooks::twilio_status).post(webhooks::post_twilio),
        )
        .route(
            "/webhooks/telnyx",
            get(webhooks::telnyx_status).post(webhooks::post_telnyx),
        )
        .route(
            "/webhooks/sms",
            get(webhooks::sms_status).post(webhooks::post_sms),
        )
        .with_state(state.clone());

    let mut api_routes = Router::new()
        .route("/v1/conversations", get(api::list_conversations))
        .route(
            "/v1/conversations/{id}",
            get(api::get_conversation).patch(api::patch_conversation),
        )
        .route(
            "/v1/conversations/{id}/messages",
            get(api::list_messages).post(api::post_message),
        )
        .route("/v1/customers", get(api::list_customers))
        .route(
            "/v1/customers/{id}",
            get(api::get_customer).patch(api::patch_customer),
        )
        .route(
            "/v1/customers/{id}/availability-checks",
            post(api::post_availability_check),
        )
        .route(
            "/v1/admin/conversations",
            axum::routing::delete(api::reset_conversations),
        )
        .route(
            "/v1/installations",
            get(installations::list_installations).post(installations::post_installation),
        )
        .route(
            "/v1/installations/{id}",
            axum::routing::patch(installations::patch_installation),
        )
        .route(
            "/v1/installations/{id}/complete",
            post(installations::complete_installation),
        )
        .route(
            "/v1/installations/{id}/remind",
            post(installations::remind_installation),
        )
        .route("/v1/commissions", get(installations::list_commissions))
        .route(
            "/v1/commissions/{id}",
            axum::routing::patch(installations::patch_commission),
        )
        .route("/v1/admin/stats", get(api::get_stats))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ));
    // Outermost route layer, so it runs before auth.
    if let Some(limiter) = state.limiter.clone() {
        api_routes = api_routes.route_layer(axum_middleware::from_fn_with_state(
            limiter,
            rate_limit_middleware,
        ));
    }
    let api_routes = api_routes.with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), LeadlineError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LeadlineError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { shutdown.cancelled().await })
    .await
    .map_err(|e| LeadlineError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
