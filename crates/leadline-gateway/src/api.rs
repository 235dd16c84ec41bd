// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP handlers for the agent API and health endpoint.
//!
//! Handles the `/v1/conversations`, `/v1/customers` and `/v1/admin` routes
//! plus `GET /health`.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use leadline_core::types::{
    ConversationPatch, ConversationSummary, CustomerPatch, ResetSummary, StoreStats,
};
use leadline_core::{
    AvailabilityCheck, Conversation, ConversationStatus, Customer, HealthStatus, LeadlineError,
    Message,
};

use crate::error::ApiError;
use crate::server::GatewayState;

type ApiResult<T> = Result<T, ApiError>;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, `degraded` or `unhealthy`.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub decider: String,
    /// ISO 8601 timestamp.
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct ListConversationsQuery {
    #[serde(default)]
    pub status: Option<String>,
}

/// GET /v1/conversations/{id}
#[derive(Debug, Serialize)]
pub struct ConversationDetail {
    pub conversation: Conversation,
    pub customer: Option<Customer>,
}

/// GET /v1/customers/{id}
#[derive(Debug, Serialize)]
pub struct CustomerDetail {
    pub customer: Customer,
    pub conversations: Vec<Conversation>,
    pub availability_checks: Vec<AvailabilityCheck>,
}

/// Request body for POST /v1/conversations/{id}/messages.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetQuery {
    #[serde(default)]
    pub clear_addresses: bool,
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let (code, status, detail) = match state.intake.storage().health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "ok", None),
        Ok(HealthStatus::Degraded(reason)) => (StatusCode::OK, "degraded", Some(reason)),
        Ok(HealthStatus::Unhealthy(reason)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(reason))
        }
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "unhealthy",
            Some(e.to_string()),
        ),
    };

    let body = HealthResponse {
        status,
        detail,
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
        decider: state.intake.decider_name().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    };
    (code, Json(body)).into_response()
}

/// GET /v1/conversations
///
/// Ordered by latest activity. `?status=` accepts any conversation status,
/// case-insensitively.
pub async fn list_conversations(
    State(state): State<GatewayState>,
    Query(query): Query<ListConversationsQuery>,
) -> ApiResult<Json<Vec<ConversationSummary>>> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            ConversationStatus::from_str(&s.trim().to_ascii_uppercase())
                .map_err(|_| LeadlineError::Validation(format!("unknown conversation status `{s}`")))
        })
        .transpose()?;
    Ok(Json(state.intake.storage().list_conversations(status).await?))
}

async fn load_conversation(state: &GatewayState, id: &str) -> Result<Conversation, LeadlineError> {
    state
        .intake
        .storage()
        .get_conversation(id)
        .await?
        .ok_or_else(|| LeadlineError::NotFound {
            entity: "conversation",
            id: id.to_string(),
        })
}

/// GET /v1/conversations/{id}
pub async fn get_conversation(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ConversationDetail>> {
    let conversation = load_conversation(&state, &id).await?;
    let customer = state
        .intake
        .storage()
        .get_customer(&conversation.customer_id)
        .await?;
    Ok(Json(ConversationDetail {
        conversation,
        customer,
    }))
}

/// PATCH /v1/conversations/{id}
pub async fn patch_conversation(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(patch): Json<ConversationPatch>,
) -> ApiResult<Json<Conversation>> {
    let updated = state
        .intake
        .storage()
        .update_conversation(&id, &patch)
        .await?
        .ok_or(LeadlineError::NotFound {
            entity: "conversation",
            id,
        })?;
    tracing::info!(
        conversation_id = %updated.id,
        status = %updated.status,
        "conversation updated by agent"
    );
    Ok(Json(updated))
}

/// GET /v1/conversations/{id}/messages
pub async fn list_messages(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Message>>> {
    load_conversation(&state, &id).await?;
    Ok(Json(state.intake.storage().list_messages(&id, None).await?))
}

/// POST /v1/conversations/{id}/messages
pub async fn post_message(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<(StatusCode, Json<Message>)> {
    let message = state.intake.send_agent_message(&id, &request.body).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /v1/customers
pub async fn list_customers(State(state): State<GatewayState>) -> ApiResult<Json<Vec<Customer>>> {
    Ok(Json(state.intake.storage().list_customers().await?))
}

/// GET /v1/customers/{id}
pub async fn get_customer(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CustomerDetail>> {
    let storage = state.intake.storage();
    let customer = storage
        .get_customer(&id)
        .await?
        .ok_or_else(|| LeadlineError::NotFound {
            entity: "customer",
            id: id.clone(),
        })?;
    let conversations = storage.list_customer_conversations(&id).await?;
    let availability_checks = storage.list_availability_checks(&id).await?;
    Ok(Json(CustomerDetail {
        customer,
        conversations,
        availability_checks,
    }))
}

/// PATCH /v1/customers/{id}
pub async fn patch_customer(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(patch): Json<CustomerPatch>,
) -> ApiResult<Json<Customer>> {
    let customer = state
        .intake
        .storage()
        .update_customer(&id, &patch)
        .await?
        .ok_or(LeadlineError::NotFound {
            entity: "customer",
            id,
        })?;
    Ok(Json(customer))
}

/// POST /v1/customers/{id}/availability-checks
///
/// Re-checks the stored address. Earlier checks are kept.
pub async fn post_availability_check(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<AvailabilityCheck>)> {
    let check = state.intake.request_availability_check(&id).await?;
    Ok((StatusCode::CREATED, Json(check)))
}

/// DELETE /v1/admin/conversations
pub async fn reset_conversations(
    State(state): State<GatewayState>,
    Query(query): Query<ResetQuery>,
) -> ApiResult<Json<ResetSummary>> {
    let summary = state
        .intake
        .storage()
        .reset_conversations(query.clear_addresses)
        .await?;
    tracing::warn!(
        conversations = summary.conversations,
        messages = summary.messages,
        addresses_cleared = summary.addresses_cleared,
        "conversation data reset via admin API"
    );
    Ok(Json(summary))
}

/// GET /v1/admin/stats
pub async fn get_stats(State(state): State<GatewayState>) -> ApiResult<Json<StoreStats>> {
    Ok(Json(state.intake.storage().stats().await?))
}
