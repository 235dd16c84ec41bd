// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handlers for `/v1/installations` and `/v1/commissions`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use leadline_core::types::{CompletedInstallation, InstallationPatch, InstallationSummary};
use leadline_core::{Commission, CommissionStatus, Installation};
use leadline_intake::{CommissionReport, ReminderReceipt, ScheduleInstallation};

use crate::error::ApiError;
use crate::server::GatewayState;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct CommissionUpdate {
    pub status: CommissionStatus,
}

/// GET /v1/installations
pub async fn list_installations(
    State(state): State<GatewayState>,
) -> ApiResult<Json<Vec<InstallationSummary>>> {
    Ok(Json(state.installations.list().await?))
}

/// POST /v1/installations
pub async fn post_installation(
    State(state): State<GatewayState>,
    Json(request): Json<ScheduleInstallation>,
) -> ApiResult<(StatusCode, Json<Installation>)> {
    let installation = state.installations.schedule(request).await?;
    Ok((StatusCode::CREATED, Json(installation)))
}

/// PATCH /v1/installations/{id}
pub async fn patch_installation(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(patch): Json<InstallationPatch>,
) -> ApiResult<Json<Installation>> {
    Ok(Json(state.installations.update(&id, patch).await?))
}

/// POST /v1/installations/{id}/complete
pub async fn complete_installation(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<CompletedInstallation>> {
    Ok(Json(state.installations.complete(&id).await?))
}

/// POST /v1/installations/{id}/remind
pub async fn remind_installation(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReminderReceipt>> {
    Ok(Json(state.installations.send_reminder(&id).await?))
}

/// GET /v1/commissions
pub async fn list_commissions(
    State(state): State<GatewayState>,
) -> ApiResult<Json<CommissionReport>> {
    Ok(Json(state.installations.commissions().await?))
}

/// PATCH /v1/commissions/{id}
pub async fn patch_commission(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(update): Json<CommissionUpdate>,
) -> ApiResult<Json<Commission>> {
    let commission = state
        .installations
        .set_commission_status(&id, update.status)
        .await?;
    tracing::info!(commission_id = %commission.id, status = %commission.status, "commission updated");
    Ok(Json(commission))
}
