// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of [`LeadlineError`] onto API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use leadline_core::LeadlineError;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A [`LeadlineError`] returned from an API handler.
#[derive(Debug)]
pub struct ApiError(pub LeadlineError);

impl From<LeadlineError> for ApiError {
    fn from(err: LeadlineError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            LeadlineError::NotFound { .. } => StatusCode::NOT_FOUND,
            LeadlineError::Validation(_) => StatusCode::BAD_REQUEST,
            LeadlineError::Sms { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "api request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
