// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error mapping shared by the HTTP-backed gateways.

use std::time::Duration;

use leadline_core::LeadlineError;

/// HTTP statuses worth retrying: rate limiting and server-side failures.
pub(crate) fn is_transient_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, LeadlineError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LeadlineError::Sms {
            message: format!("failed to build HTTP client: {e}"),
            transient: false,
            source: Some(Box::new(e)),
        })
}

/// A request that never produced a response.
pub(crate) fn request_error(provider: &str, e: reqwest::Error) -> LeadlineError {
    LeadlineError::Sms {
        message: format!("{provider} request failed: {e}"),
        transient: e.is_timeout() || e.is_connect(),
        source: Some(Box::new(e)),
    }
}

/// A response with a non-success status.
pub(crate) fn status_error(provider: &str, status: reqwest::StatusCode, body: &str) -> LeadlineError {
    LeadlineError::Sms {
        message: format!("{provider} returned {status}: {body}"),
        transient: is_transient_status(status),
        source: None,
    }
}
