// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Leadline intake CRM.

use thiserror::Error;

/// Lowercased message fragments that mark a downstream failure as retryable.
const TRANSIENT_SIGNATURES: &[&str] = &[
    "timeout",
    "timed out",
    "network",
    "econnreset",
    "etimedout",
    "connection reset",
    "rate limit",
];

/// The primary error type used across all Leadline adapter traits and core operations.
#[derive(Debug, Error)]
pub enum LeadlineError {
    /// Configuration errors (invalid TOML, missing credentials, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Caller-supplied input failed validation (empty sender, unusable phone number).
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// SMS gateway errors. `transient` is set by the gateway when it knows
    /// the failure is worth retrying (HTTP 429/5xx, connect failures).
    #[error("sms error: {message}")]
    Sms {
        message: String,
        transient: bool,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Completion provider errors (API failure, malformed response, missing key).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Availability checker errors.
    #[error("availability check failed: {message}")]
    Availability { message: String },

    /// Notification sink errors.
    #[error("notification failed: {message}")]
    Notification { message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LeadlineError {
    /// Returns true when retrying the failed operation could plausibly succeed.
    ///
    /// Timeouts and gateway errors flagged transient always qualify. Other SMS
    /// errors qualify when their message carries a timeout, network, or
    /// rate-limit signature.
    pub fn is_transient(&self) -> bool {
        match self {
            LeadlineError::Timeout { .. } => true,
            LeadlineError::Sms {
                message, transient, ..
            } => *transient || has_transient_signature(message),
            LeadlineError::Provider { message, .. } => has_transient_signature(message),
            _ => false,
        }
    }
}

/// Case-insensitive match of `message` against the known transient signatures.
pub fn has_transient_signature(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_SIGNATURES.iter().any(|sig| lower.contains(sig))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flagged_sms_errors_are_transient() {
        let err = LeadlineError::Sms {
            message: "Twilio returned 503".into(),
            transient: true,
            source: None,
        };
        assert!(err.is_transient());
    }

    #[test]
    fn sms_errors_with_network_signature_are_transient() {
        for message in [
            "request timeout",
            "read ECONNRESET",
            "connect ETIMEDOUT 10.0.0.1:443",
            "Rate limit exceeded",
            "network unreachable",
        ] {
            let err = LeadlineError::Sms {
                message: message.into(),
                transient: false,
                source: None,
            };
            assert!(err.is_transient(), "{message} should be transient");
        }
    }

    #[test]
    fn credential_errors_are_permanent() {
        let err = LeadlineError::Sms {
            message: "authentication failed: invalid account sid".into(),
            transient: false,
            source: None,
        };
        assert!(!err.is_transient());
        assert!(!LeadlineError::Validation("empty body".into()).is_transient());
    }

    #[test]
    fn timeouts_are_transient() {
        let err = LeadlineError::Timeout {
            duration: std::time::Duration::from_secs(5),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn not_found_display_names_entity() {
        let err = LeadlineError::NotFound {
            entity: "customer",
            id: "abc".into(),
        };
        assert_eq!(err.to_string(), "customer not found: abc");
    }
}
