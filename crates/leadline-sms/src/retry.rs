// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound delivery with exponential backoff.

use std::time::Duration;

use leadline_config::model::SmsConfig;
use leadline_core::types::{OutboundSms, SendReceipt};
use leadline_core::{LeadlineError, SmsGateway};
use tracing::warn;

/// How many times to try a send and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &SmsConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }

    /// Delay before attempt `attempt + 1`, for `attempt >= 1`:
    /// `base_delay * 2^(attempt - 1)`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Send `sms`, retrying only failures classified as transient.
///
/// Returns the last error once attempts are exhausted or a permanent error
/// occurs.
pub async fn send_with_retry(
    gateway: &dyn SmsGateway,
    sms: &OutboundSms,
    policy: &RetryPolicy,
) -> Result<SendReceipt, LeadlineError> {
    let mut attempt = 1;
    loop {
        match gateway.send(sms).await {
            Ok(receipt) => return Ok(receipt),
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "transient sms failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
