// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS boundary for the Leadline intake CRM.
//!
//! Outbound delivery through Twilio or Telnyx (or a log-only gateway for
//! local runs), retry with exponential backoff, Twilio webhook signature
//! validation, and decoding of inbound webhook payloads.

mod http;
pub mod log_gateway;
pub mod retry;
pub mod signature;
pub mod telnyx;
pub mod twilio;
pub mod webhook;

use std::sync::Arc;
use std::time::Duration;

use leadline_config::model::{SmsConfig, SmsProvider};
use leadline_core::{LeadlineError, PluginAdapter, SmsGateway};

pub use log_gateway::LogGateway;
pub use retry::{RetryPolicy, send_with_retry};
pub use telnyx::TelnyxGateway;
pub use twilio::TwilioGateway;

fn required(value: &Option<String>, key: &str) -> Result<String, LeadlineError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| LeadlineError::Config(format!("{key} is required")))
}

/// Build the configured gateway.
pub fn build_gateway(config: &SmsConfig) -> Result<Arc<dyn SmsGateway>, LeadlineError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let gateway: Arc<dyn SmsGateway> = match config.provider {
        SmsProvider::Twilio => Arc::new(TwilioGateway::new(
            required(&config.twilio.account_sid, "sms.twilio.account_sid")?,
            required(&config.twilio.auth_token, "sms.twilio.auth_token")?,
            required(&config.from_number, "sms.from_number")?,
            timeout,
        )?),
        SmsProvider::Telnyx => Arc::new(TelnyxGateway::new(
            required(&config.telnyx.api_key, "sms.telnyx.api_key")?,
            required(&config.from_number, "sms.from_number")?,
            config.telnyx.messaging_profile_id.clone(),
            timeout,
        )?),
        SmsProvider::Log => Arc::new(LogGateway),
    };
    tracing::info!(provider = gateway.name(), "sms gateway ready");
    Ok(gateway)
}
