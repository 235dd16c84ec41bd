// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Covers cross-field constraints serde cannot express: a chosen SMS provider
//! needs its credentials, the `llm` decider needs an enabled completion
//! endpoint, and so on. All problems are collected before returning.

use leadline_core::normalize_phone;

use crate::diagnostic::ConfigError;
use crate::model::{DeciderKind, LeadlineConfig, SmsProvider};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or every collected error.
pub fn validate_config(config: &LeadlineConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.to_lowercase().as_str()) {
        fail(format!(
            "agent.log_level `{}` must be one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        fail("gateway.host must not be empty".to_string());
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        fail(format!(
            "gateway.host `{host}` is not a valid IP address or hostname"
        ));
    }

    if config.gateway.webhook_timeout_secs == 0 {
        fail("gateway.webhook_timeout_secs must be at least 1".to_string());
    }

    if config.rate_limit.enabled {
        if config.rate_limit.max_requests == 0 {
            fail("rate_limit.max_requests must be at least 1".to_string());
        }
        if config.rate_limit.window_secs == 0 {
            fail("rate_limit.window_secs must be at least 1".to_string());
        }
    }

    if config.sms.max_attempts == 0 {
        fail("sms.max_attempts must be at least 1".to_string());
    }

    if let Some(from) = &config.sms.from_number
        && normalize_phone(from).is_err()
    {
        fail(format!("sms.from_number `{from}` is not a valid phone number"));
    }

    match config.sms.provider {
        SmsProvider::Twilio => {
            if is_blank(&config.sms.twilio.account_sid) {
                fail("sms.twilio.account_sid is required when sms.provider = \"twilio\"".into());
            }
            if is_blank(&config.sms.twilio.auth_token) {
                fail("sms.twilio.auth_token is required when sms.provider = \"twilio\"".into());
            }
            if config.sms.from_number.is_none() {
                fail("sms.from_number is required when sms.provider = \"twilio\"".into());
            }
        }
        SmsProvider::Telnyx => {
            if is_blank(&config.sms.telnyx.api_key) {
                fail("sms.telnyx.api_key is required when sms.provider = \"telnyx\"".into());
            }
            if config.sms.from_number.is_none() {
                fail("sms.from_number is required when sms.provider = \"telnyx\"".into());
            }
        }
        SmsProvider::Log => {}
    }

    if config.sms.twilio.validate_signatures {
        if is_blank(&config.sms.twilio.auth_token) {
            fail("sms.twilio.validate_signatures requires sms.twilio.auth_token".into());
        }
        if is_blank(&config.gateway.public_url) {
            fail("sms.twilio.validate_signatures requires gateway.public_url".into());
        }
    }

    if config.intake.decider == DeciderKind::Llm && !config.completion.enabled {
        fail("intake.decider = \"llm\" requires completion.enabled = true".into());
    }

    if config.completion.enabled {
        if !config.completion.base_url.starts_with("http://")
            && !config.completion.base_url.starts_with("https://")
        {
            fail(format!(
                "completion.base_url `{}` must be an http(s) URL",
                config.completion.base_url
            ));
        }
        if !(0.0..=2.0).contains(&config.completion.temperature) {
            fail(format!(
                "completion.temperature must be between 0.0 and 2.0, got {}",
                config.completion.temperature
            ));
        }
    }

    if let Some(url) = &config.availability.endpoint_url
        && !url.starts_with("http://")
        && !url.starts_with("https://")
    {
        fail(format!("availability.endpoint_url `{url}` must be an http(s) URL"));
    }

    if config.notify.enabled {
        for (key, value) in [
            ("notify.smtp_host", &config.notify.smtp_host),
            ("notify.from", &config.notify.from),
            ("notify.to", &config.notify.to),
        ] {
            if is_blank(value) {
                fail(format!("{key} is required when notify.enabled = true"));
            }
        }
    }

    if !config.intake.replies.fiber_available.contains("{speeds}") {
        fail("intake.replies.fiber_available must contain the `{speeds}` placeholder".into());
    }

    if config.installations.commission_amount < 0 {
        fail(format!(
            "installations.commission_amount must not be negative, got {}",
            config.installations.commission_amount
        ));
    }

    if config.installations.reminder.trim().is_empty() {
        fail("installations.reminder must not be empty".into());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}
