// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio Programmable Messaging sender.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use leadline_core::types::{OutboundSms, SendReceipt, SmsCapabilities};
use leadline_core::{AdapterType, HealthStatus, LeadlineError, PluginAdapter, SmsGateway};

use crate::http::{build_client, request_error, status_error};

const API_BASE_URL: &str = "https://api.twilio.com";

/// Twilio rejects bodies longer than this.
const MAX_BODY_LEN: usize = 1600;

#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// Sends SMS through the Twilio REST API with account SID + auth token.
pub struct TwilioGateway {
    client: reqwest::Client,
    account_sid: String,
    auth_token: String,
    from_number: String,
    base_url: String,
}

impl std::fmt::Debug for TwilioGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwilioGateway")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[redacted]")
            .field("from_number", &self.from_number)
            .finish()
    }
}

impl TwilioGateway {
    pub fn new(
        account_sid: String,
        auth_token: String,
        from_number: String,
        timeout: Duration,
    ) -> Result<Self, LeadlineError> {
        Ok(Self {
            client: build_client(timeout)?,
            account_sid,
            auth_token,
            from_number,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the API host (for testing with wiremock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }
}

#[async_trait]
impl PluginAdapter for TwilioGateway {
    fn name(&self) -> &str {
        "twilio"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sms
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadlineError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadlineError> {
        Ok(())
    }
}

#[async_trait]
impl SmsGateway for TwilioGateway {
    fn capabilities(&self) -> SmsCapabilities {
        // Twilio answers STOP/UNSUBSCRIBE itself on long codes.
        SmsCapabilities {
            native_opt_out: true,
            max_body_len: Some(MAX_BODY_LEN),
        }
    }

    async fn send(&self, sms: &OutboundSms) -> Result<SendReceipt, LeadlineError> {
        let form = [
            ("To", sms.to.as_str()),
            ("From", self.from_number.as_str()),
            ("Body", sms.body.as_str()),
        ];
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| request_error("twilio", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| request_error("twilio", e))?;
        if !status.is_success() {
            return Err(status_error("twilio", status, &body));
        }

        let resource: MessageResource =
            serde_json::from_str(&body).map_err(|e| LeadlineError::Sms {
                message: format!("unexpected Twilio response: {e}"),
                transient: false,
                source: Some(Box::new(e)),
            })?;
        debug!(sid = %resource.sid, to = %sms.to, "twilio accepted message");
        Ok(SendReceipt {
            provider: "twilio".into(),
            external_id: resource.sid,
        })
    }
}
