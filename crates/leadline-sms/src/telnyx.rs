// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telnyx Messaging API v2 sender.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use leadline_core::types::{OutboundSms, SendReceipt, SmsCapabilities};
use leadline_core::{AdapterType, HealthStatus, LeadlineError, PluginAdapter, SmsGateway};

use crate::http::{build_client, request_error, status_error};

const API_BASE_URL: &str = "https://api.telnyx.com";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    messaging_profile_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    data: SentMessage,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    id: String,
}

/// Sends SMS through Telnyx with a bearer API key.
pub struct TelnyxGateway {
    client: reqwest::Client,
    api_key: String,
    from_number: String,
    messaging_profile_id: Option<String>,
    base_url: String,
}

impl std::fmt::Debug for TelnyxGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnyxGateway")
            .field("api_key", &"[redacted]")
            .field("from_number", &self.from_number)
            .field("messaging_profile_id", &self.messaging_profile_id)
            .finish()
    }
}

impl TelnyxGateway {
    pub fn new(
        api_key: String,
        from_number: String,
        messaging_profile_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, LeadlineError> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key,
            from_number,
            messaging_profile_id,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the API host (for testing with wiremock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl PluginAdapter for TelnyxGateway {
    fn name(&self) -> &str {
        "telnyx"
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
impl SmsGateway for TelnyxGateway {
    fn capabilities(&self) -> SmsCapabilities {
        SmsCapabilities {
            native_opt_out: true,
            max_body_len: None,
        }
    }

    async fn send(&self, sms: &OutboundSms) -> Result<SendReceipt, LeadlineError> {
        let request = SendRequest {
            from: &self.from_number,
            to: &sms.to,
            text: &sms.body,
            messaging_profile_id: self.messaging_profile_id.as_deref(),
        };
        let response = self
            .client
            .post(format!("{}/v2/messages", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| request_error("telnyx", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| request_error("telnyx", e))?;
        if !status.is_success() {
            return Err(status_error("telnyx", status, &body));
        }

        let parsed: SendResponse = serde_json::from_str(&body).map_err(|e| LeadlineError::Sms {
            message: format!("unexpected Telnyx response: {e}"),
            transient: false,
            source: Some(Box::new(e)),
        })?;
        debug!(id = %parsed.data.id, to = %sms.to, "telnyx accepted message");
        Ok(SendReceipt {
            provider: "telnyx".into(),
            external_id: parsed.data.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn gateway(server: &MockServer) -> TelnyxGateway {
        TelnyxGateway::new(
            "KEY123".into(),
            "+15550001111".into(),
            Some("profile-1".into()),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn send_posts_json_with_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/messages"))
            .and(header("authorization", "Bearer KEY123"))
            .and(body_partial_json(serde_json::json!({
                "from": "+15550001111",
                "to": "+12145550100",
                "text": "hi",
                "messaging_profile_id": "profile-1"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {"id": "40317f", "record_type": "message"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = gateway(&server)
            .send(&OutboundSms {
                to: "+12145550100".into(),
                body: "hi".into(),
            })
            .await
            .unwrap();
        assert_eq!(receipt.external_id, "40317f");
    }

    #[tokio::test]
    async fn rate_limit_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = gateway(&server)
            .send(&OutboundSms {
                to: "+12145550100".into(),
                body: "hi".into(),
            })
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }
}
