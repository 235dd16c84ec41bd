// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway that only logs, for local runs without provider credentials.

use async_trait::async_trait;
use tracing::info;

use leadline_core::types::{OutboundSms, SendReceipt, SmsCapabilities};
use leadline_core::{AdapterType, HealthStatus, LeadlineError, PluginAdapter, SmsGateway};

#[derive(Debug, Default)]
pub struct LogGateway;

#[async_trait]
impl PluginAdapter for LogGateway {
    fn name(&self) -> &str {
        "log"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sms
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadlineError> {
        Ok(HealthStatus::Degraded(
            "log-only gateway: messages are not delivered".into(),
        ))
    }

    async fn shutdown(&self) -> Result<(), LeadlineError> {
        Ok(())
    }
}

#[async_trait]
impl SmsGateway for LogGateway {
    fn capabilities(&self) -> SmsCapabilities {
        SmsCapabilities {
            native_opt_out: false,
            max_body_len: None,
        }
    }

    async fn send(&self, sms: &OutboundSms) -> Result<SendReceipt, LeadlineError> {
        let external_id = format!("log-{}", uuid::Uuid::new_v4());
        info!(to = %sms.to, id = %external_id, body = %sms.body, "outbound sms (not delivered)");
        Ok(SendReceipt {
            provider: "log".into(),
            external_id,
        })
    }
}
