// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Availability lookups: the HTTP checker client and the background job
//! that records a result and tells the customer about it.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use leadline_config::model::{AvailabilityConfig, RepliesConfig};
use leadline_core::{
    AdapterType, AvailabilityCheck, AvailabilityChecker, AvailabilityResult, CheckStatus,
    ConversationStatus, HealthStatus, LeadlineError, ParsedAddress, PluginAdapter, StorageAdapter,
};

use crate::outbound::{Outbox, Recipient};
use crate::replies::availability_reply;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckRequest<'a> {
    street: &'a str,
    city: &'a str,
    state: &'a str,
    zip_code: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckResponse {
    status: String,
    #[serde(default)]
    services: Vec<String>,
    #[serde(default, alias = "fiber_speeds")]
    fiber_speeds: Vec<String>,
    #[serde(default, alias = "internet_air")]
    internet_air: bool,
    #[serde(default)]
    notes: Option<String>,
}

impl From<CheckResponse> for AvailabilityResult {
    fn from(wire: CheckResponse) -> Self {
        // A lookup service may only ever report a final state.
        let status = match CheckStatus::from_str(wire.status.trim()) {
            Ok(CheckStatus::Pending) | Err(_) => {
                return AvailabilityResult::error(format!(
                    "checker returned unusable status `{}`",
                    wire.status
                ));
            }
            Ok(status) => status,
        };
        AvailabilityResult {
            status,
            services: wire.services,
            fiber_speeds: wire.fiber_speeds,
            internet_air: wire.internet_air,
            notes: wire.notes,
        }
    }
}

/// [`AvailabilityChecker`] that POSTs the address to a lookup service.
pub struct HttpAvailabilityChecker {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAvailabilityChecker {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, LeadlineError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LeadlineError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// `None` when no endpoint is configured.
    pub fn from_config(config: &AvailabilityConfig) -> Result<Option<Self>, LeadlineError> {
        config
            .endpoint_url
            .as_deref()
            .map(|url| Self::new(url, Duration::from_secs(config.timeout_secs)))
            .transpose()
    }
}

#[async_trait]
impl PluginAdapter for HttpAvailabilityChecker {
    fn name(&self) -> &str {
        "http-availability"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Availability
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadlineError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadlineError> {
        Ok(())
    }
}

#[async_trait]
impl AvailabilityChecker for HttpAvailabilityChecker {
    async fn check(&self, address: &ParsedAddress) -> Result<AvailabilityResult, LeadlineError> {
        let body = CheckRequest {
            street: &address.street,
            city: &address.city,
            state: &address.state,
            zip_code: &address.zip_code,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| LeadlineError::Availability {
                message: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LeadlineError::Availability {
                message: format!("checker returned {status}: {text}"),
            });
        }

        let wire: CheckResponse =
            response
                .json()
                .await
                .map_err(|e| LeadlineError::Availability {
                    message: format!("malformed checker response: {e}"),
                })?;
        Ok(wire.into())
    }
}

/// One availability lookup to run in the background.
#[derive(Debug, Clone)]
pub struct AvailabilityJob {
    pub customer_id: String,
    pub conversation_id: Option<String>,
    pub phone_number: String,
    pub address: ParsedAddress,
}

/// Everything the background job needs, cheap to clone into a task.
#[derive(Clone)]
pub struct AvailabilityRunner {
    pub storage: Arc<dyn StorageAdapter>,
    pub checker: Arc<dyn AvailabilityChecker>,
    pub outbox: Outbox,
    pub replies: Arc<RepliesConfig>,
}

impl AvailabilityRunner {
    /// Record a PENDING check, run the lookup, store the outcome, and send
    /// the customer a summary.
    ///
    /// A failed lookup is stored as ERROR and gets no customer reply. The
    /// reply is skipped when the conversation has been closed meanwhile.
    /// A delivered reply moves a CHECKING conversation to RESPONDED.
    pub async fn run(&self, job: AvailabilityJob) -> Result<AvailabilityCheck, LeadlineError> {
        let pending = self
            .storage
            .create_availability_check(
                &job.customer_id,
                job.conversation_id.as_deref(),
                &job.address.full_address,
            )
            .await?;
        debug!(check_id = %pending.id, address = %job.address.full_address, "availability check started");

        let result = match self.checker.check(&job.address).await {
            Ok(result) => result,
            Err(e) => {
                warn!(check_id = %pending.id, error = %e, "availability checker failed");
                AvailabilityResult::error(e.to_string())
            }
        };
        let check = self
            .storage
            .complete_availability_check(&pending.id, &result)
            .await?;
        info!(check_id = %check.id, status = %check.status, "availability check completed");

        let Some(reply) = availability_reply(&result, &self.replies) else {
            return Ok(check);
        };
        let Some(conversation_id) = job.conversation_id.as_deref() else {
            return Ok(check);
        };
        let Some(conversation) = self.storage.get_conversation(conversation_id).await? else {
            warn!(conversation_id, "conversation disappeared before availability reply");
            return Ok(check);
        };
        if !conversation.status.is_open() {
            debug!(conversation_id, "conversation closed, skipping availability reply");
            return Ok(check);
        }

        let recipient = Recipient {
            conversation_id,
            customer_id: &job.customer_id,
            phone_number: &job.phone_number,
        };
        if let Err(e) = self.outbox.deliver(recipient, reply).await {
            warn!(conversation_id, error = %e, "availability reply not delivered");
            return Ok(check);
        }
        self.storage.touch_conversation(conversation_id).await?;
        if conversation.status == ConversationStatus::Checking {
            self.storage
                .set_conversation_status(conversation_id, ConversationStatus::Responded)
                .await?;
            info!(conversation_id, from = %conversation.status, to = %ConversationStatus::Responded, "conversation status changed");
        }
        Ok(check)
    }
}
