// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sending a reply and recording it on the conversation.

use std::sync::Arc;

use tracing::{debug, warn};

use leadline_core::types::{NewMessage, OutboundSms, SmsCapabilities};
use leadline_core::{DeliveryStatus, Direction, LeadlineError, Message, SmsGateway, StorageAdapter};
use leadline_sms::{RetryPolicy, send_with_retry};

/// Where an outbound message goes.
#[derive(Debug, Clone, Copy)]
pub struct Recipient<'a> {
    pub conversation_id: &'a str,
    pub customer_id: &'a str,
    pub phone_number: &'a str,
}

/// Delivers replies through the gateway and persists them as OUTBOUND.
#[derive(Clone)]
pub struct Outbox {
    storage: Arc<dyn StorageAdapter>,
    gateway: Arc<dyn SmsGateway>,
    retry: RetryPolicy,
}

impl Outbox {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        gateway: Arc<dyn SmsGateway>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            storage,
            gateway,
            retry,
        }
    }

    pub fn capabilities(&self) -> SmsCapabilities {
        self.gateway.capabilities()
    }

    /// Send `body` with retry and record the attempt.
    ///
    /// A delivered message is stored as SENT with the provider's id. When
    /// every attempt fails the message is stored as FAILED and the send
    /// error is returned.
    pub async fn deliver(
        &self,
        to: Recipient<'_>,
        body: String,
    ) -> Result<Message, LeadlineError> {
        let sms = OutboundSms {
            to: to.phone_number.to_string(),
            body,
        };
        let outcome = send_with_retry(self.gateway.as_ref(), &sms, &self.retry).await;

        let (status, provider, external_id) = match &outcome {
            Ok(receipt) => (
                DeliveryStatus::Sent,
                receipt.provider.clone(),
                Some(receipt.external_id.clone()),
            ),
            Err(e) => {
                warn!(
                    conversation_id = %to.conversation_id,
                    error = %e,
                    "outbound sms failed after retries"
                );
                (DeliveryStatus::Failed, self.gateway.name().to_string(), None)
            }
        };

        let record = NewMessage {
            conversation_id: to.conversation_id.to_string(),
            customer_id: to.customer_id.to_string(),
            body: sms.body,
            direction: Direction::Outbound,
            status,
            provider,
            external_id,
        };
        let stored = self.storage.insert_message(&record).await?.ok_or_else(|| {
            LeadlineError::Internal("provider reused an outbound message id".into())
        })?;

        match outcome {
            Ok(_) => {
                debug!(conversation_id = %to.conversation_id, message_id = %stored.id, "reply delivered");
                Ok(stored)
            }
            Err(e) => Err(e),
        }
    }
}
