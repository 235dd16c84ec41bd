// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock SMS gateway that records every accepted message.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadline_core::types::{OutboundSms, SendReceipt, SmsCapabilities};
use leadline_core::{AdapterType, HealthStatus, LeadlineError, PluginAdapter, SmsGateway};

/// A mock SMS gateway.
///
/// Accepted messages are captured for assertions. `fail_next` makes the
/// following sends fail, transiently or permanently.
pub struct MockSmsGateway {
    sent: Arc<Mutex<Vec<OutboundSms>>>,
    attempts: AtomicU32,
    failures_left: AtomicU32,
    transient_failures: AtomicBool,
    native_opt_out: bool,
}

impl MockSmsGateway {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            attempts: AtomicU32::new(0),
            failures_left: AtomicU32::new(0),
            transient_failures: AtomicBool::new(false),
            native_opt_out: false,
        }
    }

    /// Report that the provider handles STOP keywords itself.
    pub fn with_native_opt_out(mut self, native: bool) -> Self {
        self.native_opt_out = native;
        self
    }

    /// Fail the next `count` send attempts.
    pub fn fail_next(&self, count: u32, transient: bool) {
        self.transient_failures.store(transient, Ordering::SeqCst);
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// Messages accepted so far.
    pub async fn sent_messages(&self) -> Vec<OutboundSms> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Send attempts, including failed ones.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for MockSmsGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockSmsGateway {
    fn name(&self) -> &str {
        "mock-sms"
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
impl SmsGateway for MockSmsGateway {
    fn capabilities(&self) -> SmsCapabilities {
        SmsCapabilities {
            native_opt_out: self.native_opt_out,
            max_body_len: None,
        }
    }

    async fn send(&self, sms: &OutboundSms) -> Result<SendReceipt, LeadlineError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(LeadlineError::Sms {
                message: "mock gateway failure".into(),
                transient: self.transient_failures.load(Ordering::SeqCst),
                source: None,
            });
        }

        self.sent.lock().await.push(sms.clone());
        Ok(SendReceipt {
            provider: "mock-sms".into(),
            external_id: format!("mock-sms-{}", uuid::Uuid::new_v4()),
        })
    }
}
