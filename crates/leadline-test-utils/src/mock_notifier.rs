// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadline_core::types::InboundNotification;
use leadline_core::{AdapterType, HealthStatus, LeadlineError, Notifier, PluginAdapter};

/// Captures notifications. When `failing`, records them and then errors.
#[derive(Default)]
pub struct MockNotifier {
    notifications: Mutex<Vec<InboundNotification>>,
    failing: bool,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    pub async fn notifications(&self) -> Vec<InboundNotification> {
        self.notifications.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockNotifier {
    fn name(&self) -> &str {
        "mock-notifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadlineError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadlineError> {
        Ok(())
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify_inbound(
        &self,
        notification: &InboundNotification,
    ) -> Result<(), LeadlineError> {
        self.notifications.lock().await.push(notification.clone());
        if self.failing {
            return Err(LeadlineError::Notification {
                message: "mock smtp down".into(),
            });
        }
        Ok(())
    }
}
