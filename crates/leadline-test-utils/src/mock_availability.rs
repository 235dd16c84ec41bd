// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock availability checker.

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadline_core::{
    AdapterType, AvailabilityChecker, AvailabilityResult, CheckStatus, HealthStatus,
    LeadlineError, ParsedAddress, PluginAdapter,
};

/// Answers every lookup with the same result, or fails every lookup.
pub struct MockAvailabilityChecker {
    result: Result<AvailabilityResult, String>,
    checked: Mutex<Vec<ParsedAddress>>,
}

impl MockAvailabilityChecker {
    pub fn returning(result: AvailabilityResult) -> Self {
        Self {
            result: Ok(result),
            checked: Mutex::new(Vec::new()),
        }
    }

    /// Fiber at 300 and 1000 Mbps.
    pub fn fiber() -> Self {
        Self::returning(AvailabilityResult {
            status: CheckStatus::FiberAvailable,
            services: vec!["Fiber".into()],
            fiber_speeds: vec!["300".into(), "1000".into()],
            internet_air: false,
            notes: None,
        })
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            result: Err(message.into()),
            checked: Mutex::new(Vec::new()),
        }
    }

    /// Addresses looked up so far.
    pub async fn checked(&self) -> Vec<ParsedAddress> {
        self.checked.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockAvailabilityChecker {
    fn name(&self) -> &str {
        "mock-availability"
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
impl AvailabilityChecker for MockAvailabilityChecker {
    async fn check(&self, address: &ParsedAddress) -> Result<AvailabilityResult, LeadlineError> {
        self.checked.lock().await.push(address.clone());
        self.result
            .clone()
            .map_err(|message| LeadlineError::Availability { message })
    }
}
