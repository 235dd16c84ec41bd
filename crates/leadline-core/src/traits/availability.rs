// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Availability checker trait.

use async_trait::async_trait;

use crate::error::LeadlineError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AvailabilityResult, ParsedAddress};

/// Black-box service-availability lookup for a postal address.
#[async_trait]
pub trait AvailabilityChecker: PluginAdapter {
    /// Looks up service at `address`. A returned `Err` is recorded as an
    /// ERROR check by the caller; it is never retried automatically.
    async fn check(&self, address: &ParsedAddress) -> Result<AvailabilityResult, LeadlineError>;
}
