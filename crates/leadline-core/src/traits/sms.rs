// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS gateway trait (Twilio, Telnyx, log-only).

use async_trait::async_trait;

use crate::error::LeadlineError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{OutboundSms, SendReceipt, SmsCapabilities};

/// Outbound half of the messaging boundary.
///
/// Inbound traffic arrives through provider webhooks handled by the gateway
/// crate; this trait only covers delivery.
#[async_trait]
pub trait SmsGateway: PluginAdapter {
    /// Returns what the provider handles on its own.
    fn capabilities(&self) -> SmsCapabilities;

    /// Hands one message to the provider. Errors flagged transient may be retried.
    async fn send(&self, sms: &OutboundSms) -> Result<SendReceipt, LeadlineError>;
}
