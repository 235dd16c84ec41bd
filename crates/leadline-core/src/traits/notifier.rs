// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification sink trait.

use async_trait::async_trait;

use crate::error::LeadlineError;
use crate::traits::adapter::PluginAdapter;
use crate::types::InboundNotification;

/// Best-effort alert to staff about a new inbound message.
#[async_trait]
pub trait Notifier: PluginAdapter {
    async fn notify_inbound(&self, notification: &InboundNotification)
    -> Result<(), LeadlineError>;
}
