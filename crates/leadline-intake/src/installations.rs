// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Installation scheduling, reminders, and the commission earned on
//! completion.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use leadline_config::model::InstallationsConfig;
use leadline_core::types::{
    CommissionStats, CompletedInstallation, ConversationPatch, CustomerPatch, InstallationPatch,
    InstallationSummary, NewInstallation,
};
use leadline_core::{
    Commission, CommissionStatus, ConversationStatus, Installation, InstallationStatus,
    LeadlineError, Message, StorageAdapter, normalize_phone,
};

use crate::outbound::{Outbox, Recipient};

/// Request to book an installation for a phone number.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleInstallation {
    #[serde(default)]
    pub customer_name: Option<String>,
    pub phone_number: String,
    /// `YYYY-MM-DD` or RFC 3339.
    pub install_date: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A delivered reminder and the installation it was sent for.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderReceipt {
    pub installation: Installation,
    pub message: Message,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommissionReport {
    pub commissions: Vec<Commission>,
    pub stats: CommissionStats,
}

/// Agent-facing installation and commission operations.
#[derive(Clone)]
pub struct InstallationService {
    storage: Arc<dyn StorageAdapter>,
    outbox: Outbox,
    config: Arc<InstallationsConfig>,
}

impl InstallationService {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        outbox: Outbox,
        config: &InstallationsConfig,
    ) -> Self {
        Self {
            storage,
            outbox,
            config: Arc::new(config.clone()),
        }
    }

    /// Book an installation, creating the customer if the number is new.
    /// A given name fills an empty customer name; it never overwrites one.
    pub async fn schedule(
        &self,
        request: ScheduleInstallation,
    ) -> Result<Installation, LeadlineError> {
        if request.phone_number.trim().is_empty() {
            return Err(LeadlineError::Validation(
                "phone number and install date are required".into(),
            ));
        }
        let install_date = normalize_install_date(&request.install_date)?;
        let phone = normalize_phone(&request.phone_number)?;

        let customer = self.storage.upsert_customer(&phone).await?;
        let name = request
            .customer_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if let Some(name) = name
            && customer.name.as_deref().is_none_or(|n| n.trim().is_empty())
        {
            let patch = CustomerPatch {
                name: Some(name),
                ..Default::default()
            };
            self.storage.update_customer(&customer.id, &patch).await?;
        }

        let installation = self
            .storage
            .create_installation(&NewInstallation {
                customer_id: customer.id.clone(),
                install_date,
                notes: request.notes.filter(|n| !n.trim().is_empty()),
            })
            .await?;
        info!(
            installation_id = %installation.id,
            customer_id = %customer.id,
            install_date = %installation.install_date,
            "installation scheduled"
        );
        Ok(installation)
    }

    pub async fn list(&self) -> Result<Vec<InstallationSummary>, LeadlineError> {
        self.storage.list_installations().await
    }

    /// Reschedule, cancel or annotate. Completion goes through
    /// [`Self::complete`] so that it always earns its commission.
    pub async fn update(
        &self,
        id: &str,
        patch: InstallationPatch,
    ) -> Result<Installation, LeadlineError> {
        if patch.status == Some(InstallationStatus::Completed) {
            return Err(LeadlineError::Validation(
                "use the complete action to mark an installation completed".into(),
            ));
        }
        let patch = InstallationPatch {
            install_date: patch
                .install_date
                .as_deref()
                .map(normalize_install_date)
                .transpose()?,
            ..patch
        };
        self.storage
            .update_installation(id, &patch)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn complete(&self, id: &str) -> Result<CompletedInstallation, LeadlineError> {
        let completed = self
            .storage
            .complete_installation(id, self.config.commission_amount)
            .await?;
        info!(
            installation_id = %completed.installation.id,
            commission_id = %completed.commission.id,
            amount = completed.commission.amount,
            "installation completed"
        );
        Ok(completed)
    }

    /// Text the installation reminder to the customer.
    ///
    /// The message is recorded on the customer's open conversation. With no
    /// open conversation a new one is opened in PENDING_INSTALL, unless the
    /// customer's latest conversation is CLOSED: such customers are not
    /// texted until an agent reopens it. A failed send is recorded and
    /// returned as an error, and `reminder_sent` stays unset.
    pub async fn send_reminder(&self, id: &str) -> Result<ReminderReceipt, LeadlineError> {
        let installation = self
            .storage
            .get_installation(id)
            .await?
            .ok_or_else(|| not_found(id))?;
        let customer = self
            .storage
            .get_customer(&installation.customer_id)
            .await?
            .ok_or_else(|| LeadlineError::NotFound {
                entity: "customer",
                id: installation.customer_id.clone(),
            })?;

        let history = self
            .storage
            .list_customer_conversations(&customer.id)
            .await?;
        if history
            .first()
            .is_some_and(|latest| latest.status == ConversationStatus::Closed)
        {
            return Err(LeadlineError::Validation(
                "customer's latest conversation is closed; reopen it before texting".into(),
            ));
        }

        let (conversation, created) = self
            .storage
            .find_or_create_open_conversation(&customer.id)
            .await?;
        if created {
            let patch = ConversationPatch {
                status: Some(ConversationStatus::PendingInstall),
                ..Default::default()
            };
            self.storage
                .update_conversation(&conversation.id, &patch)
                .await?;
        }

        let recipient = Recipient {
            conversation_id: &conversation.id,
            customer_id: &customer.id,
            phone_number: &customer.phone_number,
        };
        let message = self
            .outbox
            .deliver(recipient, self.config.reminder.clone())
            .await?;
        self.storage.touch_conversation(&conversation.id).await?;
        let installation = self.storage.mark_reminder_sent(&installation.id).await?;
        info!(
            installation_id = %installation.id,
            message_id = %message.id,
            "installation reminder sent"
        );
        Ok(ReminderReceipt {
            installation,
            message,
        })
    }

    pub async fn commissions(&self) -> Result<CommissionReport, LeadlineError> {
        Ok(CommissionReport {
            commissions: self.storage.list_commissions().await?,
            stats: self.storage.commission_stats().await?,
        })
    }

    pub async fn set_commission_status(
        &self,
        id: &str,
        status: CommissionStatus,
    ) -> Result<Commission, LeadlineError> {
        self.storage
            .set_commission_status(id, status)
            .await?
            .ok_or_else(|| LeadlineError::NotFound {
                entity: "commission",
                id: id.to_string(),
            })
    }
}

fn not_found(id: &str) -> LeadlineError {
    LeadlineError::NotFound {
        entity: "installation",
        id: id.to_string(),
    }
}

/// Normalize an install date to the stored timestamp format. A bare date
/// means midnight UTC.
pub fn normalize_install_date(raw: &str) -> Result<String, LeadlineError> {
    let raw = raw.trim();
    let at = if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        at.with_timezone(&Utc)
    } else if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        date.and_time(NaiveTime::MIN).and_utc()
    } else {
        return Err(LeadlineError::Validation(format!(
            "install date `{raw}` must be YYYY-MM-DD or an RFC 3339 timestamp"
        )));
    };
    Ok(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}
