// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use leadline_config::model::StorageConfig;
use leadline_core::types::{
    AvailabilityCheck, AvailabilityResult, Commission, CommissionStats, CommissionStatus,
    CompletedInstallation, Conversation, ConversationPatch, ConversationStatus,
    ConversationSummary, Customer, CustomerPatch, InboundRecord, Installation, InstallationPatch,
    InstallationSummary, Message, NewInbound, NewInstallation, NewMessage, ParsedAddress,
    ResetSummary, StoreStats,
};
use leadline_core::{AdapterType, HealthStatus, LeadlineError, PluginAdapter, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// The database is opened by [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// The connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, LeadlineError> {
        self.db.get().ok_or_else(|| LeadlineError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadlineError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadlineError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), LeadlineError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| LeadlineError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), LeadlineError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Customers ---

    async fn upsert_customer(&self, phone_number: &str) -> Result<Customer, LeadlineError> {
        queries::customers::upsert_customer(self.db()?, phone_number).await
    }

    async fn get_customer(&self, id: &str) -> Result<Option<Customer>, LeadlineError> {
        queries::customers::get_customer(self.db()?, id).await
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, LeadlineError> {
        queries::customers::list_customers(self.db()?).await
    }

    async fn set_customer_address(
        &self,
        id: &str,
        address: &ParsedAddress,
    ) -> Result<(), LeadlineError> {
        queries::customers::set_customer_address(self.db()?, id, address).await
    }

    async fn update_customer(
        &self,
        id: &str,
        patch: &CustomerPatch,
    ) -> Result<Option<Customer>, LeadlineError> {
        queries::customers::update_customer(self.db()?, id, patch).await
    }

    // --- Conversations ---

    async fn find_or_create_open_conversation(
        &self,
        customer_id: &str,
    ) -> Result<(Conversation, bool), LeadlineError> {
        queries::conversations::find_or_create_open_conversation(self.db()?, customer_id).await
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, LeadlineError> {
        queries::conversations::get_conversation(self.db()?, id).await
    }

    async fn list_customer_conversations(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Conversation>, LeadlineError> {
        queries::conversations::list_customer_conversations(self.db()?, customer_id).await
    }

    async fn list_conversations(
        &self,
        status: Option<ConversationStatus>,
    ) -> Result<Vec<ConversationSummary>, LeadlineError> {
        queries::conversations::list_conversations(self.db()?, status).await
    }

    async fn set_conversation_status(
        &self,
        id: &str,
        status: ConversationStatus,
    ) -> Result<(), LeadlineError> {
        queries::conversations::set_conversation_status(self.db()?, id, status).await
    }

    async fn update_conversation(
        &self,
        id: &str,
        patch: &ConversationPatch,
    ) -> Result<Option<Conversation>, LeadlineError> {
        queries::conversations::update_conversation(self.db()?, id, patch).await
    }

    async fn touch_conversation(&self, id: &str) -> Result<(), LeadlineError> {
        queries::conversations::touch_conversation(self.db()?, id).await
    }

    // --- Messages ---

    async fn record_inbound(&self, inbound: &NewInbound) -> Result<InboundRecord, LeadlineError> {
        queries::messages::record_inbound(self.db()?, inbound).await
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<Option<Message>, LeadlineError> {
        queries::messages::insert_message(self.db()?, message).await
    }

    async fn list_messages(
        &self,
        conversation_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, LeadlineError> {
        queries::messages::list_messages(self.db()?, conversation_id, limit).await
    }

    // --- Availability checks ---

    async fn create_availability_check(
        &self,
        customer_id: &str,
        conversation_id: Option<&str>,
        address: &str,
    ) -> Result<AvailabilityCheck, LeadlineError> {
        queries::availability::create_availability_check(
            self.db()?,
            customer_id,
            conversation_id,
            address,
        )
        .await
    }

    async fn complete_availability_check(
        &self,
        id: &str,
        result: &AvailabilityResult,
    ) -> Result<AvailabilityCheck, LeadlineError> {
        queries::availability::complete_availability_check(self.db()?, id, result).await
    }

    async fn list_availability_checks(
        &self,
        customer_id: &str,
    ) -> Result<Vec<AvailabilityCheck>, LeadlineError> {
        queries::availability::list_availability_checks(self.db()?, customer_id).await
    }

    // --- Installations and commissions ---

    async fn create_installation(
        &self,
        installation: &NewInstallation,
    ) -> Result<Installation, LeadlineError> {
        queries::installations::create_installation(self.db()?, installation).await
    }

    async fn get_installation(&self, id: &str) -> Result<Option<Installation>, LeadlineError> {
        queries::installations::get_installation(self.db()?, id).await
    }

    async fn list_installations(&self) -> Result<Vec<InstallationSummary>, LeadlineError> {
        queries::installations::list_installations(self.db()?).await
    }

    async fn update_installation(
        &self,
        id: &str,
        patch: &InstallationPatch,
    ) -> Result<Option<Installation>, LeadlineError> {
        queries::installations::update_installation(self.db()?, id, patch).await
    }

    async fn complete_installation(
        &self,
        id: &str,
        amount: i64,
    ) -> Result<CompletedInstallation, LeadlineError> {
        queries::installations::complete_installation(self.db()?, id, amount).await
    }

    async fn mark_reminder_sent(&self, id: &str) -> Result<Installation, LeadlineError> {
        queries::installations::mark_reminder_sent(self.db()?, id).await
    }

    async fn list_commissions(&self) -> Result<Vec<Commission>, LeadlineError> {
        queries::installations::list_commissions(self.db()?).await
    }

    async fn commission_stats(&self) -> Result<CommissionStats, LeadlineError> {
        queries::installations::commission_stats(self.db()?).await
    }

    async fn set_commission_status(
        &self,
        id: &str,
        status: CommissionStatus,
    ) -> Result<Option<Commission>, LeadlineError> {
        queries::installations::set_commission_status(self.db()?, id, status).await
    }

    // --- Administration ---

    async fn reset_conversations(
        &self,
        clear_addresses: bool,
    ) -> Result<ResetSummary, LeadlineError> {
        queries::admin::reset_conversations(self.db()?, clear_addresses).await
    }

    async fn stats(&self) -> Result<StoreStats, LeadlineError> {
        queries::admin::stats(self.db()?).await
    }
}
