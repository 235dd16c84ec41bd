// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the CRM's persistence backend.

use async_trait::async_trait;

use crate::error::LeadlineError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    AvailabilityCheck, AvailabilityResult, Commission, CommissionStats, CommissionStatus,
    CompletedInstallation, Conversation, ConversationPatch, ConversationStatus,
    ConversationSummary, Customer, CustomerPatch, InboundRecord, Installation, InstallationPatch,
    InstallationSummary, Message, NewInbound, NewInstallation, NewMessage, ParsedAddress,
    ResetSummary, StoreStats,
};

/// Persistence for customers, conversations, messages, availability checks,
/// installations and commissions.
///
/// The database is the single source of truth. The two find-or-create
/// operations must be atomic with respect to concurrent callers for the same
/// phone number or customer.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection).
    async fn initialize(&self) -> Result<(), LeadlineError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), LeadlineError>;

    // --- Customers ---

    /// Returns the customer with this E.164 phone number, creating it if absent.
    async fn upsert_customer(&self, phone_number: &str) -> Result<Customer, LeadlineError>;

    async fn get_customer(&self, id: &str) -> Result<Option<Customer>, LeadlineError>;

    /// All customers, most recently updated first.
    async fn list_customers(&self) -> Result<Vec<Customer>, LeadlineError>;

    /// Stores a captured address on the customer.
    async fn set_customer_address(
        &self,
        id: &str,
        address: &ParsedAddress,
    ) -> Result<(), LeadlineError>;

    /// Applies an agent edit. Returns `None` if the customer does not exist.
    async fn update_customer(
        &self,
        id: &str,
        patch: &CustomerPatch,
    ) -> Result<Option<Customer>, LeadlineError>;

    // --- Conversations ---

    /// Returns the customer's open conversation, creating one in NEW if none
    /// exists. The flag is true when this call created it.
    async fn find_or_create_open_conversation(
        &self,
        customer_id: &str,
    ) -> Result<(Conversation, bool), LeadlineError>;

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, LeadlineError>;

    /// Conversations for a customer, newest first.
    async fn list_customer_conversations(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Conversation>, LeadlineError>;

    /// Conversation list for the inbox, most recent activity first.
    async fn list_conversations(
        &self,
        status: Option<ConversationStatus>,
    ) -> Result<Vec<ConversationSummary>, LeadlineError>;

    async fn set_conversation_status(
        &self,
        id: &str,
        status: ConversationStatus,
    ) -> Result<(), LeadlineError>;

    /// Applies an agent edit. Returns `None` if the conversation does not exist.
    async fn update_conversation(
        &self,
        id: &str,
        patch: &ConversationPatch,
    ) -> Result<Option<Conversation>, LeadlineError>;

    /// Bumps `last_message_at` to now.
    async fn touch_conversation(&self, id: &str) -> Result<(), LeadlineError>;

    // --- Messages ---

    /// Files an inbound SMS on the customer's open conversation, opening one
    /// if needed. A redelivery of a stored `(provider, external_id)` writes
    /// nothing, not even a conversation. Atomic with respect to concurrent
    /// callers.
    async fn record_inbound(&self, inbound: &NewInbound) -> Result<InboundRecord, LeadlineError>;

    /// Appends a message. Returns `None` without writing when a message with
    /// the same provider and external id already exists.
    async fn insert_message(&self, message: &NewMessage) -> Result<Option<Message>, LeadlineError>;

    /// Messages in creation order. With `limit`, only the latest `limit`
    /// messages are returned (still oldest first).
    async fn list_messages(
        &self,
        conversation_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, LeadlineError>;

    // --- Availability checks ---

    /// Records a PENDING check for `address`.
    async fn create_availability_check(
        &self,
        customer_id: &str,
        conversation_id: Option<&str>,
        address: &str,
    ) -> Result<AvailabilityCheck, LeadlineError>;

    /// Stores the outcome of a PENDING check. Completed checks are not modified.
    async fn complete_availability_check(
        &self,
        id: &str,
        result: &AvailabilityResult,
    ) -> Result<AvailabilityCheck, LeadlineError>;

    /// Checks for a customer, newest first.
    async fn list_availability_checks(
        &self,
        customer_id: &str,
    ) -> Result<Vec<AvailabilityCheck>, LeadlineError>;

    // --- Installations and commissions ---

    async fn create_installation(
        &self,
        installation: &NewInstallation,
    ) -> Result<Installation, LeadlineError>;

    async fn get_installation(&self, id: &str) -> Result<Option<Installation>, LeadlineError>;

    /// All installations with their customer, latest install date first.
    async fn list_installations(&self) -> Result<Vec<InstallationSummary>, LeadlineError>;

    /// Applies an agent edit. Returns `None` if the installation does not exist.
    async fn update_installation(
        &self,
        id: &str,
        patch: &InstallationPatch,
    ) -> Result<Option<Installation>, LeadlineError>;

    /// Marks the installation COMPLETED and records an EARNED sale commission
    /// of `amount` in one transaction. An installation completes once.
    async fn complete_installation(
        &self,
        id: &str,
        amount: i64,
    ) -> Result<CompletedInstallation, LeadlineError>;

    async fn mark_reminder_sent(&self, id: &str) -> Result<Installation, LeadlineError>;

    /// Commissions, newest first.
    async fn list_commissions(&self) -> Result<Vec<Commission>, LeadlineError>;

    async fn commission_stats(&self) -> Result<CommissionStats, LeadlineError>;

    /// Returns `None` if the commission does not exist.
    async fn set_commission_status(
        &self,
        id: &str,
        status: CommissionStatus,
    ) -> Result<Option<Commission>, LeadlineError>;

    // --- Administration ---

    /// Deletes all messages, availability checks, and conversations. Customers
    /// are kept; their address fields are cleared when `clear_addresses` is set.
    async fn reset_conversations(&self, clear_addresses: bool)
    -> Result<ResetSummary, LeadlineError>;

    async fn stats(&self) -> Result<StoreStats, LeadlineError>;
}
