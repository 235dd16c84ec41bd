// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and the intake pipeline.
//!
//! Timestamps are ISO 8601 strings with millisecond precision, matching what
//! SQLite `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')` produces.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Sms,
    Completion,
    Availability,
    Notifier,
}

// --- Conversation status vocabulary ---

/// Every status a conversation can hold.
///
/// The first five are reachable by the automated webhook pipeline (see
/// [`AutomatedStatus`]); the remaining six are pipeline substates that only
/// an agent can set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConversationStatus {
    New,
    AddressRequested,
    Checking,
    Responded,
    Closed,
    NeedToCall,
    CallScheduled,
    CalledNoAnswer,
    NotInterested,
    FollowUp,
    PendingInstall,
}

impl ConversationStatus {
    /// All statuses, automated subset first.
    pub const ALL: [ConversationStatus; 11] = [
        ConversationStatus::New,
        ConversationStatus::AddressRequested,
        ConversationStatus::Checking,
        ConversationStatus::Responded,
        ConversationStatus::Closed,
        ConversationStatus::NeedToCall,
        ConversationStatus::CallScheduled,
        ConversationStatus::CalledNoAnswer,
        ConversationStatus::NotInterested,
        ConversationStatus::FollowUp,
        ConversationStatus::PendingInstall,
    ];

    /// Anything other than CLOSED.
    pub fn is_open(self) -> bool {
        self != ConversationStatus::Closed
    }

    /// True for statuses the webhook pipeline may set.
    pub fn is_automated(self) -> bool {
        AutomatedStatus::try_from(self).is_ok()
    }

    /// True for agent-only triage statuses.
    pub fn is_manual(self) -> bool {
        !self.is_automated()
    }

    /// True while the conversation is still in the address-collection phase.
    pub fn is_collecting_address(self) -> bool {
        matches!(
            self,
            ConversationStatus::New | ConversationStatus::AddressRequested
        )
    }
}

/// The subset of [`ConversationStatus`] the automated pipeline may propose.
///
/// Transition planning returns this type, so a manual-only status can never
/// be produced by the webhook path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AutomatedStatus {
    New,
    AddressRequested,
    Checking,
    Responded,
    Closed,
}

impl From<AutomatedStatus> for ConversationStatus {
    fn from(status: AutomatedStatus) -> Self {
        match status {
            AutomatedStatus::New => ConversationStatus::New,
            AutomatedStatus::AddressRequested => ConversationStatus::AddressRequested,
            AutomatedStatus::Checking => ConversationStatus::Checking,
            AutomatedStatus::Responded => ConversationStatus::Responded,
            AutomatedStatus::Closed => ConversationStatus::Closed,
        }
    }
}

impl TryFrom<ConversationStatus> for AutomatedStatus {
    type Error = ConversationStatus;

    fn try_from(status: ConversationStatus) -> Result<Self, Self::Error> {
        match status {
            ConversationStatus::New => Ok(AutomatedStatus::New),
            ConversationStatus::AddressRequested => Ok(AutomatedStatus::AddressRequested),
            ConversationStatus::Checking => Ok(AutomatedStatus::Checking),
            ConversationStatus::Responded => Ok(AutomatedStatus::Responded),
            ConversationStatus::Closed => Ok(AutomatedStatus::Closed),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for AutomatedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        ConversationStatus::from(*self).fmt(f)
    }
}

/// Message direction relative to the business.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Delivery state recorded on a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    /// Inbound message accepted from the provider.
    Received,
    /// Outbound message accepted by the provider.
    Sent,
    /// Outbound send failed after all retry attempts.
    Failed,
}

/// Result status of an availability lookup.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Pending,
    FiberAvailable,
    InternetAirAvailable,
    NotAvailable,
    Error,
}

/// Customer intent tag produced by the classifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    AddressProvide,
    AvailabilityCheck,
    OptOut,
    Question,
    General,
}

// --- Records ---

/// A complete postal address extracted from free text.
///
/// All four components are always present; partial extractions are not
/// represented by this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub full_address: String,
}

impl ParsedAddress {
    /// Builds an address from its parts, formatting `full_address` as
    /// `"{street}, {city}, {state} {zip}"`.
    pub fn new(street: String, city: String, state: String, zip_code: String) -> Self {
        let full_address = format!("{street}, {city}, {state} {zip_code}");
        Self {
            street,
            city,
            state,
            zip_code,
            full_address,
        }
    }
}

/// A phone-number-keyed customer identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    /// E.164 phone number, unique across customers.
    pub phone_number: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Customer {
    /// True when street, city, state, and ZIP are all stored and non-blank.
    pub fn has_complete_address(&self) -> bool {
        [&self.address, &self.city, &self.state, &self.zip_code]
            .iter()
            .all(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }

    /// The stored address, if complete.
    pub fn stored_address(&self) -> Option<ParsedAddress> {
        if !self.has_complete_address() {
            return None;
        }
        Some(ParsedAddress::new(
            self.address.clone().unwrap_or_default(),
            self.city.clone().unwrap_or_default(),
            self.state.clone().unwrap_or_default(),
            self.zip_code.clone().unwrap_or_default(),
        ))
    }

    /// Name for display, falling back to the phone number.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.phone_number)
    }
}

/// Agent-editable customer profile fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
}

/// A bounded interaction thread between one customer and the business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub customer_id: String,
    pub status: ConversationStatus,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub scheduled_call_at: Option<String>,
    pub last_message_at: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Agent-editable conversation fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationPatch {
    pub status: Option<ConversationStatus>,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    pub tags: Option<Vec<String>>,
    pub scheduled_call_at: Option<String>,
}

/// Conversation list row joined with its customer and latest message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    pub phone_number: String,
    pub customer_name: Option<String>,
    pub last_message: Option<String>,
}

/// An immutable record of one SMS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub customer_id: String,
    pub body: String,
    pub direction: Direction,
    pub status: DeliveryStatus,
    pub provider: String,
    pub external_id: Option<String>,
    pub created_at: String,
}

/// Fields for a message about to be persisted. Id and timestamp are assigned on insert.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub conversation_id: String,
    pub customer_id: String,
    pub body: String,
    pub direction: Direction,
    pub status: DeliveryStatus,
    pub provider: String,
    pub external_id: Option<String>,
}

/// What the availability collaborator reports for one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub status: CheckStatus,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub fiber_speeds: Vec<String>,
    #[serde(default)]
    pub internet_air: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AvailabilityResult {
    /// An ERROR result carrying the failure description as its note.
    pub fn error(notes: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Error,
            services: Vec::new(),
            fiber_speeds: Vec::new(),
            internet_air: false,
            notes: Some(notes.into()),
        }
    }
}

/// One service-lookup attempt for an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityCheck {
    pub id: String,
    pub customer_id: String,
    pub conversation_id: Option<String>,
    pub address: String,
    pub status: CheckStatus,
    pub services: Vec<String>,
    pub fiber_speeds: Vec<String>,
    pub internet_air: bool,
    pub notes: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

/// Row counts removed by an administrative reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSummary {
    pub messages: usize,
    pub conversations: usize,
    pub availability_checks: usize,
    pub addresses_cleared: usize,
}

/// Table sizes for the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub customers: i64,
    pub conversations: i64,
    pub open_conversations: i64,
    pub messages: i64,
    pub availability_checks: i64,
}

/// An inbound SMS about to be filed on its customer's open conversation.
#[derive(Debug, Clone)]
pub struct NewInbound {
    pub customer_id: String,
    pub body: String,
    pub provider: String,
    pub external_id: Option<String>,
}

/// How an inbound SMS was filed.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundRecord {
    /// `(provider, external_id)` was already stored. Nothing was written.
    Duplicate { conversation_id: String },
    Stored {
        conversation: Conversation,
        /// True when filing the message opened a new conversation.
        created: bool,
        message: Message,
    },
}

// --- Installations and commissions ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallationStatus {
    Scheduled,
    Completed,
    Cancelled,
    Rescheduled,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionStatus {
    Pending,
    Earned,
    Paid,
    Chargeback,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommissionKind {
    Sale,
}

/// A scheduled service installation for a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installation {
    pub id: String,
    pub customer_id: String,
    pub install_date: String,
    pub status: InstallationStatus,
    pub reminder_sent: bool,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Installation list row joined with its customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallationSummary {
    #[serde(flatten)]
    pub installation: Installation,
    pub phone_number: String,
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewInstallation {
    pub customer_id: String,
    /// ISO 8601, already normalized.
    pub install_date: String,
    pub notes: Option<String>,
}

/// Agent-editable installation fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallationPatch {
    pub status: Option<InstallationStatus>,
    pub install_date: Option<String>,
    pub notes: Option<String>,
}

/// Pay owed to the sales agent for one sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commission {
    pub id: String,
    pub customer_id: String,
    pub installation_id: Option<String>,
    pub customer_name: String,
    /// Whole dollars.
    pub amount: i64,
    pub status: CommissionStatus,
    #[serde(rename = "type")]
    pub kind: CommissionKind,
    pub install_date: String,
    pub created_at: String,
    pub updated_at: String,
}

/// An installation marked COMPLETED together with the commission it earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedInstallation {
    pub installation: Installation,
    pub commission: Commission,
}

/// Commission counts per status and dollar totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionStats {
    pub total: i64,
    pub pending: i64,
    pub earned: i64,
    pub paid: i64,
    pub chargeback: i64,
    /// EARNED plus PAID.
    pub total_earned: i64,
    pub total_paid: i64,
    pub pending_amount: i64,
    /// EARNED plus PAID created in the current calendar month (UTC).
    pub this_month_amount: i64,
    pub last_month_amount: i64,
}

// --- SMS gateway types ---

/// An inbound SMS decoded from a provider webhook.
///
/// Fields are passed through as received; the intake pipeline validates
/// that `from` and `body` are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundSms {
    /// Provider tag stored on the message (`twilio`, `telnyx`, `sms`).
    pub provider: String,
    pub from: String,
    pub to: Option<String>,
    pub body: String,
    /// Provider-assigned message id, used for deduplication.
    pub external_id: Option<String>,
}


/// A text message to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundSms {
    /// E.164 destination.
    pub to: String,
    pub body: String,
}

/// Provider acknowledgment for an accepted outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub provider: String,
    pub external_id: String,
}

/// Capabilities reported by an SMS gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmsCapabilities {
    /// The carrier/provider handles STOP keywords itself and sends its own
    /// confirmation, so the application must not send another.
    pub native_opt_out: bool,
    /// Longest body the provider accepts, if limited.
    pub max_body_len: Option<usize>,
}

// --- Completion types ---

/// Role of a chat turn sent to a completion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A chat completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// Ask the endpoint for a JSON object response.
    pub json_mode: bool,
}

/// Text returned by a completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
}

// --- Notification types ---

/// Payload for the new-inbound-message alert.
#[derive(Debug, Clone)]
pub struct InboundNotification {
    pub customer_id: String,
    pub conversation_id: String,
    pub phone_number: String,
    pub customer_name: Option<String>,
    pub body: String,
}
