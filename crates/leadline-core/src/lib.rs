// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Leadline SMS intake CRM.
//!
//! This crate provides the domain model (customers, conversations, messages,
//! availability checks), the shared error type, and the adapter traits that
//! every collaborator implements: storage, SMS gateway, completion provider,
//! availability checker, and notification sink.

pub mod error;
pub mod phone;
pub mod traits;
pub mod types;

pub use error::LeadlineError;
pub use phone::normalize_phone;
pub use types::{
    AdapterType, AutomatedStatus, AvailabilityCheck, AvailabilityResult, CheckStatus, Commission,
    CommissionStatus, Conversation, ConversationStatus, Customer, DeliveryStatus, Direction,
    HealthStatus, InboundSms, Installation, InstallationStatus, Intent, Message, ParsedAddress,
};

pub use traits::{
    AvailabilityChecker, CompletionProvider, Notifier, PluginAdapter, SmsGateway, StorageAdapter,
};
