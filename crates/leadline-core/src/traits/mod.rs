// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod availability;
pub mod completion;
pub mod notifier;
pub mod sms;
pub mod storage;

pub use adapter::PluginAdapter;
pub use availability::AvailabilityChecker;
pub use completion::CompletionProvider;
pub use notifier::Notifier;
pub use sms::SmsGateway;
pub use storage::StorageAdapter;
