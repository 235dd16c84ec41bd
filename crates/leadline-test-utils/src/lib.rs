// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Leadline integration tests.
//!
//! Mock collaborators plus a harness that wires them to a real SQLite
//! database in a temp directory, so the intake workflow can be driven
//! without any network access.
//!
//! # Components
//!
//! - [`MockSmsGateway`] - captures outbound texts, can be told to fail
//! - [`MockCompletionProvider`] - queued completion responses
//! - [`MockAvailabilityChecker`] - fixed or failing availability results
//! - [`MockNotifier`] - captures inbound notifications
//! - [`TestHarness`] - all of the above around an [`IntakeService`](leadline_intake::IntakeService)

pub mod harness;
pub mod mock_availability;
pub mod mock_completion;
pub mod mock_notifier;
pub mod mock_sms;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_availability::MockAvailabilityChecker;
pub use mock_completion::MockCompletionProvider;
pub use mock_notifier::MockNotifier;
pub use mock_sms::MockSmsGateway;
