// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound SMS intake for the Leadline CRM.
//!
//! An inbound message is stored against its customer's open conversation,
//! then the transition table decides on a reply and a status change. The
//! decision step is pluggable ([`HeuristicDecider`] or [`LlmDecider`]).
//! Captured addresses can trigger a background availability lookup whose
//! result is texted back to the customer.
//!
//! [`InstallationService`] covers the sales side: booked installations,
//! reminder texts, and the commission a completed installation earns.

pub mod address;
pub mod availability;
pub mod classifier;
pub mod decider;
pub mod installations;
pub mod outbound;
pub mod replies;
pub mod transition;
pub mod workflow;

pub use address::parse_address;
pub use availability::{AvailabilityJob, AvailabilityRunner, HttpAvailabilityChecker};
pub use classifier::{Classification, ClassificationSource, IntentClassifier, fallback_classify};
pub use decider::{Decider, Decision, DecisionContext, HeuristicDecider, LlmDecider, build_decider};
pub use installations::{
    CommissionReport, InstallationService, ReminderReceipt, ScheduleInstallation,
};
pub use outbound::{Outbox, Recipient};
pub use transition::{Rule, TransitionPlan, is_opt_out};
pub use workflow::{InboundOutcome, IntakeService};
