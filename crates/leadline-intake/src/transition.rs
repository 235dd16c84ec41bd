// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The automated conversation transition table.
//!
//! Planning is pure: given the conversation's state and (when needed) a
//! [`Decision`], it returns a [`TransitionPlan`] for the workflow to execute.
//! Rules are evaluated in this order:
//!
//! 1. Whole-message opt-out (or a model-detected opt-out): CLOSED.
//! 2. Newly created conversation: qualification reply, ADDRESS_REQUESTED.
//!    Address handling waits for the next message.
//! 3. Customer already has a complete address: nothing.
//! 4. Message carries a complete address: store it, CHECKING, acknowledge.
//! 5. Still collecting an address: re-prompt, ADDRESS_REQUESTED.
//! 6. Otherwise: the decider's reply, if any, with no status change.
//!
//! Targets are [`AutomatedStatus`], so this module cannot produce a
//! manual-only status.

use std::sync::LazyLock;

use regex::Regex;

use leadline_config::model::RepliesConfig;
use leadline_core::{AutomatedStatus, ConversationStatus, ParsedAddress};

use crate::decider::Decision;

static OPT_OUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:stop|unsubscribe|cancel|end|quit)\s*$")
        .expect("opt-out pattern is valid")
});

/// True when the whole message is an opt-out keyword.
pub fn is_opt_out(body: &str) -> bool {
    OPT_OUT.is_match(body)
}

/// When the status change in a plan is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// Before the reply is sent, regardless of delivery.
    Always,
    /// Only once the reply has been accepted by the gateway.
    OnDelivery,
}

/// Which rule produced a plan. Logged and returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Rule {
    OptOut,
    NewConversation,
    AddressOnFile,
    AddressCaptured,
    AddressReprompt,
    Continue,
}

/// Side effects to carry out for one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    pub rule: Rule,
    pub target: Option<AutomatedStatus>,
    pub reply: Option<String>,
    pub capture_address: Option<ParsedAddress>,
    pub trigger_availability: bool,
    pub commit: Commit,
}

impl TransitionPlan {
    fn new(rule: Rule) -> Self {
        Self {
            rule,
            target: None,
            reply: None,
            capture_address: None,
            trigger_availability: false,
            commit: Commit::Always,
        }
    }
}

/// Conversation state read before planning.
#[derive(Debug, Clone, Copy)]
pub struct TransitionInput<'a> {
    pub status: ConversationStatus,
    /// The conversation was created by this inbound message.
    pub is_new: bool,
    pub has_stored_address: bool,
    pub body: &'a str,
    /// The SMS provider answers STOP keywords on its own.
    pub native_opt_out: bool,
}

/// Rules that need no decision. `None` means call the decider and then
/// [`plan_with_decision`].
pub fn plan_without_decision(
    input: &TransitionInput<'_>,
    replies: &RepliesConfig,
) -> Option<TransitionPlan> {
    if is_opt_out(input.body) {
        let mut plan = TransitionPlan::new(Rule::OptOut);
        plan.target = Some(AutomatedStatus::Closed);
        plan.reply = (!input.native_opt_out).then(|| replies.opt_out.clone());
        return Some(plan);
    }

    if input.is_new {
        let mut plan = TransitionPlan::new(Rule::NewConversation);
        plan.target = Some(AutomatedStatus::AddressRequested);
        plan.reply = Some(replies.qualification.clone());
        plan.commit = Commit::OnDelivery;
        return Some(plan);
    }

    if input.has_stored_address {
        return Some(TransitionPlan::new(Rule::AddressOnFile));
    }

    None
}

/// Rules 4 to 6, plus the model-detected opt-out.
///
/// `availability_enabled` controls whether a captured address triggers a
/// lookup.
pub fn plan_with_decision(
    input: &TransitionInput<'_>,
    decision: Decision,
    replies: &RepliesConfig,
    availability_enabled: bool,
) -> TransitionPlan {
    if decision.opt_out {
        // The carrier only answers exact keywords, so confirm this one ourselves.
        let mut plan = TransitionPlan::new(Rule::OptOut);
        plan.target = Some(AutomatedStatus::Closed);
        plan.reply = Some(replies.opt_out.clone());
        return plan;
    }

    if let Some(address) = decision.address {
        let mut plan = TransitionPlan::new(Rule::AddressCaptured);
        plan.target = AutomatedStatus::try_from(input.status)
            .ok()
            .filter(|s| *s != AutomatedStatus::Checking)
            .map(|_| AutomatedStatus::Checking);
        plan.reply = Some(replies.address_received.clone());
        plan.capture_address = Some(address);
        plan.trigger_availability = availability_enabled;
        return plan;
    }

    if input.status.is_collecting_address() {
        let mut plan = TransitionPlan::new(Rule::AddressReprompt);
        plan.target = Some(AutomatedStatus::AddressRequested);
        plan.reply = Some(
            decision
                .reply
                .unwrap_or_else(|| replies.address_reprompt.clone()),
        );
        plan.commit = Commit::OnDelivery;
        return plan;
    }

    let mut plan = TransitionPlan::new(Rule::Continue);
    plan.reply = decision.reply;
    plan
}
