// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound message orchestration and the agent-initiated actions that share
//! its side effects.
//!
//! Persistence steps are awaited in order; notification and availability
//! lookups run on tracked background tasks so the webhook can be
//! acknowledged without waiting for them.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use leadline_config::model::{IntakeConfig, RepliesConfig};
use leadline_core::types::{
    ChatMessage, ChatRole, InboundNotification, InboundRecord, NewInbound,
};
use leadline_core::{
    AvailabilityCheck, AvailabilityChecker, Conversation, ConversationStatus, Customer, Direction,
    InboundSms, LeadlineError, Message, Notifier, SmsGateway, StorageAdapter, normalize_phone,
};
use leadline_sms::RetryPolicy;

use crate::availability::{AvailabilityJob, AvailabilityRunner};
use crate::decider::{Decider, DecisionContext};
use crate::outbound::{Outbox, Recipient};
use crate::transition::{
    Commit, Rule, TransitionInput, TransitionPlan, plan_with_decision, plan_without_decision,
};

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InboundOutcome {
    /// Same provider message id seen before; nothing was done.
    Duplicate { conversation_id: String },
    Processed {
        customer_id: String,
        conversation_id: String,
        message_id: String,
        #[serde(serialize_with = "serialize_rule")]
        rule: Rule,
        status: ConversationStatus,
        replied: bool,
    },
}

fn serialize_rule<S: serde::Serializer>(rule: &Rule, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(rule)
}

/// The intake workflow. Clones share state.
#[derive(Clone)]
pub struct IntakeService {
    storage: Arc<dyn StorageAdapter>,
    outbox: Outbox,
    decider: Arc<dyn Decider>,
    notifier: Option<Arc<dyn Notifier>>,
    availability: Option<AvailabilityRunner>,
    replies: Arc<RepliesConfig>,
    auto_availability: bool,
    history_limit: usize,
    tasks: TaskTracker,
}

impl IntakeService {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        gateway: Arc<dyn SmsGateway>,
        decider: Arc<dyn Decider>,
        config: &IntakeConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            outbox: Outbox::new(storage.clone(), gateway, retry),
            storage,
            decider,
            notifier: None,
            availability: None,
            replies: Arc::new(config.replies.clone()),
            auto_availability: config.availability_checks,
            history_limit: config.history_limit,
            tasks: TaskTracker::new(),
        }
    }

    /// Alert staff about each accepted inbound message.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Enable availability lookups. Automatic dispatch after an address is
    /// captured still follows `intake.availability_checks`.
    pub fn with_availability_checker(mut self, checker: Arc<dyn AvailabilityChecker>) -> Self {
        self.availability = Some(AvailabilityRunner {
            storage: self.storage.clone(),
            checker,
            outbox: self.outbox.clone(),
            replies: self.replies.clone(),
        });
        self
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }

    /// The reply path shared with other agent-facing services.
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn decider_name(&self) -> &str {
        self.decider.name()
    }

    /// Process one inbound SMS end to end.
    ///
    /// Returns `Validation` for a payload without sender or body, before
    /// anything is written.
    pub async fn handle_inbound(&self, sms: InboundSms) -> Result<InboundOutcome, LeadlineError> {
        let body = sms.body.trim();
        if sms.from.trim().is_empty() {
            return Err(LeadlineError::Validation("inbound message has no sender".into()));
        }
        if body.is_empty() {
            return Err(LeadlineError::Validation("inbound message has no body".into()));
        }

        let phone = normalize_phone(&sms.from)?;
        let customer = self.storage.upsert_customer(&phone).await?;
        let inbound = NewInbound {
            customer_id: customer.id.clone(),
            body: body.to_string(),
            provider: sms.provider.clone(),
            external_id: sms.external_id.clone().filter(|id| !id.is_empty()),
        };
        let (conversation, is_new, message) = match self.storage.record_inbound(&inbound).await? {
            InboundRecord::Stored {
                conversation,
                created,
                message,
            } => (conversation, created, message),
            InboundRecord::Duplicate { conversation_id } => {
                info!(
                    provider = %sms.provider,
                    external_id = sms.external_id.as_deref().unwrap_or_default(),
                    %conversation_id,
                    "duplicate inbound delivery ignored"
                );
                return Ok(InboundOutcome::Duplicate { conversation_id });
            }
        };
        debug!(
            customer_id = %customer.id,
            conversation_id = %conversation.id,
            is_new,
            "conversation resolved"
        );

        self.spawn_notification(&customer, &conversation, &message);
        self.storage.touch_conversation(&conversation.id).await?;

        let input = TransitionInput {
            status: conversation.status,
            is_new,
            has_stored_address: customer.has_complete_address(),
            body,
            native_opt_out: self.outbox.capabilities().native_opt_out,
        };
        let plan = match plan_without_decision(&input, &self.replies) {
            Some(plan) => plan,
            None => {
                let history = self.history(&conversation.id, &message.id).await?;
                let decision = self
                    .decider
                    .decide(DecisionContext {
                        message: body,
                        history: &history,
                    })
                    .await;
                debug!(
                    decider = self.decider.name(),
                    intent = %decision.intent,
                    has_address = decision.address.is_some(),
                    "decision made"
                );
                plan_with_decision(
                    &input,
                    decision,
                    &self.replies,
                    self.auto_availability && self.availability.is_some(),
                )
            }
        };
        debug!(conversation_id = %conversation.id, rule = %plan.rule, "transition planned");

        let rule = plan.rule;
        let (status, replied) = self.execute(&customer, &conversation, plan).await?;
        Ok(InboundOutcome::Processed {
            customer_id: customer.id,
            conversation_id: conversation.id,
            message_id: message.id,
            rule,
            status,
            replied,
        })
    }

    /// Run [`Self::handle_inbound`] on a tracked task, so a caller with a
    /// deadline can stop waiting while processing continues and shutdown
    /// still drains it.
    pub fn spawn_inbound(
        &self,
        sms: InboundSms,
    ) -> JoinHandle<Result<InboundOutcome, LeadlineError>> {
        let service = self.clone();
        self.tasks
            .spawn(async move { service.handle_inbound(sms).await })
    }

    /// Apply a plan. Returns the resulting status and whether a reply was
    /// delivered.
    async fn execute(
        &self,
        customer: &Customer,
        conversation: &Conversation,
        plan: TransitionPlan,
    ) -> Result<(ConversationStatus, bool), LeadlineError> {
        let mut status = conversation.status;

        if let Some(address) = &plan.capture_address {
            self.storage
                .set_customer_address(&customer.id, address)
                .await?;
            info!(customer_id = %customer.id, address = %address.full_address, "address captured");
        }

        if plan.commit == Commit::Always
            && let Some(target) = plan.target
        {
            status = self.transition(&conversation.id, status, target.into()).await?;
        }

        let mut replied = false;
        if let Some(reply) = plan.reply {
            let recipient = Recipient {
                conversation_id: &conversation.id,
                customer_id: &customer.id,
                phone_number: &customer.phone_number,
            };
            match self.outbox.deliver(recipient, reply).await {
                Ok(_) => {
                    replied = true;
                    self.storage.touch_conversation(&conversation.id).await?;
                }
                Err(e) => {
                    warn!(conversation_id = %conversation.id, rule = %plan.rule, error = %e, "auto-reply not delivered");
                }
            }
        }

        if plan.commit == Commit::OnDelivery
            && replied
            && let Some(target) = plan.target
        {
            status = self.transition(&conversation.id, status, target.into()).await?;
        }

        if plan.trigger_availability
            && let (Some(runner), Some(address)) = (&self.availability, plan.capture_address)
        {
            let job = AvailabilityJob {
                customer_id: customer.id.clone(),
                conversation_id: Some(conversation.id.clone()),
                phone_number: customer.phone_number.clone(),
                address,
            };
            let runner = runner.clone();
            self.tasks.spawn(async move {
                if let Err(e) = runner.run(job).await {
                    warn!(error = %e, "availability job failed");
                }
            });
        }

        Ok((status, replied))
    }

    async fn transition(
        &self,
        conversation_id: &str,
        from: ConversationStatus,
        to: ConversationStatus,
    ) -> Result<ConversationStatus, LeadlineError> {
        if from != to {
            self.storage.set_conversation_status(conversation_id, to).await?;
            info!(conversation_id, %from, %to, "conversation status changed");
        }
        Ok(to)
    }

    /// Prior turns for the classifier, excluding the message being decided.
    async fn history(
        &self,
        conversation_id: &str,
        current_message_id: &str,
    ) -> Result<Vec<ChatMessage>, LeadlineError> {
        if !self.decider.uses_history() || self.history_limit == 0 {
            return Ok(Vec::new());
        }
        let messages = self
            .storage
            .list_messages(conversation_id, Some(self.history_limit + 1))
            .await?;
        Ok(prior_turns(messages, current_message_id, self.history_limit))
    }

    fn spawn_notification(&self, customer: &Customer, conversation: &Conversation, message: &Message) {
        let Some(notifier) = self.notifier.clone() else {
            return;
        };
        let notification = InboundNotification {
            customer_id: customer.id.clone(),
            conversation_id: conversation.id.clone(),
            phone_number: customer.phone_number.clone(),
            customer_name: customer.name.clone(),
            body: message.body.clone(),
        };
        self.tasks.spawn(async move {
            if let Err(e) = notifier.notify_inbound(&notification).await {
                warn!(conversation_id = %notification.conversation_id, error = %e, "inbound notification failed");
            }
        });
    }

    /// Send an agent-written message on a conversation.
    ///
    /// A delivered message moves the conversation to RESPONDED. A failed
    /// send is still recorded (as FAILED) and the error returned.
    pub async fn send_agent_message(
        &self,
        conversation_id: &str,
        body: &str,
    ) -> Result<Message, LeadlineError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(LeadlineError::Validation("message body is empty".into()));
        }
        let conversation = self
            .storage
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| LeadlineError::NotFound {
                entity: "conversation",
                id: conversation_id.to_string(),
            })?;
        if !conversation.status.is_open() {
            return Err(LeadlineError::Validation(
                "conversation is closed; the customer opted out or the thread ended".into(),
            ));
        }
        let customer = self.customer(&conversation.customer_id).await?;

        let recipient = Recipient {
            conversation_id: &conversation.id,
            customer_id: &customer.id,
            phone_number: &customer.phone_number,
        };
        let message = self.outbox.deliver(recipient, body.to_string()).await?;
        self.storage.touch_conversation(&conversation.id).await?;
        self.transition(&conversation.id, conversation.status, ConversationStatus::Responded)
            .await?;
        Ok(message)
    }

    /// Run an availability lookup for the customer's stored address and wait
    /// for it. The result reply goes to the customer's open conversation,
    /// if any.
    pub async fn request_availability_check(
        &self,
        customer_id: &str,
    ) -> Result<AvailabilityCheck, LeadlineError> {
        let Some(runner) = &self.availability else {
            return Err(LeadlineError::Validation(
                "availability checks are not configured".into(),
            ));
        };
        let customer = self.customer(customer_id).await?;
        let address = customer.stored_address().ok_or_else(|| {
            LeadlineError::Validation("customer has no complete address on file".into())
        })?;
        let conversation_id = self
            .storage
            .list_customer_conversations(&customer.id)
            .await?
            .into_iter()
            .find(|c| c.status.is_open())
            .map(|c| c.id);

        runner
            .run(AvailabilityJob {
                customer_id: customer.id.clone(),
                conversation_id,
                phone_number: customer.phone_number.clone(),
                address,
            })
            .await
    }

    async fn customer(&self, id: &str) -> Result<Customer, LeadlineError> {
        self.storage
            .get_customer(id)
            .await?
            .ok_or_else(|| LeadlineError::NotFound {
                entity: "customer",
                id: id.to_string(),
            })
    }

    /// Wait for all background work spawned so far.
    pub async fn wait_idle(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    /// Wait up to `timeout` for background work during shutdown.
    pub async fn drain(&self, timeout: Duration) {
        self.tasks.close();
        if tokio::time::timeout(timeout, self.tasks.wait()).await.is_err() {
            warn!(pending = self.tasks.len(), "background tasks still running at shutdown");
        }
    }
}

/// The latest `limit` messages other than `current_id`, oldest first, as
/// chat turns. `messages` must be in creation order.
fn prior_turns(messages: Vec<Message>, current_id: &str, limit: usize) -> Vec<ChatMessage> {
    let mut turns: Vec<ChatMessage> = messages
        .into_iter()
        .filter(|m| m.id != current_id)
        .map(|m| {
            let role = match m.direction {
                Direction::Inbound => ChatRole::User,
                Direction::Outbound => ChatRole::Assistant,
            };
            ChatMessage::new(role, m.body)
        })
        .collect();
    if turns.len() > limit {
        turns.drain(..turns.len() - limit);
    }
    turns
}
