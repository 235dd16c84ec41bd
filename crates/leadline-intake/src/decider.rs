// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pluggable decision strategies feeding the transition table.
//!
//! Both strategies produce the same [`Decision`] shape, so the transition
//! logic in [`crate::transition`] does not know which one ran.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use leadline_config::model::DeciderKind;
use leadline_core::types::ChatMessage;
use leadline_core::{CompletionProvider, Intent, ParsedAddress};

use crate::address::parse_address;
use crate::classifier::{ClassificationSource, FALLBACK_CONFIDENCE, IntentClassifier, fallback_intent};

/// Input to a decision: the inbound text and the prior turns, oldest first.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub message: &'a str,
    pub history: &'a [ChatMessage],
}

/// What a decider concluded about one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub intent: Intent,
    /// A complete address, if one was found.
    pub address: Option<ParsedAddress>,
    /// Reply the decider suggests. `None` means use the configured text.
    pub reply: Option<String>,
    /// True only when the customer asked to stop in words a keyword match
    /// would not catch. Closes the conversation.
    pub opt_out: bool,
    pub confidence: f32,
}

#[async_trait]
pub trait Decider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether [`DecisionContext::history`] is read. Lets the workflow skip
    /// the history query.
    fn uses_history(&self) -> bool {
        false
    }

    /// Never fails; degraded paths still yield a decision.
    async fn decide(&self, ctx: DecisionContext<'_>) -> Decision;
}

/// Regex address parser plus keyword intent. No network access.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicDecider;

#[async_trait]
impl Decider for HeuristicDecider {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn decide(&self, ctx: DecisionContext<'_>) -> Decision {
        let address = parse_address(ctx.message);
        let intent = if address.is_some() {
            Intent::AddressProvide
        } else {
            fallback_intent(ctx.message)
        };
        Decision {
            intent,
            address,
            reply: None,
            opt_out: false,
            confidence: FALLBACK_CONFIDENCE,
        }
    }
}

/// LLM classifier with the keyword classifier as fallback.
///
/// When the model extracts no complete address the heuristic parser gets a
/// second look at the message.
#[derive(Clone)]
pub struct LlmDecider {
    classifier: IntentClassifier,
}

impl LlmDecider {
    pub fn new(classifier: IntentClassifier) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl Decider for LlmDecider {
    fn name(&self) -> &str {
        "llm"
    }

    fn uses_history(&self) -> bool {
        true
    }

    async fn decide(&self, ctx: DecisionContext<'_>) -> Decision {
        let classification = self.classifier.classify(ctx.message, ctx.history).await;
        debug!(
            intent = %classification.intent,
            confidence = classification.confidence,
            source = ?classification.source,
            "message classified"
        );
        let address = classification
            .address
            .or_else(|| parse_address(ctx.message));
        Decision {
            intent: classification.intent,
            address,
            reply: Some(classification.suggested_response),
            opt_out: classification.intent == Intent::OptOut
                && classification.source == ClassificationSource::Model,
            confidence: classification.confidence,
        }
    }
}

/// Build the decider selected by `intake.decider`.
pub fn build_decider(
    kind: DeciderKind,
    provider: Option<Arc<dyn CompletionProvider>>,
) -> Arc<dyn Decider> {
    match kind {
        DeciderKind::Heuristic => Arc::new(HeuristicDecider),
        DeciderKind::Llm => Arc::new(LlmDecider::new(IntentClassifier::new(provider))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(message: &str) -> DecisionContext<'_> {
        DecisionContext {
            message,
            history: &[],
        }
    }

    #[tokio::test]
    async fn heuristic_finds_address() {
        let decision = HeuristicDecider
            .decide(ctx("123 Main St Dallas TX 75201"))
            .await;
        assert_eq!(decision.intent, Intent::AddressProvide);
        assert_eq!(decision.address.unwrap().city, "Dallas");
        assert!(decision.reply.is_none());
    }

    #[tokio::test]
    async fn heuristic_keyword_stop_does_not_opt_out() {
        let decision = HeuristicDecider
            .decide(ctx("please don't stop the install"))
            .await;
        assert_eq!(decision.intent, Intent::OptOut);
        assert!(!decision.opt_out);
    }

    #[tokio::test]
    async fn llm_without_provider_uses_fallback_reply() {
        let decider = LlmDecider::new(IntentClassifier::default());
        assert!(decider.uses_history());

        let decision = decider.decide(ctx("Is fiber available at my house?")).await;
        assert_eq!(decision.intent, Intent::AvailabilityCheck);
        assert!(decision.reply.is_some_and(|r| !r.is_empty()));
        assert!(!decision.opt_out);
    }

    #[tokio::test]
    async fn llm_fallback_still_parses_address() {
        let decider = LlmDecider::new(IntentClassifier::default());
        let decision = decider
            .decide(ctx("456 Oak Ave, Plano, TX 75024"))
            .await;
        assert_eq!(decision.address.unwrap().street, "456 Oak Ave");
    }

    #[test]
    fn build_selects_by_kind() {
        assert_eq!(build_decider(DeciderKind::Heuristic, None).name(), "heuristic");
        assert_eq!(build_decider(DeciderKind::Llm, None).name(), "llm");
    }
}
