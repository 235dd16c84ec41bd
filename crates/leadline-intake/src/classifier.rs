// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent classification: LLM-backed with a deterministic keyword fallback.
//!
//! [`IntentClassifier::classify`] never fails. Any provider error, empty
//! response, or malformed JSON degrades to [`fallback_classify`].

use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use leadline_core::types::{ChatMessage, ChatRole, CompletionRequest};
use leadline_core::{CompletionProvider, Intent, ParsedAddress};

/// Confidence reported by the fallback path and substituted when the model
/// omits one.
pub const FALLBACK_CONFIDENCE: f32 = 0.5;

const SYSTEM_PROMPT: &str = r#"You are an AI assistant for an AT&T Authorized Retailer. Your job is to:
1. Extract addresses from customer messages
2. Determine customer intent
3. Generate helpful, professional responses

When extracting addresses, return them in this format:
- Street address
- City
- State (2-letter code)
- ZIP code

Intents:
- address_provide: Customer provided or confirmed an address
- question: Customer is asking a question
- availability_check: Customer wants to check service availability
- general: General conversation
- opt_out: Customer wants to stop receiving messages

Respond in JSON format only:
{
  "extractedAddress": { "street": "", "city": "", "state": "", "zipCode": "", "fullAddress": "" },
  "intent": "",
  "suggestedResponse": "",
  "confidence": 0.0
}"#;

/// House number followed by words and a street-type word, e.g. "42 Oak Ave".
static STREET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+\s+[\w\s]+?\b(?:st|nd|rd|th|ave|blvd|ln|dr|ct|way|pl|hwy|highway)\b\.?")
        .expect("street pattern is valid")
});

static ZIP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{5}(?:-\d{4})?\b").expect("zip pattern is valid"));

/// Where a [`Classification`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    Model,
    Fallback,
}

/// Outcome of classifying one inbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub intent: Intent,
    pub source: ClassificationSource,
    /// Present only when all four address components were extracted.
    pub address: Option<ParsedAddress>,
    pub suggested_response: String,
    /// Model-reported, not calibrated.
    pub confidence: f32,
}

/// Fixed reply used for `intent` when no model response is available.
pub fn canned_response(intent: Intent) -> &'static str {
    match intent {
        Intent::AddressProvide => {
            "Thank you for providing your address! Let me check AT&T service availability for you. This will just take a moment."
        }
        Intent::AvailabilityCheck => {
            "I'd be happy to check AT&T service availability for you. Could you please provide your full address including street, city, state, and ZIP code?"
        }
        Intent::Question => {
            "Thank you for your question! One of our AT&T representatives will get back to you shortly with an answer."
        }
        Intent::OptOut => {
            "You've been unsubscribed from our messages. If you need assistance in the future, feel free to reach out. Have a great day!"
        }
        Intent::General => {
            "Thank you for reaching out to AT&T! How can we help you today? We can check service availability, answer questions about our plans, or connect you with a representative."
        }
    }
}

/// Keyword classifier. Rules are checked in order; the first hit wins.
pub fn fallback_intent(message: &str) -> Intent {
    let lower = message.to_lowercase();
    let has_address = STREET_PATTERN.is_match(message) || ZIP_PATTERN.is_match(message);

    if lower.contains("address") || has_address {
        Intent::AddressProvide
    } else if ["available", "service", "internet", "fiber"]
        .iter()
        .any(|k| lower.contains(k))
    {
        Intent::AvailabilityCheck
    } else if lower.contains('?') {
        Intent::Question
    } else if ["stop", "unsubscribe", "opt out"]
        .iter()
        .any(|k| lower.contains(k))
    {
        Intent::OptOut
    } else {
        Intent::General
    }
}

/// Deterministic classification with the canned reply and fixed confidence.
pub fn fallback_classify(message: &str) -> Classification {
    let intent = fallback_intent(message);
    Classification {
        intent,
        source: ClassificationSource::Fallback,
        address: None,
        suggested_response: canned_response(intent).to_string(),
        confidence: FALLBACK_CONFIDENCE,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelReply {
    #[serde(default)]
    extracted_address: Option<ModelAddress>,
    #[serde(default)]
    intent: Option<String>,
    #[serde(default)]
    suggested_response: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelAddress {
    #[serde(default)]
    street: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    zip_code: Option<String>,
    #[serde(default)]
    full_address: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ModelAddress {
    /// Accept only fully populated extractions.
    fn into_complete(self) -> Option<ParsedAddress> {
        let mut address = ParsedAddress::new(
            non_blank(self.street)?,
            non_blank(self.city)?,
            non_blank(self.state)?.to_uppercase(),
            non_blank(self.zip_code)?,
        );
        if let Some(full) = non_blank(self.full_address) {
            address.full_address = full;
        }
        Some(address)
    }
}

/// Strip a Markdown code fence some models wrap around JSON.
fn strip_fence(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Interpret the model's JSON, filling gaps from the fallback path.
fn interpret(content: &str, message: &str) -> Option<Classification> {
    let reply: ModelReply = match serde_json::from_str(strip_fence(content)) {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "classifier returned malformed JSON, using fallback");
            return None;
        }
    };

    let intent = reply
        .intent
        .as_deref()
        .and_then(|raw| Intent::from_str(raw.trim()).ok())
        .unwrap_or_else(|| fallback_intent(message));
    let confidence = reply
        .confidence
        .filter(|c| c.is_finite() && *c > 0.0)
        .unwrap_or(FALLBACK_CONFIDENCE);
    let suggested_response = non_blank(reply.suggested_response)
        .unwrap_or_else(|| canned_response(intent).to_string());

    Some(Classification {
        intent,
        source: ClassificationSource::Model,
        address: reply.extracted_address.and_then(ModelAddress::into_complete),
        suggested_response,
        confidence,
    })
}

/// Classifies messages through a completion provider when one is configured.
#[derive(Clone, Default)]
pub struct IntentClassifier {
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl IntentClassifier {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self { provider }
    }

    /// Classify `message` given prior turns (oldest first).
    pub async fn classify(&self, message: &str, history: &[ChatMessage]) -> Classification {
        let Some(provider) = &self.provider else {
            debug!("no completion provider configured, using fallback classifier");
            return fallback_classify(message);
        };

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::new(ChatRole::System, SYSTEM_PROMPT));
        messages.extend(history.iter().cloned());
        messages.push(ChatMessage::new(ChatRole::User, message));

        let request = CompletionRequest {
            messages,
            json_mode: true,
        };
        match provider.complete(request).await {
            Ok(response) => interpret(&response.content, message)
                .unwrap_or_else(|| fallback_classify(message)),
            Err(e) => {
                warn!(error = %e, "classifier request failed, using fallback");
                fallback_classify(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use leadline_core::types::CompletionResponse;
    use leadline_core::{AdapterType, HealthStatus, LeadlineError, PluginAdapter};
    use std::sync::Mutex;
    use tracing_test::traced_test;

    struct CannedProvider {
        reply: Result<String, String>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl CannedProvider {
        fn ok(content: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(content.into()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err("connection refused".into()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PluginAdapter for CannedProvider {
        fn name(&self) -> &str {
            "canned"
        }
        fn version(&self) -> semver::Version {
            semver::Version::new(0, 1, 0)
        }
        fn adapter_type(&self) -> AdapterType {
            AdapterType::Completion
        }
        async fn health_check(&self) -> Result<HealthStatus, LeadlineError> {
            Ok(HealthStatus::Healthy)
        }
        async fn shutdown(&self) -> Result<(), LeadlineError> {
            Ok(())
        }
    }

    #[async_trait]
    impl CompletionProvider for CannedProvider {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LeadlineError> {
            self.seen.lock().unwrap().push(request);
            match &self.reply {
                Ok(content) => Ok(CompletionResponse {
                    content: content.clone(),
                    model: "canned".into(),
                }),
                Err(message) => Err(LeadlineError::Provider {
                    message: message.clone(),
                    source: None,
                }),
            }
        }
    }

    #[tokio::test]
    async fn fiber_question_falls_back_to_availability_check() {
        let classifier = IntentClassifier::default();
        let result = classifier
            .classify("Is fiber available at my house?", &[])
            .await;
        assert_eq!(result.intent, Intent::AvailabilityCheck);
        assert_eq!(result.confidence, 0.5);
        assert!(!result.suggested_response.is_empty());
        assert!(result.address.is_none());
    }

    #[test]
    fn fallback_rules_apply_in_order() {
        assert_eq!(fallback_intent("my address is below"), Intent::AddressProvide);
        assert_eq!(fallback_intent("42 Oak Ave"), Intent::AddressProvide);
        assert_eq!(fallback_intent("zip is 75201"), Intent::AddressProvide);
        assert_eq!(fallback_intent("what internet do you have"), Intent::AvailabilityCheck);
        assert_eq!(fallback_intent("how much is it?"), Intent::Question);
        assert_eq!(fallback_intent("please STOP texting me"), Intent::OptOut);
        assert_eq!(fallback_intent("thanks"), Intent::General);
    }

    #[test]
    fn counts_without_street_suffix_are_not_addresses() {
        assert_eq!(fallback_intent("I have 2 kids"), Intent::General);
    }

    #[tokio::test]
    async fn model_reply_is_used() {
        let provider = CannedProvider::ok(
            r#"{"extractedAddress":{"street":"123 Main St","city":"Dallas","state":"tx","zipCode":"75201","fullAddress":""},
               "intent":"address_provide","suggestedResponse":"Checking now!","confidence":0.92}"#,
        );
        let classifier = IntentClassifier::new(Some(provider.clone()));
        let history = vec![ChatMessage::new(ChatRole::Assistant, "What's your address?")];
        let result = classifier
            .classify("123 Main St Dallas TX 75201", &history)
            .await;

        assert_eq!(result.intent, Intent::AddressProvide);
        assert_eq!(result.source, ClassificationSource::Model);
        assert_eq!(result.suggested_response, "Checking now!");
        assert!((result.confidence - 0.92).abs() < f32::EPSILON);
        let address = result.address.unwrap();
        assert_eq!(address.state, "TX");
        assert_eq!(address.full_address, "123 Main St, Dallas, TX 75201");

        let seen = provider.seen.lock().unwrap();
        let request = &seen[0];
        assert!(request.json_mode);
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages[1].role, ChatRole::Assistant);
        assert_eq!(request.messages[2].content, "123 Main St Dallas TX 75201");
    }

    #[tokio::test]
    async fn partial_model_address_is_dropped_and_zero_confidence_defaults() {
        let provider = CannedProvider::ok(
            r#"{"extractedAddress":{"street":"","city":"","state":"TX","zipCode":"75201"},
               "intent":"address_provide","suggestedResponse":"Need more","confidence":0}"#,
        );
        let result = IntentClassifier::new(Some(provider))
            .classify("TX 75201", &[])
            .await;
        assert!(result.address.is_none());
        assert_eq!(result.confidence, FALLBACK_CONFIDENCE);
    }

    #[tokio::test]
    async fn fenced_json_is_accepted() {
        let provider = CannedProvider::ok("```json\n{\"intent\":\"question\",\"confidence\":0.7}\n```");
        let result = IntentClassifier::new(Some(provider)).classify("hm", &[]).await;
        assert_eq!(result.intent, Intent::Question);
        assert_eq!(result.suggested_response, canned_response(Intent::Question));
    }

    #[tokio::test]
    #[traced_test]
    async fn malformed_json_falls_back() {
        let provider = CannedProvider::ok("Sure! The intent is general.");
        let result = IntentClassifier::new(Some(provider))
            .classify("Is fiber available?", &[])
            .await;
        assert_eq!(result.intent, Intent::AvailabilityCheck);
        assert_eq!(result.confidence, FALLBACK_CONFIDENCE);
        assert!(logs_contain("malformed JSON"));
    }

    #[tokio::test]
    async fn provider_error_falls_back() {
        let result = IntentClassifier::new(Some(CannedProvider::failing()))
            .classify("unsubscribe", &[])
            .await;
        assert_eq!(result.intent, Intent::OptOut);
        assert_eq!(result.source, ClassificationSource::Fallback);
        assert_eq!(result.confidence, FALLBACK_CONFIDENCE);
    }
}
