// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end intake tests: inbound SMS in, storage and outbound SMS out.

use leadline_config::model::{IntakeConfig, RepliesConfig};
use leadline_core::types::ChatRole;
use leadline_core::{
    AvailabilityResult, CheckStatus, ConversationStatus, DeliveryStatus, Direction, Intent,
    LeadlineError, StorageAdapter,
};
use leadline_intake::{InboundOutcome, Rule, fallback_classify, parse_address};
use leadline_test_utils::{MockAvailabilityChecker, MockNotifier, TestHarness};

const PHONE: &str = "+12145550100";

fn processed(outcome: InboundOutcome) -> (String, Rule, ConversationStatus, bool) {
    match outcome {
        InboundOutcome::Processed {
            conversation_id,
            rule,
            status,
            replied,
            ..
        } => (conversation_id, rule, status, replied),
        other => panic!("expected a processed message, got {other:?}"),
    }
}

#[tokio::test]
async fn phone_representations_resolve_to_one_customer() {
    let harness = TestHarness::new().await.unwrap();
    let mut conversations = Vec::new();
    for from in [
        "(214) 555-0100",
        "214-555-0100",
        "2145550100",
        "12145550100",
        "+1 214 555 0100",
    ] {
        let (conversation_id, ..) = processed(harness.receive(from, "hello").await.unwrap());
        conversations.push(conversation_id);
    }

    let customers = harness.storage.list_customers().await.unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].phone_number, PHONE);
    conversations.dedup();
    assert_eq!(conversations.len(), 1, "all messages share one open conversation");
}

#[tokio::test]
async fn first_message_gets_exactly_one_qualification_reply() {
    let harness = TestHarness::new().await.unwrap();
    let (conversation_id, rule, status, replied) =
        processed(harness.receive(PHONE, "Hi, saw your ad").await.unwrap());
    assert_eq!(rule, Rule::NewConversation);
    assert_eq!(status, ConversationStatus::AddressRequested);
    assert!(replied);

    harness.receive(PHONE, "hello?").await.unwrap();
    harness.receive(PHONE, "anyone there").await.unwrap();

    let qualification = RepliesConfig::default().qualification;
    let outbound = harness.outbound(&conversation_id).await.unwrap();
    let qualification_count = outbound
        .iter()
        .filter(|m| m.body == qualification)
        .count();
    assert_eq!(qualification_count, 1);
    assert_eq!(
        harness.conversation(&conversation_id).await.unwrap().status,
        ConversationStatus::AddressRequested
    );
}

#[tokio::test]
async fn first_message_with_address_still_gets_qualification_first() {
    let harness = TestHarness::new().await.unwrap();
    let (conversation_id, rule, ..) = processed(
        harness
            .receive(PHONE, "123 Main St Dallas TX 75201")
            .await
            .unwrap(),
    );
    assert_eq!(rule, Rule::NewConversation);
    let customer = harness.customer(PHONE).await.unwrap();
    assert!(!customer.has_complete_address());
    assert_eq!(harness.outbound(&conversation_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn complete_address_moves_to_checking() {
    let harness = TestHarness::new().await.unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    let (conversation_id, rule, status, replied) = processed(
        harness
            .receive(PHONE, "123 Main St Dallas TX 75201")
            .await
            .unwrap(),
    );
    assert_eq!(rule, Rule::AddressCaptured);
    assert_eq!(status, ConversationStatus::Checking);
    assert!(replied);

    let customer = harness.customer(PHONE).await.unwrap();
    assert_eq!(customer.address.as_deref(), Some("123 Main St"));
    assert_eq!(customer.city.as_deref(), Some("Dallas"));
    assert_eq!(customer.state.as_deref(), Some("TX"));
    assert_eq!(customer.zip_code.as_deref(), Some("75201"));

    let thanks = RepliesConfig::default().address_received;
    let outbound = harness.outbound(&conversation_id).await.unwrap();
    assert_eq!(outbound.iter().filter(|m| m.body == thanks).count(), 1);
    assert_eq!(
        harness.conversation(&conversation_id).await.unwrap().status,
        ConversationStatus::Checking
    );
}

#[tokio::test]
async fn partial_address_gets_reprompt() {
    let harness = TestHarness::new().await.unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    let (conversation_id, rule, status, replied) =
        processed(harness.receive(PHONE, "TX 75201").await.unwrap());
    assert_eq!(rule, Rule::AddressReprompt);
    assert_eq!(status, ConversationStatus::AddressRequested);
    assert!(replied);

    let customer = harness.customer(PHONE).await.unwrap();
    assert!(customer.address.is_none());
    assert!(customer.zip_code.is_none());

    let outbound = harness.outbound(&conversation_id).await.unwrap();
    assert_eq!(
        outbound.last().unwrap().body,
        RepliesConfig::default().address_reprompt
    );
}

#[tokio::test]
async fn stop_closes_conversation_from_any_state() {
    let harness = TestHarness::new().await.unwrap();
    let (conversation_id, ..) = processed(harness.receive(PHONE, "hi").await.unwrap());
    harness
        .storage
        .set_conversation_status(&conversation_id, ConversationStatus::CallScheduled)
        .await
        .unwrap();

    let (_, rule, status, replied) = processed(harness.receive(PHONE, "  Stop ").await.unwrap());
    assert_eq!(rule, Rule::OptOut);
    assert_eq!(status, ConversationStatus::Closed);
    assert!(replied, "confirmation is sent when the gateway lacks native opt-out");

    let outbound = harness.outbound(&conversation_id).await.unwrap();
    assert_eq!(outbound.last().unwrap().body, RepliesConfig::default().opt_out);
}

#[tokio::test]
async fn native_opt_out_suppresses_confirmation() {
    let harness = TestHarness::builder()
        .with_native_opt_out(true)
        .build()
        .await
        .unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    let sent_before = harness.sms.sent_count().await;

    let (conversation_id, rule, status, replied) =
        processed(harness.receive(PHONE, "UNSUBSCRIBE").await.unwrap());
    assert_eq!(rule, Rule::OptOut);
    assert_eq!(status, ConversationStatus::Closed);
    assert!(!replied);
    assert_eq!(harness.sms.sent_count().await, sent_before);
    assert_eq!(
        harness.conversation(&conversation_id).await.unwrap().status,
        ConversationStatus::Closed
    );
}

#[tokio::test]
async fn opt_out_as_first_message_skips_qualification() {
    let harness = TestHarness::new().await.unwrap();
    let (conversation_id, rule, status, _) =
        processed(harness.receive(PHONE, "quit").await.unwrap());
    assert_eq!(rule, Rule::OptOut);
    assert_eq!(status, ConversationStatus::Closed);

    let qualification = RepliesConfig::default().qualification;
    let outbound = harness.outbound(&conversation_id).await.unwrap();
    assert!(outbound.iter().all(|m| m.body != qualification));
}

#[tokio::test]
async fn message_after_close_starts_a_new_conversation() {
    let harness = TestHarness::new().await.unwrap();
    let (first, ..) = processed(harness.receive(PHONE, "hi").await.unwrap());
    harness.receive(PHONE, "stop").await.unwrap();

    let (second, rule, status, _) = processed(harness.receive(PHONE, "hi again").await.unwrap());
    assert_ne!(first, second);
    assert_eq!(rule, Rule::NewConversation);
    assert_eq!(status, ConversationStatus::AddressRequested);

    let customer = harness.customer(PHONE).await.unwrap();
    let conversations = harness
        .storage
        .list_customer_conversations(&customer.id)
        .await
        .unwrap();
    assert_eq!(conversations.len(), 2);
    assert_eq!(
        conversations.iter().filter(|c| c.status.is_open()).count(),
        1
    );
}

#[tokio::test]
async fn stop_inside_a_sentence_does_not_close() {
    let harness = TestHarness::new().await.unwrap();
    let (conversation_id, ..) = processed(harness.receive(PHONE, "hi").await.unwrap());
    let (_, rule, status, _) = processed(
        harness
            .receive(PHONE, "please don't stop texting me")
            .await
            .unwrap(),
    );
    assert_ne!(rule, Rule::OptOut);
    assert_ne!(status, ConversationStatus::Closed);
    assert!(
        harness
            .conversation(&conversation_id)
            .await
            .unwrap()
            .status
            .is_open()
    );
}

#[tokio::test]
async fn duplicate_delivery_is_ignored() {
    let harness = TestHarness::new().await.unwrap();
    let first = harness.receive_with_id(PHONE, "hi", "SM-1").await.unwrap();
    let (conversation_id, ..) = processed(first);

    let again = harness.receive_with_id(PHONE, "hi", "SM-1").await.unwrap();
    assert_eq!(
        again,
        InboundOutcome::Duplicate {
            conversation_id: conversation_id.clone()
        }
    );
    assert_eq!(harness.messages(&conversation_id).await.unwrap().len(), 2);
    assert_eq!(harness.sms.sent_count().await, 1);
    assert_eq!(harness.notifier.notifications().await.len(), 1);
}

#[tokio::test]
async fn redelivered_stop_does_not_block_next_qualification() {
    let harness = TestHarness::new().await.unwrap();
    harness.receive_with_id(PHONE, "hi", "SM-1").await.unwrap();
    let (closed_id, rule, ..) =
        processed(harness.receive_with_id(PHONE, "STOP", "SM-2").await.unwrap());
    assert_eq!(rule, Rule::OptOut);

    let again = harness.receive_with_id(PHONE, "STOP", "SM-2").await.unwrap();
    assert_eq!(
        again,
        InboundOutcome::Duplicate {
            conversation_id: closed_id.clone()
        }
    );
    let customer = harness.customer(PHONE).await.unwrap();
    let conversations = harness
        .storage
        .list_customer_conversations(&customer.id)
        .await
        .unwrap();
    assert_eq!(conversations.len(), 1, "a redelivery opens no conversation");
    assert_eq!(conversations[0].status, ConversationStatus::Closed);

    let (conversation_id, rule, status, replied) = processed(
        harness
            .receive_with_id(PHONE, "hi again", "SM-3")
            .await
            .unwrap(),
    );
    assert_ne!(conversation_id, closed_id);
    assert_eq!(rule, Rule::NewConversation);
    assert_eq!(status, ConversationStatus::AddressRequested);
    assert!(replied);
    let outbound = harness.outbound(&conversation_id).await.unwrap();
    assert_eq!(outbound.len(), 1);
    assert_eq!(outbound[0].body, RepliesConfig::default().qualification);
}

#[test]
fn address_parser_round_trip_example() {
    let address = parse_address("123 Main St Dallas TX 75201").unwrap();
    assert_eq!(address.street, "123 Main St");
    assert_eq!(address.city, "Dallas");
    assert_eq!(address.state, "TX");
    assert_eq!(address.zip_code, "75201");
    assert_eq!(address.full_address, "123 Main St, Dallas, TX 75201");
}

#[test]
fn classifier_fallback_is_deterministic() {
    let classification = fallback_classify("Is fiber available at my house?");
    assert_eq!(classification.intent, Intent::AvailabilityCheck);
    assert_eq!(classification.confidence, 0.5);
    assert!(!classification.suggested_response.is_empty());
}

#[tokio::test]
async fn availability_result_is_texted_and_conversation_responded() {
    let harness = TestHarness::builder()
        .with_availability(MockAvailabilityChecker::fiber())
        .build()
        .await
        .unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    let (conversation_id, _, status, _) = processed(
        harness
            .receive(PHONE, "123 Main St, Dallas, TX 75201")
            .await
            .unwrap(),
    );
    assert_eq!(status, ConversationStatus::Checking);

    let checker = harness.availability.as_ref().unwrap();
    assert_eq!(checker.checked().await.len(), 1);

    let customer = harness.customer(PHONE).await.unwrap();
    let checks = harness
        .storage
        .list_availability_checks(&customer.id)
        .await
        .unwrap();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].status, CheckStatus::FiberAvailable);
    assert!(checks[0].completed_at.is_some());

    let outbound = harness.outbound(&conversation_id).await.unwrap();
    let last = outbound.last().unwrap();
    assert!(last.body.contains("300, 1000 Mbps"), "got: {}", last.body);
    assert_eq!(
        harness.conversation(&conversation_id).await.unwrap().status,
        ConversationStatus::Responded
    );
}

#[tokio::test]
async fn checker_error_is_recorded_without_customer_reply() {
    let harness = TestHarness::builder()
        .with_availability(MockAvailabilityChecker::failing("lookup timed out"))
        .build()
        .await
        .unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    let (conversation_id, ..) = processed(
        harness
            .receive(PHONE, "123 Main St Dallas TX 75201")
            .await
            .unwrap(),
    );

    let customer = harness.customer(PHONE).await.unwrap();
    let checks = harness
        .storage
        .list_availability_checks(&customer.id)
        .await
        .unwrap();
    assert_eq!(checks[0].status, CheckStatus::Error);
    assert_eq!(harness.outbound(&conversation_id).await.unwrap().len(), 2);
    assert_eq!(
        harness.conversation(&conversation_id).await.unwrap().status,
        ConversationStatus::Checking
    );
}

#[tokio::test]
async fn automatic_checks_can_be_disabled() {
    let harness = TestHarness::builder()
        .with_availability(MockAvailabilityChecker::fiber())
        .with_intake_config(IntakeConfig {
            availability_checks: false,
            ..IntakeConfig::default()
        })
        .build()
        .await
        .unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    harness
        .receive(PHONE, "123 Main St Dallas TX 75201")
        .await
        .unwrap();
    assert!(harness.availability.as_ref().unwrap().checked().await.is_empty());

    // An agent can still ask for one.
    let customer = harness.customer(PHONE).await.unwrap();
    let check = harness
        .service
        .request_availability_check(&customer.id)
        .await
        .unwrap();
    assert_eq!(check.status, CheckStatus::FiberAvailable);
    assert_eq!(check.address, "123 Main St, Dallas, TX 75201");
}

#[tokio::test]
async fn manual_recheck_keeps_history() {
    let harness = TestHarness::builder()
        .with_availability(MockAvailabilityChecker::returning(AvailabilityResult {
            status: CheckStatus::InternetAirAvailable,
            services: vec!["Internet Air".into()],
            fiber_speeds: Vec::new(),
            internet_air: true,
            notes: None,
        }))
        .build()
        .await
        .unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    harness
        .receive(PHONE, "123 Main St Dallas TX 75201")
        .await
        .unwrap();
    let customer = harness.customer(PHONE).await.unwrap();
    harness
        .service
        .request_availability_check(&customer.id)
        .await
        .unwrap();

    let checks = harness
        .storage
        .list_availability_checks(&customer.id)
        .await
        .unwrap();
    assert_eq!(checks.len(), 2);
    assert!(
        checks
            .iter()
            .all(|c| c.status == CheckStatus::InternetAirAvailable)
    );
}

#[tokio::test]
async fn address_in_manual_status_is_stored_without_status_change() {
    let harness = TestHarness::new().await.unwrap();
    let (conversation_id, ..) = processed(harness.receive(PHONE, "hi").await.unwrap());
    harness
        .storage
        .set_conversation_status(&conversation_id, ConversationStatus::NeedToCall)
        .await
        .unwrap();

    let (_, rule, status, _) = processed(
        harness
            .receive(PHONE, "456 Oak Ave Plano TX 75024")
            .await
            .unwrap(),
    );
    assert_eq!(rule, Rule::AddressCaptured);
    assert_eq!(status, ConversationStatus::NeedToCall);
    let customer = harness.customer(PHONE).await.unwrap();
    assert_eq!(customer.city.as_deref(), Some("Plano"));
}

#[tokio::test]
async fn stored_address_suppresses_automation() {
    let harness = TestHarness::new().await.unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    harness
        .receive(PHONE, "123 Main St Dallas TX 75201")
        .await
        .unwrap();
    let sent_before = harness.sms.sent_count().await;

    let (_, rule, status, replied) =
        processed(harness.receive(PHONE, "when will someone call?").await.unwrap());
    assert_eq!(rule, Rule::AddressOnFile);
    assert_eq!(status, ConversationStatus::Checking);
    assert!(!replied);
    assert_eq!(harness.sms.sent_count().await, sent_before);
}

#[tokio::test]
async fn failed_auto_reply_keeps_status_and_records_failure() {
    let harness = TestHarness::new().await.unwrap();
    harness.sms.fail_next(3, true);

    let (conversation_id, rule, status, replied) =
        processed(harness.receive(PHONE, "hi").await.unwrap());
    assert_eq!(rule, Rule::NewConversation);
    assert!(!replied);
    assert_eq!(status, ConversationStatus::New);
    assert_eq!(harness.sms.attempts(), 3);

    let outbound = harness.outbound(&conversation_id).await.unwrap();
    assert_eq!(outbound.len(), 1);
    assert_eq!(outbound[0].status, DeliveryStatus::Failed);

    // The qualification is not re-sent; the next turn is an ordinary NEW turn.
    let (_, rule, status, replied) = processed(harness.receive(PHONE, "hello?").await.unwrap());
    assert_eq!(rule, Rule::AddressReprompt);
    assert_eq!(status, ConversationStatus::AddressRequested);
    assert!(replied);
    let outbound = harness.outbound(&conversation_id).await.unwrap();
    assert_eq!(outbound.len(), 2);
    assert_eq!(outbound[1].body, RepliesConfig::default().address_reprompt);
}

#[tokio::test]
async fn transient_send_failure_is_retried() {
    let harness = TestHarness::new().await.unwrap();
    harness.sms.fail_next(1, true);

    let (conversation_id, _, status, replied) =
        processed(harness.receive(PHONE, "hi").await.unwrap());
    assert!(replied);
    assert_eq!(status, ConversationStatus::AddressRequested);
    assert_eq!(harness.sms.attempts(), 2);
    let outbound = harness.outbound(&conversation_id).await.unwrap();
    assert_eq!(outbound[0].status, DeliveryStatus::Sent);
    assert_eq!(outbound[0].provider, "mock-sms");
}

#[tokio::test]
async fn notifier_failure_does_not_block_intake() {
    let harness = TestHarness::builder()
        .with_notifier(MockNotifier::failing())
        .build()
        .await
        .unwrap();
    let (_, _, status, replied) = processed(harness.receive(PHONE, "hi").await.unwrap());
    assert!(replied);
    assert_eq!(status, ConversationStatus::AddressRequested);
}

#[tokio::test]
async fn empty_body_is_rejected_before_any_write() {
    let harness = TestHarness::new().await.unwrap();
    let err = harness.receive(PHONE, "   ").await.unwrap_err();
    assert!(matches!(err, LeadlineError::Validation(_)));
    assert!(harness.storage.list_customers().await.unwrap().is_empty());
}

#[tokio::test]
async fn llm_decider_uses_model_address_and_history() {
    let model_reply = r#"{
        "extractedAddress": {"street": "500 Elm Ave", "city": "Plano", "state": "tx", "zipCode": "75024"},
        "intent": "address_provide",
        "suggestedResponse": "Thanks, checking now!",
        "confidence": 0.92
    }"#;
    let harness = TestHarness::builder()
        .with_completion_responses(vec![model_reply.to_string()])
        .build()
        .await
        .unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    let (conversation_id, rule, status, _) = processed(
        harness
            .receive(PHONE, "sure, it's the place on elm in plano")
            .await
            .unwrap(),
    );
    assert_eq!(rule, Rule::AddressCaptured);
    assert_eq!(status, ConversationStatus::Checking);

    let customer = harness.customer(PHONE).await.unwrap();
    assert_eq!(customer.address.as_deref(), Some("500 Elm Ave"));
    assert_eq!(customer.state.as_deref(), Some("TX"));

    let requests = harness.completion.requests().await;
    assert_eq!(requests.len(), 1, "the first message never reaches the model");
    let messages = &requests[0].messages;
    assert_eq!(messages[0].role, ChatRole::System);
    assert_eq!(messages[1].role, ChatRole::User);
    assert_eq!(messages[1].content, "hi");
    assert_eq!(messages[2].role, ChatRole::Assistant);
    assert_eq!(messages.last().unwrap().content, "sure, it's the place on elm in plano");
    assert_eq!(messages.len(), 4);

    let outbound = harness.outbound(&conversation_id).await.unwrap();
    assert_eq!(outbound.last().unwrap().direction, Direction::Outbound);
}

#[tokio::test]
async fn llm_outage_falls_back_to_keyword_rules() {
    let harness = TestHarness::builder()
        .with_completion_responses(Vec::new())
        .build()
        .await
        .unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    let (_, rule, status, replied) = processed(
        harness
            .receive(PHONE, "123 Main St Dallas TX 75201")
            .await
            .unwrap(),
    );
    assert_eq!(rule, Rule::AddressCaptured);
    assert_eq!(status, ConversationStatus::Checking);
    assert!(replied);
}

#[tokio::test]
async fn agent_message_on_closed_conversation_is_refused() {
    let harness = TestHarness::new().await.unwrap();
    let (conversation_id, ..) = processed(harness.receive(PHONE, "hi").await.unwrap());
    harness.receive(PHONE, "stop").await.unwrap();
    let err = harness
        .service
        .send_agent_message(&conversation_id, "one more thing")
        .await
        .unwrap_err();
    assert!(matches!(err, LeadlineError::Validation(_)));
}

#[tokio::test]
async fn outcome_serializes_with_tag() {
    let harness = TestHarness::new().await.unwrap();
    let outcome = harness.receive(PHONE, "hi").await.unwrap();
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["outcome"], "processed");
    assert_eq!(json["rule"], "new_conversation");
    assert_eq!(json["status"], "ADDRESS_REQUESTED");
}
