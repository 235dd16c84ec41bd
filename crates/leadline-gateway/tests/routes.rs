// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process route tests: webhooks, agent API, auth and rate limiting.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use leadline_core::{ConversationStatus, DeliveryStatus, Direction, StorageAdapter};
use leadline_gateway::{
    AuthConfig, FixedWindowLimiter, GatewayState, RateLimiter, WebhookSettings, build_router,
};
use leadline_sms::signature::compute_signature;
use leadline_test_utils::TestHarness;

const TOKEN: &str = "agent-token";
const PHONE: &str = "+12145550100";

fn state(harness: &TestHarness) -> GatewayState {
    GatewayState {
        intake: harness.service.clone(),
        installations: harness.installations.clone(),
        webhooks: WebhookSettings {
            twilio_auth_token: None,
            validate_signatures: false,
            public_url: None,
            ack_timeout: Duration::from_secs(5),
        },
        auth: AuthConfig {
            bearer_token: Some(TOKEN.into()),
        },
        limiter: None,
        start_time: Instant::now(),
    }
}

fn twilio_form(body: &str, sid: &str) -> String {
    format!(
        "From=%2B12145550100&To=%2B18005550199&Body={}&MessageSid={sid}",
        body.replace(' ', "+")
    )
}

fn twilio_request(form: String) -> Request<Body> {
    Request::post("/webhooks/twilio")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form))
        .unwrap()
}

fn authed(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"));
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let harness = TestHarness::new().await.unwrap();
    let response = build_router(state(&harness))
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["decider"], "heuristic");
}

#[tokio::test]
async fn webhook_status_endpoints_respond() {
    let harness = TestHarness::new().await.unwrap();
    let app = build_router(state(&harness));
    for (path, expected) in [
        ("/webhooks/twilio", "Twilio webhook endpoint active"),
        ("/webhooks/telnyx", "Telnyx webhook endpoint active"),
        ("/webhooks/sms", "SMS webhook endpoint active"),
    ] {
        let response = app
            .clone()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], expected);
    }
}

#[tokio::test]
async fn twilio_webhook_acks_with_twiml_and_replies() {
    let harness = TestHarness::new().await.unwrap();
    let response = build_router(state(&harness))
        .oneshot(twilio_request(twilio_form("hi there", "SM100")))
        .await
        .unwrap();
    harness.service.wait_idle().await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        "text/xml"
    );
    let customer = harness.customer(PHONE).await.unwrap();
    assert_eq!(customer.phone_number, PHONE);
    assert_eq!(harness.sms.sent_count().await, 1);
}

#[tokio::test]
async fn duplicate_twilio_delivery_has_no_side_effects() {
    let harness = TestHarness::new().await.unwrap();
    let app = build_router(state(&harness));
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(twilio_request(twilio_form("hello", "SM-dup")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    harness.service.wait_idle().await;

    assert_eq!(harness.sms.sent_count().await, 1);
    let stats = harness.storage.stats().await.unwrap();
    assert_eq!(stats.messages, 2, "one inbound plus one auto-reply");
}

#[tokio::test]
async fn unsigned_twilio_request_is_forbidden_when_validation_is_on() {
    let harness = TestHarness::new().await.unwrap();
    let mut state = state(&harness);
    state.webhooks.validate_signatures = true;
    state.webhooks.twilio_auth_token = Some("twilio-secret".into());

    let response = build_router(state)
        .oneshot(twilio_request(twilio_form("hi", "SM1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(harness.storage.stats().await.unwrap().messages, 0);
}

#[tokio::test]
async fn signed_twilio_request_is_processed() {
    let harness = TestHarness::new().await.unwrap();
    let mut state = state(&harness);
    state.webhooks.validate_signatures = true;
    state.webhooks.twilio_auth_token = Some("twilio-secret".into());
    state.webhooks.public_url = Some("https://crm.example.com".into());

    let params = vec![
        ("From".to_string(), PHONE.to_string()),
        ("To".to_string(), "+18005550199".to_string()),
        ("Body".to_string(), "hi".to_string()),
        ("MessageSid".to_string(), "SM2".to_string()),
    ];
    let signature = compute_signature(
        "twilio-secret",
        "https://crm.example.com/webhooks/twilio",
        &params,
    );
    let mut request = twilio_request(twilio_form("hi", "SM2"));
    request
        .headers_mut()
        .insert("x-twilio-signature", signature.parse().unwrap());

    let response = build_router(state).oneshot(request).await.unwrap();
    harness.service.wait_idle().await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(harness.sms.sent_count().await, 1);
}

#[tokio::test]
async fn telnyx_webhook_processes_received_messages_only() {
    let harness = TestHarness::new().await.unwrap();
    let app = build_router(state(&harness));

    let delivery_receipt = json!({"data": {"event_type": "message.sent", "payload": {}}});
    let inbound = json!({
        "data": {
            "event_type": "message.received",
            "payload": {
                "id": "tx-1",
                "from": {"phone_number": PHONE},
                "to": [{"phone_number": "+18005550199"}],
                "text": "hello"
            }
        }
    });
    for event in [delivery_receipt, inbound] {
        let response = app
            .clone()
            .oneshot(
                Request::post("/webhooks/telnyx")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(event.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"received": true}));
    }
    harness.service.wait_idle().await;
    assert_eq!(harness.sms.sent_count().await, 1);
}

#[tokio::test]
async fn garbage_webhook_is_still_acknowledged() {
    let harness = TestHarness::new().await.unwrap();
    let response = build_router(state(&harness))
        .oneshot(
            Request::post("/webhooks/sms")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(harness.storage.stats().await.unwrap().messages, 0);
}

#[tokio::test]
async fn api_requires_bearer_token() {
    let harness = TestHarness::new().await.unwrap();
    let app = build_router(state(&harness));

    let anonymous = app
        .clone()
        .oneshot(Request::get("/v1/conversations").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(authed("GET", "/v1/conversations", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn api_is_closed_without_a_configured_token() {
    let harness = TestHarness::new().await.unwrap();
    let mut state = state(&harness);
    state.auth.bearer_token = None;
    let response = build_router(state)
        .oneshot(authed("GET", "/v1/customers", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn conversation_list_filters_by_status() {
    let harness = TestHarness::new().await.unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    let app = build_router(state(&harness));

    let response = app
        .clone()
        .oneshot(authed("GET", "/v1/conversations?status=address_requested", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let rows = json_body(response).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["phone_number"], PHONE);

    let response = app
        .oneshot(authed("GET", "/v1/conversations?status=bogus", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_conversation_is_not_found() {
    let harness = TestHarness::new().await.unwrap();
    let response = build_router(state(&harness))
        .oneshot(authed("GET", "/v1/conversations/missing", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn agent_message_sets_responded() {
    let harness = TestHarness::new().await.unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    let customer = harness.customer(PHONE).await.unwrap();
    let conversation = &harness
        .storage
        .list_customer_conversations(&customer.id)
        .await
        .unwrap()[0];

    let response = build_router(state(&harness))
        .oneshot(authed(
            "POST",
            &format!("/v1/conversations/{}/messages", conversation.id),
            Some(json!({"body": "Calling you at 3pm"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let message = json_body(response).await;
    assert_eq!(message["direction"], "OUTBOUND");
    assert_eq!(message["status"], "SENT");

    let updated = harness.conversation(&conversation.id).await.unwrap();
    assert_eq!(updated.status, ConversationStatus::Responded);
}

#[tokio::test]
async fn failed_agent_message_is_bad_gateway_and_recorded() {
    let harness = TestHarness::new().await.unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    let customer = harness.customer(PHONE).await.unwrap();
    let conversation_id = harness
        .storage
        .list_customer_conversations(&customer.id)
        .await
        .unwrap()[0]
        .id
        .clone();
    harness.sms.fail_next(1, false);

    let response = build_router(state(&harness))
        .oneshot(authed(
            "POST",
            &format!("/v1/conversations/{conversation_id}/messages"),
            Some(json!({"body": "hello?"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let outbound = harness.outbound(&conversation_id).await.unwrap();
    let last = outbound.last().unwrap();
    assert_eq!(last.direction, Direction::Outbound);
    assert_eq!(last.status, DeliveryStatus::Failed);
    assert_eq!(last.body, "hello?");
}

#[tokio::test]
async fn patch_conversation_updates_agent_fields() {
    let harness = TestHarness::new().await.unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    let customer = harness.customer(PHONE).await.unwrap();
    let conversation_id = harness
        .storage
        .list_customer_conversations(&customer.id)
        .await
        .unwrap()[0]
        .id
        .clone();

    let response = build_router(state(&harness))
        .oneshot(authed(
            "PATCH",
            &format!("/v1/conversations/{conversation_id}"),
            Some(json!({"status": "NEED_TO_CALL", "assigned_to": "dana", "tags": ["fiber"]})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "NEED_TO_CALL");
    assert_eq!(body["assigned_to"], "dana");
    assert_eq!(body["tags"], json!(["fiber"]));
}

#[tokio::test]
async fn customer_detail_includes_history() {
    let harness = TestHarness::new().await.unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    let customer = harness.customer(PHONE).await.unwrap();
    let app = build_router(state(&harness));

    let response = app
        .clone()
        .oneshot(authed(
            "PATCH",
            &format!("/v1/customers/{}", customer.id),
            Some(json!({"name": "Jordan"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(authed("GET", &format!("/v1/customers/{}", customer.id), None))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["customer"]["name"], "Jordan");
    assert_eq!(body["conversations"].as_array().unwrap().len(), 1);
    assert_eq!(body["availability_checks"], json!([]));
}

#[tokio::test]
async fn availability_recheck_without_checker_is_rejected() {
    let harness = TestHarness::new().await.unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    let customer = harness.customer(PHONE).await.unwrap();
    let response = build_router(state(&harness))
        .oneshot(authed(
            "POST",
            &format!("/v1/customers/{}/availability-checks", customer.id),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_reset_clears_conversations_and_keeps_customers() {
    let harness = TestHarness::new().await.unwrap();
    harness.receive(PHONE, "hi").await.unwrap();
    let app = build_router(state(&harness));

    let response = app
        .clone()
        .oneshot(authed(
            "DELETE",
            "/v1/admin/conversations?clear_addresses=true",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["conversations"], 1);

    let stats = json_body(
        app.oneshot(authed("GET", "/v1/admin/stats", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(stats["customers"], 1);
    assert_eq!(stats["conversations"], 0);
    assert_eq!(stats["messages"], 0);
}

async fn schedule(app: &axum::Router, body: Value) -> axum::response::Response {
    app.clone()
        .oneshot(authed("POST", "/v1/installations", Some(body)))
        .await
        .unwrap()
}

#[tokio::test]
async fn scheduling_creates_the_customer_and_lists_the_installation() {
    let harness = TestHarness::new().await.unwrap();
    let app = build_router(state(&harness));

    let response = schedule(
        &app,
        json!({
            "customer_name": "Dana Reyes",
            "phone_number": "(214) 555-0100",
            "install_date": "2026-03-01",
            "notes": "gate code 4411"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let installation = json_body(response).await;
    assert_eq!(installation["status"], "SCHEDULED");
    assert_eq!(installation["reminder_sent"], false);
    assert_eq!(installation["install_date"], "2026-03-01T00:00:00.000Z");

    let customer = harness.customer(PHONE).await.unwrap();
    assert_eq!(customer.name.as_deref(), Some("Dana Reyes"));

    let response = app
        .oneshot(authed("GET", "/v1/installations", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list = json_body(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["phone_number"], PHONE);
    assert_eq!(list[0]["customer_name"], "Dana Reyes");
    assert_eq!(list[0]["notes"], "gate code 4411");
}

#[tokio::test]
async fn scheduling_rejects_unparseable_dates() {
    let harness = TestHarness::new().await.unwrap();
    let app = build_router(state(&harness));
    let response = schedule(
        &app,
        json!({"phone_number": PHONE, "install_date": "next tuesday"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(harness.storage.list_installations().await.unwrap().is_empty());
}

#[tokio::test]
async fn completing_an_installation_earns_a_commission_once() {
    let harness = TestHarness::new().await.unwrap();
    let app = build_router(state(&harness));
    let installation = json_body(
        schedule(
            &app,
            json!({"phone_number": PHONE, "install_date": "2026-03-01"}),
        )
        .await,
    )
    .await;
    let id = installation["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(authed(
            "PATCH",
            &format!("/v1/installations/{id}"),
            Some(json!({"status": "COMPLETED"})),
        ))
        .await
        .unwrap();
    assert_eq!(
        response.status(),
        StatusCode::BAD_REQUEST,
        "completion goes through /complete"
    );

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &format!("/v1/installations/{id}/complete"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let completed = json_body(response).await;
    assert_eq!(completed["installation"]["status"], "COMPLETED");
    assert_eq!(completed["commission"]["amount"], 200);
    assert_eq!(completed["commission"]["status"], "EARNED");
    assert_eq!(completed["commission"]["type"], "SALE");
    assert_eq!(completed["commission"]["installation_id"], id);

    let response = app
        .clone()
        .oneshot(authed(
            "POST",
            &format!("/v1/installations/{id}/complete"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(harness.storage.list_commissions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn commission_report_tracks_payment() {
    let harness = TestHarness::new().await.unwrap();
    let app = build_router(state(&harness));
    let installation = json_body(
        schedule(
            &app,
            json!({"phone_number": PHONE, "install_date": "2026-03-01"}),
        )
        .await,
    )
    .await;
    let id = installation["id"].as_str().unwrap();
    let completed = json_body(
        app.clone()
            .oneshot(authed(
            "POST",
            &format!("/v1/installations/{id}/complete"),
            None,
        ))
            .await
            .unwrap(),
    )
    .await;
    let commission_id = completed["commission"]["id"].as_str().unwrap();

    let report = json_body(
        app.clone()
            .oneshot(authed("GET", "/v1/commissions", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(report["commissions"].as_array().unwrap().len(), 1);
    assert_eq!(report["stats"]["earned"], 1);
    assert_eq!(report["stats"]["total_earned"], 200);
    assert_eq!(report["stats"]["this_month_amount"], 200);

    let response = app
        .clone()
        .oneshot(authed(
            "PATCH",
            &format!("/v1/commissions/{commission_id}"),
            Some(json!({"status": "PAID"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "PAID");

    let report = json_body(
        app.clone()
            .oneshot(authed("GET", "/v1/commissions", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(report["stats"]["earned"], 0);
    assert_eq!(report["stats"]["paid"], 1);
    assert_eq!(report["stats"]["total_paid"], 200);
    assert_eq!(report["stats"]["total_earned"], 200);

    let response = app
        .oneshot(authed(
            "PATCH",
            "/v1/commissions/no-such-commission",
            Some(json!({"status": "PAID"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reminder_is_texted_on_a_pending_install_conversation() {
    let harness = TestHarness::new().await.unwrap();
    let app = build_router(state(&harness));
    let installation = json_body(
        schedule(
            &app,
            json!({"phone_number": PHONE, "install_date": "2026-03-01"}),
        )
        .await,
    )
    .await;
    let id = installation["id"].as_str().unwrap();

    let response = app
        .oneshot(authed(
            "POST",
            &format!("/v1/installations/{id}/remind"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let receipt = json_body(response).await;
    assert_eq!(receipt["installation"]["reminder_sent"], true);
    assert_eq!(receipt["message"]["status"], "SENT");

    let sent = harness.sms.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert!(
        sent[0]
            .body
            .starts_with("Reminder: Your AT&T installation is scheduled.")
    );

    let customer = harness.customer(PHONE).await.unwrap();
    let conversations = harness
        .storage
        .list_customer_conversations(&customer.id)
        .await
        .unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].status, ConversationStatus::PendingInstall);
}

#[tokio::test]
async fn failed_reminder_is_bad_gateway_and_leaves_flag_unset() {
    let harness = TestHarness::new().await.unwrap();
    let app = build_router(state(&harness));
    harness.receive(PHONE, "hi").await.unwrap();
    let installation = json_body(
        schedule(
            &app,
            json!({"phone_number": PHONE, "install_date": "2026-03-01"}),
        )
        .await,
    )
    .await;
    let id = installation["id"].as_str().unwrap();
    harness.sms.fail_next(1, false);

    let response = app
        .oneshot(authed(
            "POST",
            &format!("/v1/installations/{id}/remind"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let stored = harness.storage.get_installation(id).await.unwrap().unwrap();
    assert!(!stored.reminder_sent);

    let customer = harness.customer(PHONE).await.unwrap();
    let conversation = &harness
        .storage
        .list_customer_conversations(&customer.id)
        .await
        .unwrap()[0];
    assert_eq!(conversation.status, ConversationStatus::AddressRequested);
    let last = harness.outbound(&conversation.id).await.unwrap().pop().unwrap();
    assert_eq!(last.status, DeliveryStatus::Failed);
}

#[tokio::test]
async fn reminder_is_refused_after_opt_out() {
    let harness = TestHarness::new().await.unwrap();
    let app = build_router(state(&harness));
    harness.receive(PHONE, "STOP").await.unwrap();
    let sent_before = harness.sms.sent_count().await;
    let installation = json_body(
        schedule(
            &app,
            json!({"phone_number": PHONE, "install_date": "2026-03-01"}),
        )
        .await,
    )
    .await;
    let id = installation["id"].as_str().unwrap();

    let response = app
        .oneshot(authed(
            "POST",
            &format!("/v1/installations/{id}/remind"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(harness.sms.sent_count().await, sent_before);
}

#[tokio::test]
async fn rate_limit_applies_before_auth() {
    let harness = TestHarness::new().await.unwrap();
    let mut state = state(&harness);
    let limiter: Arc<dyn RateLimiter> =
        Arc::new(FixedWindowLimiter::new(2, Duration::from_secs(60)));
    state.limiter = Some(limiter);
    let app = build_router(state);

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(Request::get("/v1/customers").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    let response = app
        .clone()
        .oneshot(authed("GET", "/v1/customers", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(header::RETRY_AFTER));

    let webhook = app
        .oneshot(Request::get("/webhooks/sms").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(webhook.status(), StatusCode::OK, "webhooks are not limited");
}
