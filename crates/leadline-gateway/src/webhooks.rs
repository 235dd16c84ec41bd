// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider webhook endpoints.
//!
//! Every decodable delivery is acknowledged with 200 whatever happens
//! inside the pipeline, so providers never retry. The one exception is a
//! failed Twilio signature check (403): that caller is not Twilio.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, error, warn};

use leadline_core::{InboundSms, LeadlineError};
use leadline_sms::signature::validate_signature;
use leadline_sms::webhook::{TWIML_ACK, decode_form, parse_json, parse_telnyx, twilio_inbound};

use crate::server::{GatewayState, WebhookSettings};

fn twiml_ack() -> Response {
    ([(header::CONTENT_TYPE, "text/xml")], TWIML_ACK).into_response()
}

fn json_ack() -> Response {
    Json(json!({ "received": true })).into_response()
}

/// Run the pipeline, waiting at most the ack deadline. Failures are logged
/// and swallowed.
async fn process(state: &GatewayState, sms: InboundSms) {
    let provider = sms.provider.clone();
    let task = state.intake.spawn_inbound(sms);
    match tokio::time::timeout(state.webhooks.ack_timeout, task).await {
        Ok(Ok(Ok(outcome))) => debug!(%provider, ?outcome, "inbound processed"),
        Ok(Ok(Err(LeadlineError::Validation(reason)))) => {
            warn!(%provider, %reason, "inbound payload rejected")
        }
        Ok(Ok(Err(e))) => error!(%provider, error = %e, "inbound processing failed"),
        Ok(Err(e)) => error!(%provider, error = %e, "inbound processing task aborted"),
        Err(_) => warn!(
            %provider,
            timeout_secs = state.webhooks.ack_timeout.as_secs(),
            "inbound processing still running at ack deadline"
        ),
    }
}

/// The URL Twilio signed: the public base URL plus path and query, or the
/// request's own host when no public URL is configured.
fn signed_url(settings: &WebhookSettings, headers: &HeaderMap, uri: &Uri) -> String {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    match &settings.public_url {
        Some(base) => format!("{}{path}", base.trim_end_matches('/')),
        None => {
            let host = headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("localhost");
            format!("https://{host}{path}")
        }
    }
}

/// POST /webhooks/twilio
pub async fn post_twilio(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    uri: Uri,
    body: Bytes,
) -> Response {
    let params = match decode_form(&body) {
        Ok(params) => params,
        Err(e) => {
            warn!(error = %e, "undecodable twilio webhook");
            return twiml_ack();
        }
    };

    if state.webhooks.validate_signatures {
        let Some(token) = state.webhooks.twilio_auth_token.as_deref() else {
            error!("twilio signature validation enabled without an auth token -- rejecting");
            return StatusCode::FORBIDDEN.into_response();
        };
        let url = signed_url(&state.webhooks, &headers, &uri);
        let valid = headers
            .get("x-twilio-signature")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|sig| validate_signature(token, &url, &params, sig));
        if !valid {
            warn!(%url, "twilio signature check failed");
            return StatusCode::FORBIDDEN.into_response();
        }
    }

    process(&state, twilio_inbound(&params)).await;
    twiml_ack()
}

/// POST /webhooks/telnyx
pub async fn post_telnyx(State(state): State<GatewayState>, body: Bytes) -> Response {
    match parse_telnyx(&body) {
        Ok(Some(sms)) => process(&state, sms).await,
        Ok(None) => debug!("telnyx event ignored"),
        Err(e) => warn!(error = %e, "undecodable telnyx webhook"),
    }
    json_ack()
}

/// POST /webhooks/sms
///
/// Form bodies are read with Twilio's field names, anything else as JSON.
pub async fn post_sms(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

    let decoded = if is_form {
        decode_form(&body).map(|params| Some(twilio_inbound(&params)))
    } else {
        parse_json(&body)
    };
    match decoded {
        Ok(Some(sms)) => process(&state, sms).await,
        Ok(None) => debug!("sms webhook event ignored"),
        Err(e) => warn!(error = %e, "undecodable sms webhook"),
    }
    json_ack()
}

pub async fn twilio_status() -> Json<serde_json::Value> {
    Json(json!({ "status": "Twilio webhook endpoint active" }))
}

pub async fn telnyx_status() -> Json<serde_json::Value> {
    Json(json!({ "status": "Telnyx webhook endpoint active" }))
}

pub async fn sms_status() -> Json<serde_json::Value> {
    Json(json!({ "status": "SMS webhook endpoint active" }))
}
