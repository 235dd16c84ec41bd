// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of provider webhook payloads into [`InboundSms`].
//!
//! Decoders never reject a payload for missing sender or body; that is the
//! intake pipeline's validation step. They fail only on bytes that are not
//! the declared encoding at all.

use serde::Deserialize;

use leadline_core::{InboundSms, LeadlineError};

/// Empty TwiML document acknowledging a Twilio webhook without replying.
pub const TWIML_ACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#;

/// Telnyx event type for an inbound message.
const TELNYX_MESSAGE_RECEIVED: &str = "message.received";

fn decode_error(kind: &str, e: impl std::fmt::Display) -> LeadlineError {
    LeadlineError::Validation(format!("malformed {kind} webhook payload: {e}"))
}

/// Decode an `application/x-www-form-urlencoded` body into ordered pairs.
///
/// The pairs are kept for Twilio signature validation.
pub fn decode_form(body: &[u8]) -> Result<Vec<(String, String)>, LeadlineError> {
    serde_urlencoded::from_bytes(body).map_err(|e| decode_error("form", e))
}

fn form_value(params: &[(String, String)], key: &str) -> Option<String> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

/// Build an inbound message from Twilio's form fields
/// (`From`, `To`, `Body`, `MessageSid`/`SmsSid`).
pub fn twilio_inbound(params: &[(String, String)]) -> InboundSms {
    InboundSms {
        provider: "twilio".into(),
        from: form_value(params, "From").unwrap_or_default(),
        to: form_value(params, "To"),
        body: form_value(params, "Body").unwrap_or_default(),
        external_id: form_value(params, "MessageSid").or_else(|| form_value(params, "SmsSid")),
    }
}

#[derive(Debug, Deserialize)]
struct TelnyxEnvelope {
    data: TelnyxEvent,
}

#[derive(Debug, Deserialize)]
struct TelnyxEvent {
    event_type: String,
    #[serde(default)]
    payload: Option<TelnyxPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct TelnyxPayload {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    from: Option<TelnyxParty>,
    #[serde(default)]
    to: Vec<TelnyxParty>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelnyxParty {
    #[serde(default)]
    phone_number: Option<String>,
}

/// Decode a Telnyx webhook. Returns `Ok(None)` for events other than
/// `message.received` (delivery receipts and the like).
pub fn parse_telnyx(body: &[u8]) -> Result<Option<InboundSms>, LeadlineError> {
    let envelope: TelnyxEnvelope =
        serde_json::from_slice(body).map_err(|e| decode_error("telnyx", e))?;
    if envelope.data.event_type != TELNYX_MESSAGE_RECEIVED {
        return Ok(None);
    }
    let payload = envelope.data.payload.unwrap_or_default();
    Ok(Some(InboundSms {
        provider: "telnyx".into(),
        from: payload
            .from
            .and_then(|p| p.phone_number)
            .unwrap_or_default(),
        to: payload.to.into_iter().find_map(|p| p.phone_number),
        body: payload.text.unwrap_or_default(),
        external_id: payload.id,
    }))
}

/// Provider-neutral JSON shape accepted by `/webhooks/sms`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenericInbound {
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default, alias = "text")]
    body: Option<String>,
    #[serde(default, alias = "id", alias = "message_id")]
    message_id: Option<String>,
}

/// Decode a JSON webhook of unknown origin.
///
/// A Telnyx envelope (top-level `data`) is decoded as Telnyx; anything else
/// is read as `{from, to, body|text, messageId|id}`.
pub fn parse_json(body: &[u8]) -> Result<Option<InboundSms>, LeadlineError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| decode_error("json", e))?;
    if value.get("data").is_some_and(|d| d.get("event_type").is_some()) {
        return parse_telnyx(body);
    }
    let generic: GenericInbound =
        serde_json::from_value(value).map_err(|e| decode_error("json", e))?;
    Ok(Some(InboundSms {
        provider: "sms".into(),
        from: generic.from.unwrap_or_default(),
        to: generic.to,
        body: generic.body.unwrap_or_default(),
        external_id: generic.message_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twilio_form_decodes() {
        let body = b"MessageSid=SM123&From=%2B12145550100&To=%2B15550001111&Body=123+Main+St+Dallas+TX+75201";
        let params = decode_form(body).unwrap();
        let sms = twilio_inbound(&params);
        assert_eq!(sms.provider, "twilio");
        assert_eq!(sms.from, "+12145550100");
        assert_eq!(sms.to.as_deref(), Some("+15550001111"));
        assert_eq!(sms.body, "123 Main St Dallas TX 75201");
        assert_eq!(sms.external_id.as_deref(), Some("SM123"));
    }

    #[test]
    fn twilio_missing_fields_are_empty() {
        let sms = twilio_inbound(&decode_form(b"To=%2B15550001111").unwrap());
        assert!(sms.from.is_empty());
        assert!(sms.body.is_empty());
        assert!(sms.external_id.is_none());
    }

    #[test]
    fn telnyx_message_received_decodes() {
        let body = serde_json::json!({
            "data": {
                "event_type": "message.received",
                "payload": {
                    "id": "b0c7e8cb",
                    "from": {"phone_number": "+12145550100"},
                    "to": [{"phone_number": "+15550001111"}],
                    "text": "Is fiber available?"
                }
            }
        });
        let sms = parse_telnyx(body.to_string().as_bytes()).unwrap().unwrap();
        assert_eq!(sms.provider, "telnyx");
        assert_eq!(sms.from, "+12145550100");
        assert_eq!(sms.to.as_deref(), Some("+15550001111"));
        assert_eq!(sms.body, "Is fiber available?");
        assert_eq!(sms.external_id.as_deref(), Some("b0c7e8cb"));
    }

    #[test]
    fn telnyx_other_events_are_ignored() {
        let body = serde_json::json!({
            "data": {"event_type": "message.finalized", "payload": {"id": "x"}}
        });
        assert!(parse_telnyx(body.to_string().as_bytes()).unwrap().is_none());
    }

    #[test]
    fn generic_json_accepts_aliases() {
        let body = serde_json::json!({"from": "2145550100", "text": "hello", "id": "m1"});
        let sms = parse_json(body.to_string().as_bytes()).unwrap().unwrap();
        assert_eq!(sms.provider, "sms");
        assert_eq!(sms.body, "hello");
        assert_eq!(sms.external_id.as_deref(), Some("m1"));
    }

    #[test]
    fn generic_json_routes_telnyx_envelopes() {
        let body = serde_json::json!({
            "data": {"event_type": "message.received", "payload": {"text": "hi"}}
        });
        let sms = parse_json(body.to_string().as_bytes()).unwrap().unwrap();
        assert_eq!(sms.provider, "telnyx");
    }

    #[test]
    fn invalid_json_is_a_validation_error() {
        let err = parse_json(b"{not json").unwrap_err();
        assert!(matches!(err, LeadlineError::Validation(_)));
    }
}
