//! Peer-event envelope
//!
//! SDK clients send signaling messages as peer requests and expect to receive
//! them as peer events. With envelope rewriting enabled, the relay converts
//! each inbound text message from one form to the other before queueing it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RelayError;
use crate::model::payload::Payload;

/// Status carried by every rewritten event.
const STATUS_OK: u32 = 1;

/// Message as sent by a peer, e.g. `{"action":"SDP_OFFER", ...}`.
#[derive(Debug, Deserialize)]
pub struct PeerRequest {
    pub action: String,
    #[serde(rename = "RecipientClientId", default)]
    pub recipient_client_id: Value,
    #[serde(rename = "MessagePayload")]
    pub message_payload: Value,
}

/// Message as delivered to the receiving peer.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeerEvent {
    pub sender_client_id: Value,
    pub message_type: String,
    pub message_payload: Value,
    pub status_response: u32,
}

impl From<PeerRequest> for PeerEvent {
    fn from(request: PeerRequest) -> Self {
        PeerEvent {
            sender_client_id: request.recipient_client_id,
            message_type: request.action,
            message_payload: request.message_payload,
            status_response: STATUS_OK,
        }
    }
}

/// Rewrite a text payload from request to event form.
///
/// Binary payloads are passed through untouched.
pub fn rewrite(payload: Payload) -> Result<Payload, RelayError> {
    match payload {
        Payload::Text(text) => {
            let request: PeerRequest = serde_json::from_str(&text)?;
            let event = PeerEvent::from(request);
            Ok(Payload::Text(serde_json::to_string(&event)?))
        }
        binary @ Payload::Binary(_) => Ok(binary),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_becomes_event() {
        let request = json!({
            "action": "SDP_OFFER",
            "RecipientClientId": "viewer-1",
            "MessagePayload": "eyJ0eXBlIjoib2ZmZXIifQ==",
        });

        let Payload::Text(out) = rewrite(Payload::Text(request.to_string())).unwrap() else {
            panic!("expected a text payload");
        };
        let event: PeerEvent = serde_json::from_str(&out).unwrap();

        assert_eq!(
            event,
            PeerEvent {
                sender_client_id: json!("viewer-1"),
                message_type: "SDP_OFFER".to_string(),
                message_payload: json!("eyJ0eXBlIjoib2ZmZXIifQ=="),
                status_response: 1,
            }
        );

        let raw: Value = serde_json::from_str(&out).unwrap();
        assert!(raw.get("senderClientId").is_some());
        assert!(raw.get("messageType").is_some());
        assert!(raw.get("messagePayload").is_some());
        assert_eq!(raw["statusResponse"], json!(1));
    }

    #[test]
    fn missing_recipient_is_null_sender() {
        let request = json!({ "action": "ICE_CANDIDATE", "MessagePayload": "c" });
        let Payload::Text(out) = rewrite(Payload::Text(request.to_string())).unwrap() else {
            panic!("expected a text payload");
        };
        let raw: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(raw["senderClientId"], Value::Null);
        assert_eq!(raw["messageType"], json!("ICE_CANDIDATE"));
    }

    #[test]
    fn malformed_text_is_rejected() {
        assert!(matches!(
            rewrite(Payload::from("OFFER:abc")),
            Err(RelayError::Envelope(_))
        ));
        assert!(matches!(
            rewrite(Payload::from(r#"{"action":"SDP_OFFER"}"#)),
            Err(RelayError::Envelope(_))
        ));
    }

    #[test]
    fn binary_passes_through() {
        let payload = Payload::Binary(vec![9, 8, 7]);
        assert_eq!(rewrite(payload.clone()).unwrap(), payload);
    }
}
