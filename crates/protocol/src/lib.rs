//! Wire protocol for the huddle relay.
//!
//! Every frame is a JSON object discriminated by an `action` tag. Inbound
//! frames ([`ClientEvent`]) come from connected clients; outbound frames
//! ([`ServerEvent`]) are relayed to room members. Unknown inbound actions
//! are not an error — [`decode_client_event`] reports them as `None` so the
//! session loop can skip them.

use {
    serde::{Deserialize, Deserializer, Serialize, Serializer},
    thiserror::Error,
};

// ── Shared payload types ─────────────────────────────────────────────────────

/// A latitude/longitude pair. New sessions start at the origin until their
/// first `MOVING` frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Snapshot projection of one room member, as carried by
/// `UPDATE_PARTICIPANTS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub display_name: String,
    pub location: Location,
}

// ── Inbound events ───────────────────────────────────────────────────────────

/// A frame sent by a client while joined to a room.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action")]
pub enum ClientEvent {
    /// The client moved; carries its new position.
    #[serde(rename = "MOVING")]
    Moving { location: Location },
    /// The client started typing a chat message.
    #[serde(rename = "TYPING")]
    Typing,
    /// The client sent a chat message. The text may be absent.
    #[serde(rename = "MESSAGING")]
    Messaging {
        #[serde(default)]
        message: Option<String>,
    },
    /// The client asked to leave cleanly.
    #[serde(rename = "DISCONNECTING")]
    Disconnecting,
}

/// Actions the relay reacts to; anything else falls through untouched.
const CLIENT_ACTIONS: &[&str] = &["MOVING", "TYPING", "MESSAGING", "DISCONNECTING"];

#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame was not valid JSON, or a recognized action carried a
    /// payload that does not decode.
    #[error("malformed frame: {0}")]
    Malformed(String),
}

/// Decode one inbound text frame.
///
/// Returns `Ok(None)` when the frame parses but its `action` is missing or
/// unrecognized — those frames are ignored, never fatal. Returns an error
/// only for undecodable input, which the session treats as a protocol
/// violation on that connection alone.
pub fn decode_client_event(raw: &str) -> Result<Option<ClientEvent>, ProtocolError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    let Some(action) = value.get("action").and_then(serde_json::Value::as_str) else {
        return Ok(None);
    };
    if !CLIENT_ACTIONS.contains(&action) {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| ProtocolError::Malformed(e.to_string()))
}

// ── Outbound events ──────────────────────────────────────────────────────────

/// A frame relayed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum ServerEvent {
    /// Sent to a member right after admission.
    #[serde(rename = "WELCOME")]
    Welcome { id: String, notice: String },
    /// Sent to a connection whose join was refused, just before close.
    #[serde(rename = "FORBIDDEN")]
    Forbidden { notice: String },
    /// Acknowledges an explicit `DISCONNECTING` request.
    #[serde(rename = "GOODBYE")]
    Goodbye { notice: String },
    /// Fresh membership roster for the room. `notice` is `null` for
    /// location-only updates.
    #[serde(rename = "UPDATE_PARTICIPANTS")]
    UpdateParticipants {
        participants: Vec<Participant>,
        notice: Option<String>,
    },
    /// A transient activity notice, e.g. "<name> is typing a message".
    #[serde(rename = "DISPLAY_CLIENT_ACTION")]
    DisplayClientAction { notice: String },
    /// A relayed chat message. Absent text is encoded as the literal JSON
    /// `false`, and `notice` is always `false`; existing clients key off
    /// those exact values, so the sentinel is part of the wire contract.
    #[serde(rename = "DISPLAY_CLIENT_MESSAGE")]
    DisplayClientMessage {
        #[serde(with = "text_or_false")]
        message: Option<String>,
        #[serde(with = "text_or_false")]
        notice: Option<String>,
    },
}

/// Codec for fields that carry a string or the literal `false`.
mod text_or_false {
    use super::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(text) => serializer.serialize_str(text),
            None => serializer.serialize_bool(false),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(text) => Ok(Some(text)),
            serde_json::Value::Bool(false) => Ok(None),
            other => Err(serde::de::Error::custom(format!(
                "expected a string or false, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn decodes_moving_frame() {
        let event = decode_client_event(
            r#"{"action":"MOVING","location":{"latitude":1.5,"longitude":-2.0}}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::Moving {
                location: Location {
                    latitude: 1.5,
                    longitude: -2.0
                }
            }
        );
    }

    #[test]
    fn decodes_bare_actions() {
        assert_eq!(
            decode_client_event(r#"{"action":"TYPING"}"#).unwrap(),
            Some(ClientEvent::Typing)
        );
        assert_eq!(
            decode_client_event(r#"{"action":"DISCONNECTING"}"#).unwrap(),
            Some(ClientEvent::Disconnecting)
        );
    }

    #[test]
    fn messaging_text_is_optional() {
        assert_eq!(
            decode_client_event(r#"{"action":"MESSAGING","message":"hi"}"#).unwrap(),
            Some(ClientEvent::Messaging {
                message: Some("hi".into())
            })
        );
        assert_eq!(
            decode_client_event(r#"{"action":"MESSAGING"}"#).unwrap(),
            Some(ClientEvent::Messaging { message: None })
        );
    }

    #[test]
    fn unknown_or_missing_action_is_ignored() {
        assert_eq!(decode_client_event(r#"{"action":"DANCING"}"#).unwrap(), None);
        assert_eq!(decode_client_event(r#"{"message":"hi"}"#).unwrap(), None);
        assert_eq!(decode_client_event(r#"{"action":42}"#).unwrap(), None);
    }

    #[test]
    fn malformed_frames_error() {
        assert!(decode_client_event("not json").is_err());
        // Recognized action with an undecodable payload.
        assert!(decode_client_event(r#"{"action":"MOVING"}"#).is_err());
        assert!(decode_client_event(r#"{"action":"MOVING","location":"here"}"#).is_err());
    }

    #[test]
    fn roster_serializes_camel_case_with_null_notice() {
        let event = ServerEvent::UpdateParticipants {
            participants: vec![Participant {
                id: "abc".into(),
                display_name: "Al".into(),
                location: Location::default(),
            }],
            notice: None,
        };
        let value: Value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "action": "UPDATE_PARTICIPANTS",
                "participants": [{
                    "id": "abc",
                    "displayName": "Al",
                    "location": {"latitude": 0.0, "longitude": 0.0},
                }],
                "notice": null,
            })
        );
    }

    #[test]
    fn message_sentinel_round_trips() {
        let event = ServerEvent::DisplayClientMessage {
            message: Some("hi".into()),
            notice: None,
        };
        let value: Value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["message"], json!("hi"));
        assert_eq!(value["notice"], json!(false));

        let back: ServerEvent = serde_json::from_value(value).unwrap();
        assert_eq!(back, event);

        let empty = ServerEvent::DisplayClientMessage {
            message: None,
            notice: None,
        };
        let value: Value = serde_json::to_value(&empty).unwrap();
        assert_eq!(value["message"], json!(false));
    }

    #[test]
    fn welcome_shape() {
        let value = serde_json::to_value(ServerEvent::Welcome {
            id: "abc".into(),
            notice: "Welcome to lobby".into(),
        })
        .unwrap();
        assert_eq!(
            value,
            json!({"action": "WELCOME", "id": "abc", "notice": "Welcome to lobby"})
        );
    }
}
