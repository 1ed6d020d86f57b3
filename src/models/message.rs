//! Publish-time wire messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppResult;

/// What gets pushed to subscribers.
///
/// The broker's browser library evaluates `eval` payloads as script and hands
/// `data` payloads to the channel callback. Exactly one of the two keys is
/// present in a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    #[serde(rename = "eval")]
    Literal(String),
    #[serde(rename = "data")]
    Structured(Value),
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::Literal(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::Literal(s)
    }
}

/// JSON values are always structured, including JSON strings.
impl From<Value> for Payload {
    fn from(v: Value) -> Self {
        Payload::Structured(v)
    }
}

/// Message sent to the broker:
/// `{"channel", "data": {"channel", "eval"|"data"}, "ext": {"private_pub_token"}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Routing channel, read by the broker.
    pub channel: String,
    pub data: EnvelopeData,
    pub ext: EnvelopeExt,
}

/// Body forwarded to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeData {
    pub channel: String,
    #[serde(flatten)]
    pub payload: Payload,
}

/// Publisher authentication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeExt {
    pub private_pub_token: String,
}

impl Envelope {
    pub fn new(channel: &str, payload: Payload, token: &str) -> Self {
        Self {
            channel: channel.to_string(),
            data: EnvelopeData {
                channel: channel.to_string(),
                payload,
            },
            ext: EnvelopeExt {
                private_pub_token: token.to_string(),
            },
        }
    }

    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Payload for the bridge's HTTP API to publish a message:
/// `{"channel": "...", "eval": "..."}` or `{"channel": "...", "data": <json>}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishRequest {
    pub channel: String,
    #[serde(flatten)]
    pub payload: Payload,
}

/// What the broker answered. The body is opaque; the status is reported, not interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishResponse {
    pub status: u16,
    pub body: String,
}

impl PublishResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
