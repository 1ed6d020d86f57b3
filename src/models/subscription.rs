//! Subscribe-time payloads handed to the browser library.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AppResult;

/// Keys the protocol owns. Caller extras never overwrite them.
pub const RESERVED_FIELDS: [&str; 4] = ["server", "timestamp", "channel", "signature"];

/// What a caller asks to have signed: a channel plus optional extra fields
/// that travel alongside the signature to the browser.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub channel: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubscriptionRequest {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl From<&str> for SubscriptionRequest {
    fn from(channel: &str) -> Self {
        Self::new(channel)
    }
}

impl From<String> for SubscriptionRequest {
    fn from(channel: String) -> Self {
        Self::new(channel)
    }
}

/// Signed subscription, serialized as
/// `{"server": "...", "timestamp": <ms>, "channel": "...", "signature": "<hex>", ...extra}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedSubscription {
    pub server: String,
    /// Milliseconds since the Unix epoch at signing time. Part of the signed payload.
    #[serde(rename = "timestamp")]
    pub timestamp_ms: i64,
    pub channel: String,
    pub signature: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SignedSubscription {
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Browser snippet that hands this subscription to the private_pub client:
    /// `PrivatePub.sign({...});`.
    ///
    /// `<` and the JS line separators are escaped so the snippet is safe to
    /// inline inside a `<script>` element.
    pub fn to_script(&self) -> AppResult<String> {
        let json = self
            .to_json()?
            .replace('<', "\\u003c")
            .replace('\u{2028}', "\\u2028")
            .replace('\u{2029}', "\\u2029");
        Ok(format!("PrivatePub.sign({});", json))
    }
}
