//! Subscription signatures (private_pub compatible).
//!
//! signature = hex(DIGEST(token ++ channel ++ decimal(timestamp_ms))).
//! The broker recomputes the same digest, so the algorithm is part of the
//! wire contract: stock private_pub brokers expect SHA-1.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// Digest used to sign subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureAlgorithm {
    /// 160-bit SHA-1, what private_pub brokers verify against.
    #[default]
    Sha1,
    /// SHA-256, for brokers patched to expect it.
    Sha256,
}

impl SignatureAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Sha1 => "sha1",
            SignatureAlgorithm::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(SignatureAlgorithm::Sha1),
            "sha256" => Ok(SignatureAlgorithm::Sha256),
            other => Err(AppError::Config(format!(
                "unsupported signature algorithm: {}",
                other
            ))),
        }
    }
}

/// Sign `(channel, timestamp_ms)` with the shared token. Pure; an empty channel is allowed.
pub fn compute_signature(
    algorithm: SignatureAlgorithm,
    token: &str,
    channel: &str,
    timestamp_ms: i64,
) -> String {
    let payload = format!("{}{}{}", token, channel, timestamp_ms);
    match algorithm {
        SignatureAlgorithm::Sha1 => hex::encode(Sha1::digest(payload.as_bytes())),
        SignatureAlgorithm::Sha256 => hex::encode(Sha256::digest(payload.as_bytes())),
    }
}

/// Check a signature produced by [`compute_signature`]. Hex case is ignored.
pub fn verify_signature(
    algorithm: SignatureAlgorithm,
    token: &str,
    channel: &str,
    timestamp_ms: i64,
    signature: &str,
) -> bool {
    compute_signature(algorithm, token, channel, timestamp_ms).eq_ignore_ascii_case(signature)
}
