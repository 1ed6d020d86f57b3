//! Broker client settings: server URL, shared token, transport options.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::services::signature::SignatureAlgorithm;

/// Environment variable holding the broker URL (with path).
pub const SERVER_ENV: &str = "PRIVATE_PUB_SERVER";
/// Environment variable holding the shared secret token.
pub const TOKEN_ENV: &str = "PRIVATE_PUB_TOKEN";
pub const SIGNATURE_EXPIRATION_ENV: &str = "PRIVATE_PUB_SIGNATURE_EXPIRATION";
pub const VERIFY_TLS_ENV: &str = "PRIVATE_PUB_VERIFY_TLS";
pub const TIMEOUT_ENV: &str = "PRIVATE_PUB_TIMEOUT_SECS";
pub const PROXY_ENV: &str = "PRIVATE_PUB_PROXY";
pub const ALGORITHM_ENV: &str = "PRIVATE_PUB_SIGNATURE_ALGORITHM";

/// Settings for [`PubSubClient`](crate::PubSubClient).
///
/// Built once per process and treated as immutable afterwards. `server` and
/// `token` are required; [`ClientConfig::validate`] runs when the client is
/// constructed, so a half-configured client never performs I/O.
#[derive(Clone)]
pub struct ClientConfig {
    /// Broker URL, including the mount path (e.g. `https://faye.example.com/faye`).
    pub server: String,
    /// Secret shared with the broker. Authenticates publishers and signs subscriptions.
    pub token: String,
    /// Seconds a subscription signature stays valid. `None` means no expiry;
    /// enforcement belongs to the broker.
    pub signature_expiration: Option<u64>,
    /// Verify the broker's TLS certificate and host name.
    pub verify_tls: bool,
    /// Overall timeout for one publish round-trip.
    pub request_timeout: Option<Duration>,
    /// Proxy URL applied to every broker request.
    pub proxy: Option<String>,
    /// Digest used for subscription signatures. Must match the broker.
    pub algorithm: SignatureAlgorithm,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            token: String::new(),
            signature_expiration: None,
            verify_tls: true,
            request_timeout: None,
            proxy: None,
            algorithm: SignatureAlgorithm::default(),
        }
    }
}

// Keeps the token out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server", &self.server)
            .field("token", &"<redacted>")
            .field("signature_expiration", &self.signature_expiration)
            .field("verify_tls", &self.verify_tls)
            .field("request_timeout", &self.request_timeout)
            .field("proxy", &self.proxy)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(server: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    /// Zero is treated as "no expiry".
    pub fn with_signature_expiration(mut self, seconds: u64) -> Self {
        self.signature_expiration = (seconds > 0).then_some(seconds);
        self
    }

    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Fill an empty `server` or `token` from `PRIVATE_PUB_SERVER` / `PRIVATE_PUB_TOKEN`.
    pub fn with_env_defaults(self) -> Self {
        self.with_defaults_from(|name| std::env::var(name).ok())
    }

    /// Fill an empty `server` or `token` from `lookup`. Values set explicitly are kept.
    pub fn with_defaults_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.server.trim().is_empty() {
            if let Some(server) = lookup(SERVER_ENV) {
                debug!(var = SERVER_ENV, "broker server taken from environment");
                self.server = server;
            }
        }
        if self.token.trim().is_empty() {
            if let Some(token) = lookup(TOKEN_ENV) {
                debug!(var = TOKEN_ENV, "broker token taken from environment");
                self.token = token;
            }
        }
        self
    }

    /// Check that both required settings are present.
    pub fn validate(&self) -> AppResult<()> {
        if self.server.trim().is_empty() {
            return Err(AppError::Config(format!(
                "{} must be set to the URL of the Faye server",
                SERVER_ENV
            )));
        }
        if self.token.trim().is_empty() {
            return Err(AppError::Config(format!(
                "{} must be set to the broker's secret token",
                TOKEN_ENV
            )));
        }
        Ok(())
    }

    /// Load every setting from the process environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load every setting through `lookup` and validate the result.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default().with_defaults_from(&lookup);

        if let Some(raw) = lookup(SIGNATURE_EXPIRATION_ENV) {
            let seconds = raw.trim().parse::<u64>().map_err(|_| invalid(SIGNATURE_EXPIRATION_ENV, &raw))?;
            config = config.with_signature_expiration(seconds);
        }
        if let Some(raw) = lookup(VERIFY_TLS_ENV) {
            config.verify_tls = parse_bool(&raw).ok_or_else(|| invalid(VERIFY_TLS_ENV, &raw))?;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let seconds = raw.trim().parse::<u64>().map_err(|_| invalid(TIMEOUT_ENV, &raw))?;
            if seconds > 0 {
                config.request_timeout = Some(Duration::from_secs(seconds));
            }
        }
        if let Some(raw) = lookup(PROXY_ENV) {
            if !raw.trim().is_empty() {
                config.proxy = Some(raw.trim().to_string());
            }
        }
        if let Some(raw) = lookup(ALGORITHM_ENV) {
            config.algorithm = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn invalid(name: &str, value: &str) -> AppError {
    AppError::Config(format!("invalid value for {}: {:?}", name, value))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
