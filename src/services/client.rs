//! The private_pub client: signs browser subscriptions and publishes messages.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{AppError, AppResult};
use crate::models::message::{Envelope, Payload, PublishResponse};
use crate::models::subscription::{SignedSubscription, SubscriptionRequest, RESERVED_FIELDS};
use crate::services::signature::{compute_signature, verify_signature};
use crate::services::transport::{RequestHook, Transport};

/// Client for a private_pub (Faye) broker.
///
/// Holds only immutable configuration and a shared HTTP client, so clones
/// and concurrent calls need no locking. Every publish is one POST with no
/// retry; callers own retry policy.
#[derive(Clone)]
pub struct PubSubClient {
    config: Arc<ClientConfig>,
    transport: Transport,
}

impl PubSubClient {
    /// Validate `config` and build the client. Fails with [`AppError::Config`]
    /// when `server` or `token` is missing.
    ///
    /// Nothing is read from the environment here; pass the config through
    /// [`ClientConfig::with_env_defaults`] first to fall back to
    /// `PRIVATE_PUB_SERVER` / `PRIVATE_PUB_TOKEN`.
    pub fn new(config: ClientConfig) -> AppResult<Self> {
        config.validate()?;
        let transport = Transport::new(&config)?;
        info!(
            server = %transport.server(),
            algorithm = %config.algorithm,
            verify_tls = config.verify_tls,
            "private_pub client configured"
        );
        Ok(Self {
            config: Arc::new(config),
            transport,
        })
    }

    /// Build from `PRIVATE_PUB_*` environment variables.
    pub fn from_env() -> AppResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Install a hook that may inspect or rewrite each outgoing request.
    pub fn with_request_hook<H>(mut self, hook: H) -> Self
    where
        H: RequestHook + 'static,
    {
        self.transport = self.transport.with_hook(Arc::new(hook));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sign a subscription stamped with the current time.
    pub fn sign_subscription(&self, request: impl Into<SubscriptionRequest>) -> SignedSubscription {
        self.sign_subscription_at(request, now_ms())
    }

    /// Sign a subscription stamped with `timestamp_ms`.
    ///
    /// Extra fields are copied into the result, except the reserved protocol
    /// keys which always come from the client.
    pub fn sign_subscription_at(
        &self,
        request: impl Into<SubscriptionRequest>,
        timestamp_ms: i64,
    ) -> SignedSubscription {
        let SubscriptionRequest { channel, mut extra } = request.into();
        for key in RESERVED_FIELDS {
            if extra.remove(key).is_some() {
                debug!(channel = %channel, field = key, "ignoring reserved subscription field");
            }
        }

        let signature = compute_signature(
            self.config.algorithm,
            &self.config.token,
            &channel,
            timestamp_ms,
        );
        debug!(channel = %channel, timestamp_ms, "subscription signed");

        SignedSubscription {
            server: self.config.server.clone(),
            timestamp_ms,
            channel,
            signature,
            extra,
        }
    }

    /// Sign a subscription and render it as a `PrivatePub.sign(...)` browser snippet.
    pub fn subscription_script(&self, request: impl Into<SubscriptionRequest>) -> AppResult<String> {
        self.sign_subscription(request).to_script()
    }

    /// Broker-side check of a signed subscription: signature must match and,
    /// when an expiration is configured, the timestamp must be recent enough.
    pub fn verify_subscription(&self, subscription: &SignedSubscription, now_ms: i64) -> AppResult<()> {
        if !verify_signature(
            self.config.algorithm,
            &self.config.token,
            &subscription.channel,
            subscription.timestamp_ms,
            &subscription.signature,
        ) {
            debug!(channel = %subscription.channel, "subscription signature mismatch");
            return Err(AppError::Auth("incorrect signature".to_string()));
        }

        if let Some(expiration) = self.config.signature_expiration {
            let window_ms = i64::try_from(expiration.saturating_mul(1000)).unwrap_or(i64::MAX);
            let oldest = now_ms.saturating_sub(window_ms);
            if subscription.timestamp_ms < oldest {
                debug!(channel = %subscription.channel, "subscription signature expired");
                return Err(AppError::Auth("signature expired".to_string()));
            }
        }

        Ok(())
    }

    /// Build the broker envelope for `channel`. Pure.
    pub fn build_message(&self, channel: &str, data: impl Into<Payload>) -> Envelope {
        Envelope::new(channel, data.into(), &self.config.token)
    }

    /// Send an envelope to the broker.
    pub async fn transmit(&self, envelope: &Envelope) -> AppResult<PublishResponse> {
        self.transport.send(envelope).await
    }

    /// Publish `data` to every browser subscribed to `channel`.
    ///
    /// Returns whatever the broker answered, whatever its status. Network,
    /// TLS and timeout failures come back as [`AppError::Transport`].
    #[instrument(skip(self, data))]
    pub async fn publish_to(
        &self,
        channel: &str,
        data: impl Into<Payload>,
    ) -> AppResult<PublishResponse> {
        let envelope = self.build_message(channel, data);
        match self.transmit(&envelope).await {
            Ok(resp) => {
                info!(channel = %channel, status = resp.status, "published");
                Ok(resp)
            }
            Err(e) => {
                warn!(channel = %channel, error = %e, "publish failed");
                Err(e)
            }
        }
    }
}

/// Current time in milliseconds, at whole-second resolution.
pub fn now_ms() -> i64 {
    Utc::now().timestamp() * 1000
}
