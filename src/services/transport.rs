//! HTTP delivery of envelopes to the broker.
//!
//! One form-encoded POST per publish (`message=<json>`), no retries, no
//! batching. The `reqwest::Client` is built once from [`ClientConfig`] and
//! shared by clones.

use std::sync::Arc;

use reqwest::Url;
use tracing::{debug, warn};

use crate::config::{ClientConfig, PROXY_ENV, SERVER_ENV};
use crate::error::{AppError, AppResult};
use crate::models::message::{Envelope, PublishResponse};

/// Runs on every outgoing request right before it is sent.
///
/// Gets the fully built request (URL, headers, form body) and returns the
/// request to actually send. Returning an error aborts the publish with
/// [`AppError::Hook`]; nothing reaches the network.
pub trait RequestHook: Send + Sync {
    fn prepare(&self, request: reqwest::Request) -> AppResult<reqwest::Request>;
}

impl<F> RequestHook for F
where
    F: Fn(reqwest::Request) -> AppResult<reqwest::Request> + Send + Sync,
{
    fn prepare(&self, request: reqwest::Request) -> AppResult<reqwest::Request> {
        self(request)
    }
}

#[derive(Clone)]
pub struct Transport {
    http: reqwest::Client,
    server: Url,
    hook: Option<Arc<dyn RequestHook>>,
}

impl Transport {
    pub fn new(config: &ClientConfig) -> AppResult<Self> {
        let server = Url::parse(config.server.trim())
            .map_err(|e| AppError::Config(format!("{} is not a valid URL: {}", SERVER_ENV, e)))?;

        let mut builder = reqwest::Client::builder();
        if !config.verify_tls {
            warn!(server = %server, "TLS certificate verification disabled for broker");
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| AppError::Config(format!("{} is not a valid proxy: {}", PROXY_ENV, e)))?;
            builder = builder.proxy(proxy);
        }
        let http = builder
            .build()
            .map_err(|e| AppError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            server,
            hook: None,
        })
    }

    pub fn with_hook(mut self, hook: Arc<dyn RequestHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn server(&self) -> &Url {
        &self.server
    }

    /// POST the envelope as `message=<json>`. Any HTTP status counts as delivered.
    pub async fn send(&self, envelope: &Envelope) -> AppResult<PublishResponse> {
        let message = envelope.to_json()?;
        let mut request = self
            .http
            .post(self.server.clone())
            .form(&[("message", message.as_str())])
            .build()?;

        if let Some(hook) = &self.hook {
            request = hook.prepare(request)?;
        }

        let resp = self.http.execute(request).await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        debug!(channel = %envelope.channel, status, bytes = body.len(), "broker responded");

        Ok(PublishResponse { status, body })
    }
}
