//! Client for private_pub style Faye brokers.
//!
//! Signs time-stamped channel subscriptions that browsers present to the
//! broker, and publishes messages to channels over HTTP. Also ships a small
//! axum bridge so non-Rust backends can sign and publish through one service.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

pub use config::{ClientConfig, Config};
pub use error::{AppError, AppResult};
pub use handlers::http::AppState;
pub use models::{Envelope, Payload, PublishResponse, SignedSubscription, SubscriptionRequest};
pub use services::{PubSubClient, RequestHook, SignatureAlgorithm};

use axum::routing::{get, post};
use handlers::http;
use tower_http::trace::TraceLayer;

/// Build the bridge router (health, subscriptions, publish). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let api_routes = axum::Router::new()
        .route("/subscriptions", post(http::sign_subscription))
        .route("/publish", post(http::publish));

    axum::Router::new()
        .route("/health", get(http::health))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
