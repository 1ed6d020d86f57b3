//! Wire models: signed subscriptions and publish envelopes.

pub mod message;
pub mod subscription;

pub use message::*;
pub use subscription::*;
