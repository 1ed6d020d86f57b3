//! Signing, transport and the client that composes them.

pub mod client;
pub mod signature;
pub mod transport;

pub use client::{now_ms, PubSubClient};
pub use signature::{compute_signature, verify_signature, SignatureAlgorithm};
pub use transport::{RequestHook, Transport};
