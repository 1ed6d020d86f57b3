//! HTTP request handlers for the bridge service.

pub mod http;

pub use http::*;
