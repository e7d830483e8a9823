//! HTTP communication with the inventory API
//!
//! Steps build [`ApiRequest`] values and hand them to a [`Transport`];
//! [`HttpClient`] is the reqwest-backed implementation used by the CLI.

pub mod client;
pub mod protocol;

#[cfg(test)]
pub(crate) mod scripted;

pub use client::{HttpClient, Transport};
pub use protocol::{ApiRequest, ApiResponse};
