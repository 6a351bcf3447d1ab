//! HTTP client module
//!
//! Provides the blocking client the rest of the SDK is built on.
//!
//! # Features
//!
//! - **Signed Requests**: Fresh HS512 bearer token per attempt
//! - **Connection Retries**: Randomized backoff for socket-level failures
//! - **Typed Responses**: JSON decoding into caller-chosen types
//! - **File Transfer**: Multipart uploads and streaming downloads

mod client;
mod retry;

pub use client::{
    BoonClient, ClientConfig, ClientConfigBuilder, DEFAULT_SERVER, PROJECT_ENV, SERVER_ENV,
};

#[cfg(test)]
mod tests;
