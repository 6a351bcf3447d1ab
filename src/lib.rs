//! # Boon AI SDK
//!
//! A blocking Rust client for the Boon AI visual intelligence REST API.
//!
//! ## Features
//!
//! - **Signed Requests**: Every call carries a fresh, short-lived HS512 bearer token
//! - **Connection Retries**: Socket-level failures retry with randomized backoff
//! - **Paged Search**: Lazy iteration over search endpoints with limits and cursors
//! - **Typed Errors**: Each failure status maps onto one typed error with the server payload
//! - **File Transfer**: Multipart uploads and streaming downloads
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use boonsdk::{BoonClient, ClientConfig, Result};
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     // Reads BOONAI_SERVER, BOONAI_APIKEY and BOONAI_PROJECT
//!     let client = BoonClient::from_env()?;
//!
//!     // Fetch a single entity
//!     let asset: serde_json::Value = client.get("/api/v3/assets/abc-123", None)?;
//!
//!     // Scroll a search, at most 500 results
//!     let search = json!({"query": {"term": {"source.type": "image"}}});
//!     for item in client.iter_paged::<serde_json::Value>("/api/v3/assets/_search", search, Some(500)) {
//!         let asset = item?;
//!         // Process assets
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         BoonClient                          │
//! │  get/post/put/delete/patch → T      iter_paged → items     │
//! │  upload_files → T                   download → writer      │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────┬──────────────┴─────────┬────────────────────┐
//! │     Auth     │          HTTP          │     Pagination     │
//! ├──────────────┼────────────────────────┼────────────────────┤
//! │ API Key      │ Blocking requests      │ Page cursor        │
//! │ HS512 tokens │ Connection retry       │ Lazy scrolling     │
//! │ Task context │ Status translation     │ Limits, stop flag  │
//! └──────────────┴────────────────────────┴────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the SDK
pub mod error;

/// Common types and type aliases
pub mod types;

/// API key loading and request signing
pub mod auth;

/// Blocking HTTP client
pub mod http;

/// Lazy iteration over paged searches
pub mod pagination;

// ============================================================================
// Re-exports
// ============================================================================

pub use auth::{ApiKey, ApiKeySource, ExecutionContext};
pub use error::{Error, ErrorPayload, Result};
pub use http::{BoonClient, ClientConfig, DEFAULT_SERVER};
pub use pagination::SearchScroller;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
