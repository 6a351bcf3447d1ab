//! Authentication module
//!
//! Loads API keys from their supported source forms and signs the
//! short-lived bearer token attached to every request.
//!
//! A key is loaded once at client construction and never changes
//! afterwards. Tokens are never cached: each request gets a fresh one.

mod apikey;
mod signer;

pub use apikey::{ApiKey, ApiKeySource, APIKEY_ENV, APIKEY_FILE_ENV};
pub use signer::{sign_token, Claims, ExecutionContext, JOB_ID_ENV, TASK_ID_ENV, TOKEN_LIFETIME_SECS};
