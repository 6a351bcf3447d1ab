//! API key loading
//!
//! Keys arrive in one of three shapes: an inline JSON object, a key file
//! on disk, or the base64 wrapped JSON handed out by the console. All of
//! them normalize into the same [`ApiKey`] pair.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Environment variable holding a base64 encoded API key.
pub const APIKEY_ENV: &str = "BOONAI_APIKEY";

/// Environment variable holding a path to an API key file.
pub const APIKEY_FILE_ENV: &str = "BOONAI_APIKEY_FILE";

/// A normalized Boon AI API key.
///
/// The access key identifies the caller inside signed token claims, the
/// secret key signs them.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    /// Public identifier of the key.
    pub access_key: String,
    /// Signing secret. Never sent over the wire.
    pub secret_key: String,
}

impl ApiKey {
    /// Create a key from its two components.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Load a key from the process environment.
    ///
    /// Checks `BOONAI_APIKEY` (base64) first, then `BOONAI_APIKEY_FILE`
    /// (path to a key file). Returns `Ok(None)` when neither is set.
    pub fn from_env() -> Result<Option<Self>> {
        if let Ok(encoded) = env::var(APIKEY_ENV) {
            return ApiKeySource::Base64(encoded).load().map(Some);
        }
        if let Ok(path) = env::var(APIKEY_FILE_ENV) {
            return ApiKeySource::File(PathBuf::from(path)).load().map(Some);
        }
        Ok(None)
    }
}

// Keeps the secret out of logs and panic messages.
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Source forms an API key can be loaded from.
#[derive(Debug, Clone)]
pub enum ApiKeySource {
    /// An already-decoded JSON object with `accessKey` and `secretKey`.
    Json(JsonValue),
    /// Path to a JSON key file on disk.
    File(PathBuf),
    /// Base64 encoded key JSON, as copied from the console.
    Base64(String),
}

impl ApiKeySource {
    /// Decode this source into a normalized [`ApiKey`].
    ///
    /// Any malformed input maps to [`Error::InvalidApiKey`] with a message
    /// naming what went wrong.
    pub fn load(&self) -> Result<ApiKey> {
        match self {
            ApiKeySource::Json(value) => serde_json::from_value(value.clone())
                .map_err(|e| Error::invalid_api_key(format!("key object is malformed: {e}"))),

            ApiKeySource::File(path) => {
                let data = fs::read(path).map_err(|e| {
                    Error::invalid_api_key(format!("cannot read key file {}: {e}", path.display()))
                })?;
                serde_json::from_slice(&data)
                    .map_err(|e| Error::invalid_api_key(format!("key file is malformed: {e}")))
            }

            ApiKeySource::Base64(encoded) => {
                let raw = BASE64
                    .decode(encoded.trim())
                    .map_err(|e| Error::invalid_api_key(format!("key is not valid base64: {e}")))?;
                serde_json::from_slice(&raw)
                    .map_err(|e| Error::invalid_api_key(format!("decoded key is malformed: {e}")))
            }
        }
    }
}

