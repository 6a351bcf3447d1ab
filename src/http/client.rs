//! Boon AI API client
//!
//! Provides a blocking client that handles:
//! - Request signing with short-lived bearer tokens
//! - Automatic retries for connection-level failures
//! - Response body parsing into caller-chosen types
//! - Translation of failure statuses into typed errors

use super::retry::with_connection_retry;
use crate::auth::{sign_token, ApiKey, ExecutionContext};
use crate::error::{self, Error, Result};
use crate::pagination::SearchScroller;
use crate::types::{JsonValue, OptionStringExt};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::env;
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default API server.
pub const DEFAULT_SERVER: &str = "https://api.boonai.app";

/// Environment variable overriding the API server.
pub const SERVER_ENV: &str = "BOONAI_SERVER";

/// Environment variable supplying a default project id.
pub const PROJECT_ENV: &str = "BOONAI_PROJECT";

/// Configuration for [`BoonClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API server
    pub server: String,
    /// Project to scope signed tokens to, for keys spanning projects
    pub project_id: Option<String>,
    /// Maximum connection attempts per request, 0 for unlimited
    pub max_retries: u32,
    /// Per-request timeout; `None` waits on the server indefinitely
    pub timeout: Option<Duration>,
    /// Verify TLS certificates
    pub verify_tls: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            project_id: None,
            max_retries: 3,
            timeout: None,
            verify_tls: true,
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for client config
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the API server URL
    pub fn server(mut self, server: impl Into<String>) -> Self {
        self.config.server = server.into();
        self
    }

    /// Scope signed tokens to a project
    pub fn project_id(mut self, project_id: impl Into<String>) -> Self {
        self.config.project_id = Some(project_id.into());
        self
    }

    /// Set max connection attempts per request, 0 for unlimited
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Enable or disable TLS certificate verification
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.config.verify_tls = verify;
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// Blocking client for the Boon AI REST API
///
/// Every call runs on the caller's thread: requests, retries and paged
/// iteration all block until they complete. The client holds no mutable
/// state after construction.
pub struct BoonClient {
    client: Client,
    server: String,
    apikey: Option<ApiKey>,
    project_id: Option<String>,
    max_retries: u32,
}

impl BoonClient {
    /// Create a client from an already-loaded API key.
    ///
    /// A missing key is allowed here; requests will fail with
    /// [`Error::MissingApiKey`] before touching the network. The project
    /// id falls back to `BOONAI_PROJECT` when the config leaves it unset;
    /// an empty value counts as unset.
    pub fn new(apikey: Option<ApiKey>, config: ClientConfig) -> Result<Self> {
        Url::parse(&config.server)?;

        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(Error::http)?;

        let project_id = config
            .project_id
            .or_else(|| env::var(PROJECT_ENV).ok().none_if_empty());

        Ok(Self {
            client,
            server: config.server,
            apikey,
            project_id,
            max_retries: config.max_retries,
        })
    }

    /// Create a client entirely from the process environment.
    ///
    /// Reads `BOONAI_SERVER` for the server URL, `BOONAI_APIKEY` or
    /// `BOONAI_APIKEY_FILE` for the key, and `BOONAI_PROJECT` for the
    /// project scope. An empty server value counts as unset.
    pub fn from_env() -> Result<Self> {
        let apikey = ApiKey::from_env()?;
        let config = ClientConfig {
            server: env::var(SERVER_ENV)
                .ok()
                .none_if_empty()
                .unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            ..ClientConfig::default()
        };
        Self::new(apikey, config)
    }

    /// The configured server URL
    pub fn server(&self) -> &str {
        &self.server
    }

    /// The project id signed tokens are scoped to, if any
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Whether an API key is configured
    pub fn has_apikey(&self) -> bool {
        self.apikey.is_some()
    }

    /// Make a GET request and parse the JSON response
    pub fn get<T: DeserializeOwned>(&self, path: &str, body: Option<&JsonValue>) -> Result<T> {
        self.request(Method::GET, path, body)
    }

    /// Make a POST request and parse the JSON response
    pub fn post<T: DeserializeOwned>(&self, path: &str, body: Option<&JsonValue>) -> Result<T> {
        self.request(Method::POST, path, body)
    }

    /// Make a PUT request and parse the JSON response
    pub fn put<T: DeserializeOwned>(&self, path: &str, body: Option<&JsonValue>) -> Result<T> {
        self.request(Method::PUT, path, body)
    }

    /// Make a DELETE request and parse the JSON response
    pub fn delete<T: DeserializeOwned>(&self, path: &str, body: Option<&JsonValue>) -> Result<T> {
        self.request(Method::DELETE, path, body)
    }

    /// Make a PATCH request and parse the JSON response
    pub fn patch<T: DeserializeOwned>(&self, path: &str, body: Option<&JsonValue>) -> Result<T> {
        self.request(Method::PATCH, path, body)
    }

    /// Make a generic request and parse the JSON response
    pub fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&JsonValue>,
    ) -> Result<T> {
        let response = self.send(method, path, body)?;
        self.decode_response(response)
    }

    /// Make a generic request, returning the raw response.
    ///
    /// The status has already been checked: any non-200 response comes
    /// back as a typed error, so the returned response body is safe to
    /// stream or decode however the caller likes.
    pub fn send(&self, method: Method, path: &str, body: Option<&JsonValue>) -> Result<Response> {
        let apikey = self.require_apikey()?;
        let url = self.full_url(path);
        let payload = body.map(serde_json::to_string).transpose()?;

        if let Some(ref data) = payload {
            debug!("Request: {} {} body: {}", method, url, data);
        } else {
            debug!("Request: {} {}", method, url);
        }

        let response = with_connection_retry(
            &url,
            self.max_retries,
            thread::sleep,
            || {
                // Tokens are short-lived, so each attempt signs its own.
                let token = sign_token(
                    apikey,
                    &self.server,
                    self.project_id.as_deref(),
                    &ExecutionContext::from_env(),
                )?;
                let mut request = self
                    .client
                    .request(method.clone(), &url)
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .header(CONTENT_TYPE, "application/json");
                if let Some(ref data) = payload {
                    request = request.body(data.clone());
                }
                request.send().map_err(Error::connection)
            },
        )?;

        self.check_status(response, path)
    }

    /// Upload a single file with a JSON body document.
    pub fn upload_file<T: DeserializeOwned>(
        &self,
        path: &str,
        file: impl AsRef<Path>,
        body: &JsonValue,
    ) -> Result<T> {
        self.upload_files(path, &[file], body)
    }

    /// Upload files as one multipart POST request.
    ///
    /// Each file becomes a `files` part and the JSON document rides along
    /// as the `body` part. Uploads are never retried: the multipart form
    /// is consumed by the first attempt.
    pub fn upload_files<T: DeserializeOwned>(
        &self,
        path: &str,
        files: &[impl AsRef<Path>],
        body: &JsonValue,
    ) -> Result<T> {
        let apikey = self.require_apikey()?;
        let url = self.full_url(path);

        let mut form = Form::new();
        for file in files {
            form = form.file("files", file)?;
        }
        let document = Part::text(serde_json::to_string(body)?)
            .mime_str("application/json")
            .map_err(Error::http)?;
        form = form.part("body", document);

        debug!("Upload: POST {} files: {}", url, files.len());

        let token = sign_token(
            apikey,
            &self.server,
            self.project_id.as_deref(),
            &ExecutionContext::from_env(),
        )?;
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .multipart(form)
            .send()
            .map_err(Error::connection)?;

        let response = self.check_status(response, path)?;
        self.decode_response(response)
    }

    /// Stream a GET response body into a writer, returning bytes copied.
    pub fn download(&self, path: &str, dst: &mut dyn Write) -> Result<u64> {
        let mut response = self.send(Method::GET, path, None)?;
        response.copy_to(dst).map_err(Error::http)
    }

    /// Lazily iterate the results of a search endpoint.
    ///
    /// The search body must be a JSON object (or null); the client owns a
    /// copy and injects the page cursor into it before every request. An
    /// optional `limit` caps how many items come back in total.
    pub fn iter_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        search: JsonValue,
        limit: Option<u64>,
    ) -> SearchScroller<'_, T> {
        SearchScroller::new(self, path, search, limit)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn require_apikey(&self) -> Result<&ApiKey> {
        self.apikey.as_ref().ok_or(Error::MissingApiKey)
    }

    /// Join the configured server with an endpoint path.
    fn full_url(&self, path: &str) -> String {
        let server = self.server.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{server}/{path}")
    }

    /// Translate failure statuses; hand successful responses back.
    fn check_status(&self, response: Response, endpoint: &str) -> Result<Response> {
        let status = response.status();
        if status != StatusCode::OK {
            let body = response.bytes().unwrap_or_default();
            return Err(error::from_response(status.as_u16(), &body, endpoint));
        }
        Ok(response)
    }

    /// Decode a successful response body into the caller's type.
    ///
    /// Empty bodies decode as JSON null, so endpoints that answer 200
    /// with no content still work against `Value` and `Option` targets.
    fn decode_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let body = response.bytes().map_err(Error::http)?;
        if body.is_empty() {
            return serde_json::from_value(JsonValue::Null).map_err(Error::from);
        }
        debug!(
            "Response: status {} body: {}",
            status.as_u16(),
            String::from_utf8_lossy(&body)
        );
        serde_json::from_slice(&body).map_err(Error::from)
    }
}

impl std::fmt::Debug for BoonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoonClient")
            .field("server", &self.server)
            .field("project_id", &self.project_id)
            .field("max_retries", &self.max_retries)
            .field("has_apikey", &self.apikey.is_some())
            .finish_non_exhaustive()
    }
}
