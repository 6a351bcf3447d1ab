//! Tests for the HTTP client module

use super::retry::{retry_delay, with_connection_retry, MAX_BACKOFF_SECS};
use super::*;
use crate::auth::{ApiKey, APIKEY_ENV, APIKEY_FILE_ENV};
use crate::error::Error;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use mockito::Matcher;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::env;
use std::io::Write as IoWrite;
use std::net::TcpListener;
use std::time::Duration;

/// A bearer header carrying a three-segment JWT.
const BEARER_JWT: &str = r"^Bearer [A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+$";

fn test_client(server_url: &str) -> BoonClient {
    let config = ClientConfig::builder()
        .server(server_url)
        .max_retries(1)
        .build();
    BoonClient::new(Some(ApiKey::new("access-abc", "secret-xyz")), config).unwrap()
}

/// Produce a real connection-level error by dialing a port nobody
/// listens on.
fn connection_error() -> Error {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = reqwest::blocking::Client::new()
        .get(format!("http://{addr}/"))
        .send()
        .unwrap_err();
    Error::connection(err)
}

#[test]
fn test_client_config_default() {
    let config = ClientConfig::default();
    assert_eq!(config.server, DEFAULT_SERVER);
    assert_eq!(config.max_retries, 3);
    assert!(config.project_id.is_none());
    assert!(config.timeout.is_none());
    assert!(config.verify_tls);
}

#[test]
fn test_client_config_builder() {
    let config = ClientConfig::builder()
        .server("https://api.example.com")
        .project_id("proj-1")
        .max_retries(5)
        .timeout(Duration::from_secs(30))
        .verify_tls(false)
        .build();

    assert_eq!(config.server, "https://api.example.com");
    assert_eq!(config.project_id, Some("proj-1".to_string()));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    assert!(!config.verify_tls);
}

#[test]
fn test_client_rejects_invalid_server_url() {
    let config = ClientConfig::builder().server("not a url").build();
    let result = BoonClient::new(None, config);
    assert!(matches!(result, Err(Error::InvalidUrl(_))));
}

#[test]
fn test_client_accessors() {
    let config = ClientConfig::builder()
        .server("https://api.example.com")
        .project_id("proj-1")
        .build();
    let client = BoonClient::new(Some(ApiKey::new("a", "s")), config).unwrap();
    assert_eq!(client.server(), "https://api.example.com");
    assert_eq!(client.project_id(), Some("proj-1"));
    assert!(client.has_apikey());

    let config = ClientConfig::builder()
        .server("https://api.example.com")
        .build();
    let client = BoonClient::new(None, config).unwrap();
    assert!(!client.has_apikey());
}

#[test]
fn test_client_get_json() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v3/assets/abc-123")
        .match_header("authorization", Matcher::Regex(BEARER_JWT.to_string()))
        .match_header("content-type", "application/json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": "abc-123", "document": {"source": {"filename": "dog.jpg"}}}"#)
        .create();

    let client = test_client(&server.url());
    let asset: serde_json::Value = client.get("/api/v3/assets/abc-123", None).unwrap();

    mock.assert();
    assert_eq!(asset["id"], "abc-123");
    assert_eq!(asset["document"]["source"]["filename"], "dog.jpg");
}

#[test]
fn test_client_post_sends_body() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/v3/datasets")
        .match_body(Matcher::Json(json!({"name": "pets", "type": "Classification"})))
        .with_status(200)
        .with_body(r#"{"id": "ds-1", "name": "pets"}"#)
        .create();

    let client = test_client(&server.url());
    let body = json!({"name": "pets", "type": "Classification"});
    let created: serde_json::Value = client.post("/api/v3/datasets", Some(&body)).unwrap();

    mock.assert();
    assert_eq!(created["id"], "ds-1");
}

#[test]
fn test_client_verbs_route_methods() {
    let mut server = mockito::Server::new();
    let put = server
        .mock("PUT", "/api/v3/models/m1")
        .with_status(200)
        .with_body("{}")
        .create();
    let patch = server
        .mock("PATCH", "/api/v3/models/m1")
        .with_status(200)
        .with_body("{}")
        .create();
    let delete = server
        .mock("DELETE", "/api/v3/models/m1")
        .with_status(200)
        .with_body("{}")
        .create();

    let client = test_client(&server.url());
    let _: serde_json::Value = client.put("/api/v3/models/m1", None).unwrap();
    let _: serde_json::Value = client.patch("/api/v3/models/m1", None).unwrap();
    let _: serde_json::Value = client.delete("/api/v3/models/m1", None).unwrap();

    put.assert();
    patch.assert();
    delete.assert();
}

#[test]
fn test_url_join_normalizes_slashes() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v3/projects")
        .with_status(200)
        .with_body("{}")
        .create();

    // Trailing slash on the server, leading slash on the path
    let client = test_client(&format!("{}/", server.url()));
    let _: serde_json::Value = client.get("/api/v3/projects", None).unwrap();

    mock.assert();
}

#[test]
fn test_empty_body_decodes_as_null() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("GET", "/api/v3/assets/_files")
        .with_status(200)
        .with_body("")
        .create();

    let client = test_client(&server.url());
    let value: serde_json::Value = client.get("/api/v3/assets/_files", None).unwrap();
    assert!(value.is_null());

    let nothing: Option<String> = client.get("/api/v3/assets/_files", None).unwrap();
    assert_eq!(nothing, None);
}

#[test]
fn test_missing_apikey_fails_before_network() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v3/projects")
        .with_status(200)
        .expect(0)
        .create();

    let config = ClientConfig::builder().server(server.url()).build();
    let client = BoonClient::new(None, config).unwrap();
    let result: crate::error::Result<serde_json::Value> = client.get("/api/v3/projects", None);

    assert!(matches!(result, Err(Error::MissingApiKey)));
    mock.assert();
}

#[test]
fn test_404_translates_to_not_found() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("GET", "/api/v3/assets/gone")
        .with_status(404)
        .with_body(r#"{"message": "asset gone was not found", "exception": "EmptyResultDataAccessException"}"#)
        .create();

    let client = test_client(&server.url());
    let err = client
        .get::<serde_json::Value>("/api/v3/assets/gone", None)
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.endpoint(), Some("/api/v3/assets/gone"));
    assert_eq!(err.exception_type(), Some("EmptyResultDataAccessException"));
}

#[test]
fn test_409_translates_to_duplicate() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("POST", "/api/v3/datasets")
        .with_status(409)
        .with_body(r#"{"message": "dataset pets already exists"}"#)
        .create();

    let client = test_client(&server.url());
    let body = json!({"name": "pets"});
    let err = client
        .post::<serde_json::Value>("/api/v3/datasets", Some(&body))
        .unwrap_err();

    assert!(matches!(err, Error::Duplicate(_)));
    assert_eq!(err.payload().unwrap().message(), "dataset pets already exists");
}

#[test]
fn test_non_json_error_body_synthesized() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("GET", "/api/v3/health")
        .with_status(503)
        .with_body("<html>Service Unavailable</html>")
        .create();

    let client = test_client(&server.url());
    let err = client
        .get::<serde_json::Value>("/api/v3/health", None)
        .unwrap_err();

    assert!(matches!(err, Error::Request(_)));
    assert!(err.payload().unwrap().message().contains("status '503'"));
    assert_eq!(err.endpoint(), Some("/api/v3/health"));
}

#[test]
fn test_non_200_success_statuses_are_errors() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("POST", "/api/v3/jobs")
        .with_status(201)
        .with_body(r#"{"id": "job-1"}"#)
        .create();

    let client = test_client(&server.url());
    let body = json!({"name": "reprocess"});
    let err = client
        .post::<serde_json::Value>("/api/v3/jobs", Some(&body))
        .unwrap_err();

    assert!(matches!(err, Error::Request(_)));
    assert_eq!(err.status(), Some(201));
}

#[test]
fn test_http_errors_never_retried() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/api/v3/flaky")
        .with_status(500)
        .with_body(r#"{"message": "boom"}"#)
        .expect(1)
        .create();

    let config = ClientConfig::builder()
        .server(server.url())
        .max_retries(3)
        .build();
    let client = BoonClient::new(Some(ApiKey::new("a", "s")), config).unwrap();
    let err = client
        .get::<serde_json::Value>("/api/v3/flaky", None)
        .unwrap_err();

    assert!(matches!(err, Error::InvalidRequest(_)));
    // A single hit: failure statuses surface immediately
    mock.assert();
}

#[test]
fn test_connection_error_is_retryable() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = test_client(&format!("http://{addr}"));
    let err = client
        .get::<serde_json::Value>("/api/v3/projects", None)
        .unwrap_err();

    assert!(matches!(err, Error::Connection(_)));
    assert!(err.is_retryable());
}

#[test]
fn test_download_writes_bytes() {
    let payload = "raw file bytes, not JSON";
    let mut server = mockito::Server::new();
    let _m = server
        .mock("GET", "/api/v3/files/_stream/f1")
        .with_status(200)
        .with_header("content-type", "application/octet-stream")
        .with_body(payload)
        .create();

    let client = test_client(&server.url());
    let mut sink = Vec::new();
    let copied = client.download("/api/v3/files/_stream/f1", &mut sink).unwrap();

    assert_eq!(copied, payload.len() as u64);
    assert_eq!(sink, payload.as_bytes());
}

#[test]
fn test_download_failure_translates_status() {
    let mut server = mockito::Server::new();
    let _m = server
        .mock("GET", "/api/v3/files/_stream/missing")
        .with_status(404)
        .with_body(r#"{"message": "no such file"}"#)
        .create();

    let client = test_client(&server.url());
    let mut sink = Vec::new();
    let err = client
        .download("/api/v3/files/_stream/missing", &mut sink)
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert!(sink.is_empty());
}

#[test]
fn test_upload_file_multipart() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"fake image bytes 123").unwrap();

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/v3/assets/_batch_upload")
        .match_header("authorization", Matcher::Regex(BEARER_JWT.to_string()))
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data".to_string()),
        )
        .match_body(Matcher::Regex("fake image bytes 123".to_string()))
        .with_status(200)
        .with_body(r#"{"status": [{"assetId": "abc"}]}"#)
        .create();

    let client = test_client(&server.url());
    let body = json!({"analysis": ["boonai-label-detection"]});
    let result: serde_json::Value = client
        .upload_file("/api/v3/assets/_batch_upload", file.path(), &body)
        .unwrap();

    mock.assert();
    assert_eq!(result["status"][0]["assetId"], "abc");
}

#[test]
fn test_upload_includes_body_part() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"content").unwrap();

    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/v3/datasets/_import")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="files""#.to_string()),
            Matcher::Regex(r#"name="body""#.to_string()),
            Matcher::Regex(r#"\{"kind":"dataset"\}"#.to_string()),
        ]))
        .with_status(200)
        .with_body("{}")
        .create();

    let client = test_client(&server.url());
    let body = json!({"kind": "dataset"});
    let _: serde_json::Value = client
        .upload_files("/api/v3/datasets/_import", &[file.path()], &body)
        .unwrap();

    mock.assert();
}

#[test]
fn test_client_debug_hides_key_material() {
    let client = test_client("https://api.example.com");
    let rendered = format!("{client:?}");
    assert!(rendered.contains("BoonClient"));
    assert!(rendered.contains("api.example.com"));
    assert!(!rendered.contains("secret-xyz"));
}

// ============================================================================
// Environment
// ============================================================================

#[test]
fn test_project_env_fallback_ignores_empty() {
    let _env = crate::test_env::lock();
    env::set_var(PROJECT_ENV, "");
    let client = test_client("https://api.example.com");
    assert_eq!(client.project_id(), None);

    env::set_var(PROJECT_ENV, "proj-env");
    let client = test_client("https://api.example.com");
    assert_eq!(client.project_id(), Some("proj-env"));

    // Explicit config wins over the environment
    let config = ClientConfig::builder()
        .server("https://api.example.com")
        .project_id("proj-cfg")
        .build();
    let client = BoonClient::new(Some(ApiKey::new("a", "s")), config).unwrap();
    assert_eq!(client.project_id(), Some("proj-cfg"));

    env::remove_var(PROJECT_ENV);
}

#[test]
fn test_client_from_env_reads_server_and_key() {
    let _env = crate::test_env::lock();
    env::remove_var(APIKEY_FILE_ENV);
    env::set_var(
        APIKEY_ENV,
        BASE64.encode(br#"{"accessKey": "env-access", "secretKey": "env-secret"}"#),
    );
    env::set_var(SERVER_ENV, "https://env.example.com");

    let client = BoonClient::from_env().unwrap();
    assert_eq!(client.server(), "https://env.example.com");
    assert!(client.has_apikey());

    // Empty and unset server values both fall back to the default
    env::set_var(SERVER_ENV, "");
    let client = BoonClient::from_env().unwrap();
    assert_eq!(client.server(), DEFAULT_SERVER);

    env::remove_var(SERVER_ENV);
    env::remove_var(APIKEY_ENV);
    let client = BoonClient::from_env().unwrap();
    assert_eq!(client.server(), DEFAULT_SERVER);
    assert!(!client.has_apikey());
}

// ============================================================================
// Retry loop
// ============================================================================

#[test]
fn test_retry_returns_first_success() {
    let mut attempts = 0;
    let mut sleeps = 0;
    let result = with_connection_retry(
        "target",
        3,
        |_| sleeps += 1,
        || {
            attempts += 1;
            Ok(42)
        },
    );

    assert_eq!(result.unwrap(), 42);
    assert_eq!(attempts, 1);
    assert_eq!(sleeps, 0);
}

#[test]
fn test_retry_gives_up_after_max_attempts() {
    let mut attempts = 0;
    let mut waits = Vec::new();
    let result: crate::error::Result<()> = with_connection_retry(
        "target",
        3,
        |wait| waits.push(wait),
        || {
            attempts += 1;
            Err(connection_error())
        },
    );

    let err = result.unwrap_err();
    assert!(matches!(err, Error::Connection(_)));
    // Exactly three attempts, with a wait between each pair
    assert_eq!(attempts, 3);
    assert_eq!(waits.len(), 2);
    for wait in waits {
        assert!(wait >= Duration::from_secs(1));
        assert!(wait <= Duration::from_secs(MAX_BACKOFF_SECS));
    }
}

#[test]
fn test_retry_zero_means_unbounded() {
    let mut attempts = 0;
    let result = with_connection_retry(
        "target",
        0,
        |_| {},
        || {
            attempts += 1;
            if attempts <= 5 {
                Err(connection_error())
            } else {
                Ok("done")
            }
        },
    );

    assert_eq!(result.unwrap(), "done");
    assert_eq!(attempts, 6);
}

#[test]
fn test_retry_skips_non_connection_errors() {
    let mut attempts = 0;
    let mut sleeps = 0;
    let result: crate::error::Result<()> = with_connection_retry(
        "target",
        5,
        |_| sleeps += 1,
        || {
            attempts += 1;
            Err(Error::MissingApiKey)
        },
    );

    assert!(matches!(result.unwrap_err(), Error::MissingApiKey));
    assert_eq!(attempts, 1);
    assert_eq!(sleeps, 0);
}

#[test]
fn test_retry_delay_bounds() {
    let mut rng = rand::rng();
    for _ in 0..500 {
        let wait = retry_delay(&mut rng);
        assert!(wait >= Duration::from_secs(1));
        assert!(wait <= Duration::from_secs(MAX_BACKOFF_SECS));
    }
}
