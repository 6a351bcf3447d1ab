//! Request token signing
//!
//! Every request carries a freshly signed HS512 bearer token. Tokens are
//! scoped to the configured server, expire after [`TOKEN_LIFETIME_SECS`],
//! and pick up the task execution context active at signing time.

use super::apikey::ApiKey;
use crate::error::Result;
use crate::types::OptionStringExt;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::env;

/// Seconds a signed request token stays valid.
pub const TOKEN_LIFETIME_SECS: i64 = 60;

/// Environment variable carrying the task id during task execution.
pub const TASK_ID_ENV: &str = "BOONAI_TASK_ID";

/// Environment variable carrying the job id during task execution.
pub const JOB_ID_ENV: &str = "BOONAI_JOB_ID";

/// Claims embedded in every request token.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Audience: the server URL this token is intended for.
    pub aud: String,
    /// Expiry as a unix timestamp.
    pub exp: i64,
    /// Access key identifying the caller.
    pub access_key: String,
    /// Project scope, for keys spanning multiple projects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Task id, when signing inside a task execution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// Job id, only attached alongside a task id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

/// Task execution context attached to token claims when the process runs
/// inside a Boon AI job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Task the process is executing.
    pub task_id: Option<String>,
    /// Job the task belongs to.
    pub job_id: Option<String>,
}

impl ExecutionContext {
    /// Read the context from the process environment.
    ///
    /// Empty values count as unset.
    pub fn from_env() -> Self {
        Self {
            task_id: env::var(TASK_ID_ENV).ok().none_if_empty(),
            job_id: env::var(JOB_ID_ENV).ok().none_if_empty(),
        }
    }
}

/// Sign a short-lived bearer token for one request.
///
/// The job id is only attached when a task id is present; a job id on its
/// own identifies nothing.
pub fn sign_token(
    apikey: &ApiKey,
    server: &str,
    project_id: Option<&str>,
    context: &ExecutionContext,
) -> Result<String> {
    let claims = Claims {
        aud: server.to_string(),
        exp: Utc::now().timestamp() + TOKEN_LIFETIME_SECS,
        access_key: apikey.access_key.clone(),
        project_id: project_id.map(str::to_string),
        task_id: context.task_id.clone(),
        job_id: if context.task_id.is_some() {
            context.job_id.clone()
        } else {
            None
        },
    };

    let token = encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(apikey.secret_key.as_bytes()),
    )?;
    Ok(token)
}
