//! Client for the external AI backend
//!
//! The backend is an opaque HTTP service: each helper POSTs a JSON payload
//! to `<endpoint>/<name>` and pulls generated text out of the response.
//! Callers treat every failure here as non-critical.

use crate::config::{AiConfig, Language};
use crate::error::{Error, Result};
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Delay between attempts
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// HTTP client for the AI backend
#[derive(Debug, Clone)]
pub struct AiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    max_retries: u32,
    backoff: Duration,
}

impl AiClient {
    /// Build a client from the global AI settings
    pub fn new(config: &AiConfig) -> Result<Self> {
        let timeout = config
            .timeout_secs
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("autopr/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Ai(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            backoff: RETRY_BACKOFF,
        })
    }

    /// Override the delay between retries
    #[must_use]
    pub const fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// POST `payload` to `<base>/<endpoint>` and return the JSON response
    ///
    /// Transport errors and 5xx responses are retried; 4xx responses fail
    /// immediately.
    pub async fn call_api(&self, endpoint: &str, payload: &Value) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let mut attempt = 0;

        loop {
            debug!(%url, attempt, "calling AI backend");
            let mut request = self.http.post(&url).json(payload);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            let error = match request.send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json()
                        .await
                        .map_err(|e| Error::Ai(format!("Invalid response from {endpoint}: {e}")));
                }
                Ok(response) if response.status().is_server_error() => {
                    Error::Ai(format!("{endpoint} returned {}", response.status()))
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::Ai(format!("{endpoint} returned {status}: {body}")));
                }
                Err(e) => Error::Ai(format!("Request to {endpoint} failed: {e}")),
            };

            if attempt >= self.max_retries {
                return Err(error);
            }
            attempt += 1;
            warn!(error = %error, attempt, "AI request failed, retrying");
            tokio::time::sleep(self.backoff).await;
        }
    }

    async fn call_for_text(&self, endpoint: &str, payload: &Value) -> Result<String> {
        let response = self.call_api(endpoint, payload).await?;
        extract_text(&response)
            .ok_or_else(|| Error::Ai(format!("{endpoint} response contained no text")))
    }

    /// Draft a PR description from branch, commits and diff summary
    pub async fn generate_pr_description(
        &self,
        branch: &str,
        commits: &[String],
        diff_stat: &str,
        language: Language,
    ) -> Result<String> {
        let payload = json!({
            "branch": branch,
            "commits": commits,
            "diffStat": diff_stat,
            "language": language_code(language),
        });
        self.call_for_text("generate-pr-description", &payload).await
    }

    /// Review a diff and return comments as markdown
    pub async fn review_code(&self, title: &str, diff: &str, language: Language) -> Result<String> {
        let payload = json!({
            "title": title,
            "diff": diff,
            "language": language_code(language),
        });
        self.call_for_text("review-code", &payload).await
    }

    /// Suggest how to resolve the conflicts in one file
    pub async fn suggest_conflict_resolution(
        &self,
        file: &str,
        content: &str,
        language: Language,
    ) -> Result<String> {
        let payload = json!({
            "file": file,
            "content": content,
            "language": language_code(language),
        });
        self.call_for_text("suggest-conflict-resolution", &payload)
            .await
    }

    /// Rewrite a commit message for a staged diff
    pub async fn improve_commit_message(
        &self,
        message: Option<&str>,
        diff: &str,
        language: Language,
    ) -> Result<String> {
        let payload = json!({
            "message": message,
            "diff": diff,
            "language": language_code(language),
        });
        self.call_for_text("improve-commit-message", &payload).await
    }
}

const fn language_code(language: Language) -> &'static str {
    match language {
        Language::En => "en",
        Language::Ko => "ko",
    }
}

/// Pull generated text out of a backend response
///
/// Accepts a bare string or an object with a `content`, `text` or `result`
/// string field, checked in that order.
pub fn extract_text(response: &Value) -> Option<String> {
    if let Some(s) = response.as_str() {
        return Some(s.to_string());
    }
    ["content", "text", "result"]
        .iter()
        .find_map(|key| response.get(key).and_then(Value::as_str))
        .map(ToString::to_string)
}
