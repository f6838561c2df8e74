//! Typed HTTP client for the Quill backend API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// API failures, split so handlers can react to auth problems.
#[derive(Debug)]
pub enum ApiError {
    /// 401 — bad login or stale token; the stored token should be cleared.
    Unauthorized,
    /// 404 — e.g. searching an unknown tag.
    NotFound,
    /// Transport failures, unexpected statuses, bad payloads.
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized => write!(f, "unauthorized"),
            ApiError::NotFound => write!(f, "not found"),
            ApiError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NoteSummary {
    pub id: i64,
    pub title: String,
    pub content: String,
}

pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Exchange credentials for a bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let resp = self
            .client
            .post(format!("{}/api/token", self.base_url))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .map_err(|e| ApiError::Other(format!("Login request failed: {}", e)))?;

        match resp.status() {
            s if s.is_success() => resp
                .json::<TokenResponse>()
                .await
                .map(|t| t.access_token)
                .map_err(|e| ApiError::Other(format!("Parse token response: {}", e))),
            reqwest::StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            s => Err(ApiError::Other(format!("Login HTTP {}", s))),
        }
    }

    pub async fn create_note(&self, token: &str, draft: &NoteDraft) -> Result<NoteSummary, ApiError> {
        let resp = self
            .client
            .post(format!("{}/api/notes", self.base_url))
            .bearer_auth(token)
            .json(draft)
            .send()
            .await
            .map_err(|e| ApiError::Other(format!("Create note request failed: {}", e)))?;

        match resp.status() {
            s if s.is_success() => resp
                .json::<NoteSummary>()
                .await
                .map_err(|e| ApiError::Other(format!("Parse note response: {}", e))),
            reqwest::StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            s => Err(ApiError::Other(format!("Create note HTTP {}", s))),
        }
    }

    pub async fn search_notes(&self, token: &str, tag: &str) -> Result<Vec<NoteSummary>, ApiError> {
        let resp = self
            .client
            .get(format!("{}/api/notes/search", self.base_url))
            .query(&[("tag", tag)])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Other(format!("Search request failed: {}", e)))?;

        match resp.status() {
            s if s.is_success() => resp
                .json::<Vec<NoteSummary>>()
                .await
                .map_err(|e| ApiError::Other(format!("Parse search response: {}", e))),
            reqwest::StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            reqwest::StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            s => Err(ApiError::Other(format!("Search HTTP {}", s))),
        }
    }
}
