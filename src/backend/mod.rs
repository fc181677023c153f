// src/backend/mod.rs

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Instant;

use crate::config::AppConfig;
use crate::errors::{ConsoleError, Result};

pub mod comparisons;
pub mod execute;
pub mod llm_configs;
pub mod models;
pub mod prompts;

pub use models::*;

/// Largest page the backend serves for any listing.
pub(crate) const MAX_PAGE_SIZE: u32 = 100;

/// Typed client for the prompt backend's `/api/v1` routes.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Creates a new `BackendClient` around an existing reqwest client.
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// Builds a client with the configured request timeout.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::new(client, config.api_url.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    /// Sends the request and decodes a JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send_raw(request).await?;
        serde_json::from_str(&body).map_err(|e| ConsoleError::UnexpectedResponse(e.to_string()))
    }

    /// Sends the request and discards the body.
    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        self.send_raw(request).await.map(|_| ())
    }

    async fn send_raw(&self, request: RequestBuilder) -> Result<String> {
        let request = request.build()?;
        let method = request.method().clone();
        let url = request.url().clone();

        log::debug!("📡 {} {}", method, url);
        let start = Instant::now();
        let resp = self.client.execute(request).await?;

        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;
        log::debug!("📥 {} {} -> {} ({}ms)", method, url.path(), status, latency_ms);

        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ConsoleError::ApiError {
                status: status.as_u16(),
                message: extract_error_message(&body),
                body,
            });
        }
        Ok(body)
    }
}

/// Pull a human-readable message out of an error body.
///
/// Understands `{"detail": "..."}`, validation lists
/// (`{"detail": [{"msg": "..."}]}`), `{"error": "..."}` and `{"message": "..."}`.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    let detail = match value.get("detail") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .next()
            .map(str::to_string),
        _ => None,
    };

    detail
        .or_else(|| value.get("error").and_then(|v| v.as_str()).map(str::to_string))
        .or_else(|| value.get("message").and_then(|v| v.as_str()).map(str::to_string))
        .filter(|m| !m.trim().is_empty())
}
