// src/backend/execute.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::BackendClient;
use crate::errors::{ConsoleError, Result};
use crate::executor::{Execution, PromptExecutor};
use crate::runner::Target;

#[derive(Serialize)]
struct ExecuteRequest<'a> {
    llm_config_id: &'a str,
    prompt: &'a str,
}

/// `POST /llm/test` response. The backend answers `200` with
/// `success: false` when the provider call itself failed.
#[derive(Deserialize)]
struct ExecuteResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tokens_used: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

impl BackendClient {
    /// Run `prompt` against the LLM configuration `llm_config_id`.
    pub async fn execute_prompt(&self, llm_config_id: &str, prompt: &str) -> Result<Execution> {
        let body = ExecuteRequest {
            llm_config_id,
            prompt,
        };
        let request = self.client.post(self.url("/llm/test")).json(&body);
        let resp: ExecuteResponse = self.send(request).await?;

        if resp.success == Some(false) {
            return Err(ConsoleError::ApiResponse(resp.error.unwrap_or_default()));
        }

        let content = resp.content.ok_or_else(|| {
            ConsoleError::UnexpectedResponse("execute response has no `content`".to_string())
        })?;

        Ok(Execution::new(content, resp.tokens_used))
    }
}

#[async_trait]
impl PromptExecutor for BackendClient {
    async fn execute(&self, target: &Target) -> Result<Execution> {
        self.execute_prompt(&target.config_ref, &target.content).await
    }
}
