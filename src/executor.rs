// src/executor.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::runner::Target;

/// What a successful execution hands back to the runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub content: String,
    pub tokens_used: Option<u64>,
}

impl Execution {
    pub fn new(content: impl Into<String>, tokens_used: Option<u64>) -> Self {
        Self {
            content: content.into(),
            tokens_used,
        }
    }
}

/// Executes one target's content against its LLM configuration.
///
/// The runner treats this as opaque: it only sees success with an
/// [`Execution`], or an error it turns into a probe message. Implemented by
/// [`crate::backend::BackendClient`] against the backend's execute-prompt
/// endpoint.
#[async_trait]
pub trait PromptExecutor: Send + Sync {
    async fn execute(&self, target: &Target) -> Result<Execution>;
}
