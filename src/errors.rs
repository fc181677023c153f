// src/errors.rs
use thiserror::Error;

use crate::runner::ProbeStatus;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Backend request failed with status {status}: {body}")]
    ApiError {
        status: u16,
        message: Option<String>,
        body: String,
    },

    #[error("Backend reported an error: {0}")]
    ApiResponse(String),

    #[error("Unexpected response structure: {0}")]
    UnexpectedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("LLM configuration '{0}' not found")]
    UnknownConfig(String),

    #[error("LLM configuration '{0}' is not active")]
    InactiveConfig(String),

    #[error("Prompt version '{0}' not found")]
    UnknownVersion(String),

    #[error("Cannot run an empty batch")]
    EmptyBatch,

    #[error("Probe {index} cannot move from {from} to {to}")]
    InvalidTransition {
        index: usize,
        from: ProbeStatus,
        to: ProbeStatus,
    },
}

impl ConsoleError {
    /// Text shown on a probe card when its execution fails.
    ///
    /// Server-supplied messages win; transport and decoding failures get a
    /// generic description.
    pub fn probe_message(&self) -> String {
        match self {
            ConsoleError::ApiError {
                message: Some(message),
                ..
            } => message.clone(),
            ConsoleError::ApiError { status, .. } => {
                format!("Backend returned status {}", status)
            }
            ConsoleError::ApiResponse(message) if !message.trim().is_empty() => message.clone(),
            ConsoleError::ApiResponse(_) => "Execution failed".to_string(),
            ConsoleError::Request(e) if e.is_timeout() => "Request timed out".to_string(),
            ConsoleError::Request(e) if e.is_decode() => {
                "Backend returned an unexpected response".to_string()
            }
            ConsoleError::Request(_) => "Could not reach the backend".to_string(),
            ConsoleError::UnexpectedResponse(_) | ConsoleError::JsonParse(_) => {
                "Backend returned an unexpected response".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
