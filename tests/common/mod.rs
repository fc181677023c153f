// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use promptbench::errors::{ConsoleError, Result};
use promptbench::executor::{Execution, PromptExecutor};
use promptbench::runner::Target;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub enum Outcome {
    Reply(String, Option<u64>),
    Fail(String),
}

impl Outcome {
    pub fn reply(text: impl Into<String>, tokens: Option<u64>) -> Self {
        Outcome::Reply(text.into(), tokens)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Outcome::Fail(message.into())
    }

    fn into_result(self) -> Result<Execution> {
        match self {
            Outcome::Reply(text, tokens) => Ok(Execution::new(text, tokens)),
            Outcome::Fail(message) => Err(ConsoleError::ApiResponse(message)),
        }
    }
}

pub fn target(config_ref: &str) -> Target {
    Target::new(
        format!("content for {}", config_ref),
        config_ref,
        format!("label-{}", config_ref),
    )
}

/// Answers immediately (after one yield) with a fixed outcome per config ref.
pub struct ScriptedExecutor {
    outcomes: HashMap<String, Outcome>,
    calls: AtomicUsize,
}

impl ScriptedExecutor {
    pub fn new(outcomes: Vec<(&str, Outcome)>) -> Self {
        Self {
            outcomes: outcomes
                .into_iter()
                .map(|(key, outcome)| (key.to_string(), outcome))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PromptExecutor for ScriptedExecutor {
    async fn execute(&self, target: &Target) -> Result<Execution> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        match self.outcomes.get(&target.config_ref) {
            Some(outcome) => outcome.clone().into_result(),
            None => Err(ConsoleError::UnexpectedResponse(format!(
                "no outcome scripted for {}",
                target.config_ref
            ))),
        }
    }
}

/// Each call blocks until the test releases its gate with an outcome.
pub struct GatedExecutor {
    gates: Mutex<HashMap<String, oneshot::Receiver<Outcome>>>,
}

impl GatedExecutor {
    pub fn new(keys: &[&str]) -> (Self, HashMap<String, oneshot::Sender<Outcome>>) {
        let mut receivers = HashMap::new();
        let mut senders = HashMap::new();
        for key in keys {
            let (tx, rx) = oneshot::channel();
            senders.insert(key.to_string(), tx);
            receivers.insert(key.to_string(), rx);
        }
        (
            Self {
                gates: Mutex::new(receivers),
            },
            senders,
        )
    }
}

#[async_trait]
impl PromptExecutor for GatedExecutor {
    async fn execute(&self, target: &Target) -> Result<Execution> {
        let gate = {
            let mut gates = self.gates.lock().unwrap();
            gates.remove(&target.config_ref)
        };
        let Some(gate) = gate else {
            return Err(ConsoleError::UnexpectedResponse("gate already used".to_string()));
        };
        match gate.await {
            Ok(outcome) => outcome.into_result(),
            Err(_) => Err(ConsoleError::ApiResponse("gate dropped".to_string())),
        }
    }
}
