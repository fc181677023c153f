// src/runner.rs
use crate::errors::{ConsoleError, Result};
use crate::executor::{Execution, PromptExecutor};
use futures::future;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Semaphore, mpsc, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// One requested execution: resolved content plus the LLM configuration to run it on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub content: String,
    pub config_ref: String,
    /// Display only, e.g. `v3` or `openai / gpt-4o`.
    pub label: String,
}

impl Target {
    pub fn new(
        content: impl Into<String>,
        config_ref: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            config_ref: config_ref.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Pending,
    Running,
    Success,
    Error,
}

impl ProbeStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ProbeStatus::Success | ProbeStatus::Error)
    }
}

impl std::fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeStatus::Pending => write!(f, "pending"),
            ProbeStatus::Running => write!(f, "running"),
            ProbeStatus::Success => write!(f, "success"),
            ProbeStatus::Error => write!(f, "error"),
        }
    }
}

/// Tracked lifecycle of one target within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    pub index: usize,
    pub label: String,
    pub config_ref: String,
    pub status: ProbeStatus,
    pub result_text: Option<String>,
    pub error_message: Option<String>,
    pub execution_time_ms: Option<u64>,
    pub tokens_used: Option<u64>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}

#[derive(Debug)]
pub(crate) enum Transition {
    Started {
        at: String,
    },
    Succeeded {
        execution: Execution,
        elapsed_ms: u64,
        at: String,
    },
    Failed {
        message: String,
        elapsed_ms: u64,
        at: String,
    },
}

impl Transition {
    fn status(&self) -> ProbeStatus {
        match self {
            Transition::Started { .. } => ProbeStatus::Running,
            Transition::Succeeded { .. } => ProbeStatus::Success,
            Transition::Failed { .. } => ProbeStatus::Error,
        }
    }
}

impl Probe {
    fn pending(index: usize, target: &Target) -> Self {
        Self {
            index,
            label: target.label.clone(),
            config_ref: target.config_ref.clone(),
            status: ProbeStatus::Pending,
            result_text: None,
            error_message: None,
            execution_time_ms: None,
            tokens_used: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Apply one lifecycle step. Only `Pending -> Running` and
    /// `Running -> Success | Error` are accepted.
    pub(crate) fn apply(&mut self, transition: Transition) -> Result<()> {
        let to = transition.status();
        let allowed = matches!(
            (self.status, to),
            (ProbeStatus::Pending, ProbeStatus::Running)
                | (ProbeStatus::Running, ProbeStatus::Success)
                | (ProbeStatus::Running, ProbeStatus::Error)
        );
        if !allowed {
            return Err(ConsoleError::InvalidTransition {
                index: self.index,
                from: self.status,
                to,
            });
        }

        match transition {
            Transition::Started { at } => {
                self.started_at = Some(at);
            }
            Transition::Succeeded {
                execution,
                elapsed_ms,
                at,
            } => {
                self.result_text = Some(execution.content);
                self.tokens_used = execution.tokens_used;
                self.execution_time_ms = Some(elapsed_ms);
                self.finished_at = Some(at);
            }
            Transition::Failed {
                message,
                elapsed_ms,
                at,
            } => {
                self.error_message = Some(message);
                self.execution_time_ms = Some(elapsed_ms);
                self.finished_at = Some(at);
            }
        }
        self.status = to;
        Ok(())
    }
}

/// Published once per applied transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeUpdate {
    pub batch_id: String,
    pub index: usize,
    pub probe: Probe,
}

/// Aggregate metrics over a batch. Timing and token totals count successful probes only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub pending: usize,
    pub running: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub average_execution_time_ms: u64,
    pub total_tokens_used: u64,
}

impl BatchSummary {
    pub fn from_probes(probes: &[Probe]) -> Self {
        let mut summary = BatchSummary {
            total: probes.len(),
            ..Default::default()
        };
        let mut total_time = 0u64;

        for probe in probes {
            match probe.status {
                ProbeStatus::Pending => summary.pending += 1,
                ProbeStatus::Running => summary.running += 1,
                ProbeStatus::Success => {
                    summary.succeeded += 1;
                    total_time += probe.execution_time_ms.unwrap_or(0);
                    summary.total_tokens_used += probe.tokens_used.unwrap_or(0);
                }
                ProbeStatus::Error => summary.failed += 1,
            }
        }

        if summary.succeeded > 0 {
            summary.average_execution_time_ms = total_time / summary.succeeded as u64;
        }
        summary
    }

    pub fn is_settled(&self) -> bool {
        self.pending == 0 && self.running == 0
    }
}

fn all_settled(probes: &[Probe]) -> bool {
    probes.iter().all(|p| p.status.is_terminal())
}

struct ProbeEvent {
    index: usize,
    transition: Transition,
}

/// Handle on one running batch.
///
/// The probe sequence is ordered by submission index and is observable
/// from the moment [`ProbeRunner::run`] returns.
pub struct Batch {
    id: String,
    snapshot: watch::Receiver<Vec<Probe>>,
    updates: Option<mpsc::UnboundedReceiver<ProbeUpdate>>,
    aggregator: JoinHandle<Vec<Probe>>,
}

impl Batch {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current state of every probe, in submission order.
    pub fn snapshot(&self) -> Vec<Probe> {
        self.snapshot.borrow().clone()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_probes(&self.snapshot.borrow())
    }

    pub fn is_settled(&self) -> bool {
        all_settled(&self.snapshot.borrow())
    }

    /// Watch the whole probe sequence. Intermediate states may be coalesced;
    /// use [`Batch::take_updates`] to see every transition.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Probe>> {
        self.snapshot.clone()
    }

    /// Stream of every transition in the order it was applied. Closes once
    /// the batch has settled. Can be taken once.
    pub fn take_updates(&mut self) -> Option<mpsc::UnboundedReceiver<ProbeUpdate>> {
        self.updates.take()
    }

    /// Wait until every probe is `Success` or `Error`, without consuming the handle.
    pub async fn settled(&self) -> Vec<Probe> {
        let mut rx = self.snapshot.clone();
        let settled = rx
            .wait_for(|probes| all_settled(probes))
            .await
            .map(|probes| probes.clone());
        match settled {
            Ok(probes) => probes,
            Err(_) => self.snapshot.borrow().clone(),
        }
    }

    /// Consume the handle and return the final probes once all have settled.
    pub async fn wait(self) -> Vec<Probe> {
        let Batch {
            id,
            snapshot,
            aggregator,
            ..
        } = self;
        match aggregator.await {
            Ok(probes) => probes,
            Err(e) => {
                log::error!("Aggregator for batch {} stopped: {}", id, e);
                snapshot.borrow().clone()
            }
        }
    }
}

/// Launches batches of targets against a [`PromptExecutor`].
#[derive(Clone)]
pub struct ProbeRunner {
    executor: Arc<dyn PromptExecutor>,
    max_concurrency: Option<usize>,
}

impl ProbeRunner {
    pub fn new(executor: Arc<dyn PromptExecutor>) -> Self {
        Self {
            executor,
            max_concurrency: None,
        }
    }

    /// Bound the number of in-flight executions per batch. Probes waiting
    /// for a slot stay `Pending`.
    pub fn with_max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.max_concurrency = limit.filter(|n| *n > 0);
        self
    }

    /// Start a new batch. Every target is submitted without waiting for the
    /// others; a failing target never stops its siblings.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run(&self, targets: Vec<Target>) -> Result<Batch> {
        if targets.is_empty() {
            return Err(ConsoleError::EmptyBatch);
        }

        let batch_id = Uuid::new_v4().to_string();
        let probes: Vec<Probe> = targets
            .iter()
            .enumerate()
            .map(|(index, target)| Probe::pending(index, target))
            .collect();

        log::info!("Starting batch {} with {} probes", batch_id, probes.len());

        let (snapshot_tx, snapshot_rx) = watch::channel(probes.clone());
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        let aggregator = tokio::spawn(aggregate(
            batch_id.clone(),
            probes,
            event_rx,
            snapshot_tx,
            update_tx,
        ));

        let executor = Arc::clone(&self.executor);
        let limit = self.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));
        tokio::spawn(async move {
            let runs: Vec<_> = targets
                .into_iter()
                .enumerate()
                .map(|(index, target)| {
                    run_probe(
                        index,
                        target,
                        Arc::clone(&executor),
                        limit.clone(),
                        event_tx.clone(),
                    )
                })
                .collect();
            future::join_all(runs).await;
        });

        Ok(Batch {
            id: batch_id,
            snapshot: snapshot_rx,
            updates: Some(update_rx),
            aggregator,
        })
    }
}

async fn run_probe(
    index: usize,
    target: Target,
    executor: Arc<dyn PromptExecutor>,
    limit: Option<Arc<Semaphore>>,
    events: mpsc::UnboundedSender<ProbeEvent>,
) {
    let _permit = match limit {
        Some(semaphore) => semaphore.acquire_owned().await.ok(),
        None => None,
    };

    send_event(&events, index, Transition::Started { at: now() });

    let start = Instant::now();
    let outcome = executor.execute(&target).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let transition = match outcome {
        Ok(execution) => {
            log::debug!("Probe {} ({}) succeeded in {}ms", index, target.label, elapsed_ms);
            Transition::Succeeded {
                execution,
                elapsed_ms,
                at: now(),
            }
        }
        Err(e) => {
            log::warn!("Probe {} ({}) failed after {}ms: {}", index, target.label, elapsed_ms, e);
            Transition::Failed {
                message: e.probe_message(),
                elapsed_ms,
                at: now(),
            }
        }
    };
    send_event(&events, index, transition);
}

fn send_event(events: &mpsc::UnboundedSender<ProbeEvent>, index: usize, transition: Transition) {
    if events.send(ProbeEvent { index, transition }).is_err() {
        log::debug!("Dropped event for probe {}: aggregator is gone", index);
    }
}

/// Sole owner of the probe sequence. Applies events one at a time and
/// publishes after each.
async fn aggregate(
    batch_id: String,
    mut probes: Vec<Probe>,
    mut events: mpsc::UnboundedReceiver<ProbeEvent>,
    snapshot: watch::Sender<Vec<Probe>>,
    updates: mpsc::UnboundedSender<ProbeUpdate>,
) -> Vec<Probe> {
    let start = Instant::now();

    while let Some(ProbeEvent { index, transition }) = events.recv().await {
        let Some(probe) = probes.get_mut(index) else {
            log::error!("Batch {} has no probe at index {}", batch_id, index);
            continue;
        };
        if let Err(e) = probe.apply(transition) {
            log::warn!("Batch {}: {}", batch_id, e);
            continue;
        }

        let update = ProbeUpdate {
            batch_id: batch_id.clone(),
            index,
            probe: probe.clone(),
        };
        snapshot.send_replace(probes.clone());
        // Nobody listening is fine.
        let _ = updates.send(update);
    }

    let summary = BatchSummary::from_probes(&probes);
    log::info!(
        "Batch {} settled in {}ms: {} succeeded, {} failed",
        batch_id,
        start.elapsed().as_millis(),
        summary.succeeded,
        summary.failed
    );
    probes
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}
