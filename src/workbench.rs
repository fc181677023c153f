// src/workbench.rs
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::errors::{ConsoleError, Result};
use crate::runner::{Batch, BatchSummary, Probe, ProbeRunner, ProbeUpdate, Target};

const EVENT_BUFFER: usize = 256;

/// Console views that run probe batches. Each holds at most one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    PromptTest,
    VersionCompare,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::PromptTest => "prompt-test",
            View::VersionCompare => "version-compare",
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "prompt-test" => Ok(View::PromptTest),
            "version-compare" => Ok(View::VersionCompare),
            other => Err(ConsoleError::Validation(format!("Unknown view '{}'", other))),
        }
    }
}

/// A transition tagged with the view it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkbenchEvent {
    pub view: View,
    #[serde(flatten)]
    pub update: ProbeUpdate,
}

/// Point-in-time rendering of a view's batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchView {
    pub view: View,
    pub batch_id: String,
    /// Increases with every launch in this workbench; the highest one is current.
    pub generation: u64,
    pub settled: bool,
    pub summary: BatchSummary,
    pub probes: Vec<Probe>,
}

impl BatchView {
    fn from_probes(view: View, slot: &Slot, probes: Vec<Probe>) -> Self {
        let summary = BatchSummary::from_probes(&probes);
        Self {
            view,
            batch_id: slot.batch.id().to_string(),
            generation: slot.generation,
            settled: summary.is_settled(),
            summary,
            probes,
        }
    }
}

#[derive(Clone)]
struct Slot {
    generation: u64,
    batch: Arc<Batch>,
}

#[derive(Default)]
struct Batches {
    next_generation: u64,
    current: HashMap<View, Slot>,
}

/// Current batch per view. Launching into a view discards the batch that
/// was there; other views keep theirs.
#[derive(Clone)]
pub struct Workbench {
    runner: ProbeRunner,
    batches: Arc<RwLock<Batches>>,
    events: broadcast::Sender<WorkbenchEvent>,
}

impl Workbench {
    pub fn new(runner: ProbeRunner) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            runner,
            batches: Arc::new(RwLock::new(Batches::default())),
            events,
        }
    }

    /// Every transition of every batch launched from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkbenchEvent> {
        self.events.subscribe()
    }

    /// Start `targets` in `view`, replacing its previous batch. Returns the
    /// initial all-pending rendering.
    ///
    /// Starting and installing happen under one write lock, so the last
    /// launch to start is the one left current.
    pub async fn launch(&self, view: View, targets: Vec<Target>) -> Result<BatchView> {
        let mut batches = self.batches.write().await;
        let mut batch = self.runner.run(targets)?;
        let probes = batch.snapshot();

        if let Some(mut updates) = batch.take_updates() {
            let events = self.events.clone();
            tokio::spawn(async move {
                while let Some(update) = updates.recv().await {
                    // No subscribers is not an error.
                    let _ = events.send(WorkbenchEvent { view, update });
                }
            });
        }

        batches.next_generation += 1;
        let slot = Slot {
            generation: batches.next_generation,
            batch: Arc::new(batch),
        };
        let initial = BatchView::from_probes(view, &slot, probes);

        if let Some(previous) = batches.current.insert(view, slot) {
            log::debug!("Replaced batch {} in {}", previous.batch.id(), view);
        }
        Ok(initial)
    }

    pub async fn current(&self, view: View) -> Option<BatchView> {
        let slot = self.batches.read().await.current.get(&view).cloned()?;
        Some(BatchView::from_probes(view, &slot, slot.batch.snapshot()))
    }

    /// Wait for the view's current batch to settle.
    pub async fn settled(&self, view: View) -> Option<BatchView> {
        let slot = self.batches.read().await.current.get(&view).cloned()?;
        let probes = slot.batch.settled().await;
        Some(BatchView::from_probes(view, &slot, probes))
    }
}
