// src/api/state.rs
use crate::backend::BackendClient;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::runner::ProbeRunner;
use crate::workbench::Workbench;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub backend: BackendClient,
    pub workbench: Workbench,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let backend = BackendClient::from_config(&config)?;
        let runner = ProbeRunner::new(Arc::new(backend.clone()))
            .with_max_concurrency(config.max_concurrency);

        Ok(Self {
            config: Arc::new(config),
            backend,
            workbench: Workbench::new(runner),
        })
    }
}
