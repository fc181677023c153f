// src/backend/llm_configs.rs

use super::models::{ConnectionTest, LlmConfig, LlmConfigPatch, LlmConfigQuery, NewLlmConfig, Page};
use super::{BackendClient, MAX_PAGE_SIZE};
use crate::errors::Result;

impl BackendClient {
    pub async fn list_llm_configs(&self, query: &LlmConfigQuery) -> Result<Page<LlmConfig>> {
        let request = self.client.get(self.url("/llm-configs")).query(query);
        self.send(request).await
    }

    /// Every active configuration, across pages.
    pub async fn active_llm_configs(&self) -> Result<Vec<LlmConfig>> {
        self.walk_llm_configs(Some(true)).await
    }

    /// Every configuration, active or not, across pages.
    pub async fn all_llm_configs(&self) -> Result<Vec<LlmConfig>> {
        self.walk_llm_configs(None).await
    }

    async fn walk_llm_configs(&self, active: Option<bool>) -> Result<Vec<LlmConfig>> {
        let mut configs = Vec::new();
        let mut page = 1;
        loop {
            let query = LlmConfigQuery {
                page: Some(page),
                limit: Some(MAX_PAGE_SIZE),
                active,
                ..Default::default()
            };
            let listing = self.list_llm_configs(&query).await?;
            configs.extend(listing.items);
            if !listing.has_next {
                break;
            }
            page += 1;
        }
        Ok(configs)
    }

    pub async fn get_llm_config(&self, config_id: &str) -> Result<LlmConfig> {
        let request = self
            .client
            .get(self.url(&format!("/llm-configs/{}", config_id)));
        self.send(request).await
    }

    pub async fn create_llm_config(&self, config: &NewLlmConfig) -> Result<LlmConfig> {
        let request = self.client.post(self.url("/llm-configs")).json(config);
        self.send(request).await
    }

    pub async fn update_llm_config(
        &self,
        config_id: &str,
        patch: &LlmConfigPatch,
    ) -> Result<LlmConfig> {
        let request = self
            .client
            .put(self.url(&format!("/llm-configs/{}", config_id)))
            .json(patch);
        self.send(request).await
    }

    pub async fn delete_llm_config(&self, config_id: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.url(&format!("/llm-configs/{}", config_id)));
        self.send_empty(request).await
    }

    /// Flip a configuration between active and inactive.
    pub async fn toggle_llm_config(&self, config_id: &str) -> Result<LlmConfig> {
        let request = self
            .client
            .patch(self.url(&format!("/llm-configs/{}/toggle", config_id)));
        self.send(request).await
    }

    /// Check credentials without saving them. The backend takes these as query parameters.
    pub async fn test_llm_connection(&self, config: &NewLlmConfig) -> Result<ConnectionTest> {
        let temperature = config.temperature.to_string();
        let max_tokens = config.max_tokens.to_string();
        let request = self.client.post(self.url("/llm-configs/test")).query(&[
            ("provider", config.provider.as_str()),
            ("api_key", config.api_key.as_str()),
            ("model", config.model.as_str()),
            ("temperature", temperature.as_str()),
            ("max_tokens", max_tokens.as_str()),
        ]);
        self.send(request).await
    }
}
