// src/backend/comparisons.rs
//! Comparisons execute on the backend; the console only creates and reads them.

use super::models::{Comparison, DifferentLlmComparison, Page, PageQuery, SameLlmComparison};
use super::BackendClient;
use crate::errors::Result;

impl BackendClient {
    pub async fn list_comparisons(&self, query: &PageQuery) -> Result<Page<Comparison>> {
        let request = self.client.get(self.url("/comparisons")).query(query);
        self.send(request).await
    }

    pub async fn get_comparison(&self, comparison_id: &str) -> Result<Comparison> {
        let request = self
            .client
            .get(self.url(&format!("/comparisons/{}", comparison_id)));
        self.send(request).await
    }

    /// Several versions of one prompt against a single LLM configuration.
    pub async fn create_same_llm_comparison(
        &self,
        comparison: &SameLlmComparison,
    ) -> Result<Comparison> {
        let request = self
            .client
            .post(self.url("/comparisons/same-llm"))
            .json(comparison);
        self.send(request).await
    }

    /// One version against several LLM configurations. The backend expects
    /// the scalar fields as query parameters and the config ids as a bare
    /// JSON array.
    pub async fn create_different_llm_comparison(
        &self,
        comparison: &DifferentLlmComparison,
    ) -> Result<Comparison> {
        let mut params = vec![
            ("prompt_version_id", comparison.prompt_version_id.as_str()),
            ("input_text", comparison.input_text.as_str()),
        ];
        if let Some(name) = comparison.name.as_deref() {
            params.push(("name", name));
        }
        if let Some(description) = comparison.description.as_deref() {
            params.push(("description", description));
        }

        let request = self
            .client
            .post(self.url("/comparisons/different-llm"))
            .query(&params)
            .json(&comparison.llm_config_ids);
        self.send(request).await
    }

    pub async fn comparison_results(&self, comparison_id: &str) -> Result<Vec<serde_json::Value>> {
        let request = self
            .client
            .get(self.url(&format!("/comparisons/{}/results", comparison_id)));
        self.send(request).await
    }

    pub async fn comparison_summary(&self, comparison_id: &str) -> Result<serde_json::Value> {
        let request = self
            .client
            .get(self.url(&format!("/comparisons/{}/summary", comparison_id)));
        self.send(request).await
    }

    /// Ask the backend to re-execute a comparison.
    pub async fn retry_comparison(&self, comparison_id: &str) -> Result<Comparison> {
        let request = self
            .client
            .post(self.url(&format!("/comparisons/{}/retry", comparison_id)));
        self.send(request).await
    }
}
