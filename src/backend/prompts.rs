// src/backend/prompts.rs

use super::models::{
    ListOrPage, NewPrompt, NewPromptVersion, Page, PageQuery, Prompt, PromptPatch, PromptQuery,
    PromptVersion,
};
use super::{BackendClient, MAX_PAGE_SIZE};
use crate::errors::Result;

impl BackendClient {
    pub async fn list_prompts(&self, query: &PromptQuery) -> Result<Page<Prompt>> {
        let request = self.client.get(self.url("/prompts")).query(query);
        self.send(request).await
    }

    pub async fn get_prompt(&self, prompt_id: &str) -> Result<Prompt> {
        let request = self.client.get(self.url(&format!("/prompts/{}", prompt_id)));
        self.send(request).await
    }

    pub async fn create_prompt(&self, prompt: &NewPrompt) -> Result<Prompt> {
        let request = self.client.post(self.url("/prompts")).json(prompt);
        self.send(request).await
    }

    pub async fn update_prompt(&self, prompt_id: &str, patch: &PromptPatch) -> Result<Prompt> {
        let request = self
            .client
            .put(self.url(&format!("/prompts/{}", prompt_id)))
            .json(patch);
        self.send(request).await
    }

    pub async fn delete_prompt(&self, prompt_id: &str) -> Result<()> {
        let request = self
            .client
            .delete(self.url(&format!("/prompts/{}", prompt_id)));
        self.send_empty(request).await
    }

    /// All versions of a prompt, as ordered by the backend, across pages.
    pub async fn list_versions(&self, prompt_id: &str) -> Result<Vec<PromptVersion>> {
        let mut versions = Vec::new();
        let mut page = 1;
        loop {
            let query = PageQuery {
                page: Some(page),
                limit: Some(MAX_PAGE_SIZE),
            };
            let request = self
                .client
                .get(self.url(&format!("/prompts/{}/versions", prompt_id)))
                .query(&query);
            let listing: ListOrPage<PromptVersion> = self.send(request).await?;
            let more = listing.has_more(MAX_PAGE_SIZE);
            versions.extend(listing.into_items());
            if !more {
                break;
            }
            page += 1;
        }
        Ok(versions)
    }

    pub async fn get_version(&self, prompt_id: &str, version_id: &str) -> Result<PromptVersion> {
        let request = self.client.get(self.url(&format!(
            "/prompts/{}/versions/{}",
            prompt_id, version_id
        )));
        self.send(request).await
    }

    pub async fn create_version(
        &self,
        prompt_id: &str,
        version: &NewPromptVersion,
    ) -> Result<PromptVersion> {
        let request = self
            .client
            .post(self.url(&format!("/prompts/{}/versions", prompt_id)))
            .json(version);
        self.send(request).await
    }

    /// Backend-side diff of two versions. The shape is owned by the backend.
    pub async fn compare_versions(
        &self,
        prompt_id: &str,
        version_a: &str,
        version_b: &str,
    ) -> Result<serde_json::Value> {
        let request = self
            .client
            .get(self.url(&format!("/prompts/{}/versions/compare", prompt_id)))
            .query(&[("version_a", version_a), ("version_b", version_b)]);
        self.send(request).await
    }
}
