// src/api/handlers/catalog.rs
//! Read-only listings the console needs to build its selection lists.

use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use crate::api::AppState;
use crate::api::handlers::error_response;
use crate::backend::{LlmConfig, PromptQuery, PromptVersion};

#[derive(Serialize)]
pub struct LlmConfigsResponse {
    pub configs: Vec<LlmConfig>,
}

#[derive(Serialize)]
pub struct VersionsResponse {
    pub versions: Vec<PromptVersion>,
}

#[derive(Deserialize)]
pub struct PromptListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub tags: Option<String>,
}

/// GET /api/v1/llm-configs - Active LLM configurations
pub async fn list_llm_configs(state: web::Data<AppState>) -> Result<HttpResponse> {
    match state.backend.active_llm_configs().await {
        Ok(configs) => Ok(HttpResponse::Ok().json(LlmConfigsResponse { configs })),
        Err(e) => Ok(error_response(&e)),
    }
}

/// GET /api/v1/prompts - Paginated prompt list
pub async fn list_prompts(
    state: web::Data<AppState>,
    params: web::Query<PromptListParams>,
) -> Result<HttpResponse> {
    let params = params.into_inner();
    let query = PromptQuery {
        page: params.page,
        limit: params.limit,
        search: params.search.filter(|s| !s.trim().is_empty()),
        tags: params.tags.filter(|s| !s.trim().is_empty()),
    };

    match state.backend.list_prompts(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(page)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// GET /api/v1/prompts/{id}/versions - Versions of one prompt
pub async fn list_versions(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let prompt_id = path.into_inner();
    match state.backend.list_versions(&prompt_id).await {
        Ok(versions) => Ok(HttpResponse::Ok().json(VersionsResponse { versions })),
        Err(e) => Ok(error_response(&e)),
    }
}
