// src/api/handlers/comparisons.rs
//! Comparison creation is delegated to the backend, which runs the executions itself.

use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use crate::api::AppState;
use crate::api::handlers::error_response;
use crate::backend::{
    ComparisonData, ComparisonType, DifferentLlmComparison, PageQuery, SameLlmComparison,
};
use crate::errors::ConsoleError;

#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CreateComparisonRequest {
    SameLlm {
        name: String,
        description: Option<String>,
        input_text: String,
        llm_config_id: String,
        prompt_version_ids: Vec<String>,
    },
    DifferentLlm {
        name: Option<String>,
        description: Option<String>,
        input_text: String,
        prompt_version_id: String,
        llm_config_ids: Vec<String>,
    },
}

impl CreateComparisonRequest {
    fn validate(&self) -> std::result::Result<(), ConsoleError> {
        match self {
            CreateComparisonRequest::SameLlm { name, input_text, prompt_version_ids, .. } => {
                require_input(input_text)?;
                if name.trim().is_empty() {
                    return Err(ConsoleError::Validation("Comparison name must not be blank".to_string()));
                }
                if prompt_version_ids.len() < 2 {
                    return Err(ConsoleError::Validation(
                        "Select at least two versions to compare".to_string(),
                    ));
                }
            }
            CreateComparisonRequest::DifferentLlm { input_text, llm_config_ids, .. } => {
                require_input(input_text)?;
                if llm_config_ids.is_empty() {
                    return Err(ConsoleError::Validation(
                        "Select at least one LLM configuration".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn require_input(input_text: &str) -> std::result::Result<(), ConsoleError> {
    if input_text.trim().is_empty() {
        return Err(ConsoleError::Validation("Input text must not be blank".to_string()));
    }
    Ok(())
}

/// GET /api/v1/comparisons - Paginated comparison list
pub async fn list_comparisons(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    match state.backend.list_comparisons(&query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(page)),
        Err(e) => Ok(error_response(&e)),
    }
}

/// POST /api/v1/comparisons - Create a comparison on the backend
pub async fn create_comparison(
    state: web::Data<AppState>,
    req: web::Json<CreateComparisonRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    if let Err(e) = req.validate() {
        return Ok(error_response(&e));
    }

    let created = match req {
        CreateComparisonRequest::SameLlm {
            name,
            description,
            input_text,
            llm_config_id,
            prompt_version_ids,
        } => {
            let comparison = SameLlmComparison {
                comparison_data: ComparisonData {
                    name,
                    description,
                    kind: ComparisonType::SameLlm,
                    input_text,
                    llm_config_id,
                    save_snapshot: true,
                },
                prompt_version_ids,
            };
            state.backend.create_same_llm_comparison(&comparison).await
        }
        CreateComparisonRequest::DifferentLlm {
            name,
            description,
            input_text,
            prompt_version_id,
            llm_config_ids,
        } => {
            let comparison = DifferentLlmComparison {
                prompt_version_id,
                llm_config_ids,
                input_text,
                name,
                description,
            };
            state.backend.create_different_llm_comparison(&comparison).await
        }
    };

    match created {
        Ok(comparison) => {
            log::info!(
                "Created comparison {} ({}/{} executions succeeded)",
                comparison.id,
                comparison.successful_executions,
                comparison.total_executions
            );
            Ok(HttpResponse::Created().json(comparison))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

/// POST /api/v1/comparisons/{id}/retry - Re-run a comparison on the backend
pub async fn retry_comparison(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match state.backend.retry_comparison(&path.into_inner()).await {
        Ok(comparison) => Ok(HttpResponse::Ok().json(comparison)),
        Err(e) => Ok(error_response(&e)),
    }
}
