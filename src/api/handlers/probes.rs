// src/api/handlers/probes.rs
use actix_web::{web, HttpResponse, Result};
use serde::Deserialize;
use serde_json::json;
use crate::api::AppState;
use crate::api::handlers::error_response;
use crate::errors::ConsoleError;
use crate::runner::Target;
use crate::targets;
use crate::workbench::View;

#[derive(Clone, Deserialize)]
pub struct PromptTestRequest {
    pub prompt_content: String,
    pub input: String,
    pub llm_config_ids: Vec<String>,
}

#[derive(Clone, Deserialize)]
pub struct VersionCompareRequest {
    pub prompt_id: String,
    pub version_ids: Vec<String>,
    pub llm_config_id: String,
    pub input: String,
}

/// POST /api/v1/probes/prompt-test - One prompt against several LLMs
pub async fn run_prompt_test(
    state: web::Data<AppState>,
    req: web::Json<PromptTestRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    if req.input.trim().is_empty() {
        return Ok(error_response(&ConsoleError::Validation(
            "Test input must not be blank".to_string(),
        )));
    }

    let configs = match state.backend.all_llm_configs().await {
        Ok(configs) => configs,
        Err(e) => return Ok(error_response(&e)),
    };

    let built = targets::resolve_active_configs(&req.llm_config_ids, &configs)
        .and_then(|selected| {
            targets::prompt_test_targets(&req.prompt_content, &req.input, &selected)
        });

    match built {
        Ok(targets) => launch(&state, View::PromptTest, targets).await,
        Err(e) => Ok(error_response(&e)),
    }
}

/// POST /api/v1/probes/version-compare - Several versions against one LLM
pub async fn run_version_compare(
    state: web::Data<AppState>,
    req: web::Json<VersionCompareRequest>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    if req.input.trim().is_empty() {
        return Ok(error_response(&ConsoleError::Validation(
            "Test input must not be blank".to_string(),
        )));
    }

    let configs = match state.backend.all_llm_configs().await {
        Ok(configs) => configs,
        Err(e) => return Ok(error_response(&e)),
    };
    let versions = match state.backend.list_versions(&req.prompt_id).await {
        Ok(versions) => versions,
        Err(e) => return Ok(error_response(&e)),
    };

    let built = targets::resolve_active_configs(std::slice::from_ref(&req.llm_config_id), &configs)
        .and_then(|selected| {
            let selected_versions = targets::select_versions(&req.version_ids, &versions)?;
            targets::version_compare_targets(&selected_versions, &selected[0], &req.input)
        });

    match built {
        Ok(targets) => launch(&state, View::VersionCompare, targets).await,
        Err(e) => Ok(error_response(&e)),
    }
}

async fn launch(state: &AppState, view: View, targets: Vec<Target>) -> Result<HttpResponse> {
    match state.workbench.launch(view, targets).await {
        Ok(batch) => {
            log::info!("🚀 Launched {} probes in {} (batch {})", batch.probes.len(), view, batch.batch_id);
            Ok(HttpResponse::Accepted().json(batch))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

/// GET /api/v1/probes/{view} - Current state of a view's batch
pub async fn get_batch(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let Ok(view) = path.parse::<View>() else {
        return Ok(unknown_view(&path));
    };

    match state.workbench.current(view).await {
        Some(batch) => Ok(HttpResponse::Ok().json(batch)),
        None => Ok(no_batch(view)),
    }
}

/// GET /api/v1/probes/{view}/settled - Wait for a view's batch to settle
pub async fn get_settled_batch(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let Ok(view) = path.parse::<View>() else {
        return Ok(unknown_view(&path));
    };

    match state.workbench.settled(view).await {
        Some(batch) => Ok(HttpResponse::Ok().json(batch)),
        None => Ok(no_batch(view)),
    }
}

fn unknown_view(name: &str) -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "error": format!("Unknown view '{}'", name) }))
}

fn no_batch(view: View) -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "error": format!("No batch has run in {}", view) }))
}
