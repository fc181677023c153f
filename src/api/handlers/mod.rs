// src/api/handlers/mod.rs
mod health;
mod catalog;
mod comparisons;
mod probes;
pub mod ws;

use actix_web::HttpResponse;
use serde_json::json;
use crate::errors::ConsoleError;

pub use health::health_check;
pub use catalog::{list_llm_configs, list_prompts, list_versions};
pub use comparisons::{create_comparison, list_comparisons, retry_comparison};
pub use probes::{get_batch, get_settled_batch, run_prompt_test, run_version_compare};
pub use ws::{ws_handler, WsBroker};

/// Map a console error onto a JSON error response.
pub(crate) fn error_response(e: &ConsoleError) -> HttpResponse {
    let message = match e {
        ConsoleError::ApiError { message: Some(message), .. } => message.clone(),
        other => other.to_string(),
    };
    let body = json!({ "error": message });

    match e {
        ConsoleError::Validation(_)
        | ConsoleError::InactiveConfig(_)
        | ConsoleError::EmptyBatch => HttpResponse::BadRequest().json(body),
        ConsoleError::UnknownConfig(_) | ConsoleError::UnknownVersion(_) => {
            HttpResponse::NotFound().json(body)
        }
        ConsoleError::ApiError { status, .. } if (400..500).contains(status) => {
            match actix_web::http::StatusCode::from_u16(*status) {
                Ok(code) => HttpResponse::build(code).json(body),
                Err(_) => HttpResponse::BadGateway().json(body),
            }
        }
        ConsoleError::ApiError { .. }
        | ConsoleError::ApiResponse(_)
        | ConsoleError::UnexpectedResponse(_)
        | ConsoleError::Request(_) => {
            log::error!("Backend call failed: {}", e);
            HttpResponse::BadGateway().json(body)
        }
        _ => {
            log::error!("Request failed: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}
