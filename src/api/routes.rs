// src/api/routes.rs
use actix_web::web;
use super::handlers;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(handlers::health_check))
            .route("/llm-configs", web::get().to(handlers::list_llm_configs))
            .route("/prompts", web::get().to(handlers::list_prompts))
            .route("/prompts/{id}/versions", web::get().to(handlers::list_versions))
            .service(
                web::scope("/probes")
                    .route("/prompt-test", web::post().to(handlers::run_prompt_test))
                    .route("/version-compare", web::post().to(handlers::run_version_compare))
                    .route("/{view}", web::get().to(handlers::get_batch))
                    .route("/{view}/settled", web::get().to(handlers::get_settled_batch))
            )
            .service(
                web::scope("/comparisons")
                    .route("", web::get().to(handlers::list_comparisons))
                    .route("", web::post().to(handlers::create_comparison))
                    .route("/{id}/retry", web::post().to(handlers::retry_comparison))
            )
    )
    .route("/ws", web::get().to(handlers::ws_handler));
}
