// src/targets.rs
//! Builds probe targets for the console's test and compare views.

use crate::backend::{LlmConfig, PromptVersion};
use crate::errors::{ConsoleError, Result};
use crate::runner::Target;
use crate::template::render_prompt;

/// Pick `ids` out of `configs`, keeping the caller's order.
///
/// Every id must name a known, active configuration.
pub fn resolve_active_configs(ids: &[String], configs: &[LlmConfig]) -> Result<Vec<LlmConfig>> {
    if ids.is_empty() {
        return Err(ConsoleError::Validation(
            "Select at least one LLM configuration".to_string(),
        ));
    }

    ids.iter()
        .map(|id| {
            let config = configs
                .iter()
                .find(|c| &c.id == id)
                .ok_or_else(|| ConsoleError::UnknownConfig(id.clone()))?;
            if !config.active {
                return Err(ConsoleError::InactiveConfig(id.clone()));
            }
            Ok(config.clone())
        })
        .collect()
}

/// Pick `ids` out of `versions`, keeping the caller's order.
pub fn select_versions(ids: &[String], versions: &[PromptVersion]) -> Result<Vec<PromptVersion>> {
    ids.iter()
        .map(|id| {
            versions
                .iter()
                .find(|v| &v.id == id)
                .cloned()
                .ok_or_else(|| ConsoleError::UnknownVersion(id.clone()))
        })
        .collect()
}

/// One prompt, many LLMs.
pub fn prompt_test_targets(
    prompt_content: &str,
    input: &str,
    configs: &[LlmConfig],
) -> Result<Vec<Target>> {
    require_input(input)?;
    if configs.is_empty() {
        return Err(ConsoleError::Validation(
            "Select at least one LLM configuration".to_string(),
        ));
    }

    let content = render_prompt(prompt_content, input);
    Ok(configs
        .iter()
        .map(|config| Target::new(content.clone(), config.id.clone(), config.display_name()))
        .collect())
}

/// Many versions of one prompt, one LLM.
pub fn version_compare_targets(
    versions: &[PromptVersion],
    config: &LlmConfig,
    input: &str,
) -> Result<Vec<Target>> {
    require_input(input)?;
    if versions.len() < 2 {
        return Err(ConsoleError::Validation(
            "Select at least two versions to compare".to_string(),
        ));
    }

    Ok(versions
        .iter()
        .map(|version| {
            Target::new(
                render_prompt(&version.content, input),
                config.id.clone(),
                format!("v{}", version.version_number),
            )
        })
        .collect())
}

fn require_input(input: &str) -> Result<()> {
    if input.trim().is_empty() {
        return Err(ConsoleError::Validation("Test input must not be blank".to_string()));
    }
    Ok(())
}
