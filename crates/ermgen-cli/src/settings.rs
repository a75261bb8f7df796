use std::path::Path;

use ermgen_core::{EntityModel, GeneratorConfig, ValidationReport, validate_model_json};

use crate::CliError;

/// Load generator settings from TOML; a missing file yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<GeneratorConfig, CliError> {
    let Some(path) = path else {
        return Ok(GeneratorConfig::default());
    };
    if !path.exists() {
        tracing::warn!(event = "config_missing", path = %path.display());
        return Ok(GeneratorConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: GeneratorConfig = toml::from_str(&content)?;
    tracing::info!(event = "config_loaded", path = %path.display());
    Ok(config)
}

/// Load an entity model, checking its JSON structure before parsing.
pub fn load_model(path: &Path) -> Result<EntityModel, CliError> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    let structural = validate_model_json(&value)?;
    if !structural.is_ok() {
        return Err(CliError::InvalidModel(format_report(&structural)));
    }

    let model: EntityModel = serde_json::from_value(value)?;
    tracing::info!(event = "model_loaded", path = %path.display(), classes = model.classes.len());
    Ok(model)
}

pub fn format_report(report: &ValidationReport) -> String {
    report
        .errors
        .iter()
        .chain(report.warnings.iter())
        .map(|issue| {
            let mut line = format!("{:?} {} at {}: {}", issue.severity, issue.code, issue.path, issue.message);
            if let Some(hint) = &issue.hint {
                line.push_str(&format!(" (hint: {hint})"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
