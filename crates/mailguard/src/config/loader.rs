use std::collections::HashSet;
use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;
use crate::secrets::has_secret_source;

const SCHEMA_JSON: &str = include_str!("../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let validator = jsonschema::validator_for(&schema).map_err(|e| ConfigError::Validation {
        message: format!("Failed to compile JSON schema: {}", e),
    })?;

    let error_messages: Vec<String> = validator
        .iter_errors(json_value)
        .map(|e| e.to_string())
        .collect();
    if !error_messages.is_empty() {
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

/// Semantic checks the schema cannot express. Also run after command-line
/// overrides are applied.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.mailbox.host.trim().is_empty() {
        return Err(invalid("mailbox.host must not be empty"));
    }
    if config.mailbox.username.trim().is_empty() {
        return Err(invalid("mailbox.username must not be empty"));
    }
    let auth = &config.mailbox.auth;
    if !has_secret_source(
        auth.password_insecure.as_deref(),
        auth.password_file.as_deref(),
        auth.password_env_var.as_deref(),
    ) {
        return Err(invalid(
            "mailbox.auth needs one of password, passwordFile or passwordEnvVar",
        ));
    }

    let threshold = config.triage.phishy_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ConfigError::Validation {
            message: format!("triage.phishyThreshold must be within [0, 1], got {}", threshold),
        });
    }
    if config.triage.folders.iter().any(|f| f.trim().is_empty()) {
        return Err(invalid("triage.folders must not contain empty names"));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = config.triage.folders.iter().find(|f| !seen.insert(f.as_str())) {
        return Err(ConfigError::Validation {
            message: format!("triage.folders lists {} more than once", dup),
        });
    }

    if config.classifier.command.trim().is_empty() {
        return Err(invalid("classifier.command must not be empty"));
    }

    Ok(())
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Validation {
        message: message.to_string(),
    }
}
