//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config get`: Print one value
//! - `config set`: Set a configuration value

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, mask_sensitive_value};
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::error::{LeadflowError, Result};
use crate::paths::config_path;

const VALID_KEYS: &[&str] = &[
    "api.base_url",
    "api.timeout_secs",
    "auth.token",
    "default.org",
    "default.workspace",
    "page_limit",
];

/// Validate a config key and suggest dot notation for underscore keys
fn validate_config_key(key: &str) -> Result<&str> {
    if VALID_KEYS.contains(&key) {
        return Ok(key);
    }

    // e.g. auth_token -> auth.token
    if let Some(pos) = key.find('_') {
        let dot_version = format!("{}.{}", &key[..pos], &key[pos + 1..]);
        if VALID_KEYS.contains(&dot_version.as_str()) {
            return Err(LeadflowError::Config(format!(
                "invalid config key '{key}'. Use dot notation: '{dot_version}'"
            )));
        }
    }

    Err(unknown_key(key))
}

fn unknown_key(key: &str) -> LeadflowError {
    LeadflowError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        VALID_KEYS.join(", ")
    ))
}

fn configured(value: bool) -> String {
    if value {
        "configured".green().to_string()
    } else {
        "not configured".dimmed().to_string()
    }
}

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let token_configured = config.api_token().is_some();

    let json_output = json!({
        "api": {
            "base_url": config.base_url(),
            "timeout_secs": config.api.timeout_secs,
        },
        "auth": {
            "token_configured": token_configured,
        },
        "default_scope": config.default_scope.as_ref().map(|d| json!({
            "org": d.org_id,
            "workspace": d.workspace_id,
        })),
        "page_limit": config.page_limit,
        "config_file": config_path().to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    text_output.push_str(&format!("{}:\n", "api".cyan()));
    text_output.push_str(&format!("  base_url: {}\n", config.base_url()));
    text_output.push_str(&format!("  timeout_secs: {}\n\n", config.api.timeout_secs));

    text_output.push_str(&format!("{}:\n", "auth".cyan()));
    text_output.push_str(&format!("  token: {}\n\n", configured(token_configured)));

    match &config.default_scope {
        Some(default) => {
            text_output.push_str(&format!("{}:\n", "default".cyan()));
            text_output.push_str(&format!("  org: {}\n", default.org_id));
            if let Some(ws) = &default.workspace_id {
                text_output.push_str(&format!("  workspace: {ws}\n"));
            }
        }
        None => text_output.push_str(&format!(
            "{}: {}\n",
            "default".cyan(),
            "not configured".dimmed()
        )),
    }

    text_output.push_str(&format!("\n{}: {}\n\n", "page_limit".cyan(), config.page_limit));
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        LeadflowError::Config(format!(
            "invalid value '{value}' for {key}. Expected a positive integer"
        ))
    })
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    validate_config_key(key)?;
    let mut config = Config::load()?;

    // Values echoed back; the token never is
    let shown = match key {
        "api.base_url" => {
            crate::api::ApiSettings::new(value)?;
            config.api.base_url = value.to_string();
            json!(value)
        }
        "api.timeout_secs" => {
            let secs: u64 = parse_number(key, value)?;
            config.api.timeout_secs = secs;
            json!(secs)
        }
        "auth.token" => {
            config.set_api_token(value.to_string());
            serde_json::Value::Null
        }
        "default.org" => {
            if value.trim().is_empty() {
                return Err(LeadflowError::Config("org cannot be empty".to_string()));
            }
            let workspace = config
                .default_scope
                .as_ref()
                .and_then(|d| d.workspace_id.clone());
            config.set_default_scope(value.to_string(), workspace);
            json!(value)
        }
        "default.workspace" => {
            let Some(default) = config.default_scope.as_mut() else {
                return Err(LeadflowError::Config(
                    "set default.org before default.workspace".to_string(),
                ));
            };
            default.workspace_id = Some(value.to_string());
            json!(value)
        }
        "page_limit" => {
            let limit: u32 = parse_number(key, value)?;
            if limit == 0 {
                return Err(LeadflowError::Config(
                    "page_limit must be at least 1".to_string(),
                ));
            }
            config.page_limit = limit;
            json!(limit)
        }
        _ => return Err(unknown_key(key)),
    };
    config.save()?;

    let text = if shown.is_null() {
        format!("Set {}", key.cyan())
    } else {
        format!("Set {} to {}", key.cyan(), value)
    };

    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "success": true,
    }))
    .with_text(text)
    .print(output)
}

/// Get a specific configuration value
pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    validate_config_key(key)?;
    let config = Config::load()?;

    let (value, text) = match key {
        "api.base_url" => {
            let url = config.base_url();
            (json!(url), url)
        }
        "api.timeout_secs" => (
            json!(config.api.timeout_secs),
            config.api.timeout_secs.to_string(),
        ),
        "auth.token" => match config.api_token() {
            Some(token) => {
                let masked = mask_sensitive_value(&token);
                let text = format!("{masked} (masked - showing first 2 and last 2 characters)");
                (json!(masked), text)
            }
            None => (serde_json::Value::Null, "not configured".to_string()),
        },
        "default.org" => match &config.default_scope {
            Some(default) => (json!(default.org_id), default.org_id.clone()),
            None => (serde_json::Value::Null, "not configured".to_string()),
        },
        "default.workspace" => match config
            .default_scope
            .as_ref()
            .and_then(|d| d.workspace_id.clone())
        {
            Some(ws) => (json!(ws), ws),
            None => (serde_json::Value::Null, "not configured".to_string()),
        },
        "page_limit" => (json!(config.page_limit), config.page_limit.to_string()),
        _ => return Err(unknown_key(key)),
    };

    CommandOutput::new(json!({
        "key": key,
        "value": value,
    }))
    .with_text(text)
    .print(output)
}
