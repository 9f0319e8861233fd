//! Top-level application configuration.
//!
//! Configuration is stored in `.leadflow/config.yaml` and includes:
//! - Backend base URL and request timeout
//! - The API token
//! - The default organization/workspace scope
//! - The default page size for list views

use std::env;
use std::fmt;
use std::fs;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LeadflowError, Result};
use crate::paths::config_path;

pub const DEFAULT_BASE_URL: &str = "https://api.leadflow.app/v1";
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Authentication
    #[serde(default)]
    pub auth: AuthConfig,

    /// Organization/workspace used when a command does not name one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_scope: Option<DefaultScope>,

    /// Page size for list views (default: 20)
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            default_scope: None,
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Authentication configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Default organization/workspace scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultScope {
    pub org_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<String>,
}

impl Config {
    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            LeadflowError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LeadflowError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content).map_err(|e| {
            LeadflowError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // Owner read/write only: the file may hold the API token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions)?;
        }

        Ok(())
    }

    /// Get the API token from the environment or the config file
    pub fn api_token(&self) -> Option<String> {
        if let Ok(token) = env::var("LEADFLOW_API_TOKEN")
            && !token.is_empty()
        {
            return Some(token);
        }

        self.auth.token.clone()
    }

    /// Get the backend base URL from the environment or the config file
    pub fn base_url(&self) -> String {
        if let Ok(url) = env::var("LEADFLOW_BASE_URL")
            && !url.is_empty()
        {
            return url;
        }

        self.api.base_url.clone()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn set_api_token(&mut self, token: String) {
        self.auth.token = Some(token);
    }

    pub fn set_default_scope(&mut self, org_id: String, workspace_id: Option<String>) {
        self.default_scope = Some(DefaultScope {
            org_id,
            workspace_id,
        });
    }

    /// Resolve the scope for a command: explicit arguments win over the default.
    pub fn resolve_scope(
        &self,
        org_id: Option<&str>,
        workspace_id: Option<&str>,
    ) -> Result<(String, Option<String>)> {
        let default = self.default_scope.as_ref();
        let org = org_id
            .map(str::to_string)
            .or_else(|| default.map(|d| d.org_id.clone()))
            .ok_or_else(|| {
                LeadflowError::Config(
                    "no organization given and default.org is not configured".to_string(),
                )
            })?;
        let workspace = workspace_id
            .map(str::to_string)
            .or_else(|| default.and_then(|d| d.workspace_id.clone()));
        Ok((org, workspace))
    }
}
