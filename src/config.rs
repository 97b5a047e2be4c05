use std::{path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

pub const DEFAULT_TEMPLATE: &str = "{mod_name} has updated! {url}";
pub const DEFAULT_ROLE_NAME: &str = "updates";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

fn default_role_name() -> String {
    DEFAULT_ROLE_NAME.to_string()
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Discord bot token.
    pub token: String,
    #[serde(default = "default_template")]
    pub template: String,
    #[serde(default)]
    pub curseforge_api_key: Option<String>,
    /// Role whose mention replaces `<@&ROLE_ID>` in the template.
    #[serde(default = "default_role_name")]
    pub role_name: String,
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub curseforge: CurseForgeConfig,
    #[serde(default)]
    pub modrinth: ModrinthConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub timeouts: Timeouts,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CurseForgeConfig {
    /// Query the catalog API before falling back to rendering the listing page.
    /// Off until API access is granted for the configured key.
    pub use_api: bool,
    pub api_base: String,
}

impl Default for CurseForgeConfig {
    fn default() -> Self {
        Self {
            use_api: false,
            api_base: "https://api.curseforge.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModrinthConfig {
    pub api_base: String,
}

impl Default for ModrinthConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.modrinth.com/v2".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub api_base: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            api_base: "https://discord.com/api/v10".to_string(),
        }
    }
}

/// Upper bounds, in seconds, on every suspension point of a polling pass.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub request_timeout_secs: u64,
    pub page_load_timeout_secs: u64,
    pub selector_timeout_secs: u64,
    pub mod_timeout_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            page_load_timeout_secs: 60,
            selector_timeout_secs: 30,
            mod_timeout_secs: 120,
        }
    }
}

impl Timeouts {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn page_load(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout_secs)
    }

    pub fn selector(&self) -> Duration {
        Duration::from_secs(self.selector_timeout_secs)
    }

    pub fn per_mod(&self) -> Duration {
        Duration::from_secs(self.mod_timeout_secs)
    }
}

impl Config {
    pub fn from_json(path: &str, raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|source| ConfigError::Json {
            path: path.to_string(),
            source,
        })
    }

    pub async fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        debug!("Loading configuration from {}", path.display());
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_json(&path.display().to_string(), &raw)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// The key is only useful when the API path is switched on.
    pub fn curseforge_api_key(&self) -> Option<&str> {
        self.curseforge_api_key
            .as_deref()
            .filter(|k| self.curseforge.use_api && !k.trim().is_empty())
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self::from_json("test", r#"{"token": "test-token"}"#).unwrap()
    }
}
