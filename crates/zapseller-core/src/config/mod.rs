mod defaults;
mod providers;


pub use providers::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::ZapError;
use defaults::*;

/// Environment variables checked (in order) for the Gemini API key.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Top-level ZapSeller configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub zapseller: ZapSellerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub models: ModelConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub pairing: PairingConfig,
}

/// General service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZapSellerConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Language for user-facing error strings ("Portuguese" or "English").
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for ZapSellerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            language: default_language(),
        }
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
    /// Maximum request body in bytes. Voice notes arrive base64-encoded.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
    /// Seconds a login session stays valid.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_api_host(),
            port: default_api_port(),
            body_limit_bytes: default_body_limit(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

/// Audit store config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Simulated WhatsApp pairing config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairingConfig {
    /// Seconds a pairing QR stays valid before it must be restarted.
    #[serde(default = "default_pairing_ttl")]
    pub ttl_secs: u64,
}

impl Default for PairingConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_pairing_ttl(),
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

impl Config {
    /// Fill an empty Gemini API key from the environment.
    ///
    /// A key set in the config file always wins.
    pub fn apply_env_overrides(&mut self) {
        let gemini = self.provider.gemini.get_or_insert_with(GeminiConfig::default);
        if !gemini.api_key.is_empty() {
            return;
        }
        for var in API_KEY_ENV_VARS {
            if let Ok(key) = std::env::var(var) {
                if !key.trim().is_empty() {
                    info!("using Gemini API key from ${var}");
                    gemini.api_key = key.trim().to_string();
                    return;
                }
            }
        }
    }

    /// The Gemini config, if a usable API key is present.
    pub fn gemini(&self) -> Option<&GeminiConfig> {
        self.provider
            .gemini
            .as_ref()
            .filter(|g| !g.api_key.is_empty())
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist. Environment overrides
/// are applied in both cases.
pub fn load(path: &str) -> Result<Config, ZapError> {
    let path = Path::new(path);
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ZapError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        toml::from_str::<Config>(&content)
            .map_err(|e| ZapError::Config(format!("failed to parse config: {}", e)))?
    } else {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        Config::default()
    };

    config.apply_env_overrides();
    Ok(config)
}
