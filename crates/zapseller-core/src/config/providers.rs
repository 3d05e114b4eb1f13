use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    pub gemini: Option<GeminiConfig>,
}

/// Google Gemini API config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_gemini_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_gemini_base_url(),
            timeout_secs: default_gemini_timeout(),
            temperature: default_temperature(),
        }
    }
}

/// Model names per tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Text model for free and starter plans.
    #[serde(default = "default_flash_model")]
    pub flash: String,
    /// Text model for the pro plan.
    #[serde(default = "default_pro_model")]
    pub pro: String,
    /// Native-audio model used when the customer sends a voice note.
    #[serde(default = "default_audio_model")]
    pub audio: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            flash: default_flash_model(),
            pro: default_pro_model(),
            audio: default_audio_model(),
        }
    }
}
