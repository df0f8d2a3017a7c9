//! Prompt personas
//!
//! A persona is a TOML file holding the system prompt, the user prompt
//! template and the sampling settings for one assistant task. The asset
//! explainer ships embedded; a replacement can be loaded from disk.

use serde::Deserialize;
use std::path::Path;

use orion_core::Asset;

use crate::{BackendConfig, LlmError};

const ASSET_EXPLAINER: &str = include_str!("../prompts/asset_explainer.toml");

/// A persona definition loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct Persona {
    pub persona: PersonaMetadata,
    pub prompt: PromptConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonaMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    pub system: String,
    /// Template with `{domain}`, `{status}` and `{tech}` placeholders
    pub user: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u16,
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u16 {
    100
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Persona {
    /// The built-in asset explainer
    pub fn asset_explainer() -> Result<Self, LlmError> {
        Self::from_toml_str(ASSET_EXPLAINER)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, LlmError> {
        let persona: Self = toml::from_str(content)
            .map_err(|e| LlmError::Config(format!("invalid persona: {}", e)))?;
        if persona.prompt.system.trim().is_empty() {
            return Err(LlmError::Config(format!(
                "persona {} has an empty system prompt",
                persona.persona.id
            )));
        }
        Ok(persona)
    }

    /// Load a persona file from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LlmError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LlmError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Carry this persona's sampling settings into a backend configuration
    pub fn apply_sampling(&self, config: BackendConfig) -> BackendConfig {
        config.with_sampling(self.output.temperature, self.output.max_tokens)
    }

    pub fn system_prompt(&self) -> &str {
        &self.prompt.system
    }

    /// Fill the user template for an asset
    pub fn render_user_prompt(&self, asset: &Asset) -> String {
        let status = asset
            .status_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let tech = if asset.technologies.is_empty() {
            "none detected".to_string()
        } else {
            asset.technologies.join(", ")
        };

        self.prompt
            .user
            .replace("{domain}", &asset.domain)
            .replace("{status}", &status)
            .replace("{tech}", &tech)
            .trim()
            .to_string()
    }
}
