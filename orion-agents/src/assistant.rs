//! AI assistant for asset triage
//!
//! Asks the model for one short sentence on why an asset deserves
//! attention. The assistant degrades instead of failing: when disabled it
//! answers with a fixed notice, and backend errors become the insight text.

use futures::future::join_all;
use tracing::{debug, info, warn};

use orion_core::{Asset, ScoredAsset};

use crate::{LlmError, Persona, SharedBackend};

/// Insight used when no backend is configured
pub const DISABLED_NOTICE: &str = "AI analysis disabled. (Check your GROQ_API_KEY)";

/// Language-model assistant explaining high-interest assets
pub struct AiAssistant {
    backend: Option<SharedBackend>,
    persona: Persona,
}

impl AiAssistant {
    /// Assistant using the embedded asset explainer persona
    pub fn new(backend: Option<SharedBackend>) -> Result<Self, LlmError> {
        Ok(Self::with_persona(backend, Persona::asset_explainer()?))
    }

    pub fn with_persona(backend: Option<SharedBackend>, persona: Persona) -> Self {
        match &backend {
            Some(b) if persona.persona.enabled => {
                info!("AI assistant enabled with model {}", b.model_name());
            }
            _ => info!("AI assistant disabled"),
        }
        Self { backend, persona }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some() && self.persona.persona.enabled
    }

    /// One-sentence insight for an asset; never fails
    pub async fn explain_asset(&self, asset: &Asset) -> String {
        let backend = match &self.backend {
            Some(backend) if self.persona.persona.enabled => backend,
            _ => return DISABLED_NOTICE.to_string(),
        };

        let prompt = self.persona.render_user_prompt(asset);
        debug!("Requesting insight for {}", asset.domain);

        match backend.generate(self.persona.system_prompt(), &prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => format!("AI Error: {}", LlmError::EmptyResponse),
            Err(e) => {
                warn!("Insight for {} failed: {}", asset.domain, e);
                format!("AI Error: {}", e)
            }
        }
    }

    /// Attach insights to every asset at or above the high-interest threshold
    ///
    /// Requests run concurrently; returns how many assets were explained.
    pub async fn explain_high_interest(&self, assets: &mut [ScoredAsset]) -> usize {
        if !self.is_enabled() {
            return 0;
        }

        let targets: Vec<&mut ScoredAsset> = assets
            .iter_mut()
            .filter(|a| a.is_high_interest())
            .collect();
        let insights = join_all(targets.iter().map(|a| self.explain_asset(a.asset()))).await;

        let explained = targets.len();
        for (scored, insight) in targets.into_iter().zip(insights) {
            scored.set_ai_insight(insight);
        }

        info!("Explained {} high-interest assets", explained);
        explained
    }
}
