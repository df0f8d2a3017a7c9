//! Analysis pipeline
//!
//! One run for one target:
//! 1. obtain httpx records (saved file, or live discovery)
//! 2. score every asset and rank by descending score
//! 3. ask the assistant about high-interest assets, concurrently
//! 4. run rule inference over the collected signals
//! 5. assess the target's posture from passive observations

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use orion_agents::AiAssistant;
use orion_core::{
    rank, ConfigError, EngineError, ExpandedIntelligenceMap, InferenceEngine, Meta, OrionConfig,
    PostureAssessment, ScoredAsset, ScoringEngine,
};
use orion_recon::{
    collect_signals, parse_file, passive_observation, run_discovery, to_assets, HttpxRecord,
    ReconConfig, ReconError,
};

/// Errors that abort a run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Recon failed: {0}")]
    Recon(#[from] ReconError),

    #[error("Inference engine setup failed: {0}")]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to write report {path}: {error}")]
    Write {
        path: String,
        #[source]
        error: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Target domain
    pub target: String,
    /// Saved httpx output; discovery runs when absent
    pub results_file: Option<PathBuf>,
    pub recon: ReconConfig,
    pub orion: OrionConfig,
}

impl PipelineConfig {
    pub fn new(target: &str, orion: OrionConfig) -> Self {
        Self {
            target: target.to_string(),
            results_file: None,
            recon: ReconConfig::default(),
            orion,
        }
    }

    pub fn with_results_file(mut self, path: PathBuf) -> Self {
        self.results_file = Some(path);
        self
    }
}

/// Everything one run learned about a target
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub target: String,
    pub generated_at: DateTime<Utc>,
    /// Ranked by descending attack-interest score
    pub assets: Vec<ScoredAsset>,
    pub intelligence: ExpandedIntelligenceMap,
    pub posture: PostureAssessment,
}

impl AnalysisReport {
    pub fn high_interest(&self) -> impl Iterator<Item = &ScoredAsset> {
        self.assets.iter().filter(|a| a.is_high_interest())
    }

    pub fn narrative(&self) -> String {
        self.posture.narrative(&self.target)
    }
}

/// End-to-end analysis runner
pub struct Pipeline {
    config: PipelineConfig,
    scorer: ScoringEngine,
    engine: InferenceEngine,
    assistant: AiAssistant,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, assistant: AiAssistant) -> Result<Self, PipelineError> {
        let scorer = ScoringEngine::new(config.orion.scoring.clone())?;
        let engine = InferenceEngine::new(&config.orion.engine)?;

        Ok(Self {
            config,
            scorer,
            engine,
            assistant,
        })
    }

    /// Load or discover records, then analyze them
    pub async fn run(&self) -> Result<AnalysisReport, PipelineError> {
        let path = match &self.config.results_file {
            Some(path) => {
                info!("Parsing discovered assets from: {}", path.display());
                path.clone()
            }
            None => run_discovery(&self.config.target, &self.config.recon).await?,
        };

        let records = parse_file(&path).await?;
        Ok(self.analyze(records).await)
    }

    /// Analyze already parsed httpx records
    pub async fn analyze(&self, records: Vec<HttpxRecord>) -> AnalysisReport {
        let run_id = Uuid::new_v4();
        let generated_at = Utc::now();

        let mut assets = self.scorer.score_all(to_assets(&records));
        rank(&mut assets);
        if assets.is_empty() {
            warn!("No assets discovered for {}", self.config.target);
        } else {
            info!("Analyzing {} assets", assets.len());
        }

        self.assistant.explain_high_interest(&mut assets).await;

        let mut meta = Meta::new();
        meta.insert("run_id".to_string(), run_id.to_string().into());
        meta.insert("target".to_string(), self.config.target.clone().into());
        meta.insert("asset_count".to_string(), assets.len().into());
        meta.insert("generated_at".to_string(), generated_at.to_rfc3339().into());

        let signals = collect_signals(&records);
        let intelligence = self.engine.run(&signals, meta);
        let posture = PostureAssessment::assess(&passive_observation(&records));

        AnalysisReport {
            run_id,
            target: self.config.target.clone(),
            generated_at,
            assets,
            intelligence,
            posture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use orion_agents::{LlmBackend, LlmError, SharedBackend};
    use orion_core::ExposureLevel;
    use orion_recon::parse_records;
    use std::io::Write;
    use std::sync::Arc;

    const SCAN: &str = r#"
{"input":"www.example.com","host":"203.0.113.10","status_code":200,"webserver":"nginx","cdn_name":"cloudflare"}
{"input":"jenkins-dev.example.com","host":"203.0.113.11","status_code":403,"tech":["Jenkins"],"header":{"x_powered_by":"Servlet/3.1"},"asn":{"as_number":"AS16509","as_name":"Amazon.com Inc."}}
{"input":"mail.example.com","host":"203.0.113.12","status_code":401,"asn":{"as_number":"AS16509","as_name":"Amazon.com Inc."}}
"#;

    struct MockBackend;

    #[async_trait]
    impl LlmBackend for MockBackend {
        async fn generate(&self, _system: &str, _user: &str) -> Result<String, LlmError> {
            Ok("Default Jenkins credentials worth trying.".to_string())
        }

        fn model_name(&self) -> &str {
            "mock"
        }
    }

    fn pipeline(backend: Option<SharedBackend>) -> Pipeline {
        let config = PipelineConfig::new("example.com", OrionConfig::embedded().unwrap());
        Pipeline::new(config, AiAssistant::new(backend).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_ranks_and_explains() {
        let backend: SharedBackend = Arc::new(MockBackend);
        let report = pipeline(Some(backend)).analyze(parse_records(SCAN)).await;

        assert_eq!(report.assets.len(), 3);
        assert_eq!(report.assets[0].domain(), "jenkins-dev.example.com");
        assert!(report.assets.windows(2).all(|w| w[0].score() >= w[1].score()));

        let explained: Vec<_> = report.high_interest().collect();
        assert!(!explained.is_empty());
        assert!(explained
            .iter()
            .all(|a| a.ai_insight() == Some("Default Jenkins credentials worth trying.")));
        assert!(report
            .assets
            .iter()
            .filter(|a| !a.is_high_interest())
            .all(|a| a.ai_insight().is_none()));
    }

    #[tokio::test]
    async fn test_analyze_infers_and_assesses() {
        let report = pipeline(None).analyze(parse_records(SCAN)).await;

        let infra_type = report.intelligence.get_by_rule("infra_type_inference").unwrap();
        assert_eq!(infra_type.detail_str("infra_type"), Some("cloud"));
        assert_eq!(report.intelligence.len(), 3);
        assert_eq!(report.intelligence.meta()["target"], "example.com");
        assert_eq!(report.intelligence.meta()["asset_count"], 3);

        assert_eq!(report.posture.exposure.exposure_level, ExposureLevel::Moderate);
        assert!(report.narrative().starts_with("The target 'example.com'"));
    }

    #[tokio::test]
    async fn test_empty_scan_still_reports() {
        let report = pipeline(None).analyze(Vec::new()).await;

        assert!(report.assets.is_empty());
        assert!(report.intelligence.is_empty());
        assert_eq!(report.posture.exposure.exposure_level, ExposureLevel::Minimal);
    }

    #[tokio::test]
    async fn test_run_from_results_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", SCAN).unwrap();

        let config = PipelineConfig::new("example.com", OrionConfig::embedded().unwrap())
            .with_results_file(file.path().to_path_buf());
        let pipeline = Pipeline::new(config, AiAssistant::new(None).unwrap()).unwrap();

        let report = pipeline.run().await.unwrap();
        assert_eq!(report.assets.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_results_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::new("example.com", OrionConfig::embedded().unwrap())
            .with_results_file(dir.path().join("missing.json"));
        let pipeline = Pipeline::new(config, AiAssistant::new(None).unwrap()).unwrap();

        assert!(matches!(
            pipeline.run().await,
            Err(PipelineError::Recon(ReconError::Read { .. }))
        ));
    }

    #[test]
    fn test_unknown_rule_source_fails_setup() {
        let mut orion = OrionConfig::embedded().unwrap();
        orion.engine.rule_sources.push("stability".to_string());

        let result = Pipeline::new(
            PipelineConfig::new("example.com", orion),
            AiAssistant::new(None).unwrap(),
        );
        assert!(matches!(result, Err(PipelineError::Engine(_))));
    }
}
