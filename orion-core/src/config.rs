//! Configuration tables
//!
//! ORION is configured through TOML: which rule sources the inference
//! engine loads and the keyword/technology tables of the scoring engine.
//! A default configuration is embedded in the binary and can be replaced
//! by a file on disk.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{ConfigError, INFRA_CATEGORY};

const EMBEDDED_CONFIG: &str = include_str!("../config/default.toml");

/// Inference engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Rule sources to load, in order
    #[serde(default = "default_rule_sources")]
    pub rule_sources: Vec<String>,
}

fn default_rule_sources() -> Vec<String> {
    vec![INFRA_CATEGORY.to_string()]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rule_sources: default_rule_sources(),
        }
    }
}

/// One weighted entry of a scoring table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub term: String,
    pub points: u32,
}

impl ScoreEntry {
    pub fn new(term: &str, points: u32) -> Self {
        Self {
            term: term.to_string(),
            points,
        }
    }
}

/// Ordered scoring tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringTables {
    /// Domain substrings worth attention
    #[serde(default)]
    pub keywords: Vec<ScoreEntry>,
    /// Technologies with a history of critical vulnerabilities
    #[serde(default)]
    pub technologies: Vec<ScoreEntry>,
}

impl ScoringTables {
    /// Build tables from literal pairs
    pub fn from_pairs(keywords: &[(&str, u32)], technologies: &[(&str, u32)]) -> Self {
        fn to_entries(pairs: &[(&str, u32)]) -> Vec<ScoreEntry> {
            pairs
                .iter()
                .map(|(term, points)| ScoreEntry::new(term, *points))
                .collect()
        }

        Self {
            keywords: to_entries(keywords),
            technologies: to_entries(technologies),
        }
    }

    /// Reject blank terms, which would match every asset
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (table, entries) in [("keywords", &self.keywords), ("technologies", &self.technologies)] {
            if let Some(entry) = entries.iter().find(|e| e.term.trim().is_empty()) {
                return Err(ConfigError::InvalidTable {
                    table: table.to_string(),
                    reason: format!("blank term worth {} points", entry.points),
                });
            }
        }
        Ok(())
    }
}

/// Complete ORION configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrionConfig {
    pub engine: EngineConfig,
    pub scoring: ScoringTables,
}

/// Configuration as written on disk; absent sections fall back to the
/// embedded defaults
#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    engine: EngineConfig,
    scoring: Option<ScoringTables>,
}

impl OrionConfig {
    /// Configuration shipped with ORION
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml_str(EMBEDDED_CONFIG)
    }

    /// Parse and validate a TOML document
    ///
    /// A missing `[scoring]` section keeps the embedded tables. A present
    /// section replaces them as a whole.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let scoring = match file.scoring {
            Some(scoring) => scoring,
            None => {
                let embedded: ConfigFile = toml::from_str(EMBEDDED_CONFIG)?;
                embedded.scoring.ok_or_else(|| ConfigError::InvalidTable {
                    table: "scoring".to_string(),
                    reason: "embedded configuration has no [scoring] section".to_string(),
                })?
            }
        };
        scoring.validate()?;

        Ok(Self {
            engine: file.engine,
            scoring,
        })
    }

    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Read {
            path: path.display().to_string(),
            error,
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_loads() {
        let config = OrionConfig::embedded().unwrap();

        assert_eq!(config.engine.rule_sources, vec!["infra".to_string()]);
        assert_eq!(config.scoring.keywords[0], ScoreEntry::new("dev", 25));
        assert!(config.scoring.technologies.iter().any(|e| e.term == "Jenkins" && e.points == 35));
        assert!(config.scoring.keywords.len() > 50);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = OrionConfig::from_toml_str(
            r#"
            [scoring]
            keywords = [{ term = "vpn", points = 30 }]
            "#,
        )
        .unwrap();

        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.scoring.keywords.len(), 1);
        assert!(config.scoring.technologies.is_empty());
    }

    #[test]
    fn test_engine_only_config_keeps_embedded_scoring() {
        let config = OrionConfig::from_toml_str(
            r#"
            [engine]
            rule_sources = ["infra"]
            "#,
        )
        .unwrap();

        assert_eq!(config.scoring, OrionConfig::embedded().unwrap().scoring);
        assert!(config.scoring.technologies.iter().any(|e| e.term == "Jenkins"));
    }

    #[test]
    fn test_empty_config_is_embedded_config() {
        let config = OrionConfig::from_toml_str("").unwrap();
        assert_eq!(config, OrionConfig::embedded().unwrap());
    }

    #[test]
    fn test_blank_term_is_rejected() {
        let err = OrionConfig::from_toml_str(
            r#"
            [scoring]
            technologies = [{ term = " ", points = 10 }]
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidTable { ref table, .. } if table == "technologies"));
    }

    #[test]
    fn test_negative_points_fail_to_parse() {
        let result = OrionConfig::from_toml_str(
            r#"
            [scoring]
            keywords = [{ term = "dev", points = -5 }]
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
