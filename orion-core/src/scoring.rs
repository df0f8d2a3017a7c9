//! Attack-interest scoring
//!
//! Additive, table-driven scorer for discovered assets:
//! - every asset starts at [`BASE_SCORE`]
//! - domain keywords and critical technologies add their table points
//! - 401/403 responses add a fixed bonus
//! - the total is capped at [`MAX_SCORE`]
//!
//! Every point added leaves a reason behind, in the order it was found,
//! so a report reader can rebuild the score by hand.

use std::cmp::Ordering;
use tracing::debug;

use crate::{
    Asset, ConfigError, OrionConfig, ScoreEntry, ScoredAsset, ScoringTables, BASE_SCORE,
    MAX_SCORE,
};

/// Bonus for a 403 response
pub const FORBIDDEN_POINTS: u32 = 15;

/// Bonus for a 401 response
pub const UNAUTHORIZED_POINTS: u32 = 20;

const FORBIDDEN_REASON: &str = "Forbidden (403) may indicate protected interesting content";
const UNAUTHORIZED_REASON: &str = "Unauthorized (401) indicates an authentication barrier";

/// Table entry with its term pre-lowercased for matching
#[derive(Debug, Clone)]
struct Matcher {
    entry: ScoreEntry,
    needle: String,
}

impl Matcher {
    fn new(entry: &ScoreEntry) -> Self {
        Self {
            entry: entry.clone(),
            needle: entry.term.to_lowercase(),
        }
    }

    fn matches(&self, haystack_lowercase: &str) -> bool {
        haystack_lowercase.contains(&self.needle)
    }
}

/// Scores assets against keyword and technology tables
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    tables: ScoringTables,
    keywords: Vec<Matcher>,
    technologies: Vec<Matcher>,
}

impl ScoringEngine {
    /// Build an engine; blank table terms are rejected
    pub fn new(tables: ScoringTables) -> Result<Self, ConfigError> {
        tables.validate()?;

        let keywords = tables.keywords.iter().map(Matcher::new).collect();
        let technologies = tables.technologies.iter().map(Matcher::new).collect();
        Ok(Self {
            tables,
            keywords,
            technologies,
        })
    }

    /// Engine using the embedded default tables
    pub fn with_default_tables() -> Result<Self, ConfigError> {
        Self::new(OrionConfig::embedded()?.scoring)
    }

    pub fn tables(&self) -> &ScoringTables {
        &self.tables
    }

    /// Score an asset once, consuming it
    pub fn calculate_score(&self, asset: Asset) -> ScoredAsset {
        let (score, reasons) = self.accumulate(&asset, BASE_SCORE);
        debug!(
            "Scored {} at {:.1} ({} reasons)",
            asset.domain,
            score,
            reasons.len()
        );
        ScoredAsset::new(asset, score, reasons)
    }

    /// Explicit second pass: adds matches again on top of the previous total
    pub fn rescore(&self, scored: ScoredAsset) -> ScoredAsset {
        let (asset, previous, mut reasons, insight) = scored.into_parts();
        let (score, new_reasons) = self.accumulate(&asset, previous);
        reasons.extend(new_reasons);

        let mut rescored = ScoredAsset::new(asset, score, reasons);
        if let Some(insight) = insight {
            rescored.set_ai_insight(insight);
        }
        rescored
    }

    /// Score a batch of assets, keeping input order
    pub fn score_all(&self, assets: Vec<Asset>) -> Vec<ScoredAsset> {
        assets
            .into_iter()
            .map(|asset| self.calculate_score(asset))
            .collect()
    }

    fn accumulate(&self, asset: &Asset, start: f64) -> (f64, Vec<String>) {
        let mut score = start;
        let mut reasons = Vec::new();

        let domain = asset.domain.to_lowercase();
        for keyword in self.keywords.iter().filter(|k| k.matches(&domain)) {
            score += f64::from(keyword.entry.points);
            reasons.push(format!("Keyword '{}' detected in domain", keyword.entry.term));
        }

        for technology in &asset.technologies {
            let technology = technology.trim().to_lowercase();
            if technology.is_empty() {
                continue;
            }
            for critical in self.technologies.iter().filter(|t| t.matches(&technology)) {
                score += f64::from(critical.entry.points);
                reasons.push(format!("Critical technology '{}' detected", critical.entry.term));
            }
        }

        match asset.status_code {
            Some(403) => {
                score += f64::from(FORBIDDEN_POINTS);
                reasons.push(FORBIDDEN_REASON.to_string());
            }
            Some(401) => {
                score += f64::from(UNAUTHORIZED_POINTS);
                reasons.push(UNAUTHORIZED_REASON.to_string());
            }
            _ => {}
        }

        (score.min(MAX_SCORE), reasons)
    }
}

/// Sort scored assets by descending score; ties keep their input order
pub fn rank(assets: &mut [ScoredAsset]) {
    assets.sort_by(|a, b| b.score().partial_cmp(&a.score()).unwrap_or(Ordering::Equal));
}
