//! Discovered assets
//!
//! An [`Asset`] is one network-facing endpoint reported by the discovery
//! collaborator. Scoring consumes it and hands back a [`ScoredAsset`], so an
//! asset cannot be scored twice by accident.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::HIGH_INTEREST_THRESHOLD;

/// Endpoint discovered for a target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub domain: String,
    pub ip: Option<String>,
    pub status_code: Option<u16>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Asset {
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            ..Default::default()
        }
    }

    pub fn with_ip(mut self, ip: &str) -> Self {
        self.ip = Some(ip.to_string());
        self
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_technologies<I, S>(mut self, technologies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.technologies = technologies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_lowercase(), value.to_string());
        self
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Banding of the attack-interest score used by reporters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestLevel {
    Low,
    Elevated,
    High,
}

impl InterestLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::High
        } else if score >= 50.0 {
            Self::Elevated
        } else {
            Self::Low
        }
    }
}

/// An asset annotated by the scoring engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredAsset {
    asset: Asset,
    attack_interest_score: f64,
    score_reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ai_insight: Option<String>,
}

impl ScoredAsset {
    pub(crate) fn new(asset: Asset, attack_interest_score: f64, score_reasons: Vec<String>) -> Self {
        Self {
            asset,
            attack_interest_score,
            score_reasons,
            ai_insight: None,
        }
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn domain(&self) -> &str {
        &self.asset.domain
    }

    pub fn score(&self) -> f64 {
        self.attack_interest_score
    }

    /// Why the score was assigned, in discovery order
    pub fn reasons(&self) -> &[String] {
        &self.score_reasons
    }

    pub fn interest_level(&self) -> InterestLevel {
        InterestLevel::from_score(self.attack_interest_score)
    }

    /// Worth highlighting and explaining in reports
    pub fn is_high_interest(&self) -> bool {
        self.attack_interest_score >= HIGH_INTEREST_THRESHOLD
    }

    pub fn ai_insight(&self) -> Option<&str> {
        self.ai_insight.as_deref()
    }

    pub fn set_ai_insight(&mut self, insight: String) {
        self.ai_insight = Some(insight);
    }

    /// Give the raw asset back, dropping the score
    pub fn into_asset(self) -> Asset {
        self.asset
    }

    pub(crate) fn into_parts(self) -> (Asset, f64, Vec<String>, Option<String>) {
        (self.asset, self.attack_interest_score, self.score_reasons, self.ai_insight)
    }
}
