//! Rule contract
//!
//! A rule is a stateless, pure interpretation of a [`SignalSet`]:
//! - it declares the signals it needs
//! - it skips (never fails) when one of them is missing
//! - it otherwise maps signal values to an explainable [`RuleResult`]
//!
//! Rules are grouped into sources (see [`crate::RuleSource`]) so new
//! domains plug into the engine without changing it.

pub mod infra;

pub use infra::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{RegistryError, RuleError, SignalSet};

/// Name reserved for rules that never set their own
pub const UNDEFINED_RULE_NAME: &str = "undefined-rule";

/// Confidence attached to an interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    #[default]
    Low,
    Medium,
    High,
}

/// How much an interpretation should weigh in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SignalWeight {
    #[default]
    Low,
    Medium,
    High,
}

/// Outcome of one rule application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    Applied,
    Skipped,
    Conflict,
}

/// Evidence justifying an interpretation
pub type RuleDetails = BTreeMap<String, serde_json::Value>;

/// Result of applying one rule to one signal set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_name: String,
    pub category: String,
    pub status: RuleStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<RuleDetails>,
    #[serde(default)]
    pub weight: SignalWeight,
    #[serde(default)]
    pub confidence: ConfidenceLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts_with: Option<Vec<String>>,
}

impl RuleResult {
    /// Result for a rule whose required signals were not all present
    pub fn skipped(rule_name: &str, category: &str) -> Self {
        Self {
            rule_name: rule_name.to_string(),
            category: category.to_string(),
            status: RuleStatus::Skipped,
            interpretation: None,
            details: None,
            weight: SignalWeight::default(),
            confidence: ConfidenceLevel::default(),
            conflicts_with: None,
        }
    }

    /// Result carrying an interpretation and its evidence
    pub fn applied(
        rule_name: &str,
        category: &str,
        interpretation: String,
        details: RuleDetails,
    ) -> Self {
        Self {
            status: RuleStatus::Applied,
            interpretation: Some(interpretation),
            details: Some(details),
            ..Self::skipped(rule_name, category)
        }
    }

    /// Result for a rule that could not produce a consistent interpretation
    pub fn conflict(rule_name: &str, category: &str, description: String) -> Self {
        Self {
            status: RuleStatus::Conflict,
            interpretation: Some(description),
            ..Self::skipped(rule_name, category)
        }
    }

    pub fn with_weight(mut self, weight: SignalWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_confidence(mut self, confidence: ConfidenceLevel) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_conflicts(mut self, rule_names: Vec<String>) -> Self {
        self.conflicts_with = Some(rule_names);
        self
    }

    pub fn is_skipped(&self) -> bool {
        self.status == RuleStatus::Skipped
    }

    /// Read a string detail by key
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.as_ref()?.get(key)?.as_str()
    }
}

/// A unit of interpretation over a signal set
///
/// Implementations must be pure: no I/O, no randomness and no state carried
/// between calls, so identical inputs always give identical results.
pub trait Rule: Send + Sync {
    /// Unique rule name
    fn name(&self) -> &str;

    /// Category the rule belongs to (infra, exposure, ...)
    fn category(&self) -> &str;

    /// Signal names that must be present for the rule to apply
    fn required_signals(&self) -> &[&str];

    /// Interpret signals; only called once `can_apply` holds
    fn infer(&self, signals: &SignalSet) -> Result<RuleResult, RuleError>;

    /// Check that every required signal is present
    fn can_apply(&self, signals: &SignalSet) -> bool {
        self.required_signals()
            .iter()
            .all(|name| signals.contains(name))
    }

    /// Apply the rule, skipping when required signals are missing
    fn apply(&self, signals: &SignalSet) -> Result<RuleResult, RuleError> {
        if !self.can_apply(signals) {
            return Ok(RuleResult::skipped(self.name(), self.category()));
        }
        self.infer(signals)
    }
}

/// Check the identity of a rule before it is admitted into a registry
pub fn validate_rule(rule: &dyn Rule) -> Result<(), RegistryError> {
    let name = rule.name().trim();
    if name.is_empty() || name == UNDEFINED_RULE_NAME {
        return Err(RegistryError::MissingName);
    }
    if rule.category().trim().is_empty() {
        return Err(RegistryError::MissingCategory(name.to_string()));
    }
    Ok(())
}
