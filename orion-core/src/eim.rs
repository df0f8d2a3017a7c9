//! Expanded Intelligence Map
//!
//! The accepted rule results of one analysis run, in evaluation order,
//! together with the caller's context.

use serde::{Deserialize, Serialize};

use crate::{RuleResult, RuleStatus};

/// Caller-supplied context attached to a run; opaque to the engine
pub type Meta = serde_json::Map<String, serde_json::Value>;

/// Ordered hypotheses produced by one inference run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpandedIntelligenceMap {
    meta: Meta,
    hypotheses: Vec<RuleResult>,
}

impl ExpandedIntelligenceMap {
    pub fn new(meta: Meta) -> Self {
        Self {
            meta,
            hypotheses: Vec::new(),
        }
    }

    /// Append a result; only the engine builds maps
    pub(crate) fn add_hypothesis(&mut self, result: RuleResult) {
        self.hypotheses.push(result);
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn hypotheses(&self) -> &[RuleResult] {
        &self.hypotheses
    }

    pub fn get_by_category(&self, category: &str) -> Vec<&RuleResult> {
        self.hypotheses
            .iter()
            .filter(|h| h.category == category)
            .collect()
    }

    /// Result of a rule by name (first one when names repeat)
    pub fn get_by_rule(&self, rule_name: &str) -> Option<&RuleResult> {
        self.hypotheses.iter().find(|h| h.rule_name == rule_name)
    }

    /// Results that came back as conflicts
    pub fn conflicts(&self) -> Vec<&RuleResult> {
        self.hypotheses
            .iter()
            .filter(|h| h.status == RuleStatus::Conflict)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.hypotheses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleDetails;

    #[test]
    fn test_category_filter_keeps_order() {
        let mut eim = ExpandedIntelligenceMap::new(Meta::new());
        eim.add_hypothesis(RuleResult::applied("a", "infra", "first".into(), RuleDetails::new()));
        eim.add_hypothesis(RuleResult::applied("b", "exposure", "second".into(), RuleDetails::new()));
        eim.add_hypothesis(RuleResult::conflict("c", "infra", "broken".into()));

        let infra: Vec<&str> = eim
            .get_by_category("infra")
            .into_iter()
            .map(|h| h.rule_name.as_str())
            .collect();
        assert_eq!(infra, vec!["a", "c"]);
        assert_eq!(eim.conflicts().len(), 1);
        assert_eq!(eim.get_by_rule("b").and_then(|h| h.interpretation.as_deref()), Some("second"));
    }

    #[test]
    fn test_meta_is_carried_verbatim() {
        let mut meta = Meta::new();
        meta.insert("target".to_string(), serde_json::json!("example.com"));
        let eim = ExpandedIntelligenceMap::new(meta);

        assert_eq!(eim.meta()["target"], "example.com");
        assert!(eim.is_empty());
    }
}
