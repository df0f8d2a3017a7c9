//! Inference engine
//!
//! Applies every registered rule to one signal snapshot and collects the
//! accepted results into an [`ExpandedIntelligenceMap`]. The engine keeps
//! no memory between runs.

use tracing::{debug, info, warn};

use crate::{
    EngineConfig, EngineError, ExpandedIntelligenceMap, Meta, RuleCatalog, RuleRegistry,
    RuleResult, SignalSet,
};

/// Runs a fixed rule registry over signal sets
#[derive(Debug)]
pub struct InferenceEngine {
    registry: RuleRegistry,
}

impl InferenceEngine {
    /// Build an engine from the built-in rule catalog
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        Self::with_catalog(config, &RuleCatalog::builtin())
    }

    /// Build an engine resolving rule sources against a custom catalog
    pub fn with_catalog(config: &EngineConfig, catalog: &RuleCatalog) -> Result<Self, EngineError> {
        let mut registry = RuleRegistry::new();

        for source_name in &config.rule_sources {
            let source = catalog
                .get(source_name)
                .ok_or_else(|| EngineError::UnknownRuleSource(source_name.clone()))?;

            let loaded = registry
                .load_from_source(source)
                .map_err(|error| EngineError::InvalidRule {
                    source_name: source_name.clone(),
                    error,
                })?;
            debug!("Loaded {} rules from source '{}'", loaded, source_name);
        }

        Ok(Self::from_registry(registry))
    }

    /// Wrap an already populated registry
    pub fn from_registry(registry: RuleRegistry) -> Self {
        let duplicates = registry.duplicate_names();
        if !duplicates.is_empty() {
            warn!(
                "Rule names registered more than once, results will be ambiguous: {}",
                duplicates.join(", ")
            );
        }
        info!("Inference engine ready: {:?}", registry.summary());
        Self { registry }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Evaluate every rule, in registration order, against one snapshot
    pub fn run(&self, signals: &SignalSet, meta: Meta) -> ExpandedIntelligenceMap {
        let mut eim = ExpandedIntelligenceMap::new(meta);

        for rule in self.registry.get_all() {
            let result = match rule.apply(signals) {
                Ok(result) => result,
                Err(e) => {
                    warn!("Rule {} failed: {}", rule.name(), e);
                    RuleResult::conflict(rule.name(), rule.category(), e.to_string())
                }
            };

            if result.is_skipped() {
                debug!("Rule {} skipped", rule.name());
                continue;
            }
            eim.add_hypothesis(result);
        }

        info!(
            "Inference produced {} hypotheses from {} rules",
            eim.len(),
            self.registry.len()
        );
        eim
    }
}
