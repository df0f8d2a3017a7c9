//! Rule registry
//!
//! Holds the active rule set of an engine. Rules arrive either one at a
//! time or in bulk from a [`RuleSource`], a declarative table of rule
//! constructors. A [`RuleCatalog`] maps source names (as written in the
//! engine configuration) to sources.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::{infra_source, validate_rule, RegistryError, Rule};

/// Constructor for one rule instance
pub type RuleFactory = fn() -> Box<dyn Rule>;

fn construct<R: Rule + Default + 'static>() -> Box<dyn Rule> {
    Box::new(R::default())
}

/// A named collection of rule constructors
#[derive(Clone)]
pub struct RuleSource {
    name: String,
    factories: Vec<RuleFactory>,
}

impl RuleSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            factories: Vec::new(),
        }
    }

    /// Add a rule type constructed through `Default`
    pub fn with_rule<R: Rule + Default + 'static>(self) -> Self {
        self.with_factory(construct::<R>)
    }

    /// Add a rule constructor
    pub fn with_factory(mut self, factory: RuleFactory) -> Self {
        self.factories.push(factory);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn factories(&self) -> &[RuleFactory] {
        &self.factories
    }
}

impl fmt::Debug for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSource")
            .field("name", &self.name)
            .field("rules", &self.factories.len())
            .finish()
    }
}

/// Lookup of rule sources by name
#[derive(Debug, Default, Clone)]
pub struct RuleCatalog {
    sources: HashMap<String, RuleSource>,
}

impl RuleCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of the rule sources shipped with ORION
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.add(infra_source());
        catalog
    }

    /// Add (or replace) a source
    pub fn add(&mut self, source: RuleSource) {
        self.sources.insert(source.name.clone(), source);
    }

    pub fn get(&self, name: &str) -> Option<&RuleSource> {
        self.sources.get(name)
    }

    /// Names of every known source, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.sources.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Active rule set of an engine, in registration order
///
/// The registry does not deduplicate names; results are aggregated by rule
/// name downstream, so keep names unique (see [`RuleRegistry::duplicate_names`]).
#[derive(Default)]
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule after checking its name and category
    pub fn register(&mut self, rule: Box<dyn Rule>) -> Result<(), RegistryError> {
        validate_rule(rule.as_ref())?;
        self.rules.push(rule);
        Ok(())
    }

    /// Instantiate and register every rule of a source exactly once
    pub fn load_from_source(&mut self, source: &RuleSource) -> Result<usize, RegistryError> {
        for factory in source.factories() {
            self.register(factory())?;
        }
        Ok(source.factories().len())
    }

    pub fn get_all(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn get_by_category(&self, category: &str) -> Vec<&dyn Rule> {
        self.rules
            .iter()
            .filter(|rule| rule.category() == category)
            .map(|rule| rule.as_ref())
            .collect()
    }

    /// Count of registered rules per category
    pub fn summary(&self) -> BTreeMap<String, usize> {
        let mut summary = BTreeMap::new();
        for rule in &self.rules {
            *summary.entry(rule.category().to_string()).or_insert(0) += 1;
        }
        summary
    }

    /// Names registered more than once
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for rule in &self.rules {
            *counts.entry(rule.name()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("summary", &self.summary())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RuleError, RuleResult, SignalSet, INFRA_CATEGORY};

    #[derive(Default)]
    struct ExposureProbe;

    impl Rule for ExposureProbe {
        fn name(&self) -> &str {
            "exposure_probe"
        }

        fn category(&self) -> &str {
            "exposure"
        }

        fn required_signals(&self) -> &[&str] {
            &[]
        }

        fn infer(&self, _signals: &SignalSet) -> Result<RuleResult, RuleError> {
            Ok(RuleResult::skipped(self.name(), self.category()))
        }
    }

    #[derive(Default)]
    struct Nameless;

    impl Rule for Nameless {
        fn name(&self) -> &str {
            ""
        }

        fn category(&self) -> &str {
            "exposure"
        }

        fn required_signals(&self) -> &[&str] {
            &[]
        }

        fn infer(&self, _signals: &SignalSet) -> Result<RuleResult, RuleError> {
            Err(RuleError::Fault("unreachable".to_string()))
        }
    }

    #[test]
    fn test_load_builtin_infra_source() {
        let mut registry = RuleRegistry::new();
        let loaded = registry.load_from_source(&infra_source()).unwrap();

        assert_eq!(loaded, 3);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get_all()[0].name(), "infra_type_inference");
        assert_eq!(registry.get_all()[2].name(), "infra_external_dependency_inference");
    }

    #[test]
    fn test_summary_matches_category_views() {
        let mut registry = RuleRegistry::new();
        registry.load_from_source(&infra_source()).unwrap();
        registry.register(Box::new(ExposureProbe)).unwrap();

        let summary = registry.summary();
        assert_eq!(summary.len(), 2);
        for (category, count) in &summary {
            assert_eq!(registry.get_by_category(category).len(), *count);
        }
        assert_eq!(summary[INFRA_CATEGORY], 3);
        assert!(registry.get_by_category("stability").is_empty());
    }

    #[test]
    fn test_register_rejects_nameless_rule() {
        let mut registry = RuleRegistry::new();
        let err = registry.register(Box::new(Nameless)).unwrap_err();

        assert_eq!(err, RegistryError::MissingName);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicates_are_kept_and_reported() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(ExposureProbe)).unwrap();
        registry.register(Box::new(ExposureProbe)).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.duplicate_names(), vec!["exposure_probe".to_string()]);
    }

    #[test]
    fn test_catalog_lookup() {
        let mut catalog = RuleCatalog::builtin();
        catalog.add(RuleSource::new("exposure").with_rule::<ExposureProbe>());

        assert_eq!(catalog.names(), vec!["exposure", "infra"]);
        assert_eq!(catalog.get("exposure").map(|s| s.factories().len()), Some(1));
        assert!(catalog.get("stability").is_none());
    }
}
