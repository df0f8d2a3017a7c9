//! Infrastructure rules
//!
//! Interpret hosting signals (ASN, ISP, providers, third-party services)
//! into the type, standardization and external dependency of a target's
//! infrastructure.

use serde_json::json;

use crate::{
    ConfidenceLevel, Rule, RuleDetails, RuleError, RuleResult, RuleSource, SignalSet,
    SignalWeight,
};

/// Category shared by every infrastructure rule
pub const INFRA_CATEGORY: &str = "infra";

/// ISP/ASN fragments that identify a public cloud provider
pub const CLOUD_KEYWORDS: &[&str] = &[
    "amazon",
    "aws",
    "google",
    "gcp",
    "azure",
    "microsoft",
    "digitalocean",
    "oracle",
    "alibaba",
];

/// Rule source exposing every infrastructure rule
pub fn infra_source() -> RuleSource {
    RuleSource::new(INFRA_CATEGORY)
        .with_rule::<InfraTypeRule>()
        .with_rule::<InfraStandardizationRule>()
        .with_rule::<ExternalDependencyRule>()
}

fn signal_text(signals: &SignalSet, name: &str) -> Result<String, RuleError> {
    signals
        .value(name)
        .map(|value| value.render_lowercase())
        .ok_or_else(|| RuleError::InvalidSignal {
            signal: name.to_string(),
            reason: "missing after applicability check".to_string(),
        })
}

/// Cloud vs on-prem classification from ISP and ASN
#[derive(Debug, Default)]
pub struct InfraTypeRule;

impl Rule for InfraTypeRule {
    fn name(&self) -> &str {
        "infra_type_inference"
    }

    fn category(&self) -> &str {
        INFRA_CATEGORY
    }

    fn required_signals(&self) -> &[&str] {
        &["asn", "isp"]
    }

    fn infer(&self, signals: &SignalSet) -> Result<RuleResult, RuleError> {
        let isp = signal_text(signals, "isp")?;
        let asn = signal_text(signals, "asn")?;

        let is_cloud = CLOUD_KEYWORDS
            .iter()
            .any(|keyword| isp.contains(keyword) || asn.contains(keyword));

        let (infra_type, confidence) = if is_cloud {
            ("cloud", ConfidenceLevel::High)
        } else {
            ("on-prem", ConfidenceLevel::Medium)
        };

        let mut details = RuleDetails::new();
        details.insert("infra_type".to_string(), json!(infra_type));
        details.insert("isp".to_string(), json!(isp));
        details.insert("asn".to_string(), json!(asn));

        Ok(RuleResult::applied(
            self.name(),
            self.category(),
            format!("Infrastructure type inferred as '{}'", infra_type),
            details,
        )
        .with_weight(SignalWeight::Medium)
        .with_confidence(confidence))
    }
}

/// Standardized vs fragmented hosting from the set of providers in use
#[derive(Debug, Default)]
pub struct InfraStandardizationRule;

impl Rule for InfraStandardizationRule {
    fn name(&self) -> &str {
        "infra_standardization_inference"
    }

    fn category(&self) -> &str {
        INFRA_CATEGORY
    }

    fn required_signals(&self) -> &[&str] {
        &["hosting_providers"]
    }

    fn infer(&self, signals: &SignalSet) -> Result<RuleResult, RuleError> {
        let providers = signals
            .value("hosting_providers")
            .map(|value| value.lowercase_set())
            .unwrap_or_default();
        let provider_count = providers.len();

        let (infra_pattern, confidence) = match provider_count {
            0 => ("unknown", ConfidenceLevel::Low),
            1 => ("standardized", ConfidenceLevel::High),
            n if n <= 3 => ("mostly-standardized", ConfidenceLevel::Medium),
            _ => ("fragmented", ConfidenceLevel::Medium),
        };

        let mut details = RuleDetails::new();
        details.insert("infra_pattern".to_string(), json!(infra_pattern));
        details.insert("unique_providers".to_string(), json!(providers));
        details.insert("provider_count".to_string(), json!(provider_count));

        Ok(RuleResult::applied(
            self.name(),
            self.category(),
            format!("Infrastructure pattern inferred as '{}'", infra_pattern),
            details,
        )
        .with_weight(SignalWeight::Medium)
        .with_confidence(confidence))
    }
}

/// Reliance on third-party services
#[derive(Debug, Default)]
pub struct ExternalDependencyRule;

impl Rule for ExternalDependencyRule {
    fn name(&self) -> &str {
        "infra_external_dependency_inference"
    }

    fn category(&self) -> &str {
        INFRA_CATEGORY
    }

    fn required_signals(&self) -> &[&str] {
        &["third_party_services"]
    }

    fn infer(&self, signals: &SignalSet) -> Result<RuleResult, RuleError> {
        let services = signals
            .value("third_party_services")
            .map(|value| value.lowercase_set())
            .unwrap_or_default();
        let service_count = services.len();

        let (dependency_level, confidence) = match service_count {
            0 => ("low", ConfidenceLevel::Medium),
            n if n <= 2 => ("moderate", ConfidenceLevel::Medium),
            _ => ("high", ConfidenceLevel::High),
        };

        let mut details = RuleDetails::new();
        details.insert("dependency_level".to_string(), json!(dependency_level));
        details.insert("services".to_string(), json!(services));
        details.insert("service_count".to_string(), json!(service_count));

        Ok(RuleResult::applied(
            self.name(),
            self.category(),
            format!("External dependency inferred as '{}'", dependency_level),
            details,
        )
        .with_weight(SignalWeight::Medium)
        .with_confidence(confidence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RuleStatus, SignalValue};

    fn signals(pairs: &[(&str, SignalValue)]) -> SignalSet {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn test_amazon_isp_is_cloud() {
        let input = signals(&[
            ("asn", "AS16509".into()),
            ("isp", "Amazon.com Inc.".into()),
        ]);
        let result = InfraTypeRule.apply(&input).unwrap();

        assert_eq!(result.status, RuleStatus::Applied);
        assert_eq!(result.detail_str("infra_type"), Some("cloud"));
        assert_eq!(result.confidence, ConfidenceLevel::High);
        assert_eq!(result.weight, SignalWeight::Medium);
    }

    #[test]
    fn test_cloud_keyword_matches_asn_too() {
        let input = signals(&[
            ("asn", "AS8075 MICROSOFT-CORP".into()),
            ("isp", "Transit Provider".into()),
        ]);
        let result = InfraTypeRule.apply(&input).unwrap();
        assert_eq!(result.detail_str("infra_type"), Some("cloud"));
    }

    #[test]
    fn test_local_telecom_is_on_prem() {
        let input = signals(&[
            ("asn", "AS1234".into()),
            ("isp", "Local Telecom".into()),
        ]);
        let result = InfraTypeRule.apply(&input).unwrap();

        assert_eq!(result.status, RuleStatus::Applied);
        assert_eq!(result.detail_str("infra_type"), Some("on-prem"));
        assert_eq!(result.confidence, ConfidenceLevel::Medium);
        assert_eq!(
            result.interpretation.as_deref(),
            Some("Infrastructure type inferred as 'on-prem'")
        );
    }

    #[test]
    fn test_infra_type_skips_without_isp() {
        let input = signals(&[("asn", "AS16509".into())]);
        let result = InfraTypeRule.apply(&input).unwrap();

        assert_eq!(result.status, RuleStatus::Skipped);
        assert!(result.interpretation.is_none());
    }

    #[test]
    fn test_standardization_buckets() {
        let cases: &[(Vec<&str>, &str, ConfidenceLevel)] = &[
            (vec![], "unknown", ConfidenceLevel::Low),
            (vec!["AWS"], "standardized", ConfidenceLevel::High),
            (vec!["AWS", "aws", "GCP"], "mostly-standardized", ConfidenceLevel::Medium),
            (vec!["aws", "gcp", "azure"], "mostly-standardized", ConfidenceLevel::Medium),
            (vec!["aws", "gcp", "azure", "ovh"], "fragmented", ConfidenceLevel::Medium),
        ];

        for (providers, pattern, confidence) in cases {
            let input = signals(&[("hosting_providers", providers.clone().into())]);
            let result = InfraStandardizationRule.apply(&input).unwrap();

            assert_eq!(result.detail_str("infra_pattern"), Some(*pattern), "{:?}", providers);
            assert_eq!(result.confidence, *confidence, "{:?}", providers);
        }
    }

    #[test]
    fn test_standardization_counts_unique_providers() {
        let input = signals(&[("hosting_providers", vec!["AWS", "aws", "GCP"].into())]);
        let result = InfraStandardizationRule.apply(&input).unwrap();
        let details = result.details.unwrap();

        assert_eq!(details["provider_count"], json!(2));
        assert_eq!(details["unique_providers"], json!(["aws", "gcp"]));
    }

    #[test]
    fn test_external_dependency_buckets() {
        let cases: &[(Vec<&str>, &str, ConfidenceLevel)] = &[
            (vec![], "low", ConfidenceLevel::Medium),
            (vec!["Cloudflare", "cloudflare"], "moderate", ConfidenceLevel::Medium),
            (vec!["cloudflare", "stripe"], "moderate", ConfidenceLevel::Medium),
            (vec!["cloudflare", "stripe", "sentry"], "high", ConfidenceLevel::High),
        ];

        for (services, level, confidence) in cases {
            let input = signals(&[("third_party_services", services.clone().into())]);
            let result = ExternalDependencyRule.apply(&input).unwrap();

            assert_eq!(result.detail_str("dependency_level"), Some(*level), "{:?}", services);
            assert_eq!(result.confidence, *confidence, "{:?}", services);
        }
    }

    #[test]
    fn test_rules_are_deterministic() {
        let input = signals(&[
            ("asn", "AS16509".into()),
            ("isp", "Amazon.com Inc.".into()),
            ("hosting_providers", vec!["GCP", "AWS", "Azure"].into()),
            ("third_party_services", vec!["stripe", "sentry"].into()),
        ]);

        for factory in infra_source().factories() {
            let rule = factory();
            let first = rule.apply(&input).unwrap();
            let second = rule.apply(&input).unwrap();

            assert_eq!(first, second);
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }
}
