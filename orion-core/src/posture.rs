//! Posture assessment
//!
//! Three passes over what passive reconnaissance could see of a target:
//! - infrastructure profile: how much the hosting stack discloses
//! - exposure context: what that disclosure level says about intent
//! - human correlation: the operational habits it hints at
//!
//! The combined [`PostureAssessment`] renders as a short analyst narrative.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Passive facts about the primary web endpoint of a target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveObservation {
    pub server: Option<String>,
    pub powered_by: Option<String>,
    pub ip: Option<String>,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Probabilistic characterization of the hosting stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfraProfile {
    pub profile: String,
    pub confidence: f64,
    pub indicators: Vec<String>,
}

pub fn analyze_infrastructure(observation: &PassiveObservation) -> InfraProfile {
    let mut indicators = Vec::new();

    if present(&observation.server) && observation.server.as_deref() != Some("Unknown") {
        indicators.push("Identified web server".to_string());
    }
    if present(&observation.powered_by) {
        indicators.push("Application technology disclosure".to_string());
    }
    if present(&observation.ip) {
        indicators.push("Single public IP observed".to_string());
    }

    let (profile, confidence) = match indicators.len() {
        0 => ("Minimal observable infrastructure", 0.2),
        1 => ("Low visibility infrastructure", 0.3),
        2 => ("Possibly shared or moderately customized infrastructure", 0.5),
        _ => ("Generic hosting or simple cloud infrastructure", 0.7),
    };

    InfraProfile {
        profile: profile.to_string(),
        confidence,
        indicators,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExposureLevel {
    Minimal,
    Low,
    Moderate,
}

impl ExposureLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.6 {
            Self::Moderate
        } else if confidence >= 0.4 {
            Self::Low
        } else {
            Self::Minimal
        }
    }

    pub fn posture(&self) -> &'static str {
        match self {
            Self::Minimal => "Highly Controlled",
            Self::Low => "Controlled",
            Self::Moderate => "Partially Exposed",
        }
    }

    fn interpretation(&self) -> &'static str {
        match self {
            Self::Minimal => {
                "The target exposes very limited technical information, \
                 suggesting deliberate exposure minimization."
            }
            Self::Low => {
                "The target exposes a small amount of technical information, \
                 consistent with a controlled and managed posture."
            }
            Self::Moderate => {
                "The target exposes noticeable technical information, \
                 which may indicate convenience-driven or legacy configurations."
            }
        }
    }

    fn implications(&self) -> [&'static str; 3] {
        match self {
            Self::Minimal => [
                "Passive reconnaissance yields limited results",
                "Target likely applies layered defensive strategies",
                "Higher effort required for further intelligence gathering",
            ],
            Self::Low => [
                "Some fingerprinting possible",
                "Exposure appears intentional rather than accidental",
                "Moderate reconnaissance cost",
            ],
            Self::Moderate => [
                "Passive fingerprinting is feasible",
                "Potential misalignment between exposure and risk",
                "Further analysis recommended",
            ],
        }
    }
}

impl fmt::Display for ExposureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minimal => write!(f, "Minimal"),
            Self::Low => write!(f, "Low"),
            Self::Moderate => write!(f, "Moderate"),
        }
    }
}

/// Exposure posture derived from an infrastructure profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureContext {
    pub exposure_level: ExposureLevel,
    pub posture: String,
    pub interpretation: String,
    pub implications: Vec<String>,
}

pub fn analyze_exposure_context(profile: &InfraProfile) -> ExposureContext {
    let level = ExposureLevel::from_confidence(profile.confidence);
    ExposureContext {
        exposure_level: level,
        posture: level.posture().to_string(),
        interpretation: level.interpretation().to_string(),
        implications: level.implications().iter().map(|s| s.to_string()).collect(),
    }
}

/// How favourable the observed habits look from an attacker's side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBias {
    DefensiveOrMature,
    Balanced,
    OptimisticForAttacker,
}

impl fmt::Display for RiskBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DefensiveOrMature => write!(f, "defensive_or_mature"),
            Self::Balanced => write!(f, "balanced"),
            Self::OptimisticForAttacker => write!(f, "optimistic_for_attacker"),
        }
    }
}

/// Non-technical reading of the infrastructure and exposure findings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanCorrelation {
    pub human_signals: Vec<String>,
    pub interpretation: Vec<String>,
    pub risk_bias: RiskBias,
}

pub fn analyze_human_correlation(
    profile: &InfraProfile,
    exposure: &ExposureContext,
) -> HumanCorrelation {
    let mut human_signals = Vec::new();
    let mut interpretation = Vec::new();

    if profile.confidence < 0.4 {
        human_signals.push("Low infrastructure visibility".to_string());
        interpretation.push("Target may not prioritize external exposure awareness".to_string());
    }

    if profile.profile.to_lowercase().contains("shared") {
        human_signals.push("Shared infrastructure usage".to_string());
        interpretation
            .push("Cost-saving decisions may override security isolation concerns".to_string());
    }

    if exposure.exposure_level == ExposureLevel::Moderate {
        human_signals.push("Elevated exposure posture".to_string());
        interpretation.push("Exposure likely accepted for operational convenience".to_string());
    }

    let risk_bias = match human_signals.len() {
        n if n >= 3 => RiskBias::OptimisticForAttacker,
        2 => RiskBias::Balanced,
        _ => RiskBias::DefensiveOrMature,
    };

    HumanCorrelation {
        human_signals,
        interpretation,
        risk_bias,
    }
}

const PASSIVE_DISCLAIMER: &str = "This analysis is based solely on passive intelligence and \
     contextual correlation, without active probing or exploitation.";

/// Full posture assessment for one target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureAssessment {
    pub infrastructure: InfraProfile,
    pub exposure: ExposureContext,
    pub human: HumanCorrelation,
}

impl PostureAssessment {
    pub fn assess(observation: &PassiveObservation) -> Self {
        let infrastructure = analyze_infrastructure(observation);
        let exposure = analyze_exposure_context(&infrastructure);
        let human = analyze_human_correlation(&infrastructure, &exposure);
        Self {
            infrastructure,
            exposure,
            human,
        }
    }

    /// Readable intelligence narrative for a target, one statement per line
    pub fn narrative(&self, target: &str) -> String {
        let mut story = vec![
            format!(
                "The target '{}' presents an infrastructure profile classified as '{}', \
                 with a confidence level of {:.2}.",
                target, self.infrastructure.profile, self.infrastructure.confidence
            ),
            format!(
                "From an exposure standpoint, the system operates under a '{}' exposure level, \
                 suggesting a '{}' operational posture.",
                self.exposure.exposure_level, self.exposure.posture
            ),
        ];

        if self.human.human_signals.is_empty() {
            story.push("No strong behavioral indicators were identified at this stage.".to_string());
        } else {
            story.push("Behavioral indicators suggest the following human factors:".to_string());
            story.extend(self.human.human_signals.iter().map(|s| format!("- {}.", s)));
        }

        if !self.human.interpretation.is_empty() {
            story.push("Interpretation of these signals indicates:".to_string());
            story.extend(self.human.interpretation.iter().map(|s| format!("- {}.", s)));
        }

        story.push(format!(
            "Overall, the contextual risk bias is assessed as '{}'.",
            self.human.risk_bias
        ));
        story.push(PASSIVE_DISCLAIMER.to_string());
        story.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(server: Option<&str>, powered_by: Option<&str>, ip: Option<&str>) -> PassiveObservation {
        PassiveObservation {
            server: server.map(String::from),
            powered_by: powered_by.map(String::from),
            ip: ip.map(String::from),
        }
    }

    #[test]
    fn test_infrastructure_buckets() {
        let cases = [
            (observation(Some("nginx"), Some("PHP/8.1"), Some("203.0.113.7")), 0.7, 3),
            (observation(Some("nginx"), None, Some("203.0.113.7")), 0.5, 2),
            (observation(None, None, Some("203.0.113.7")), 0.3, 1),
            (observation(None, None, None), 0.2, 0),
        ];

        for (obs, confidence, indicators) in cases {
            let profile = analyze_infrastructure(&obs);
            assert_eq!(profile.confidence, confidence, "{:?}", obs);
            assert_eq!(profile.indicators.len(), indicators, "{:?}", obs);
        }
    }

    #[test]
    fn test_unknown_server_is_not_an_indicator() {
        let profile = analyze_infrastructure(&observation(Some("Unknown"), None, None));
        assert!(profile.indicators.is_empty());
        assert_eq!(profile.profile, "Minimal observable infrastructure");
    }

    #[test]
    fn test_exposure_thresholds() {
        assert_eq!(ExposureLevel::from_confidence(0.7), ExposureLevel::Moderate);
        assert_eq!(ExposureLevel::from_confidence(0.6), ExposureLevel::Moderate);
        assert_eq!(ExposureLevel::from_confidence(0.5), ExposureLevel::Low);
        assert_eq!(ExposureLevel::from_confidence(0.4), ExposureLevel::Low);
        assert_eq!(ExposureLevel::from_confidence(0.2), ExposureLevel::Minimal);

        let profile = analyze_infrastructure(&observation(None, None, None));
        let exposure = analyze_exposure_context(&profile);
        assert_eq!(exposure.posture, "Highly Controlled");
        assert_eq!(exposure.implications.len(), 3);
    }

    #[test]
    fn test_shared_profile_adds_human_signal() {
        let assessment = PostureAssessment::assess(&observation(Some("Apache"), Some("PHP"), None));

        assert_eq!(assessment.exposure.exposure_level, ExposureLevel::Low);
        assert_eq!(assessment.human.human_signals, vec!["Shared infrastructure usage".to_string()]);
        assert_eq!(assessment.human.risk_bias, RiskBias::DefensiveOrMature);
    }

    #[test]
    fn test_risk_bias_counts_signals() {
        let profile = InfraProfile {
            profile: "Shared hosting".to_string(),
            confidence: 0.3,
            indicators: vec![],
        };
        let mut exposure = analyze_exposure_context(&profile);
        assert_eq!(analyze_human_correlation(&profile, &exposure).risk_bias, RiskBias::Balanced);

        exposure.exposure_level = ExposureLevel::Moderate;
        let human = analyze_human_correlation(&profile, &exposure);
        assert_eq!(human.human_signals.len(), 3);
        assert_eq!(human.risk_bias, RiskBias::OptimisticForAttacker);
    }

    #[test]
    fn test_narrative_mentions_each_pass() {
        let assessment = PostureAssessment::assess(&observation(
            Some("nginx"),
            Some("Express"),
            Some("203.0.113.7"),
        ));
        let text = assessment.narrative("example.com");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "The target 'example.com' presents an infrastructure profile classified as \
             'Generic hosting or simple cloud infrastructure', with a confidence level of 0.70."
        );
        assert!(lines[1].contains("'Moderate' exposure level"));
        assert!(lines[1].contains("'Partially Exposed' operational posture"));
        assert!(lines.contains(&"- Elevated exposure posture."));
        assert!(lines.contains(&"- Exposure likely accepted for operational convenience."));
        assert!(text.contains("'defensive_or_mature'"));
        assert!(text.ends_with("without active probing or exploitation."));
    }

    #[test]
    fn test_narrative_without_human_signals() {
        let assessment = PostureAssessment {
            infrastructure: InfraProfile {
                profile: "Dedicated infrastructure".to_string(),
                confidence: 0.5,
                indicators: vec![],
            },
            exposure: analyze_exposure_context(&InfraProfile {
                profile: String::new(),
                confidence: 0.5,
                indicators: vec![],
            }),
            human: HumanCorrelation {
                human_signals: vec![],
                interpretation: vec![],
                risk_bias: RiskBias::DefensiveOrMature,
            },
        };

        let text = assessment.narrative("example.com");
        assert!(text.contains("No strong behavioral indicators were identified at this stage."));
        assert!(!text.contains("Interpretation of these signals"));
    }
}
