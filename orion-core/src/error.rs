//! Error types for the ORION core

use thiserror::Error;

/// Fault raised inside a rule while interpreting signals
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("signal '{signal}' has an unusable value: {reason}")]
    InvalidSignal { signal: String, reason: String },

    #[error("rule fault: {0}")]
    Fault(String),
}

/// Rejected rule registrations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("rule must define a unique 'name'")]
    MissingName,

    #[error("rule '{0}' must define a 'category'")]
    MissingCategory(String),
}

/// Errors building the inference engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown rule source '{0}'")]
    UnknownRuleSource(String),

    #[error("invalid rule in source '{source_name}': {error}")]
    InvalidRule {
        source_name: String,
        #[source]
        error: RegistryError,
    },
}

/// Errors loading configuration tables
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {error}")]
    Read {
        path: String,
        #[source]
        error: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid scoring table '{table}': {reason}")]
    InvalidTable { table: String, reason: String },
}
