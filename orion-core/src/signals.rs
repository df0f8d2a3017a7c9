//! Signals: observable facts collected about a target
//!
//! A signal is a single observation, or a meaningful absence of one,
//! produced by a recon collaborator. Signals carry no interpretation:
//! - Kind says how the fact was observed (structural, behavioral, ...)
//! - Strength says how much the collector trusts the observation
//! - Rules read signal values by name from a [`SignalSet`]

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// How a signal was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Shape of the infrastructure (ASN, providers, DNS layout)
    #[default]
    Structural,
    /// Observed behavior (status codes, redirects, response timing)
    Behavioral,
    /// Leftovers of past configuration (stale records, legacy banners)
    Residual,
    /// Something expected that was not observed
    Absence,
}

/// Collector trust in an observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SignalStrength {
    Weak,
    #[default]
    Medium,
    Strong,
}

/// Value carried by a signal: a scalar or a list of scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SignalValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<SignalValue>),
}

impl SignalValue {
    /// Render the value as plain text (lists are comma separated)
    pub fn render(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(items) => items
                .iter()
                .map(SignalValue::render)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Lowercased rendering, the form rules match keywords against
    pub fn render_lowercase(&self) -> String {
        self.render().to_lowercase()
    }

    /// True for blank text and empty lists
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Items of a list value; a scalar reads as a one-element list
    pub fn items(&self) -> Vec<&SignalValue> {
        match self {
            Self::List(items) => items.iter().collect(),
            scalar => vec![scalar],
        }
    }

    /// Case-insensitive set of the non-empty items
    pub fn lowercase_set(&self) -> BTreeSet<String> {
        self.items()
            .into_iter()
            .filter(|item| !item.is_empty())
            .map(SignalValue::render_lowercase)
            .collect()
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for SignalValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SignalValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SignalValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for SignalValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for SignalValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<SignalValue>> From<Vec<T>> for SignalValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// A single immutable observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    name: String,
    value: SignalValue,
    kind: SignalKind,
    strength: SignalStrength,
}

impl Signal {
    /// Create a new signal builder
    pub fn builder(name: &str, value: impl Into<SignalValue>) -> SignalBuilder {
        SignalBuilder::new(name, value.into())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &SignalValue {
        &self.value
    }

    pub fn kind(&self) -> SignalKind {
        self.kind
    }

    pub fn strength(&self) -> SignalStrength {
        self.strength
    }
}

/// Builder for signals
pub struct SignalBuilder {
    name: String,
    value: SignalValue,
    kind: SignalKind,
    strength: SignalStrength,
}

impl SignalBuilder {
    pub fn new(name: &str, value: SignalValue) -> Self {
        Self {
            name: name.to_string(),
            value,
            kind: SignalKind::default(),
            strength: SignalStrength::default(),
        }
    }

    pub fn kind(mut self, kind: SignalKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn strength(mut self, strength: SignalStrength) -> Self {
        self.strength = strength;
        self
    }

    pub fn build(self) -> Signal {
        Signal {
            name: self.name,
            value: self.value,
            kind: self.kind,
            strength: self.strength,
        }
    }
}

/// Snapshot of signals for one analysis, keyed by signal name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalSet {
    signals: BTreeMap<String, Signal>,
}

impl SignalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a JSON object of name -> value; nulls are dropped
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let serde_json::Value::Object(map) = value else {
            return Err(serde_json::Error::custom("signal map must be a JSON object"));
        };

        let mut set = Self::new();
        for (name, raw) in map {
            if raw.is_null() {
                continue;
            }
            let value: SignalValue = serde_json::from_value(raw)?;
            set.insert(Signal::builder(&name, value).build());
        }
        Ok(set)
    }

    /// Insert a signal, returning the one it replaced
    pub fn insert(&mut self, signal: Signal) -> Option<Signal> {
        self.signals.insert(signal.name.clone(), signal)
    }

    /// Insert a plain value with default kind and strength
    pub fn insert_value(&mut self, name: &str, value: impl Into<SignalValue>) -> Option<Signal> {
        self.insert(Signal::builder(name, value).build())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.signals.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Signal> {
        self.signals.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&SignalValue> {
        self.signals.get(name).map(Signal::value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Signal> {
        self.signals.values()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<SignalValue>> FromIterator<(K, V)> for SignalSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert_value(name.as_ref(), value);
        }
        set
    }
}
