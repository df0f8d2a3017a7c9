//! ORION Core - Signal model, rule engine and scoring for recon intelligence
//!
//! This crate provides the decision logic of ORION and nothing else:
//! - Signals: named observations collected about a target
//! - Rules: pure interpretations of a signal set, grouped by category
//! - Inference engine: runs a registry of rules into an intelligence map
//! - Scoring engine: table-driven attack-interest score for discovered assets
//! - Posture: infra profile, exposure context and human correlation narrative
//!
//! No I/O happens here; collectors and reporters live in the other crates.

pub mod asset;
pub mod config;
pub mod eim;
pub mod engine;
pub mod error;
pub mod posture;
pub mod registry;
pub mod rules;
pub mod scoring;
pub mod signals;

pub use asset::*;
pub use config::*;
pub use eim::*;
pub use engine::*;
pub use error::*;
pub use posture::*;
pub use registry::*;
pub use rules::*;
pub use scoring::*;
pub use signals::*;

/// Score every discovered asset starts from
pub const BASE_SCORE: f64 = 10.0;

/// Upper bound of the attack-interest score
pub const MAX_SCORE: f64 = 100.0;

/// Score at which an asset is highlighted and explained
pub const HIGH_INTEREST_THRESHOLD: f64 = 70.0;
