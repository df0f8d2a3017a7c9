//! ORION Runtime
//!
//! Wires one analysis run end to end:
//! - Discovery (or a saved httpx file) into assets and signals
//! - Scoring and ranking of assets, AI insights for the top ones
//! - Rule inference and posture assessment
//! - Console and HTML/JSON reporting

pub mod pipeline;
pub mod report;

pub use pipeline::*;
pub use report::*;
