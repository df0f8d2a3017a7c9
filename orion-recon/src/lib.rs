//! ORION Recon Layer
//!
//! Passive discovery around a target domain:
//! - Orchestration of `subfinder` piped into `httpx`
//! - httpx JSON-lines parsing into assets
//! - Signal and observation collection for the inference engine

pub mod collect;
pub mod orchestrator;
pub mod parser;

pub use collect::*;
pub use orchestrator::*;
pub use parser::*;
