//! ORION Agents
//!
//! Language-model support for recon reports:
//! - **Backends**: Groq, OpenAI, OpenRouter and Anthropic behind one trait
//! - **Personas**: prompt definitions loaded from TOML in `prompts/`
//! - **Assistant**: one-sentence attack-vector insight per high-interest asset
//!
//! The assistant never fails a run: without an API key it is disabled, and
//! backend errors are turned into the insight text.

pub mod assistant;
pub mod backend;
pub mod persona;

pub use assistant::*;
pub use backend::*;
pub use persona::*;
