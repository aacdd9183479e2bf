//! Persona system: stylistic profiles and their persistent collection.

pub mod store;
pub mod types;

pub use store::PersonaStore;
pub use types::{Persona, PersonaAnalysis, PersonaId, ANALYSIS_PARSE_FAILED};
