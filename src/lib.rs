//! ScriptAI - persona analysis and cross-platform script generation
//!
//! A persona is distilled from a photo and a writing sample by a
//! generative-language model, kept in a locally persisted collection, and
//! later used to write video scripts for a chosen publishing platform in
//! that persona's voice.
//!
//! [`ScriptAi`] wires the pieces together; each piece can also be used on
//! its own.

pub mod app;
pub mod config;
pub mod error;
pub mod generative;
pub mod logging;
pub mod media;
pub mod persona;
pub mod platform;
pub mod storage;
pub mod workflow;

pub use app::ScriptAi;
pub use config::ScriptAiConfig;
pub use error::{Error, ErrorCode, ErrorKind, Result};
pub use media::{ImageData, ImageMime};
pub use persona::{Persona, PersonaAnalysis, PersonaId, PersonaStore};
pub use platform::{Platform, PlatformKind, ScriptMode};
pub use workflow::{GeneratedScript, PersonaDraft, ScriptOutcome, ScriptRequest};
