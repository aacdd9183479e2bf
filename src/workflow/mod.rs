//! User-facing workflows built on the generative client and persona store.

mod analysis;
mod script;

pub use analysis::{
    failure_message, PersonaAnalysisWorkflow, PersonaDraft, PERSONA_CREATE_FAILED, PERSONA_DRAFT_INCOMPLETE,
};
pub use script::{
    GeneratedScript, ScriptGenerationWorkflow, ScriptOutcome, ScriptRequest, SCRIPT_GENERATION_FAILED,
};
