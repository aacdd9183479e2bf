//! Generative-language service access
//!
//! [`GenerativeClient`] builds the analysis and generation requests and
//! interprets the replies. Requests leave through a [`Transport`]:
//! [`HttpTransport`] for the real service, [`MockTransport`] for tests.

mod client;
mod credentials;
mod mock;
mod prompts;
mod transport;
pub mod wire;

pub use client::{parse_analysis, AnalysisOutcome, GenerativeClient, SCRIPT_FALLBACK_TEXT};
pub use credentials::{CredentialSource, EnvCredentials, StaticCredentials};
pub use mock::{MockReply, MockTransport};
pub use prompts::{analysis_prompt, script_prompt, PERSONA_SYSTEM_INSTRUCTION, SCRIPT_SYSTEM_INSTRUCTION};
pub use transport::{HttpTransport, ModelCall, RemoteResponse, Transport};
