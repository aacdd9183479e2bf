//! Script generation for a stored persona.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::generative::GenerativeClient;
use crate::persona::{PersonaId, PersonaStore};
use crate::platform::{Platform, ScriptMode};

/// Script content substituted when generation fails
pub const SCRIPT_GENERATION_FAILED: &str = "Error generating script. Please try again.";

/// What to write, for which platform, in whose voice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRequest {
    pub platform: Platform,
    pub persona_id: PersonaId,
    pub topic_or_content: String,
    #[serde(default)]
    pub mode: ScriptMode,
}

impl ScriptRequest {
    pub fn new(platform: Platform, persona_id: PersonaId, topic_or_content: impl Into<String>) -> Self {
        Self {
            platform,
            persona_id,
            topic_or_content: topic_or_content.into(),
            mode: ScriptMode::Create,
        }
    }

    pub fn with_mode(mut self, mode: ScriptMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Whether `content` is a real script or the failure notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptOutcome {
    Generated,
    Failed,
}

/// A finished generation, never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedScript {
    /// Markdown
    pub content: String,
    pub generated_at: DateTime<Utc>,
    pub outcome: ScriptOutcome,
}

impl GeneratedScript {
    fn generated(content: String) -> Self {
        Self {
            content,
            generated_at: Utc::now(),
            outcome: ScriptOutcome::Generated,
        }
    }

    fn failed() -> Self {
        Self {
            content: SCRIPT_GENERATION_FAILED.to_string(),
            generated_at: Utc::now(),
            outcome: ScriptOutcome::Failed,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.outcome == ScriptOutcome::Failed
    }
}

/// Produces scripts for stored personas
#[derive(Clone)]
pub struct ScriptGenerationWorkflow {
    client: Arc<GenerativeClient>,
    store: PersonaStore,
}

impl ScriptGenerationWorkflow {
    pub fn new(client: Arc<GenerativeClient>, store: PersonaStore) -> Self {
        Self { client, store }
    }

    /// Generate a script.
    ///
    /// Returns `None` without calling the service when the persona is not
    /// stored or the topic is blank. Service failures come back as a
    /// [`ScriptOutcome::Failed`] script carrying a fixed notice.
    pub async fn generate(&self, request: &ScriptRequest) -> Option<GeneratedScript> {
        if request.topic_or_content.trim().is_empty() {
            debug!("Script request ignored, topic is blank");
            return None;
        }
        let Some(persona) = self.store.get(&request.persona_id) else {
            debug!(persona = %request.persona_id, "Script request ignored, persona not found");
            return None;
        };

        let result = self
            .client
            .generate(request.platform, &persona, &request.topic_or_content, request.mode)
            .await;

        match result {
            Ok(content) => {
                info!(
                    platform = request.platform.slug(),
                    persona = %persona.id,
                    chars = content.len(),
                    "Script generated"
                );
                Some(GeneratedScript::generated(content))
            }
            Err(e) => {
                error!(
                    platform = request.platform.slug(),
                    persona = %persona.id,
                    error = %e.format_for_log(),
                    "Script generation failed"
                );
                Some(GeneratedScript::failed())
            }
        }
    }
}
