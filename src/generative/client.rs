//! Generative client: the single point of contact with the model service.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::media::ImageData;
use crate::persona::{Persona, PersonaAnalysis};
use crate::platform::{Platform, ScriptMode};

use super::credentials::CredentialSource;
use super::prompts::{analysis_prompt, script_prompt, PERSONA_SYSTEM_INSTRUCTION, SCRIPT_SYSTEM_INSTRUCTION};
use super::transport::{ModelCall, Transport};
use super::wire::{GenerateContentRequest, Part};

/// Returned by `generate` when the model reply carries no text
pub const SCRIPT_FALLBACK_TEXT: &str = "Failed to generate script.";

/// Result of a persona analysis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub analysis: PersonaAnalysis,
    /// Reply text as received (`"{}"` when the reply was empty)
    pub raw_text: String,
}

/// Client for the analysis and generation calls
pub struct GenerativeClient {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialSource>,
    model: String,
    api_key: OnceLock<Option<String>>,
}

impl GenerativeClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialSource>,
        model: impl Into<String>,
    ) -> Self {
        let model = model.into();
        info!(
            transport = transport.name(),
            credentials = %credentials.describe(),
            model = %model,
            "Generative client created"
        );

        Self {
            transport,
            credentials,
            model,
            api_key: OnceLock::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Resolve the key on first use; the outcome is kept for the client's lifetime.
    fn api_key(&self) -> Result<&str> {
        let cached = self.api_key.get_or_init(|| match self.credentials.resolve() {
            Ok(key) => Some(key),
            Err(e) => {
                warn!(error = %e.format_for_log(), "API credential unavailable");
                None
            }
        });

        cached.as_deref().ok_or_else(|| Error::CredentialMissing {
            source_name: self.credentials.describe(),
        })
    }

    async fn call(&self, request: GenerateContentRequest) -> Result<String> {
        let api_key = self.api_key()?;
        let call = ModelCall {
            model: self.model.clone(),
            api_key: api_key.to_string(),
            request,
        };

        let started = Instant::now();
        let response = self.transport.generate_content(&call).await.map_err(|e| {
            warn!(model = %self.model, error = %e.format_for_log(), "Model call failed");
            e
        })?;

        debug!(
            model = %self.model,
            chars = response.text().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model call completed"
        );
        Ok(response.text().to_string())
    }

    // ─────────────────────────────────────────────────────────────
    // Analysis
    // ─────────────────────────────────────────────────────────────

    /// Distil a style profile from a name, a writing sample and a photo.
    ///
    /// A reply that is not the requested JSON yields the degraded profile
    /// rather than an error.
    pub async fn analyze(&self, name: &str, text_sample: &str, image: &ImageData) -> Result<AnalysisOutcome> {
        if name.trim().is_empty() {
            return Err(Error::missing("name"));
        }
        if text_sample.trim().is_empty() {
            return Err(Error::missing("text_sample"));
        }
        if image.is_empty() {
            return Err(Error::missing("image"));
        }

        let request = GenerateContentRequest::user(vec![
            Part::image(image),
            Part::text(analysis_prompt(name, text_sample)),
        ])
        .with_system_instruction(PERSONA_SYSTEM_INSTRUCTION)
        .with_json_response();

        info!(name, mime = %image.mime(), image_bytes = image.len(), "Analyzing persona");
        let reply = self.call(request).await?;

        let raw_text = if reply.trim().is_empty() {
            "{}".to_string()
        } else {
            reply
        };
        let analysis = parse_analysis(&raw_text);

        Ok(AnalysisOutcome { analysis, raw_text })
    }

    // ─────────────────────────────────────────────────────────────
    // Generation
    // ─────────────────────────────────────────────────────────────

    /// Write a Markdown script for `platform` in the persona's voice.
    pub async fn generate(
        &self,
        platform: Platform,
        persona: &Persona,
        topic: &str,
        mode: ScriptMode,
    ) -> Result<String> {
        if topic.trim().is_empty() {
            return Err(Error::missing("topic"));
        }

        let request = GenerateContentRequest::user(vec![Part::text(script_prompt(
            platform, persona, topic, mode,
        ))])
        .with_system_instruction(SCRIPT_SYSTEM_INSTRUCTION);

        info!(platform = platform.slug(), persona = %persona.id, ?mode, "Generating script");
        let reply = self.call(request).await?;

        if reply.trim().is_empty() {
            warn!(platform = platform.slug(), "Model returned no script text");
            return Ok(SCRIPT_FALLBACK_TEXT.to_string());
        }
        Ok(reply)
    }
}

// ─────────────────────────────────────────────────────────────────
// Reply Parsing
// ─────────────────────────────────────────────────────────────────

/// Parse an analysis reply, degrading to the placeholder profile on failure.
pub fn parse_analysis(text: &str) -> PersonaAnalysis {
    match decode_analysis(text) {
        Ok(analysis) => analysis,
        Err(e) => {
            warn!(error = %e.format_for_log(), "Analysis reply unusable, using placeholder profile");
            PersonaAnalysis::parse_failed()
        }
    }
}

fn decode_analysis(text: &str) -> Result<PersonaAnalysis> {
    let body = strip_code_fence(text);
    let body = if body.is_empty() { "{}" } else { body };

    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| Error::Parse {
        message: e.to_string(),
    })?;
    if !value.is_object() {
        return Err(Error::Parse {
            message: "expected a JSON object".to_string(),
        });
    }

    serde_json::from_value(value).map_err(|e| Error::Parse {
        message: e.to_string(),
    })
}

/// Unwrap a reply enclosed in a Markdown code fence (```json ... ```).
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line
    match inner.find('\n') {
        Some(newline) => inner[newline + 1..].trim(),
        None => inner.trim(),
    }
}
