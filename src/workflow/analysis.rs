//! Persona creation: validate the draft, analyze it, store the result.

use std::sync::Arc;

use tracing::{error, info};

use crate::error::{Error, ErrorKind, Result};
use crate::generative::GenerativeClient;
use crate::media::ImageData;
use crate::persona::{Persona, PersonaStore};

/// Shown to users when persona creation fails past validation
pub const PERSONA_CREATE_FAILED: &str =
    "Failed to create persona. Please check your API key and connection.";

/// Shown to users when the draft is incomplete
pub const PERSONA_DRAFT_INCOMPLETE: &str = "Please fill in all fields and upload an image.";

/// Message a host shows for a failed `create_persona`
pub fn failure_message(err: &Error) -> &'static str {
    match err.kind() {
        ErrorKind::Validation => err.user_message(),
        _ => PERSONA_CREATE_FAILED,
    }
}

/// User-supplied inputs for a new persona
#[derive(Debug, Clone, Default)]
pub struct PersonaDraft {
    pub name: String,
    pub text_sample: String,
    pub image: Option<Vec<u8>>,
}

impl PersonaDraft {
    pub fn new(name: impl Into<String>, text_sample: impl Into<String>, image: Option<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            text_sample: text_sample.into(),
            image,
        }
    }

    /// Draft whose image arrives as a `data:` URL
    pub fn with_data_url(
        name: impl Into<String>,
        text_sample: impl Into<String>,
        image_url: &str,
    ) -> Result<Self> {
        let image = ImageData::from_data_url(image_url)?;
        Ok(Self::new(name, text_sample, Some(image.bytes().to_vec())))
    }

    /// Trimmed name, sample and decoded image, or the first missing field.
    fn validate(&self) -> Result<(String, String, ImageData)> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::missing("name"));
        }
        let text_sample = self.text_sample.trim();
        if text_sample.is_empty() {
            return Err(Error::missing("text_sample"));
        }
        let image = match &self.image {
            Some(bytes) if !bytes.is_empty() => ImageData::from_bytes(bytes.clone()),
            _ => return Err(Error::missing("image")),
        };
        Ok((name.to_string(), text_sample.to_string(), image))
    }
}

/// Turns drafts into stored personas
#[derive(Clone)]
pub struct PersonaAnalysisWorkflow {
    client: Arc<GenerativeClient>,
    store: PersonaStore,
}

impl PersonaAnalysisWorkflow {
    pub fn new(client: Arc<GenerativeClient>, store: PersonaStore) -> Self {
        Self { client, store }
    }

    /// Analyze the draft and commit the new persona to the store.
    ///
    /// Validation failures never reach the network. The store is only touched
    /// once the reply has been fully processed.
    pub async fn create_persona(&self, draft: PersonaDraft) -> Result<Persona> {
        let (name, text_sample, image) = draft.validate()?;

        let outcome = match self.client.analyze(&name, &text_sample, &image).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(name = %name, error = %e.format_for_log(), "Persona analysis failed");
                return Err(e);
            }
        };

        let persona = Persona::new(name, image, outcome.analysis, outcome.raw_text);
        self.store.add(persona.clone())?;

        info!(
            id = %persona.id,
            name = %persona.name,
            degraded = persona.analysis.is_degraded(),
            "Persona created"
        );
        Ok(persona)
    }

    pub fn store(&self) -> &PersonaStore {
        &self.store
    }
}
