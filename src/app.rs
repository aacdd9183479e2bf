//! Application wiring
//!
//! Builds every component once and hands the same client and store to both
//! workflows.

use std::sync::Arc;

use tracing::info;

use crate::config::ScriptAiConfig;
use crate::error::Result;
use crate::generative::{CredentialSource, EnvCredentials, GenerativeClient, HttpTransport, Transport};
use crate::persona::{Persona, PersonaId, PersonaStore};
use crate::storage::{FileStorage, LocalPersistence, StorageBackend};
use crate::workflow::{
    GeneratedScript, PersonaAnalysisWorkflow, PersonaDraft, ScriptGenerationWorkflow, ScriptRequest,
};

/// The assembled pipeline
pub struct ScriptAi {
    config: ScriptAiConfig,
    store: PersonaStore,
    client: Arc<GenerativeClient>,
    personas: PersonaAnalysisWorkflow,
    scripts: ScriptGenerationWorkflow,
}

impl ScriptAi {
    /// Production wiring: file storage, HTTP transport, key from the environment.
    pub fn from_config(config: &ScriptAiConfig) -> Result<Self> {
        config.validate()?;

        let storage = Arc::new(FileStorage::new(config.data_dir()));
        let transport = Arc::new(HttpTransport::from_settings(&config.gemini)?);
        let credentials = Arc::new(EnvCredentials::new(&config.gemini.api_key_env));

        Ok(Self::with_parts(config.clone(), storage, transport, credentials))
    }

    /// Wire the pipeline around injected parts.
    pub fn with_parts(
        config: ScriptAiConfig,
        storage: Arc<dyn StorageBackend>,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        let storage_name = storage.name();
        let store = PersonaStore::open(LocalPersistence::new(storage), &config.storage.personas_key);
        let client = Arc::new(GenerativeClient::new(transport, credentials, &config.gemini.model));

        let personas = PersonaAnalysisWorkflow::new(client.clone(), store.clone());
        let scripts = ScriptGenerationWorkflow::new(client.clone(), store.clone());

        info!(
            storage = storage_name,
            model = %config.gemini.model,
            personas = store.len(),
            "ScriptAI pipeline ready"
        );

        Self {
            config,
            store,
            client,
            personas,
            scripts,
        }
    }

    pub fn config(&self) -> &ScriptAiConfig {
        &self.config
    }

    pub fn store(&self) -> &PersonaStore {
        &self.store
    }

    pub fn client(&self) -> &Arc<GenerativeClient> {
        &self.client
    }

    pub fn persona_workflow(&self) -> &PersonaAnalysisWorkflow {
        &self.personas
    }

    pub fn script_workflow(&self) -> &ScriptGenerationWorkflow {
        &self.scripts
    }

    // ─────────────────────────────────────────────────────────────
    // Shortcuts
    // ─────────────────────────────────────────────────────────────

    pub async fn create_persona(&self, draft: PersonaDraft) -> Result<Persona> {
        self.personas.create_persona(draft).await
    }

    pub async fn generate_script(&self, request: &ScriptRequest) -> Option<GeneratedScript> {
        self.scripts.generate(request).await
    }

    pub fn personas(&self) -> Vec<Persona> {
        self.store.list()
    }

    pub fn delete_persona(&self, id: &PersonaId) -> bool {
        self.store.remove(id)
    }
}
