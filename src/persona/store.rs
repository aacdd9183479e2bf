//! Persona store: ordered in-memory collection mirrored to local persistence.
//!
//! Every mutation writes the whole collection back through
//! [`LocalPersistence`]. The write lock is held across mutate + save so the
//! persisted order always matches memory, whatever order async callbacks
//! complete in.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::storage::LocalPersistence;

use super::types::{Persona, PersonaId};

struct Inner {
    key: String,
    persistence: LocalPersistence,
    personas: RwLock<Vec<Persona>>,
}

/// Shared handle to the persona collection. Cloning is cheap.
#[derive(Clone)]
pub struct PersonaStore {
    inner: Arc<Inner>,
}

impl PersonaStore {
    /// Open the store, loading whatever is saved under `key`.
    ///
    /// Records are decoded one at a time; an unreadable record is skipped
    /// and the rest still load.
    pub fn open(persistence: LocalPersistence, key: impl Into<String>) -> Self {
        let key = key.into();
        let records: Vec<Value> = persistence.load(&key, Vec::new());
        let stored = records.len();
        let personas = decode_records(&key, records);
        info!(
            key = %key,
            count = personas.len(),
            skipped = stored - personas.len(),
            "Persona store opened"
        );

        Self {
            inner: Arc::new(Inner {
                key,
                persistence,
                personas: RwLock::new(personas),
            }),
        }
    }

    /// Snapshot of all personas in insertion order
    pub fn list(&self) -> Vec<Persona> {
        self.inner.personas.read().clone()
    }

    pub fn get(&self, id: &PersonaId) -> Option<Persona> {
        self.inner
            .personas
            .read()
            .iter()
            .find(|p| &p.id == id)
            .cloned()
    }

    pub fn contains(&self, id: &PersonaId) -> bool {
        self.inner.personas.read().iter().any(|p| &p.id == id)
    }

    pub fn len(&self) -> usize {
        self.inner.personas.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.personas.read().is_empty()
    }

    /// Append a persona. Ids must be unique.
    pub fn add(&self, persona: Persona) -> Result<()> {
        let mut personas = self.inner.personas.write();
        if personas.iter().any(|p| p.id == persona.id) {
            return Err(Error::DuplicatePersona {
                id: persona.id.to_string(),
            });
        }

        debug!(id = %persona.id, name = %persona.name, "Adding persona");
        personas.push(persona);
        self.inner.persistence.save(&self.inner.key, personas.as_slice());
        Ok(())
    }

    /// Remove a persona by id. Returns false if nothing matched.
    pub fn remove(&self, id: &PersonaId) -> bool {
        let mut personas = self.inner.personas.write();
        let before = personas.len();
        personas.retain(|p| &p.id != id);
        if personas.len() == before {
            debug!(id = %id, "Remove ignored, persona not found");
            return false;
        }

        debug!(id = %id, "Removed persona");
        self.inner.persistence.save(&self.inner.key, personas.as_slice());
        true
    }

    /// Storage slot this store is mirrored to
    pub fn key(&self) -> &str {
        &self.inner.key
    }
}

fn decode_records(key: &str, records: Vec<Value>) -> Vec<Persona> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Persona>(record) {
            Ok(persona) => Some(persona),
            Err(e) => {
                warn!(
                    key,
                    index,
                    error = %Error::from(e).format_for_log(),
                    "Skipping unreadable persona record"
                );
                None
            }
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
