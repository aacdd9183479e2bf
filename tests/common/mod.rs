//! Common test utilities and fixtures
//!
//! Image byte fixtures and a pipeline wired around a mock transport.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use scriptai::generative::{CredentialSource, MockTransport, StaticCredentials};
use scriptai::storage::{MemoryStorage, StorageBackend};
use scriptai::{ScriptAi, ScriptAiConfig};

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

// ─────────────────────────────────────────────────────────────────
// Image Fixtures
// ─────────────────────────────────────────────────────────────────

pub fn jpeg_bytes() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0xFF, 0xD9]
}

pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R']);
    bytes
}

pub fn gif_bytes() -> Vec<u8> {
    b"GIF89a\x01\x00\x01\x00\x00\x00\x00;".to_vec()
}

pub fn webp_bytes() -> Vec<u8> {
    let mut bytes = b"RIFF".to_vec();
    bytes.extend_from_slice(&[0x1A, 0, 0, 0]);
    bytes.extend_from_slice(b"WEBPVP8 ");
    bytes
}

// ─────────────────────────────────────────────────────────────────
// Pipeline Fixture
// ─────────────────────────────────────────────────────────────────

/// Pipeline over in-memory storage and a mock transport
pub struct TestPipeline {
    pub app: ScriptAi,
    pub transport: Arc<MockTransport>,
    pub storage: Arc<MemoryStorage>,
}

impl TestPipeline {
    pub fn new(transport: MockTransport) -> Self {
        Self::with_credentials(transport, StaticCredentials::new("test-api-key"))
    }

    pub fn with_credentials(transport: MockTransport, credentials: impl CredentialSource + 'static) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        Self::build(transport, credentials, storage)
    }

    /// Reuse `storage`, e.g. to simulate an application restart
    pub fn with_storage(transport: MockTransport, storage: Arc<MemoryStorage>) -> Self {
        Self::build(transport, StaticCredentials::new("test-api-key"), storage)
    }

    fn build(
        transport: MockTransport,
        credentials: impl CredentialSource + 'static,
        storage: Arc<MemoryStorage>,
    ) -> Self {
        let transport = Arc::new(transport);
        let backend: Arc<dyn StorageBackend> = storage.clone();
        let app = ScriptAi::with_parts(
            ScriptAiConfig::default(),
            backend,
            transport.clone(),
            Arc::new(credentials),
        );
        Self {
            app,
            transport,
            storage,
        }
    }
}
