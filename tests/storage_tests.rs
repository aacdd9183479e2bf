//! Persistence tests
//!
//! Persona collections surviving restarts, on disk and in memory, and the
//! best-effort behaviour of the persistence adapter.

mod common;

use std::fs;
use std::sync::Arc;

use common::{gif_bytes, jpeg_bytes, webp_bytes, TestPipeline};
use scriptai::generative::{MockTransport, StaticCredentials};
use scriptai::storage::{FileStorage, LocalPersistence, MemoryStorage, StorageBackend};
use scriptai::{ImageData, ImageMime, PersonaDraft, PersonaStore, ScriptAi, ScriptAiConfig};
use tempfile::TempDir;

const KEY: &str = "scriptai_personas";

fn file_app(dir: &TempDir, reply: &str) -> ScriptAi {
    ScriptAi::with_parts(
        ScriptAiConfig::default(),
        Arc::new(FileStorage::new(dir.path())),
        Arc::new(MockTransport::fixed(reply)),
        Arc::new(StaticCredentials::new("k")),
    )
}

#[tokio::test]
async fn test_personas_survive_restart_on_disk() {
    let dir = TempDir::new().unwrap();

    let first = file_app(&dir, r#"{"languageFeatures":["warm"]}"#);
    let a = first
        .create_persona(PersonaDraft::new("A", "sample", Some(jpeg_bytes())))
        .await
        .unwrap();
    let b = first
        .create_persona(PersonaDraft::new("B", "sample", Some(gif_bytes())))
        .await
        .unwrap();

    let restarted = file_app(&dir, "{}");
    let loaded = restarted.personas();
    assert_eq!(loaded, vec![a.clone(), b.clone()]);
    assert_eq!(loaded[1].avatar_image.as_ref().unwrap().mime(), ImageMime::Gif);

    assert!(restarted.delete_persona(&a.id));
    let again = file_app(&dir, "{}");
    assert_eq!(again.personas(), vec![b]);
}

#[tokio::test]
async fn test_persisted_layout() {
    let dir = TempDir::new().unwrap();
    let app = file_app(&dir, r#"{"platformAdvice":{"General":"smile more"}}"#);
    app.create_persona(PersonaDraft::new("Web", "sample", Some(webp_bytes())))
        .await
        .unwrap();

    let raw = fs::read_to_string(dir.path().join(format!("{}.json", KEY))).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &value[0];

    assert!(record["avatarUrl"].as_str().unwrap().starts_with("data:image/webp;base64,"));
    assert_eq!(record["description"], "Persona based on Web");
    assert_eq!(record["analysis"]["platformAdvice"]["General"], "smile more");
    assert_eq!(record["rawAnalysisText"], r#"{"platformAdvice":{"General":"smile more"}}"#);
}

#[test]
fn test_corrupt_slot_loads_empty() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(format!("{}.json", KEY)), "{not json").unwrap();

    let store = PersonaStore::open(LocalPersistence::new(Arc::new(FileStorage::new(dir.path()))), KEY);
    assert!(store.is_empty());
}

#[test]
fn test_unwritable_storage_keeps_memory_authoritative() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "x").unwrap();

    let app = ScriptAi::with_parts(
        ScriptAiConfig::default(),
        Arc::new(FileStorage::new(&blocker)),
        Arc::new(MockTransport::fixed("{}")),
        Arc::new(StaticCredentials::new("k")),
    );

    let persona = tokio_test::block_on(
        app.create_persona(PersonaDraft::new("A", "sample", Some(jpeg_bytes()))),
    )
    .unwrap();
    assert_eq!(app.personas(), vec![persona]);
}

#[test]
fn test_load_default_and_round_trip() {
    let persistence = LocalPersistence::new(Arc::new(MemoryStorage::new()));
    let fallback = vec!["default".to_string()];
    assert_eq!(persistence.load(KEY, fallback.clone()), fallback);

    let value = vec!["x".to_string(), "y".to_string()];
    assert!(persistence.save(KEY, &value));
    assert_eq!(persistence.load::<Vec<String>>(KEY, Vec::new()), value);
}

#[tokio::test]
async fn test_saving_twice_is_byte_identical() {
    let pipeline = TestPipeline::new(MockTransport::fixed(
        r#"{"platformAdvice":{"YouTube":"chapters","General":"smile","Bilibili":"memes"}}"#,
    ));
    pipeline
        .app
        .create_persona(PersonaDraft::new("A", "sample", Some(jpeg_bytes())))
        .await
        .unwrap();

    let first = pipeline.storage.read(KEY).unwrap().unwrap();
    let persistence = LocalPersistence::new(pipeline.storage.clone());
    assert!(persistence.save(KEY, &pipeline.app.personas()));
    let second = pipeline.storage.read(KEY).unwrap().unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_restart_from_shared_memory_storage() {
    let storage = Arc::new(MemoryStorage::new());
    let first = TestPipeline::with_storage(MockTransport::fixed("{}"), storage.clone());
    let persona = first
        .app
        .create_persona(PersonaDraft::new("A", "sample", Some(jpeg_bytes())))
        .await
        .unwrap();

    let second = TestPipeline::with_storage(MockTransport::new(), storage);
    assert_eq!(second.app.store().get(&persona.id), Some(persona));
}

#[tokio::test]
async fn test_odd_avatars_do_not_wipe_saved_personas() {
    let dir = TempDir::new().unwrap();
    let seeded = serde_json::json!([
        {
            "id": "valid",
            "name": "Valid",
            "avatarUrl": ImageData::from_bytes(jpeg_bytes()).to_data_url(),
            "description": "Persona based on Valid",
            "analysis": {},
            "rawAnalysisText": "{}"
        },
        {
            "id": "no-avatar",
            "name": "NoAvatar",
            "description": "Persona based on NoAvatar"
        },
        {
            "id": "bitmap",
            "name": "Bitmap",
            "avatarUrl": "data:image/bmp;base64,Qk0=",
            "description": "Persona based on Bitmap"
        }
    ]);
    fs::write(dir.path().join("scriptai_personas.json"), seeded.to_string()).unwrap();

    let app = file_app(&dir, "{}");
    let loaded = app.personas();
    let ids: Vec<&str> = loaded.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["valid", "no-avatar", "bitmap"]);
    assert!(loaded[1].avatar_image.is_none());
    assert_eq!(loaded[2].avatar_image.as_ref().unwrap().bytes(), b"BM");

    app.create_persona(PersonaDraft::new("New", "sample", Some(jpeg_bytes())))
        .await
        .unwrap();

    let raw = fs::read_to_string(dir.path().join("scriptai_personas.json")).unwrap();
    let persisted: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    let names: Vec<&str> = persisted.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Valid", "NoAvatar", "Bitmap", "New"]);
    assert!(persisted[1].get("avatarUrl").is_none());
}
