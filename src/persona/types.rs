//! Core types for the persona system.
//!
//! A persona is a stylistic profile (voice + look) distilled by the model from
//! a photo and a writing sample. Field names serialize in camelCase so the
//! persisted collection keeps the layout existing saved data already uses.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::media::ImageData;

/// Placed in `language_features` when the model reply could not be parsed.
pub const ANALYSIS_PARSE_FAILED: &str = "Analysis failed to parse";

// ─────────────────────────────────────────────────────────────────
// Persona Id
// ─────────────────────────────────────────────────────────────────

/// Opaque persona identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonaId(String);

impl PersonaId {
    /// Fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonaId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PersonaId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ─────────────────────────────────────────────────────────────────
// Analysis
// ─────────────────────────────────────────────────────────────────

/// Structured style profile returned by the analysis call.
///
/// Every field defaults to empty, so a reply that omits one still yields a
/// complete profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonaAnalysis {
    /// Tone and vocabulary traits
    pub language_features: Vec<String>,

    /// Appearance and setting traits
    pub visual_features: Vec<String>,

    /// Advice keyed by platform name or "General"
    pub platform_advice: BTreeMap<String, String>,

    /// Example lines in the persona's voice
    pub sample_sentences: Vec<String>,
}

impl PersonaAnalysis {
    /// Placeholder profile used when the reply is not the requested JSON.
    pub fn parse_failed() -> Self {
        Self {
            language_features: vec![ANALYSIS_PARSE_FAILED.to_string()],
            ..Default::default()
        }
    }

    /// True when the profile is the parse-failure placeholder
    pub fn is_degraded(&self) -> bool {
        self.language_features.len() == 1
            && self.language_features[0] == ANALYSIS_PARSE_FAILED
            && self.visual_features.is_empty()
            && self.platform_advice.is_empty()
            && self.sample_sentences.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona
// ─────────────────────────────────────────────────────────────────

/// A stored persona
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: PersonaId,

    pub name: String,

    /// Uploaded photo, persisted as a data URL. `None` when the saved
    /// record has no avatar or one that cannot be decoded.
    #[serde(
        rename = "avatarUrl",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_avatar"
    )]
    pub avatar_image: Option<ImageData>,

    pub description: String,

    #[serde(default)]
    pub analysis: PersonaAnalysis,

    /// Model reply exactly as received
    #[serde(default)]
    pub raw_analysis_text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Persona {
    /// Build a new persona with a fresh id.
    pub fn new(
        name: impl Into<String>,
        avatar_image: ImageData,
        analysis: PersonaAnalysis,
        raw_analysis_text: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            id: PersonaId::generate(),
            description: describe(&name),
            name,
            avatar_image: Some(avatar_image),
            analysis,
            raw_analysis_text: raw_analysis_text.into(),
            created_at: Some(Utc::now()),
        }
    }
}

fn describe(name: &str) -> String {
    format!("Persona based on {}", name)
}

/// A bad avatar costs the avatar, not the record.
fn lenient_avatar<'de, D>(deserializer: D) -> std::result::Result<Option<ImageData>, D::Error>
where
    D: Deserializer<'de>,
{
    let url = Option::<String>::deserialize(deserializer)?;
    Ok(url.and_then(|url| match ImageData::from_data_url(&url) {
        Ok(image) => Some(image),
        Err(e) => {
            warn!(error = %e.format_for_log(), "Dropping unreadable persona avatar");
            None
        }
    }))
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::fixtures::jpeg_bytes;

    #[test]
    fn test_ids_are_unique() {
        let a = PersonaId::generate();
        let b = PersonaId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_analysis_missing_fields_default() {
        let analysis: PersonaAnalysis =
            serde_json::from_str(r#"{"languageFeatures":["casual"]}"#).unwrap();
        assert_eq!(analysis.language_features, vec!["casual"]);
        assert!(analysis.visual_features.is_empty());
        assert!(analysis.platform_advice.is_empty());
        assert!(analysis.sample_sentences.is_empty());
    }

    #[test]
    fn test_parse_failed_placeholder() {
        let analysis = PersonaAnalysis::parse_failed();
        assert_eq!(analysis.language_features, vec![ANALYSIS_PARSE_FAILED]);
        assert!(analysis.is_degraded());
        assert!(!PersonaAnalysis::default().is_degraded());
    }

    #[test]
    fn test_new_persona() {
        let persona = Persona::new(
            "Tom",
            ImageData::from_bytes(jpeg_bytes()),
            PersonaAnalysis::default(),
            "{}",
        );
        assert_eq!(persona.description, "Persona based on Tom");
        assert_eq!(persona.raw_analysis_text, "{}");
        assert!(persona.created_at.is_some());
    }

    #[test]
    fn test_persona_json_layout() {
        let persona = Persona::new(
            "Tom",
            ImageData::from_bytes(jpeg_bytes()),
            PersonaAnalysis::default(),
            "{}",
        );
        let value = serde_json::to_value(&persona).unwrap();
        assert!(value["avatarUrl"].as_str().unwrap().starts_with("data:image/jpeg;base64,"));
        assert!(value["analysis"]["languageFeatures"].is_array());
        assert!(value["rawAnalysisText"].is_string());

        let back: Persona = serde_json::from_value(value).unwrap();
        assert_eq!(back, persona);
    }

    #[test]
    fn test_record_without_timestamp_loads() {
        let url = ImageData::from_bytes(jpeg_bytes()).to_data_url();
        let json = format!(
            r#"{{"id":"p1","name":"Old","avatarUrl":"{}","description":"d","analysis":{{}},"rawAnalysisText":""}}"#,
            url
        );
        let persona: Persona = serde_json::from_str(&json).unwrap();
        assert_eq!(persona.id.as_str(), "p1");
        assert!(persona.created_at.is_none());
        assert_eq!(persona.analysis, PersonaAnalysis::default());
    }

    #[test]
    fn test_record_with_unusable_avatar_loads() {
        let without: Persona =
            serde_json::from_str(r#"{"id":"p1","name":"NoPhoto","description":"d"}"#).unwrap();
        assert!(without.avatar_image.is_none());

        let null: Persona =
            serde_json::from_str(r#"{"id":"p2","name":"Null","avatarUrl":null,"description":"d"}"#)
                .unwrap();
        assert!(null.avatar_image.is_none());

        let remote: Persona = serde_json::from_str(
            r#"{"id":"p3","name":"Remote","avatarUrl":"https://example.com/a.png","description":"d"}"#,
        )
        .unwrap();
        assert!(remote.avatar_image.is_none());
        assert_eq!(remote.name, "Remote");

        // Absent avatars stay absent when saved again
        let value = serde_json::to_value(&without).unwrap();
        assert!(value.get("avatarUrl").is_none());
    }

    #[test]
    fn test_bitmap_avatar_keeps_its_bytes() {
        let persona: Persona = serde_json::from_str(
            r#"{"id":"p1","name":"Bmp","avatarUrl":"data:image/bmp;base64,Qk0=","description":"d"}"#,
        )
        .unwrap();
        let image = persona.avatar_image.unwrap();
        assert_eq!(image.bytes(), b"BM");
    }
}
