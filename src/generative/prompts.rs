//! System instructions and prompt builders.

use crate::persona::Persona;
use crate::platform::{Platform, ScriptMode};

/// System instruction for the persona analysis call
pub const PERSONA_SYSTEM_INSTRUCTION: &str = r#"You are an expert Persona Analyst for a Video Script Writing System.
Your task is to analyze text samples and an image of a person to create a structured "Style Profile".

Analyze the input based on:
1. Text Features: Sentence structure preference, vocabulary habits (slang/technical), emotional pattern, opening/closing routines.
2. Visual Features (from image): Appearance description, suggested scene/setting, facial expression/posture.

Output the result in strict JSON format matching this schema:
{
  "languageFeatures": ["feature1", "feature2"],
  "visualFeatures": ["feature1", "feature2"],
  "platformAdvice": {"General": "advice"},
  "sampleSentences": ["example1", "example2"]
}
Only output the JSON."#;

/// System instruction for the script generation call
pub const SCRIPT_SYSTEM_INSTRUCTION: &str = r#"You are a Professional Cross-Platform Video Script AI Agent.
Your goal is to generate optimized video scripts based on a specific "Persona Style" and a target "Platform".

Core Capabilities:
1. Platform Adaptation (Douyin, YouTube, RedNote, etc.)
2. Persona Mimicry (Apply analyzed style traits)
3. Script Optimization (Hooks, CTAs, Structure)

Output Format (Markdown):
# Script for [Platform]
## 1. Style Match Analysis
- [How specific traits from the profile were used]
- [Specific phrases mimicking the persona]

## 2. Visual/Acting Suggestions
- [Outfit/Look based on persona visual features]
- [Scene/Background suggestions]
- [Acting cues]

## 3. The Script
(The actual script content, formatted for the platform. e.g., Scene headers, Dialogue, On-screen text)

## 4. Metadata
- **Titles:** (3 options)
- **Tags:** (Platform specific hashtags)
- **Risk Check:** (Potential shadowban keywords)"#;

/// User turn for the analysis call
pub fn analysis_prompt(name: &str, text_sample: &str) -> String {
    format!(
        "Analyze this person's style.\n\
         Name: {}\n\
         Text Sample: \"{}\"\n\
         \n\
         Extract their style profile according to the system instructions.",
        name, text_sample
    )
}

/// User turn for the generation call
pub fn script_prompt(platform: Platform, persona: &Persona, topic: &str, mode: ScriptMode) -> String {
    let analysis = &persona.analysis;
    format!(
        "TASK: {task}\n\
         TARGET PLATFORM: {platform}\n\
         TOPIC/CONTENT: \"{topic}\"\n\
         \n\
         PERSONA PROFILE TO MIMIC:\n\
         Name: {name}\n\
         Language Traits: {language}\n\
         Visual Traits: {visual}\n\
         Sample Sentences: {samples}\n\
         \n\
         Platform Instructions:\n\
         - {instruction}\n\
         \n\
         Please generate the full response following the standard output format.",
        task = mode.task_verb(),
        platform = platform.display_name(),
        topic = topic,
        name = persona.name,
        language = json_list(&analysis.language_features),
        visual = json_list(&analysis.visual_features),
        samples = json_list(&analysis.sample_sentences),
        instruction = platform.instruction(),
    )
}

fn json_list(items: &[String]) -> String {
    // A list of strings always serializes
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}
