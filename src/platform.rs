//! Target publishing platforms and their fixed prompt fragments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────
// Platform
// ─────────────────────────────────────────────────────────────────

/// Publishing destinations a script can be written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Douyin,
    Kuaishou,
    #[serde(rename = "rednote")]
    RedNote,
    WechatChannels,
    WechatOfficial,
    Bilibili,
    Youtube,
}

/// Content shape a platform expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformKind {
    ShortVideo,
    LongFormVideo,
    Article,
}

impl Platform {
    /// All platforms in display order.
    pub fn all() -> &'static [Platform] {
        &[
            Platform::Douyin,
            Platform::Kuaishou,
            Platform::RedNote,
            Platform::WechatChannels,
            Platform::WechatOfficial,
            Platform::Bilibili,
            Platform::Youtube,
        ]
    }

    /// Slug used in config files and host APIs.
    pub fn slug(&self) -> &'static str {
        match self {
            Platform::Douyin => "douyin",
            Platform::Kuaishou => "kuaishou",
            Platform::RedNote => "rednote",
            Platform::WechatChannels => "wechat-channels",
            Platform::WechatOfficial => "wechat-official",
            Platform::Bilibili => "bilibili",
            Platform::Youtube => "youtube",
        }
    }

    /// Name shown to users and sent to the model.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Douyin => "Douyin (TikTok China)",
            Platform::Kuaishou => "Kuaishou",
            Platform::RedNote => "RedNote (Xiaohongshu)",
            Platform::WechatChannels => "WeChat Channels",
            Platform::WechatOfficial => "WeChat Official Account",
            Platform::Bilibili => "Bilibili",
            Platform::Youtube => "YouTube",
        }
    }

    pub fn kind(&self) -> PlatformKind {
        match self {
            Platform::Douyin
            | Platform::Kuaishou
            | Platform::RedNote
            | Platform::WechatChannels => PlatformKind::ShortVideo,
            Platform::Bilibili | Platform::Youtube => PlatformKind::LongFormVideo,
            Platform::WechatOfficial => PlatformKind::Article,
        }
    }

    /// Platform-specific writing instruction appended to the generation prompt.
    pub fn instruction(&self) -> &'static str {
        match self {
            Platform::Douyin => {
                "Fast pace, a hook in the first 3 seconds, short punchy lines, trending BGM suggestions."
            }
            Platform::Kuaishou => {
                "Down-to-earth and authentic tone, hook in the first 3 seconds, direct calls to follow and comment."
            }
            Platform::RedNote => {
                "Use emojis, searchable keywords and emotional resonance; write like a personal recommendation note."
            }
            Platform::WechatChannels => {
                "Warm, shareable tone suited to friends-and-family audiences; short segments with a clear takeaway."
            }
            Platform::WechatOfficial => {
                "Article format: compelling headline, clear section headings, readable paragraphs, closing call to action."
            }
            Platform::Bilibili => {
                "Cultural memes and community in-jokes, longer form, chapter structure, invite danmaku and engagement."
            }
            Platform::Youtube => {
                "SEO keywords in the opening, clear structure with chapters, retention hooks and a subscribe CTA."
            }
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Platform::all()
            .iter()
            .copied()
            .find(|p| p.slug() == wanted || p.display_name().to_lowercase() == wanted)
            .or(match wanted.as_str() {
                "tiktok" => Some(Platform::Douyin),
                "xiaohongshu" | "red-note" => Some(Platform::RedNote),
                _ => None,
            })
            .ok_or_else(|| {
                let valid: Vec<&str> = Platform::all().iter().map(|p| p.slug()).collect();
                format!("Unknown platform '{}'. Valid: {}", s, valid.join(", "))
            })
    }
}

// ─────────────────────────────────────────────────────────────────
// Script Mode
// ─────────────────────────────────────────────────────────────────

/// Whether the topic text is a theme to write from or a draft to rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptMode {
    #[default]
    Create,
    Rewrite,
}

impl ScriptMode {
    /// Task line placed at the top of the generation prompt.
    pub fn task_verb(&self) -> &'static str {
        match self {
            ScriptMode::Create => "Create a new script from topic",
            ScriptMode::Rewrite => "Rewrite the provided text",
        }
    }
}

impl FromStr for ScriptMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "create" => Ok(ScriptMode::Create),
            "rewrite" => Ok(ScriptMode::Rewrite),
            _ => Err(format!("Unknown mode '{}'. Valid: create, rewrite", s)),
        }
    }
}
