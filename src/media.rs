//! Image payload handling
//!
//! MIME detection from the binary signature and RFC 2397 data URLs
//! (`data:image/png;base64,...`), which is how avatars are persisted and how
//! hosts usually hand over uploaded files.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

/// Image formats the remote model accepts as inline data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMime {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageMime {
    /// Detect the format from the leading bytes.
    ///
    /// Unrecognized or truncated payloads are reported as JPEG.
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(PNG_SIGNATURE) {
            ImageMime::Png
        } else if bytes.starts_with(JPEG_SIGNATURE) {
            ImageMime::Jpeg
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            ImageMime::Gif
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            ImageMime::Webp
        } else {
            ImageMime::Jpeg
        }
    }

    /// MIME type string, e.g. `image/png`
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Png => "image/png",
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Gif => "image/gif",
            ImageMime::Webp => "image/webp",
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An image payload together with its detected format
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    mime: ImageMime,
    bytes: Vec<u8>,
}

impl ImageData {
    /// Wrap raw bytes, detecting the format from the signature
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime = ImageMime::detect(&bytes);
        Self { mime, bytes }
    }

    /// Parse a base64 data URL.
    ///
    /// The declared media type is not consulted: the format comes from the
    /// payload signature exactly as in [`ImageData::from_bytes`], so an
    /// unrecognized payload is reported as JPEG whatever the header says.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| Error::invalid("image", "not a data URL"))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::invalid("image", "data URL has no payload"))?;
        // First param is the declared media type
        if !header.split(';').skip(1).any(|p| p.eq_ignore_ascii_case("base64")) {
            return Err(Error::invalid("image", "only base64 data URLs are supported"));
        }

        let bytes = BASE64_STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::invalid("image", format!("bad base64 payload: {}", e)))?;
        if bytes.is_empty() {
            return Err(Error::missing("image"));
        }
        Ok(Self::from_bytes(bytes))
    }

    /// Render as a base64 data URL
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.to_base64())
    }

    /// Base64 of the raw bytes, as sent in inline request parts
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.bytes)
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageData")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Serialize for ImageData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_data_url())
    }
}

impl<'de> Deserialize<'de> for ImageData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let url = String::deserialize(deserializer)?;
        ImageData::from_data_url(&url).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Smallest byte string that passes as a JPEG
    pub fn jpeg_bytes() -> Vec<u8> {
        vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0xFF, 0xD9]
    }

    pub fn png_bytes() -> Vec<u8> {
        let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R']);
        bytes
    }
}
