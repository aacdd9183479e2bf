//! API credential sources.

use std::fmt;

use crate::error::{Error, Result};

/// Where the API key comes from.
pub trait CredentialSource: Send + Sync {
    /// Human-readable origin, used in error messages and logs
    fn describe(&self) -> String;

    /// Resolve the key. Blank values count as missing.
    fn resolve(&self) -> Result<String>;
}

/// Reads the key from an environment variable
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new("API_KEY")
    }
}

impl CredentialSource for EnvCredentials {
    fn describe(&self) -> String {
        format!("environment variable {}", self.var)
    }

    fn resolve(&self) -> Result<String> {
        match std::env::var(&self.var) {
            Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            _ => Err(Error::CredentialMissing {
                source_name: self.describe(),
            }),
        }
    }
}

/// Fixed key supplied by the host
#[derive(Clone)]
pub struct StaticCredentials {
    key: Option<String>,
}

impl StaticCredentials {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
        }
    }

    /// A source that never yields a key
    pub fn missing() -> Self {
        Self { key: None }
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl CredentialSource for StaticCredentials {
    fn describe(&self) -> String {
        "static credentials".to_string()
    }

    fn resolve(&self) -> Result<String> {
        match self.key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key.to_string()),
            _ => Err(Error::CredentialMissing {
                source_name: self.describe(),
            }),
        }
    }
}
