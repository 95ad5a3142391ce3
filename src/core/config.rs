use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Hl7Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    pub default_version: Hl7Version,
    /// Log and skip schema declarations that fail while a structure is being
    /// constructed instead of failing the construction.
    pub lenient_declarations: bool,
    /// Max length recorded for fields grown on demand by generic segments.
    pub generic_field_length: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Hl7Version {
    #[serde(rename = "2.1")]
    V21,
    #[serde(rename = "2.2")]
    V22,
    #[serde(rename = "2.3")]
    V23,
    #[serde(rename = "2.3.1")]
    V231,
    #[serde(rename = "2.4")]
    V24,
    #[serde(rename = "2.5")]
    V25,
    #[serde(rename = "2.5.1")]
    V251,
    #[serde(rename = "2.6")]
    V26,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            default_version: Hl7Version::V25,
            lenient_declarations: true,
            generic_field_length: 65536,
        }
    }
}

impl ModelConfig {
    pub fn for_version(version: Hl7Version) -> Self {
        Self {
            default_version: version,
            ..Default::default()
        }
    }

    pub fn with_lenient_declarations(mut self, enabled: bool) -> Self {
        self.lenient_declarations = enabled;
        self
    }

    pub fn with_generic_field_length(mut self, length: u32) -> Self {
        self.generic_field_length = length;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            version = %config.default_version,
            "Loaded model configuration"
        );
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl std::fmt::Display for Hl7Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Hl7Version {
    type Err = Hl7Error;

    fn from_str(s: &str) -> Result<Self> {
        Hl7Version::all()
            .iter()
            .copied()
            .find(|version| version.as_str() == s)
            .ok_or_else(|| Hl7Error::unsupported_version(s))
    }
}

impl Hl7Version {
    /// Get all supported HL7 versions
    pub fn all() -> &'static [Hl7Version] {
        &[
            Hl7Version::V21,
            Hl7Version::V22,
            Hl7Version::V23,
            Hl7Version::V231,
            Hl7Version::V24,
            Hl7Version::V25,
            Hl7Version::V251,
            Hl7Version::V26,
        ]
    }

    /// The version string as it appears in MSH-12
    pub fn as_str(&self) -> &'static str {
        match self {
            Hl7Version::V21 => "2.1",
            Hl7Version::V22 => "2.2",
            Hl7Version::V23 => "2.3",
            Hl7Version::V231 => "2.3.1",
            Hl7Version::V24 => "2.4",
            Hl7Version::V25 => "2.5",
            Hl7Version::V251 => "2.5.1",
            Hl7Version::V26 => "2.6",
        }
    }

    /// Whether a generic message structure exists for this version
    pub fn supports_generic_message(&self) -> bool {
        *self <= Hl7Version::V25
    }
}
