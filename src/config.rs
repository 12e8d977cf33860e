//! Load settings threaded through every parser variant.
//!
//! Settings are usually built in code, but can also be read from a TOML file
//! (the `--settings` flag of the binary). A missing or empty file yields
//! `LoadSettings::default()`. Unknown keys are accepted and logged as warnings.
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in settings file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Settings file exceeds maximum allowed size.
    #[error("Settings file too large: {0}")]
    TooLarge(String),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

// ============================================================================
// Load Settings
// ============================================================================

/// Immutable per-call configuration for loading a syndication resource.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoadSettings {
    /// Encoding label that overrides the one declared in the XML prolog.
    pub character_encoding: Option<String>,

    /// Maximum number of extension elements kept per parent element.
    /// 0 disables extension retention.
    pub max_extension_elements: usize,

    /// Maximum number of XML nodes a document may expand to, entity
    /// expansion included.
    pub entity_limit: u32,
}

impl Default for LoadSettings {
    fn default() -> Self {
        Self {
            character_encoding: None,
            max_extension_elements: Self::DEFAULT_MAX_EXTENSION_ELEMENTS,
            entity_limit: Self::DEFAULT_ENTITY_LIMIT,
        }
    }
}

impl LoadSettings {
    pub const DEFAULT_MAX_EXTENSION_ELEMENTS: usize = 256;
    pub const DEFAULT_ENTITY_LIMIT: u32 = 1_000_000;

    /// SEC-014: Maximum settings file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 3] = [
        "character_encoding",
        "max_extension_elements",
        "entity_limit",
    ];

    /// Load settings from a TOML file.
    ///
    /// - Missing file → `Ok(LoadSettings::default())`
    /// - Empty file → `Ok(LoadSettings::default())`
    /// - Invalid TOML → `Err(SettingsError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    /// - `entity_limit = 0` → `Err(SettingsError::Invalid)`
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        // SEC-014: Check file size before reading
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(SettingsError::TooLarge(format!(
                    "Settings file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(SettingsError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(
                    path = %path.display(),
                    "Settings file disappeared, using defaults"
                );
                return Ok(Self::default());
            }
            Err(e) => return Err(SettingsError::Io(e)),
        };

        Self::from_toml(&content)
    }

    /// Parse settings from TOML text. Whitespace-only input yields defaults.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in settings file, ignoring");
                }
            }
        }

        let settings: LoadSettings = toml::from_str(content)?;
        settings.validate()?;
        tracing::debug!(?settings, "Loaded load settings");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.entity_limit == 0 {
            return Err(SettingsError::Invalid(
                "entity_limit must be greater than 0".to_string(),
            ));
        }
        if let Some(label) = &self.character_encoding {
            if label.trim().is_empty() {
                return Err(SettingsError::Invalid(
                    "character_encoding must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn with_character_encoding(mut self, label: impl Into<String>) -> Self {
        self.character_encoding = Some(label.into());
        self
    }

    pub fn with_max_extension_elements(mut self, max: usize) -> Self {
        self.max_extension_elements = max;
        self
    }

    pub fn with_entity_limit(mut self, limit: u32) -> Self {
        self.entity_limit = limit;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
