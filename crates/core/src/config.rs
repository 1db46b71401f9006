//! Checker configuration (`z.config.json`).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Words that may never be used as element names.
pub const BUILTIN_RESERVED_NAMES: &[&str] = &[
    "function",
    "class",
    "interface",
    "let",
    "const",
    "var",
    "import",
    "export",
];

/// Errors that can occur when loading a [`CheckConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON deserialization failed.
    #[error("invalid config JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A field value is not acceptable.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// The name of the field that failed validation.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },
}

/// What to do with the bodies of `code`-mode elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeBodies {
    /// Track braces through the embedded code and emit nothing inside it.
    #[default]
    Skip,
    /// Classify and validate code bodies like markup.
    Validate,
}

/// Tunables for a check run. Every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct CheckConfig {
    /// Substrings reported by the marker scan.
    pub markers: Vec<String>,
    /// Handling of `code`-mode bodies.
    pub code_bodies: CodeBodies,
    /// Reserved words added to [`BUILTIN_RESERVED_NAMES`].
    pub reserved_names: Vec<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            markers: vec!["TODO".into()],
            code_bodies: CodeBodies::default(),
            reserved_names: Vec::new(),
        }
    }
}

impl CheckConfig {
    /// `true` if `name` is a built-in or configured reserved word.
    pub fn is_reserved(&self, name: &str) -> bool {
        BUILTIN_RESERVED_NAMES.contains(&name) || self.reserved_names.iter().any(|r| r == name)
    }
}

/// Load and validate a [`CheckConfig`] from a JSON or JSONC string.
///
/// Missing fields take their defaults. Markers and reserved names must be
/// non-empty strings.
pub fn load_config_from_str(s: &str) -> Result<CheckConfig, ConfigError> {
    let config: CheckConfig = serde_json::from_str(&z_toolchain_jsonc_strip::strip_jsonc(s))?;

    if let Some(i) = config.markers.iter().position(|m| m.is_empty()) {
        return Err(ConfigError::InvalidField {
            field: format!("markers[{i}]"),
            reason: "must not be empty".into(),
        });
    }
    if let Some(i) = config
        .reserved_names
        .iter()
        .position(|r| r.trim().is_empty())
    {
        return Err(ConfigError::InvalidField {
            field: format!("reservedNames[{i}]"),
            reason: "must not be empty".into(),
        });
    }

    Ok(config)
}
