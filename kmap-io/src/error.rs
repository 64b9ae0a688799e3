//! Error types for mapping-file loading

use kmap_core::KeyMapError;
use thiserror::Error;

/// Errors that can occur while loading a mapping file
#[derive(Debug, Error)]
pub enum LoadError {
    /// I/O error while reading the mapping file
    #[error("I/O error while reading mapping: {0}")]
    Io(#[from] std::io::Error),

    /// JSON mapping file failed to parse
    #[error("JSON parse error in mapping '{path}': {source}")]
    Json {
        /// Path of the mapping file
        path: String,
        /// Underlying serde_json error
        source: serde_json::Error,
    },

    /// YAML mapping file failed to parse
    #[error("YAML parse error in mapping '{path}': {source}")]
    Yaml {
        /// Path of the mapping file
        path: String,
        /// Underlying serde_yaml error
        source: serde_yaml::Error,
    },

    /// TOML mapping file failed to parse
    #[error("TOML parse error in mapping '{path}': {source}")]
    Toml {
        /// Path of the mapping file
        path: String,
        /// Underlying toml error
        source: toml::de::Error,
    },

    /// File extension does not name a supported mapping format
    #[error(
        "Unsupported mapping format for '{path}': extension '{extension}' \
         (expected json, yaml, yml, or toml)"
    )]
    UnsupportedFormat {
        /// Path of the mapping file
        path: String,
        /// Extension that was not recognized (empty if none)
        extension: String,
    },

    /// Parsed document is not a flat mapping
    #[error("Mapping '{path}' must be a flat mapping of strings, found {found_type}")]
    NotAMapping {
        /// Path of the mapping file
        path: String,
        /// Actual type found at the document root
        found_type: String,
    },

    /// Mapping contains a non-string key
    #[error("Mapping keys must be strings, found {found_type}")]
    NonStringKey {
        /// Actual type of the offending key
        found_type: String,
    },

    /// Mapping contains a non-string abbreviation
    #[error("Abbreviation for key '{key}' must be a string, found {found_type}")]
    InvalidAbbreviation {
        /// Key whose abbreviation has the wrong type
        key: String,
        /// Actual type of the offending value
        found_type: String,
    },

    /// Loaded pairs failed registration
    #[error(transparent)]
    Register(#[from] KeyMapError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, LoadError>;
