//! Error types for key/abbreviation registration

use thiserror::Error;

/// Errors raised while registering key/abbreviation pairs
///
/// Registration is all-or-nothing per pair: a failed pair leaves both lookup
/// tables untouched, and bulk registration stops at the first failing pair
/// without rolling back earlier ones.
#[derive(Debug, Error)]
pub enum KeyMapError {
    /// The key already owns a registered abbreviation.
    #[error("Key '{key}' already has an abbreviation ('{abbr}')")]
    DuplicateKey {
        /// Key that was registered twice
        key: String,
        /// Abbreviation the key already owns
        abbr: String,
    },

    /// The abbreviation is already bound to a different key.
    #[error("Abbreviation '{abbr}' already used by '{key}'")]
    DuplicateAbbreviation {
        /// Abbreviation that was reused
        abbr: String,
        /// Key currently owning the abbreviation
        key: String,
    },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, KeyMapError>;
