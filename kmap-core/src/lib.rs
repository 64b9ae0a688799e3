//! kmap core - Bidirectional key abbreviation for JSON-like documents
//!
//! This crate provides the key/abbreviation mapping store and the recursive
//! document rewriting built on it, with no I/O dependencies. It includes:
//!
//! - [`KeyMap`]: the bidirectional mapping with registration and lookup
//! - [`Document`]: a tagged document model distinguishing structural records
//!   from opaque pass-through values
//! - Compact/expand: recursive key rewriting in either direction, over
//!   [`Document`] or directly over [`serde_json::Value`]
//! - Registration error types
//!
//! Loading mappings from files lives in `kmap-io`; the core only ever sees
//! parsed association lists.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod document;
pub mod error;
pub mod keymap;

// Re-export commonly used types
pub use document::{Document, Opaque, OpaqueValueError};
pub use error::{KeyMapError, Result};
pub use keymap::KeyMap;
