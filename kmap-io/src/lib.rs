//! kmap I/O - Mapping-file loading
//!
//! This crate resolves external mapping sources into the parsed association
//! lists the core consumes:
//!
//! - [`MappingSource`]: the loader collaborator contract
//! - [`FileLoader`]: JSON / YAML / TOML mapping files resolved by extension
//! - [`keymap_from_path`]: one-call construction of a populated [`KeyMap`]

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod loader;

// Re-export commonly used types
pub use error::{LoadError, Result};
pub use kmap_core::KeyMap;
pub use loader::{keymap_from_path, load_pairs, FileLoader, MappingFormat, MappingSource};
