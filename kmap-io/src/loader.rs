//! Mapping-file loaders
//!
//! The core never reads files: a loader resolves some external source into a
//! plain association list of key/abbreviation pairs, and the core registers
//! the result. [`MappingSource`] is the collaborator contract; [`FileLoader`]
//! implements it for JSON, YAML, and TOML files resolved by extension.

use crate::error::{LoadError, Result};
use kmap_core::KeyMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Supported mapping file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingFormat {
    /// JSON mapping (`.json`)
    Json,
    /// YAML mapping (`.yaml` / `.yml`)
    Yaml,
    /// TOML mapping (`.toml`)
    Toml,
}

impl MappingFormat {
    /// Resolve the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(MappingFormat::Json),
            "yaml" | "yml" => Ok(MappingFormat::Yaml),
            "toml" => Ok(MappingFormat::Toml),
            _ => Err(LoadError::UnsupportedFormat {
                path: path.display().to_string(),
                extension,
            }),
        }
    }
}

/// Contract for collaborators that supply key/abbreviation pairs
///
/// A source resolves whatever it points at (a file, a network resource, an
/// in-memory table) into a parsed association list; the core only ever
/// receives the pairs.
pub trait MappingSource {
    /// Resolve the source into key/abbreviation pairs
    fn load(&self) -> Result<Vec<(String, String)>>;

    /// Build a [`KeyMap`] from this source
    ///
    /// Registers the loaded pairs in order, propagating the first
    /// registration failure.
    fn into_keymap(&self) -> Result<KeyMap> {
        let mut map = KeyMap::new();
        map.load(self.load()?)?;
        Ok(map)
    }
}

/// [`MappingSource`] over a mapping file on disk
///
/// The file must contain a flat mapping of string keys to string
/// abbreviations in the format named by its extension.
#[derive(Debug, Clone)]
pub struct FileLoader {
    path: PathBuf,
}

impl FileLoader {
    /// Create a loader for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path this loader reads from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingSource for FileLoader {
    fn load(&self) -> Result<Vec<(String, String)>> {
        let format = MappingFormat::from_path(&self.path)?;
        let content = fs::read_to_string(&self.path)?;
        let path = self.path.display().to_string();

        match format {
            MappingFormat::Json => parse_json(&content, &path),
            MappingFormat::Yaml => parse_yaml(&content, &path),
            MappingFormat::Toml => parse_toml(&content, &path),
        }
    }
}

/// Load the key/abbreviation pairs of a mapping file
pub fn load_pairs(path: impl AsRef<Path>) -> Result<Vec<(String, String)>> {
    FileLoader::new(path.as_ref()).load()
}

/// Build a [`KeyMap`] from a mapping file
pub fn keymap_from_path(path: impl AsRef<Path>) -> Result<KeyMap> {
    FileLoader::new(path.as_ref()).into_keymap()
}

fn parse_json(content: &str, path: &str) -> Result<Vec<(String, String)>> {
    let document: serde_json::Value =
        serde_json::from_str(content).map_err(|source| LoadError::Json {
            path: path.to_string(),
            source,
        })?;

    let fields = document.as_object().ok_or_else(|| LoadError::NotAMapping {
        path: path.to_string(),
        found_type: json_type_name(&document).to_string(),
    })?;

    let mut pairs = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let abbr = value
            .as_str()
            .ok_or_else(|| LoadError::InvalidAbbreviation {
                key: key.clone(),
                found_type: json_type_name(value).to_string(),
            })?;
        pairs.push((key.clone(), abbr.to_string()));
    }
    Ok(pairs)
}

fn parse_yaml(content: &str, path: &str) -> Result<Vec<(String, String)>> {
    let document: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|source| LoadError::Yaml {
            path: path.to_string(),
            source,
        })?;

    let mapping = document.as_mapping().ok_or_else(|| LoadError::NotAMapping {
        path: path.to_string(),
        found_type: yaml_type_name(&document).to_string(),
    })?;

    let mut pairs = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = key.as_str().ok_or_else(|| LoadError::NonStringKey {
            found_type: yaml_type_name(key).to_string(),
        })?;
        let abbr = value
            .as_str()
            .ok_or_else(|| LoadError::InvalidAbbreviation {
                key: key.to_string(),
                found_type: yaml_type_name(value).to_string(),
            })?;
        pairs.push((key.to_string(), abbr.to_string()));
    }
    Ok(pairs)
}

fn parse_toml(content: &str, path: &str) -> Result<Vec<(String, String)>> {
    let document: toml::Value = toml::from_str(content).map_err(|source| LoadError::Toml {
        path: path.to_string(),
        source,
    })?;

    let table = document.as_table().ok_or_else(|| LoadError::NotAMapping {
        path: path.to_string(),
        found_type: document.type_str().to_string(),
    })?;

    let mut pairs = Vec::with_capacity(table.len());
    for (key, value) in table {
        let abbr = value
            .as_str()
            .ok_or_else(|| LoadError::InvalidAbbreviation {
                key: key.clone(),
                found_type: value.type_str().to_string(),
            })?;
        pairs.push((key.clone(), abbr.to_string()));
    }
    Ok(pairs)
}

/// Get a human-readable type name
fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn yaml_type_name(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "boolean",
        serde_yaml::Value::Number(_) => "number",
        serde_yaml::Value::String(_) => "string",
        serde_yaml::Value::Sequence(_) => "sequence",
        serde_yaml::Value::Mapping(_) => "mapping",
        serde_yaml::Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_json_mapping_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "map.json", r#"{"zulu": "z", "alpha": "a"}"#);

        let pairs = load_pairs(&path).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("zulu".to_string(), "z".to_string()),
                ("alpha".to_string(), "a".to_string())
            ]
        );
    }

    #[test]
    fn loads_yaml_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "map.yml", "firstname: fn\nlastname: ln\n");

        let pairs = load_pairs(&path).unwrap();
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&("firstname".to_string(), "fn".to_string())));

        // The long extension resolves to the same format.
        let path = write_file(&dir, "map.yaml", "foo: f\n");
        assert_eq!(load_pairs(&path).unwrap(), vec![("foo".to_string(), "f".to_string())]);
    }

    #[test]
    fn loads_toml_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "map.toml", "foo = \"f\"\nbar = \"b\"\n");

        let pairs = load_pairs(&path).unwrap();
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&("bar".to_string(), "b".to_string())));
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "map.ini", "foo=f\n");

        assert!(matches!(
            load_pairs(&path),
            Err(LoadError::UnsupportedFormat { ref extension, .. }) if extension == "ini"
        ));
        assert!(matches!(
            load_pairs(dir.path().join("noext")),
            Err(LoadError::UnsupportedFormat { ref extension, .. }) if extension.is_empty()
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "map.json", "{broken");
        assert!(matches!(load_pairs(&path), Err(LoadError::Json { .. })));
    }

    #[test]
    fn rejects_non_mapping_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "map.json", r#"["foo", "f"]"#);
        assert!(matches!(
            load_pairs(&path),
            Err(LoadError::NotAMapping { ref found_type, .. }) if found_type == "array"
        ));
    }

    #[test]
    fn rejects_non_string_abbreviation() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "map.json", r#"{"foo": 1}"#);
        assert!(matches!(
            load_pairs(&path),
            Err(LoadError::InvalidAbbreviation { ref key, ref found_type })
                if key == "foo" && found_type == "number"
        ));
    }

    #[test]
    fn keymap_from_path_builds_working_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "map.yml", "foo: f\nbar: b\n");

        let map = keymap_from_path(&path).unwrap();
        assert_eq!(map.abbreviate("foo.bar.baz"), "f.b.baz");
        assert_eq!(map.restore("f"), "foo");
    }

    #[test]
    fn keymap_from_path_propagates_registration_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "map.json", r#"{"foo": "x", "bar": "x"}"#);
        assert!(matches!(
            keymap_from_path(&path),
            Err(LoadError::Register(_))
        ));
    }

    #[test]
    fn custom_source_builds_keymap() {
        struct InlineSource;

        impl MappingSource for InlineSource {
            fn load(&self) -> Result<Vec<(String, String)>> {
                Ok(vec![("foo".to_string(), "f".to_string())])
            }
        }

        let map = InlineSource.into_keymap().unwrap();
        assert_eq!(map.abbreviate("foo"), "f");
    }
}
