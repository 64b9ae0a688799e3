//! Bidirectional key/abbreviation mapping and recursive document rewriting

use crate::document::Document;
use crate::error::{KeyMapError, Result};
use ahash::AHashMap;
use serde_json::{Map, Value};

/// A bidirectional mapping between full key names and short abbreviations
///
/// Each instance owns its own pair of lookup tables; independent instances
/// never interfere. The tables only ever grow: pairs are added through
/// [`KeyMap::register`] (or its bulk forms) and there is no removal
/// operation. All other operations are read-only transforms, so a `KeyMap`
/// that is no longer being mutated can be shared freely across threads.
///
/// # Example
///
/// ```
/// use kmap_core::KeyMap;
///
/// let mut map = KeyMap::new();
/// map.register("firstname", "fn").unwrap().register("lastname", "ln").unwrap();
///
/// assert_eq!(map.abbreviate("firstname"), "fn");
/// assert_eq!(map.restore("ln"), "lastname");
/// assert_eq!(map.abbreviate("middlename"), "middlename");
/// ```
#[derive(Debug, Default, Clone)]
pub struct KeyMap {
    /// key -> abbreviation
    forward: AHashMap<String, String>,
    /// abbreviation -> key
    backward: AHashMap<String, String>,
}

impl KeyMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map pre-populated from an association list
    ///
    /// Pairs are registered in iteration order; the first failing pair aborts
    /// construction.
    pub fn with_pairs<I, K, A>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, A)>,
        K: Into<String>,
        A: Into<String>,
    {
        let mut map = Self::new();
        map.register_all(pairs)?;
        Ok(map)
    }

    /// Register a single key/abbreviation pair
    ///
    /// Inserts into both lookup tables together; on failure neither table is
    /// touched. Returns `&mut Self` so registrations can be chained.
    ///
    /// Keys and abbreviations are atomic segments: dots are reserved as path
    /// separators and the caller must not register dotted paths.
    ///
    /// # Errors
    ///
    /// [`KeyMapError::DuplicateKey`] if the key already owns an abbreviation,
    /// [`KeyMapError::DuplicateAbbreviation`] if the abbreviation is already
    /// bound to another key.
    pub fn register(&mut self, key: impl Into<String>, abbr: impl Into<String>) -> Result<&mut Self> {
        let key = key.into();
        let abbr = abbr.into();

        if let Some(existing) = self.forward.get(&key) {
            return Err(KeyMapError::DuplicateKey {
                key,
                abbr: existing.clone(),
            });
        }
        if let Some(owner) = self.backward.get(&abbr) {
            return Err(KeyMapError::DuplicateAbbreviation {
                abbr,
                key: owner.clone(),
            });
        }

        self.forward.insert(key.clone(), abbr.clone());
        self.backward.insert(abbr, key);
        Ok(self)
    }

    /// Register every pair of an association list, in iteration order
    ///
    /// Stops at the first failing pair and propagates its error; pairs
    /// registered before the failure stay in place (no rollback).
    pub fn register_all<I, K, A>(&mut self, pairs: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, A)>,
        K: Into<String>,
        A: Into<String>,
    {
        for (key, abbr) in pairs {
            self.register(key, abbr)?;
        }
        Ok(self)
    }

    /// Register an externally-loaded mapping
    ///
    /// The source is an already-parsed association list, typically produced
    /// by a loader collaborator that resolved some file format. Equivalent to
    /// [`KeyMap::register_all`].
    pub fn load<I, K, A>(&mut self, source: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, A)>,
        K: Into<String>,
        A: Into<String>,
    {
        self.register_all(source)
    }

    /// Map a key (or dotted path) to its abbreviated form
    ///
    /// Dotted input is split on `.`, each segment abbreviated independently,
    /// and the result rejoined with `.`. Unmapped segments pass through
    /// unchanged; this operation never fails.
    pub fn abbreviate(&self, key: &str) -> String {
        Self::translate(&self.forward, key)
    }

    /// Abbreviate each key of a sequence independently
    ///
    /// Each element gets a single one-level lookup; elements are not split on
    /// dots (only a single string argument is treated as a dotted path).
    pub fn abbreviate_each<I, S>(&self, keys: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keys.into_iter()
            .map(|key| Self::lookup(&self.forward, key.as_ref()).to_string())
            .collect()
    }

    /// Map an abbreviation (or dotted path) back to its full key
    ///
    /// Mirror of [`KeyMap::abbreviate`] over the backward table, with the
    /// same dotted-path and pass-through rules.
    pub fn restore(&self, abbr: &str) -> String {
        Self::translate(&self.backward, abbr)
    }

    /// Restore each abbreviation of a sequence independently
    ///
    /// Mirror of [`KeyMap::abbreviate_each`]; elements are not dot-split.
    pub fn restore_each<I, S>(&self, abbrs: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        abbrs
            .into_iter()
            .map(|abbr| Self::lookup(&self.backward, abbr.as_ref()).to_string())
            .collect()
    }

    /// Recursively rewrite a document's record keys from full to abbreviated form
    ///
    /// Sequences are rewritten element-wise with order preserved; records get
    /// every key replaced by [`KeyMap::abbreviate`] and every value compacted
    /// recursively, with output fields following the input's own order.
    /// Scalars and opaque values come back unchanged (opaque identity is
    /// preserved, not copied). The input is never mutated.
    pub fn compact(&self, document: &Document) -> Document {
        Self::rewrite(&self.forward, document)
    }

    /// Recursively rewrite a document's record keys from abbreviated to full form
    ///
    /// Mirror of [`KeyMap::compact`] using [`KeyMap::restore`]; identical
    /// recursion and pass-through rules.
    pub fn expand(&self, document: &Document) -> Document {
        Self::rewrite(&self.backward, document)
    }

    /// [`KeyMap::compact`] directly over a JSON value
    ///
    /// Every JSON object is a structural record (JSON has no opaque values),
    /// so all object keys are rewritten.
    pub fn compact_value(&self, value: &Value) -> Value {
        Self::rewrite_value(&self.forward, value)
    }

    /// [`KeyMap::expand`] directly over a JSON value
    pub fn expand_value(&self, value: &Value) -> Value {
        Self::rewrite_value(&self.backward, value)
    }

    /// Number of registered pairs
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Whether no pairs are registered
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// The registered abbreviation for a key, if any
    pub fn abbreviation_of(&self, key: &str) -> Option<&str> {
        self.forward.get(key).map(String::as_str)
    }

    /// The registered key for an abbreviation, if any
    pub fn key_of(&self, abbr: &str) -> Option<&str> {
        self.backward.get(abbr).map(String::as_str)
    }

    /// Iterate over the registered (key, abbreviation) pairs
    ///
    /// Iteration order is unspecified.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.forward
            .iter()
            .map(|(key, abbr)| (key.as_str(), abbr.as_str()))
    }

    /// One-level lookup with pass-through for unmapped or empty results
    fn lookup<'a>(table: &'a AHashMap<String, String>, name: &'a str) -> &'a str {
        match table.get(name) {
            Some(mapped) if !mapped.is_empty() => mapped,
            _ => name,
        }
    }

    /// Translate a name, decomposing dotted paths into independent segments
    fn translate(table: &AHashMap<String, String>, name: &str) -> String {
        if name.contains('.') {
            name.split('.')
                .map(|segment| Self::lookup(table, segment))
                .collect::<Vec<_>>()
                .join(".")
        } else {
            Self::lookup(table, name).to_string()
        }
    }

    fn rewrite(table: &AHashMap<String, String>, document: &Document) -> Document {
        match document {
            Document::Sequence(items) => Document::Sequence(
                items.iter().map(|item| Self::rewrite(table, item)).collect(),
            ),
            Document::Record(fields) => Document::Record(
                fields
                    .iter()
                    .map(|(key, value)| {
                        (Self::translate(table, key), Self::rewrite(table, value))
                    })
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn rewrite_value(table: &AHashMap<String, String>, value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| Self::rewrite_value(table, item))
                    .collect(),
            ),
            Value::Object(fields) => {
                let mut out = Map::with_capacity(fields.len());
                for (key, val) in fields {
                    out.insert(Self::translate(table, key), Self::rewrite_value(table, val));
                }
                Value::Object(out)
            }
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Opaque;
    use serde_json::json;

    fn sample_map() -> KeyMap {
        let mut map = KeyMap::new();
        map.register("foo", "f")
            .unwrap()
            .register("bar", "b")
            .unwrap();
        map
    }

    #[test]
    fn abbreviate_returns_registered_abbreviation() {
        let map = sample_map();
        assert_eq!(map.abbreviate("foo"), "f");
        assert_eq!(map.abbreviate("bar"), "b");
    }

    #[test]
    fn abbreviate_passes_unregistered_keys_through() {
        let map = sample_map();
        assert_eq!(map.abbreviate("baz"), "baz");
        assert_eq!(map.restore("bz"), "bz");
    }

    #[test]
    fn abbreviate_splits_dotted_paths() {
        let map = sample_map();
        assert_eq!(map.abbreviate("foo.bar.baz"), "f.b.baz");
    }

    #[test]
    fn abbreviate_each_maps_one_level() {
        let map = sample_map();
        assert_eq!(
            map.abbreviate_each(["foo", "bar", "baz"]),
            vec!["f", "b", "baz"]
        );
        // Sequence elements are not dot-split; only a single string argument
        // is treated as a dotted path.
        assert_eq!(map.abbreviate_each(["foo.bar"]), vec!["foo.bar"]);
    }

    #[test]
    fn restore_mirrors_abbreviate() {
        let map = sample_map();
        assert_eq!(map.restore("f"), "foo");
        assert_eq!(map.restore("f.b.bz"), "foo.bar.bz");
        assert_eq!(map.restore_each(["f", "b", "bz"]), vec!["foo", "bar", "bz"]);
    }

    #[test]
    fn empty_abbreviation_falls_back_to_key() {
        let mut map = KeyMap::new();
        map.register("foo", "").unwrap();
        assert_eq!(map.abbreviate("foo"), "foo");
    }

    #[test]
    fn compact_rewrites_record_keys() {
        let map = sample_map();
        let doc = Document::from_json(json!({"foo": "foo", "bar": "bar", "baz": "baz"}));
        let expected = Document::from_json(json!({"f": "foo", "b": "bar", "baz": "baz"}));
        assert_eq!(map.compact(&doc), expected);
    }

    #[test]
    fn compact_recurses_into_nested_records() {
        let map = sample_map();
        let doc = Document::from_json(json!({"foo": {"bar": "bar", "baz": "baz"}}));
        let expected = Document::from_json(json!({"f": {"b": "bar", "baz": "baz"}}));
        assert_eq!(map.compact(&doc), expected);
    }

    #[test]
    fn compact_rewrites_records_inside_sequences() {
        let map = sample_map();
        let doc = Document::from_json(json!([
            {"foo": "foo", "bar": "bar"},
            {"bar": "bar", "baz": "baz"}
        ]));
        let expected = Document::from_json(json!([
            {"f": "foo", "b": "bar"},
            {"b": "bar", "baz": "baz"}
        ]));
        assert_eq!(map.compact(&doc), expected);
    }

    #[test]
    fn compact_leaves_scalars_untouched() {
        let map = sample_map();
        assert_eq!(
            map.compact(&Document::String("foo".into())),
            Document::String("foo".into())
        );
        assert_eq!(
            map.compact(&Document::Number(123.into())),
            Document::Number(123.into())
        );
    }

    #[test]
    fn compact_preserves_opaque_identity() {
        let map = sample_map();
        let now = Opaque::new(chrono::Utc::now());

        let standalone = map.compact(&Document::Opaque(now.clone()));
        match standalone {
            Document::Opaque(out) => assert!(out.ptr_eq(&now)),
            other => panic!("expected opaque, got {:?}", other),
        }

        let doc = Document::Record(vec![("foo".to_string(), Document::Opaque(now.clone()))]);
        match map.compact(&doc) {
            Document::Record(fields) => {
                assert_eq!(fields[0].0, "f");
                match &fields[0].1 {
                    Document::Opaque(out) => assert!(out.ptr_eq(&now)),
                    other => panic!("expected opaque, got {:?}", other),
                }
            }
            other => panic!("expected record, got {:?}", other),
        }
    }

    #[test]
    fn expand_mirrors_compact() {
        let map = sample_map();
        let doc = Document::from_json(json!({"f": "foo", "b": "bar", "baz": "baz"}));
        let expected = Document::from_json(json!({"foo": "foo", "bar": "bar", "baz": "baz"}));
        assert_eq!(map.expand(&doc), expected);
    }

    #[test]
    fn expand_of_compact_restores_original() {
        let map = sample_map();
        let doc = Document::from_json(json!({
            "foo": {"bar": [{"foo": 1}, {"bar": 2}], "baz": null},
            "bar": true
        }));
        assert_eq!(map.expand(&map.compact(&doc)), doc);
    }

    #[test]
    fn compact_value_rewrites_json_in_place_order() {
        let map = sample_map();
        let value = json!({"foo": "foo", "bar": {"foo": 1}, "baz": [{"bar": 2}]});
        let compacted = map.compact_value(&value);
        assert_eq!(
            compacted,
            json!({"f": "foo", "b": {"f": 1}, "baz": [{"b": 2}]})
        );

        // Output fields follow the input's own key order.
        let keys: Vec<&str> = compacted
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["f", "b", "baz"]);

        assert_eq!(map.expand_value(&compacted), value);
    }

    #[test]
    fn compact_value_leaves_scalars_untouched() {
        let map = sample_map();
        assert_eq!(map.compact_value(&json!("foo")), json!("foo"));
        assert_eq!(map.compact_value(&json!(123)), json!(123));
        assert_eq!(map.expand_value(&json!(null)), json!(null));
    }

    #[test]
    fn register_rejects_duplicate_key() {
        let mut map = KeyMap::new();
        map.register("foo", "f").unwrap();

        let err = map.register("foo", "f_").unwrap_err();
        assert!(matches!(
            err,
            KeyMapError::DuplicateKey { ref key, ref abbr } if key == "foo" && abbr == "f"
        ));
        assert_eq!(err.to_string(), "Key 'foo' already has an abbreviation ('f')");

        // The failed pair left both tables untouched.
        assert_eq!(map.abbreviate("foo"), "f");
        assert_eq!(map.restore("f_"), "f_");
    }

    #[test]
    fn register_rejects_duplicate_abbreviation() {
        let mut map = KeyMap::new();
        map.register("bar", "b").unwrap();

        let err = map.register("baz", "b").unwrap_err();
        assert!(matches!(
            err,
            KeyMapError::DuplicateAbbreviation { ref abbr, ref key } if abbr == "b" && key == "bar"
        ));
        assert_eq!(err.to_string(), "Abbreviation 'b' already used by 'bar'");
        assert_eq!(map.restore("b"), "bar");
    }

    #[test]
    fn register_all_matches_sequential_registration() {
        let mut bulk = KeyMap::new();
        bulk.register_all([("foo", "f"), ("bar", "b")]).unwrap();

        assert_eq!(bulk.abbreviate("foo"), "f");
        assert_eq!(bulk.abbreviate("bar"), "b");
        assert_eq!(bulk.restore("f"), "foo");
        assert_eq!(bulk.restore("b"), "bar");
        assert_eq!(bulk.len(), 2);
    }

    #[test]
    fn register_all_stops_at_first_failure() {
        let mut map = KeyMap::new();
        let err = map
            .register_all([("foo", "f"), ("bar", "f"), ("baz", "bz")])
            .unwrap_err();
        assert!(matches!(err, KeyMapError::DuplicateAbbreviation { .. }));

        // Pairs registered before the failure stay in place; later ones were
        // never reached.
        assert_eq!(map.abbreviate("foo"), "f");
        assert_eq!(map.abbreviate("baz"), "baz");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn with_pairs_builds_populated_map() {
        let map = KeyMap::with_pairs([("foo", "f"), ("bar", "b")]).unwrap();
        assert_eq!(map.abbreviate("foo.bar"), "f.b");
        assert!(KeyMap::with_pairs([("a", "x"), ("b", "x")]).is_err());
    }

    #[test]
    fn load_registers_parsed_mapping() {
        let mut map = KeyMap::new();
        map.load(vec![
            ("foo".to_string(), "f".to_string()),
            ("bar".to_string(), "b".to_string()),
        ])
        .unwrap();
        assert_eq!(map.abbreviate("foo"), "f");
        assert_eq!(map.key_of("b"), Some("bar"));
    }

    #[test]
    fn instances_do_not_interfere() {
        let a = KeyMap::with_pairs([("foo", "f")]).unwrap();
        let b = KeyMap::with_pairs([("foo", "x")]).unwrap();
        assert_eq!(a.abbreviate("foo"), "f");
        assert_eq!(b.abbreviate("foo"), "x");
        assert_eq!(KeyMap::new().abbreviate("foo"), "foo");
    }

    #[test]
    fn pairs_exposes_registrations() {
        let map = sample_map();
        let mut pairs: Vec<(String, String)> = map
            .pairs()
            .map(|(k, a)| (k.to_string(), a.to_string()))
            .collect();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("bar".to_string(), "b".to_string()),
                ("foo".to_string(), "f".to_string())
            ]
        );
        assert_eq!(map.abbreviation_of("foo"), Some("f"));
        assert_eq!(map.abbreviation_of("nope"), None);
    }
}
