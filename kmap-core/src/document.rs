//! Tagged document model for key rewriting
//!
//! A [`Document`] is the value shape the rewriting operations walk: scalars,
//! ordered sequences, structural records, and opaque values. The record/opaque
//! boundary is explicit here rather than sniffed at runtime: only values built
//! as [`Document::Record`] have their keys rewritten, while anything wrapped
//! in [`Opaque`] passes through untouched with its identity preserved.

use serde_json::{Map, Number, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A JSON-like document value
///
/// Records keep their fields as an insertion-ordered association list so that
/// rewritten output follows the iteration order of the input.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    /// Null scalar
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Numeric scalar
    Number(Number),
    /// String scalar
    String(String),
    /// Ordered sequence of documents
    Sequence(Vec<Document>),
    /// Structural key-value record, keys subject to rewriting
    Record(Vec<(String, Document)>),
    /// Value with identity beyond plain structural data (e.g. a date-time)
    Opaque(Opaque),
}

/// A pass-through value carried inside a document
///
/// Opaque values are never rewritten or copied: cloning an `Opaque` clones the
/// shared handle, so the value coming out of `compact`/`expand` is the same
/// value that went in (pointer equality, which is also how `PartialEq` is
/// defined for this type).
#[derive(Clone)]
pub struct Opaque(Arc<dyn Any + Send + Sync>);

impl Opaque {
    /// Wrap a value as an opaque document node
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the wrapped value if it has type `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }

    /// Whether two opaques are the same underlying value
    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Opaque(..)")
    }
}

/// A document containing an opaque value was converted to JSON
#[derive(Debug, Error)]
#[error("Opaque values have no JSON representation")]
pub struct OpaqueValueError;

impl Document {
    /// Build a document from a JSON value
    ///
    /// Every JSON object becomes a [`Document::Record`] (JSON carries no type
    /// identity beyond its structure, so nothing maps to [`Document::Opaque`]).
    /// Field order is preserved.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Document::Null,
            Value::Bool(b) => Document::Bool(b),
            Value::Number(n) => Document::Number(n),
            Value::String(s) => Document::String(s),
            Value::Array(items) => {
                Document::Sequence(items.into_iter().map(Document::from_json).collect())
            }
            Value::Object(fields) => Document::Record(
                fields
                    .into_iter()
                    .map(|(key, val)| (key, Document::from_json(val)))
                    .collect(),
            ),
        }
    }

    /// Convert the document back into a JSON value
    ///
    /// Fails only if the document contains an [`Document::Opaque`] node
    /// anywhere; documents built with [`Document::from_json`] always convert.
    pub fn try_into_json(self) -> std::result::Result<Value, OpaqueValueError> {
        match self {
            Document::Null => Ok(Value::Null),
            Document::Bool(b) => Ok(Value::Bool(b)),
            Document::Number(n) => Ok(Value::Number(n)),
            Document::String(s) => Ok(Value::String(s)),
            Document::Sequence(items) => Ok(Value::Array(
                items
                    .into_iter()
                    .map(Document::try_into_json)
                    .collect::<std::result::Result<_, _>>()?,
            )),
            Document::Record(fields) => {
                let mut map = Map::with_capacity(fields.len());
                for (key, val) in fields {
                    map.insert(key, val.try_into_json()?);
                }
                Ok(Value::Object(map))
            }
            Document::Opaque(_) => Err(OpaqueValueError),
        }
    }

    /// Whether this document is a structural record
    pub fn is_record(&self) -> bool {
        matches!(self, Document::Record(_))
    }

    /// Whether this document is an ordered sequence
    pub fn is_sequence(&self) -> bool {
        matches!(self, Document::Sequence(_))
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Document::from_json(value)
    }
}

impl TryFrom<Document> for Value {
    type Error = OpaqueValueError;

    fn try_from(doc: Document) -> std::result::Result<Self, Self::Error> {
        doc.try_into_json()
    }
}
