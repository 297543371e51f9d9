//! List items.
//!
//! An item is an opaque JSON record. The only structure this crate relies on
//! is the identity field; everything else is carried through untouched for
//! the presentation layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::identifiers::ItemId;

/// Name of the identity field on every item.
pub const ID_FIELD: &str = "id";

/// An opaque record with an identity field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(Value);

impl Item {
    /// Wrap a raw JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Identity of this item, if it has a usable one.
    ///
    /// Returns `None` for non-object records, a missing or `null` id, an empty
    /// string id, or an id of any other JSON type (arrays, objects, booleans).
    pub fn id(&self) -> Option<ItemId> {
        self.key_of(ID_FIELD)
    }

    /// Read an arbitrary field as an identity key.
    ///
    /// Strings are used verbatim; numbers use their JSON text form.
    pub fn key_of(&self, field: &str) -> Option<ItemId> {
        match self.0.get(field)? {
            Value::String(s) => ItemId::new(s.as_str()).ok(),
            Value::Number(n) => ItemId::new(n.to_string()).ok(),
            _ => None,
        }
    }

    /// Look up any other field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// The underlying JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for Item {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
