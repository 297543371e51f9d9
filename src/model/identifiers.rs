//! Core identifier newtypes with smart constructors.
//!
//! Both identifiers validate non-empty strings at construction time.
//! Raw constructors are never exported - use smart constructors only.

use std::fmt;

/// Name of a key in the shared query-string namespace (e.g. `category`, `tags`, `page`).
/// NEVER export the constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(String);

impl QueryKey {
    /// Smart constructor: validates non-empty key
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidQueryKey> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidQueryKey::Empty);
        }
        Ok(Self(raw))
    }

    /// Key from a compile-time constant. Constants are checked by tests, not at runtime.
    pub(crate) fn from_static(raw: &'static str) -> Self {
        debug_assert!(!raw.is_empty(), "query key constant must not be empty");
        Self(raw.to_string())
    }

    /// Borrow the key as it appears in the query string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a list item.
///
/// Numeric ids from the API are normalized to their decimal string form so
/// that `7` and `"7"` refer to the same item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    /// Smart constructor: validates non-empty id
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidItemId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidItemId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ===== Error Types =====

/// Rejected query key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidQueryKey {
    /// Key was the empty string.
    #[error("Query key cannot be empty")]
    Empty,
}

/// Rejected item id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidItemId {
    /// Id was the empty string.
    #[error("Item ID cannot be empty")]
    Empty,
}

// ===== Tests =====
