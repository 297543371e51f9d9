//! Tab-scoped query-string store with typed bindings.
//!
//! The store owns two representations:
//!
//! - **committed** - what the address bar shows; every binding reads from it.
//! - **pending** - the representation the current turn is building. Every write is a
//!   read-modify-write against the pending copy, so several writes issued in the same
//!   turn compose instead of clobbering each other.
//!
//! [`UrlStateStore::flush`] ends the turn and turns the pending copy into at most one
//! committed navigation.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info};

use super::query::QueryString;
use crate::codec::{Codec, ParseMemo};
use crate::model::QueryKey;

/// How a commit is recorded in session history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavigationMode {
    /// Overwrite the current history entry.
    #[default]
    Replace,
    /// Add a new history entry.
    Push,
}

/// One committed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Canonical query string after the commit (no leading `?`).
    pub query: String,
    /// History mode of the commit.
    pub mode: NavigationMode,
    /// Store revision after the commit.
    pub revision: u64,
}

#[derive(Debug)]
struct PendingCommit {
    query: QueryString,
    mode: NavigationMode,
}

#[derive(Debug, Default)]
struct StoreInner {
    committed: QueryString,
    revision: u64,
    pending: Option<PendingCommit>,
    last_commit: Option<Navigation>,
}

/// Shared query-string state for one browser tab.
///
/// Cloning is cheap and yields a handle to the same state. There is no locking;
/// correctness relies on single-threaded execution.
#[derive(Debug, Clone, Default)]
pub struct UrlStateStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl UrlStateStore {
    /// Store with an empty query string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded from the address bar's current query.
    pub fn from_query(raw: &str) -> Self {
        let store = Self::new();
        store.inner.borrow_mut().committed = QueryString::parse(raw);
        store
    }

    /// Bind `key` to a typed value with a declared default.
    pub fn bind<C: Codec>(&self, key: QueryKey, default: C::Value, codec: C) -> StateBinding<C> {
        StateBinding {
            store: self.clone(),
            key,
            default: Rc::new(default),
            codec,
            memo: ParseMemo::new(),
        }
    }

    /// Raw committed value for `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().committed.get(key).map(str::to_string)
    }

    /// Canonical committed query string (no leading `?`).
    pub fn query_string(&self) -> String {
        self.inner.borrow().committed.to_string()
    }

    /// Number of commits applied so far.
    pub fn revision(&self) -> u64 {
        self.inner.borrow().revision
    }

    /// Raw value for `key` as the current turn sees it: pending writes included.
    ///
    /// Same as [`raw`](Self::raw) when nothing is pending.
    pub fn pending_raw(&self, key: &str) -> Option<String> {
        let inner = self.inner.borrow();
        let query = match &inner.pending {
            Some(pending) => &pending.query,
            None => &inner.committed,
        };
        query.get(key).map(str::to_string)
    }

    /// The most recent commit made through [`flush`](Self::flush).
    pub fn last_commit(&self) -> Option<Navigation> {
        self.inner.borrow().last_commit.clone()
    }

    /// Whether writes are waiting for [`flush`](Self::flush).
    pub fn has_pending(&self) -> bool {
        self.inner.borrow().pending.is_some()
    }

    /// The single read-modify-write entry point.
    ///
    /// `edit` sees the latest pending representation (or the committed one when this is
    /// the first write of the turn). A `Push` anywhere in the turn makes the whole commit
    /// a push.
    pub fn modify(&self, mode: NavigationMode, edit: impl FnOnce(&mut QueryString)) {
        let mut inner = self.inner.borrow_mut();
        let StoreInner {
            committed, pending, ..
        } = &mut *inner;
        let pending = pending.get_or_insert_with(|| PendingCommit {
            query: committed.clone(),
            mode: NavigationMode::Replace,
        });
        edit(&mut pending.query);
        if mode == NavigationMode::Push {
            pending.mode = NavigationMode::Push;
        }
    }

    /// Apply several raw updates as one edit. `None` or empty deletes the key.
    pub fn update_many<I>(&self, updates: I, mode: NavigationMode)
    where
        I: IntoIterator<Item = (QueryKey, Option<String>)>,
    {
        self.modify(mode, |query| {
            for (key, value) in updates {
                match value {
                    Some(v) if !v.is_empty() => query.set(key.as_str(), v),
                    _ => query.remove(key.as_str()),
                }
            }
        });
    }

    /// Clear the listed keys, or every key when `keys` is `None`.
    pub fn reset_all(&self, keys: Option<&[QueryKey]>) {
        self.modify(NavigationMode::Replace, |query| match keys {
            Some(keys) => {
                for key in keys {
                    query.remove(key.as_str());
                }
            }
            None => query.clear(),
        });
    }

    /// Commit the pending representation, ending the turn.
    ///
    /// Returns `None` when nothing was written or the writes cancelled out.
    pub fn flush(&self) -> Option<Navigation> {
        let mut inner = self.inner.borrow_mut();
        let pending = inner.pending.take()?;

        if pending.query == inner.committed {
            debug!("url_state.flush: no-op commit dropped");
            return None;
        }

        inner.committed = pending.query;
        inner.revision += 1;
        let navigation = Navigation {
            query: inner.committed.to_string(),
            mode: pending.mode,
            revision: inner.revision,
        };
        info!(
            query = %navigation.query,
            mode = ?navigation.mode,
            revision = navigation.revision,
            "url_state.flush: committed"
        );
        inner.last_commit = Some(navigation.clone());
        Some(navigation)
    }

    /// Replace the committed query wholesale (address bar edit, back/forward).
    ///
    /// Discards any pending writes.
    pub fn navigate(&self, raw: &str) {
        let mut inner = self.inner.borrow_mut();
        inner.pending = None;
        let query = QueryString::parse(raw);
        if query != inner.committed {
            inner.committed = query;
            inner.revision += 1;
            debug!(revision = inner.revision, "url_state.navigate: external navigation");
        }
    }
}

/// A typed view of one query key.
///
/// The binding owns no state of its own beyond a parse memo; its value is always
/// derived from the store's committed representation.
pub struct StateBinding<C: Codec> {
    store: UrlStateStore,
    key: QueryKey,
    default: Rc<C::Value>,
    codec: C,
    memo: ParseMemo<C::Value>,
}

impl<C: Codec> std::fmt::Debug for StateBinding<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateBinding")
            .field("key", &self.key)
            .field("raw", &self.store.raw(self.key.as_str()))
            .finish()
    }
}

impl<C: Codec> StateBinding<C> {
    /// The bound key.
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// The declared default.
    pub fn default_value(&self) -> &C::Value {
        &self.default
    }

    /// Value as the current turn sees it, pending writes included.
    ///
    /// Decoded fresh on every call; use [`value`](Self::value) for identity-stable
    /// reads of committed state.
    pub fn pending_value(&self) -> C::Value {
        match self.store.pending_raw(self.key.as_str()).as_deref() {
            None | Some("") => self.default.as_ref().clone(),
            Some(raw) => self
                .codec
                .parse(raw)
                .unwrap_or_else(|_| self.default.as_ref().clone()),
        }
    }

    /// Current value.
    ///
    /// Absent or empty raw values yield the default. Unparsable values also fall back
    /// to the default. The returned `Rc` is pointer-identical across calls as long as
    /// the raw string is unchanged.
    pub fn value(&self) -> Rc<C::Value> {
        let raw = self.store.raw(self.key.as_str());
        self.memo.get_or_compute(raw.as_deref(), || match raw.as_deref() {
            None | Some("") => Rc::clone(&self.default),
            Some(raw) => match self.codec.parse(raw) {
                Ok(value) => Rc::new(value),
                Err(err) => {
                    debug!(
                        key = %self.key,
                        error = %err,
                        "url_state.bind: falling back to default"
                    );
                    Rc::clone(&self.default)
                }
            },
        })
    }

    /// Raw string a value would be stored as, or `None` when the key must be elided.
    pub fn encode(&self, value: &C::Value) -> Option<String> {
        if *value == *self.default {
            return None;
        }
        let serialized = self.codec.serialize(value);
        (!serialized.is_empty()).then_some(serialized)
    }

    /// Write a new value with replace navigation.
    ///
    /// The key is removed when the value equals the default or serializes to `""`.
    pub fn set(&self, value: &C::Value) {
        self.set_with_mode(value, NavigationMode::Replace);
    }

    /// Write a new value with an explicit navigation mode.
    pub fn set_with_mode(&self, value: &C::Value, mode: NavigationMode) {
        let encoded = self.encode(value);
        let key = self.key.as_str();
        self.store.modify(mode, |query| match encoded {
            Some(raw) => query.set(key, raw),
            None => query.remove(key),
        });
    }

    /// Remove the key (the "undefined/null" write).
    pub fn clear(&self) {
        let key = self.key.as_str();
        self.store
            .modify(NavigationMode::Replace, |query| query.remove(key));
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
