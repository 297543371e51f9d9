//! Depth-1 parse memo keyed by the raw query string.
//!
//! Consumers compare bound values by pointer identity to decide whether dependent
//! work must re-run. Re-parsing on every read would hand out a fresh allocation each
//! time and retrigger that work forever, so the last raw string and its parsed value
//! are kept and reused while the raw string is unchanged.

use std::cell::RefCell;
use std::rc::Rc;

/// Remembers the value parsed from the most recently seen raw string.
///
/// `None` (key absent) is a cache key like any other.
#[derive(Debug)]
pub struct ParseMemo<T> {
    last: RefCell<Option<(Option<String>, Rc<T>)>>,
}

impl<T> ParseMemo<T> {
    /// Empty memo.
    pub fn new() -> Self {
        Self {
            last: RefCell::new(None),
        }
    }

    /// Return the cached value for `raw`, or compute, cache, and return a new one.
    ///
    /// `compute` runs only when `raw` differs from the previous call's key.
    pub fn get_or_compute(&self, raw: Option<&str>, compute: impl FnOnce() -> Rc<T>) -> Rc<T> {
        if let Some((cached_raw, value)) = self.last.borrow().as_ref() {
            if cached_raw.as_deref() == raw {
                return Rc::clone(value);
            }
        }

        let value = compute();
        *self.last.borrow_mut() = Some((raw.map(str::to_string), Rc::clone(&value)));
        value
    }

    /// Forget the cached entry.
    pub fn clear(&self) {
        self.last.borrow_mut().take();
    }
}

impl<T> Default for ParseMemo<T> {
    fn default() -> Self {
        Self::new()
    }
}
