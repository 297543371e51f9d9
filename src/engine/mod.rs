//! Single-threaded driver wiring the state machines to the data sources.
//!
//! Everything runs on one thread inside a tokio `LocalSet`. State lives behind
//! `Rc<RefCell<_>>`; no borrow is held across an `.await`, so fetch completions
//! interleave with user events only at await points, never mid-transition.

mod feed;
mod paged_list;
mod tasks;

pub use feed::FeedEngine;
pub use paged_list::PagedList;

use crate::model::Item;
use crate::state::{ListPaginationController, ListPhase, PaginationCursor};

/// Read-only copy of a list for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    /// Merged items.
    pub items: Vec<Item>,
    /// Cursor after the latest resolve.
    pub cursor: PaginationCursor,
    /// Lifecycle phase (drives the loading indicator and the end-of-list footer).
    pub phase: ListPhase,
    /// Server-reported total, once a page has loaded.
    pub total: Option<u64>,
}

impl ListView {
    fn of(list: &ListPaginationController) -> Self {
        Self {
            items: list.items().to_vec(),
            cursor: list.cursor(),
            phase: list.phase(),
            total: list.total(),
        }
    }

    /// True once a short page has ended the list.
    pub fn is_exhausted(&self) -> bool {
        self.phase == ListPhase::Exhausted
    }
}
