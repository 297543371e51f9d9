//! A filterless paged list (bookmarks).

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use super::tasks::TaskSet;
use super::ListView;
use crate::model::FilterSnapshot;
use crate::source::PageSource;
use crate::state::{FetchTicket, InfiniteScrollTrigger, ListPaginationController, ScrollSample};

struct Inner<S> {
    source: S,
    list: RefCell<ListPaginationController>,
    tasks: TaskSet,
}

/// One paginated list over a [`PageSource`], with no filters and no facets.
///
/// Fetches are spawned on the current `LocalSet`; all methods that dispatch must be
/// called from inside one.
pub struct PagedList<S> {
    inner: Rc<Inner<S>>,
    trigger: InfiniteScrollTrigger,
}

impl<S: PageSource + 'static> PagedList<S> {
    /// List over `source` requesting `page_size` items per page.
    pub fn new(source: S, page_size: u32, trigger: InfiniteScrollTrigger) -> Self {
        Self {
            inner: Rc::new(Inner {
                source,
                list: RefCell::new(ListPaginationController::new(page_size)),
                tasks: TaskSet::default(),
            }),
            trigger,
        }
    }

    /// Clear the list and fetch page 1 again.
    pub fn refresh(&self) {
        let ticket = self
            .inner
            .list
            .borrow_mut()
            .restart(FilterSnapshot::default());
        self.dispatch(ticket);
    }

    /// Fetch the next page. Returns `false` when a fetch is in flight or the list is
    /// exhausted.
    pub fn load_more(&self) -> bool {
        let ticket = self.inner.list.borrow_mut().load_more();
        match ticket {
            Ok(ticket) => {
                self.dispatch(ticket);
                true
            }
            Err(blocked) => {
                trace!(reason = %blocked, "paged_list.load_more: ignored");
                false
            }
        }
    }

    /// Fetch the next page if `sample` is near the bottom.
    pub fn on_scroll(&self, sample: ScrollSample) -> bool {
        let ticket = self.trigger.poll(sample, &mut self.inner.list.borrow_mut());
        match ticket {
            Some(ticket) => {
                self.dispatch(ticket);
                true
            }
            None => false,
        }
    }

    /// Wait for every outstanding fetch to resolve.
    pub async fn settle(&self) {
        self.inner.tasks.settle().await;
    }

    /// Current items and cursor.
    pub fn view(&self) -> ListView {
        ListView::of(&self.inner.list.borrow())
    }

    fn dispatch(&self, ticket: FetchTicket) {
        let inner = Rc::clone(&self.inner);
        self.inner.tasks.spawn(async move {
            let result = inner.source.fetch_page(&ticket.request).await;
            let outcome = inner.list.borrow_mut().resolve(&ticket, result);
            debug!(page = ticket.page(), ?outcome, "paged_list.resolve");
        });
    }
}
