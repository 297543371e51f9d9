//! The filtered feed: query-string filters, facets, and an infinite-scroll list.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, trace};

use super::tasks::TaskSet;
use super::ListView;
use crate::model::{FilterChange, FilterSnapshot};
use crate::source::{FacetSource, PageSource};
use crate::state::{
    CoordinatorPhase, FacetState, FacetTicket, FetchGeneration, FetchTicket, FilterCoordinator,
    InfiniteScrollTrigger, ListPaginationController, ScrollSample,
};
use crate::url_state::{FilterBindings, Navigation, UrlStateStore};

/// Filter values as last synced, compared by pointer.
type SyncedFilters = (Rc<String>, Rc<String>, Rc<Vec<String>>);

struct Inner<S> {
    source: S,
    list: RefCell<ListPaginationController>,
    coordinator: RefCell<FilterCoordinator>,
    tasks: TaskSet,
}

/// Drives the feed from the query string.
///
/// Filter state is read from the store's committed query. Whenever the bound filter
/// values change identity, the coordinator resets the list and the engine dispatches
/// page 1 and the three facet requests. Every completion re-enters through the
/// coordinator, so responses from superseded filters are discarded there.
///
/// Methods that dispatch fetches must be called inside a `LocalSet`.
pub struct FeedEngine<S> {
    store: UrlStateStore,
    filters: FilterBindings,
    trigger: InfiniteScrollTrigger,
    inner: Rc<Inner<S>>,
    synced: RefCell<Option<SyncedFilters>>,
}

impl<S> FeedEngine<S>
where
    S: PageSource + FacetSource + 'static,
{
    /// Engine over `store` fetching from `source`.
    ///
    /// Nothing is fetched until [`start`](Self::start).
    pub fn new(
        store: UrlStateStore,
        source: S,
        page_size: u32,
        trigger: InfiniteScrollTrigger,
    ) -> Self {
        let filters = FilterBindings::new(&store);
        Self {
            store,
            filters,
            trigger,
            inner: Rc::new(Inner {
                source,
                list: RefCell::new(ListPaginationController::new(page_size)),
                coordinator: RefCell::new(FilterCoordinator::new()),
                tasks: TaskSet::default(),
            }),
            synced: RefCell::new(None),
        }
    }

    /// The backing store.
    pub fn store(&self) -> &UrlStateStore {
        &self.store
    }

    /// The filter bindings.
    pub fn filters(&self) -> &FilterBindings {
        &self.filters
    }

    /// Initial load for the filters currently in the query string.
    pub fn start(&self) -> Option<FetchGeneration> {
        self.sync_from_url()
    }

    /// Apply a filter UI event: write, commit once, then resync.
    ///
    /// Returns the commit, or `None` when the event changed nothing.
    pub fn change_filter(&self, change: &FilterChange) -> Option<Navigation> {
        self.filters.apply(change);
        let navigation = self.store.flush();
        self.sync_from_url();
        navigation
    }

    /// Apply an external navigation (address bar edit, back/forward).
    pub fn navigate(&self, raw_query: &str) -> Option<FetchGeneration> {
        self.store.navigate(raw_query);
        self.sync_from_url()
    }

    /// Reset and refetch if the bound filter values changed since the last sync.
    ///
    /// Values are compared by identity. Commits that leave the filter keys untouched
    /// keep the same `Rc`s and trigger nothing.
    pub fn sync_from_url(&self) -> Option<FetchGeneration> {
        let current = self.filters.values();
        if let Some((category, blog, tags)) = &*self.synced.borrow() {
            if Rc::ptr_eq(category, &current.0)
                && Rc::ptr_eq(blog, &current.1)
                && Rc::ptr_eq(tags, &current.2)
            {
                trace!("engine.sync: filters unchanged");
                return None;
            }
        }

        let snapshot = FilterSnapshot {
            category: current.0.as_ref().clone(),
            blog: current.1.as_ref().clone(),
            tags: current.2.as_ref().clone(),
        };
        *self.synced.borrow_mut() = Some(current);

        let plan = {
            let mut list = self.inner.list.borrow_mut();
            self.inner
                .coordinator
                .borrow_mut()
                .on_filters_changed(snapshot, &mut list)
        };
        info!(
            generation = plan.generation.get(),
            query = %self.store.query_string(),
            "engine.sync: filters changed"
        );

        self.dispatch_page(plan.page);
        for ticket in plan.facets {
            self.dispatch_facet(ticket);
        }
        Some(plan.generation)
    }

    /// Fetch the next page if `sample` is near the bottom.
    pub fn on_scroll(&self, sample: ScrollSample) -> bool {
        let ticket = self.trigger.poll(sample, &mut self.inner.list.borrow_mut());
        match ticket {
            Some(ticket) => {
                self.dispatch_page(ticket);
                true
            }
            None => false,
        }
    }

    /// Fetch the next page regardless of scroll position.
    pub fn load_more(&self) -> bool {
        let ticket = self.inner.list.borrow_mut().load_more();
        match ticket {
            Ok(ticket) => {
                self.dispatch_page(ticket);
                true
            }
            Err(blocked) => {
                trace!(reason = %blocked, "engine.load_more: ignored");
                false
            }
        }
    }

    /// Wait for every outstanding page and facet fetch to resolve.
    pub async fn settle(&self) {
        self.inner.tasks.settle().await;
    }

    /// Fetches that have not resolved yet.
    pub fn in_flight(&self) -> usize {
        self.inner.tasks.in_flight()
    }

    /// Current items and cursor.
    pub fn view(&self) -> ListView {
        ListView::of(&self.inner.list.borrow())
    }

    /// Current facet options.
    pub fn facets(&self) -> FacetState {
        self.inner.coordinator.borrow().facets().clone()
    }

    /// Coordinator phase.
    pub fn phase(&self) -> CoordinatorPhase {
        self.inner.coordinator.borrow().phase()
    }

    fn dispatch_page(&self, ticket: FetchTicket) {
        let inner = Rc::clone(&self.inner);
        self.inner.tasks.spawn(async move {
            let result = inner.source.fetch_page(&ticket.request).await;
            let mut list = inner.list.borrow_mut();
            let outcome = inner
                .coordinator
                .borrow_mut()
                .resolve_page(&mut list, &ticket, result);
            debug!(page = ticket.page(), ?outcome, "engine.page: resolved");
        });
    }

    fn dispatch_facet(&self, ticket: FacetTicket) {
        let inner = Rc::clone(&self.inner);
        self.inner.tasks.spawn(async move {
            let result = inner.source.fetch_facets(&ticket.query).await;
            let outcome = inner.coordinator.borrow_mut().resolve_facet(&ticket, result);
            debug!(dimension = ?ticket.dimension(), ?outcome, "engine.facet: resolved");
        });
    }
}

#[cfg(test)]
#[path = "feed_tests.rs"]
mod tests;
