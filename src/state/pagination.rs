//! Incremental list pagination state machine (pure).
//!
//! The controller never performs I/O. [`ListPaginationController::begin_fetch`] hands out
//! a [`FetchTicket`] describing the request to issue; the caller runs it against a data
//! source and feeds the result back through [`ListPaginationController::resolve`]. The
//! ticket carries the [`FetchGeneration`] captured at dispatch time, which is how late
//! responses from superseded filter states are recognized and dropped.
//!
//! # Phases
//!
//! ```text
//! RESETTING ──┐
//!             ▼
//! IDLE ──▶ LOADING ──▶ APPENDED ──┐
//!   ▲         │──────▶ FAILED  ───┤──▶ (idle: next fetch allowed)
//!   │         └──────▶ EXHAUSTED     (no fetch until reset)
//!   └───────────────────────────────┘
//! ```

use tracing::{debug, info, trace, warn};

use crate::merge::merge_unique_by_key;
use crate::model::{FetchError, FilterSnapshot, Item, PageRequest, PageResponse};

// ===== FetchGeneration =====

/// Monotonic token identifying one filter state.
///
/// Bumped on every filter-driven reset; a response whose ticket carries an older
/// generation is stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchGeneration(u64);

impl FetchGeneration {
    /// The generation after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw counter value (for logging).
    pub fn get(self) -> u64 {
        self.0
    }
}

// ===== PaginationCursor =====

/// Position and availability of the next page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCursor {
    /// Last page merged in this generation, or 1 right after a reset.
    pub page_number: u32,
    /// False once a short page was seen; blocks further fetches until reset.
    pub has_more: bool,
    /// True while a page fetch is in flight; blocks a second fetch.
    pub is_loading: bool,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self {
            page_number: 1,
            has_more: true,
            is_loading: false,
        }
    }
}

// ===== ListPhase =====

/// Lifecycle phase of one list instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListPhase {
    /// Nothing dispatched yet.
    #[default]
    Idle,
    /// A filter change cleared the list; page 1 not yet dispatched.
    Resetting,
    /// A page fetch is in flight.
    Loading,
    /// The last fetch merged a full page; more may follow.
    Appended,
    /// The last fetch returned a short page; nothing follows.
    Exhausted,
    /// The last fetch failed; the same page may be retried.
    Failed,
}

// ===== Tickets and outcomes =====

/// A dispatched page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    /// Generation captured at dispatch time.
    pub generation: FetchGeneration,
    /// Clear the collection before merging this page.
    pub reset_collection: bool,
    /// Request to send to the data source.
    pub request: PageRequest,
}

impl FetchTicket {
    /// Requested page number.
    pub fn page(&self) -> u32 {
        self.request.page
    }
}

/// Why a fetch was not dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FetchBlocked {
    /// Another page fetch is in flight.
    #[error("A page fetch is already in flight")]
    InFlight,
    /// A short page ended the list for this generation.
    #[error("No more pages for the current filters")]
    Exhausted,
}

/// What happened when a response was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// A full page was merged.
    Appended {
        /// Items that were not already in the collection.
        added: usize,
    },
    /// A short page was merged; the list is exhausted.
    Exhausted {
        /// Items that were not already in the collection.
        added: usize,
    },
    /// The fetch failed; items and `has_more` are unchanged.
    Failed(FetchError),
    /// The ticket belongs to a superseded generation; nothing changed.
    Stale,
}

// ===== ListPaginationController =====

/// Drives sequential page fetches and owns the merged item collection.
#[derive(Debug, Clone)]
pub struct ListPaginationController {
    page_size: u32,
    filters: FilterSnapshot,
    generation: FetchGeneration,
    cursor: PaginationCursor,
    phase: ListPhase,
    items: Vec<Item>,
    total: Option<u64>,
    loaded_in_generation: bool,
}

impl ListPaginationController {
    /// New, empty controller. A `page_size` of 0 is clamped to 1.
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            filters: FilterSnapshot::default(),
            generation: FetchGeneration::default(),
            cursor: PaginationCursor::default(),
            phase: ListPhase::Idle,
            items: Vec::new(),
            total: None,
            loaded_in_generation: false,
        }
    }

    /// Requested items per page.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Filters every fetch of the current generation is sent with.
    pub fn filters(&self) -> &FilterSnapshot {
        &self.filters
    }

    /// Current generation.
    pub fn generation(&self) -> FetchGeneration {
        self.generation
    }

    /// Current cursor.
    pub fn cursor(&self) -> PaginationCursor {
        self.cursor
    }

    /// Current phase.
    pub fn phase(&self) -> ListPhase {
        self.phase
    }

    /// Merged items, unique by id, in insertion order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Server-reported total from the latest merged page.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Page the next non-reset fetch should request.
    ///
    /// Follows the last merged page. If nothing has merged in this generation yet (the
    /// first page failed), the first page is retried instead of being skipped.
    pub fn next_page(&self) -> u32 {
        if self.loaded_in_generation {
            self.cursor.page_number.saturating_add(1)
        } else {
            self.cursor.page_number
        }
    }

    /// Whether a non-reset fetch would be accepted right now.
    pub fn can_fetch(&self) -> bool {
        !self.cursor.is_loading && self.cursor.has_more
    }

    /// Start a new generation for `filters`: clear items, rewind the cursor.
    ///
    /// Any fetch still in flight becomes stale.
    pub fn reset(&mut self, filters: FilterSnapshot) -> FetchGeneration {
        self.generation = self.generation.next();
        self.filters = filters;
        self.cursor = PaginationCursor::default();
        self.items.clear();
        self.total = None;
        self.loaded_in_generation = false;
        self.phase = ListPhase::Resetting;
        debug!(
            generation = self.generation.get(),
            "pagination.reset: collection cleared"
        );
        self.generation
    }

    /// Reset for `filters` and dispatch page 1 in one step.
    ///
    /// Cannot be blocked: the reset clears both the loading and exhausted guards.
    pub fn restart(&mut self, filters: FilterSnapshot) -> FetchTicket {
        self.reset(filters);
        self.dispatch(1, true)
    }

    /// Dispatch a fetch for `page`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchBlocked::InFlight`] while another fetch is loading and
    /// [`FetchBlocked::Exhausted`] once a short page ended the list.
    pub fn begin_fetch(
        &mut self,
        page: u32,
        reset_collection: bool,
    ) -> Result<FetchTicket, FetchBlocked> {
        if self.cursor.is_loading {
            trace!(page, "pagination.begin_fetch: ignored (in flight)");
            return Err(FetchBlocked::InFlight);
        }
        if !self.cursor.has_more {
            trace!(page, "pagination.begin_fetch: ignored (exhausted)");
            return Err(FetchBlocked::Exhausted);
        }
        Ok(self.dispatch(page, reset_collection))
    }

    /// Dispatch the follow-up page ("load more").
    ///
    /// # Errors
    ///
    /// Same as [`begin_fetch`](Self::begin_fetch).
    pub fn load_more(&mut self) -> Result<FetchTicket, FetchBlocked> {
        self.begin_fetch(self.next_page(), false)
    }

    fn dispatch(&mut self, page: u32, reset_collection: bool) -> FetchTicket {
        self.cursor.is_loading = true;
        self.phase = ListPhase::Loading;
        debug!(
            page,
            reset_collection,
            generation = self.generation.get(),
            "pagination.dispatch"
        );
        FetchTicket {
            generation: self.generation,
            reset_collection,
            request: PageRequest {
                page: page.max(1),
                page_size: self.page_size,
                filters: self.filters.clone(),
            },
        }
    }

    /// Feed a response back.
    ///
    /// Stale tickets are discarded without touching any state.
    pub fn resolve(
        &mut self,
        ticket: &FetchTicket,
        result: Result<PageResponse, FetchError>,
    ) -> ResolveOutcome {
        if ticket.generation != self.generation {
            trace!(
                ticket_generation = ticket.generation.get(),
                current_generation = self.generation.get(),
                page = ticket.page(),
                "pagination.resolve: stale response discarded"
            );
            return ResolveOutcome::Stale;
        }

        self.cursor.is_loading = false;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(page = ticket.page(), error = %err, "pagination.resolve: fetch failed");
                self.phase = ListPhase::Failed;
                return ResolveOutcome::Failed(err);
            }
        };

        let exhausted = response.is_last_page(self.page_size);
        let existing = if ticket.reset_collection {
            Vec::new()
        } else {
            std::mem::take(&mut self.items)
        };
        let before = existing.len();
        self.items = merge_unique_by_key(existing, response.data, Item::id);
        let added = self.items.len().saturating_sub(before);

        self.total = Some(response.total);
        self.cursor.page_number = ticket.page();
        self.loaded_in_generation = true;

        info!(
            page = ticket.page(),
            added,
            len = self.items.len(),
            exhausted,
            "pagination.resolve: page merged"
        );

        if exhausted {
            self.cursor.has_more = false;
            self.phase = ListPhase::Exhausted;
            ResolveOutcome::Exhausted { added }
        } else {
            self.phase = ListPhase::Appended;
            ResolveOutcome::Appended { added }
        }
    }
}

impl Default for ListPaginationController {
    fn default() -> Self {
        Self::new(crate::model::DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
