//! Filter change coordination.
//!
//! One named entry point per filter event replaces a web of listeners that re-trigger
//! each other. A change walks the machine `STABLE → RESETTING → FETCHING → STABLE`:
//!
//! 1. bump the fetch generation,
//! 2. reset the list cursor and clear the collection,
//! 3. dispatch page 1 with `reset_collection`,
//! 4. dispatch one facet request per dimension, each scoped by the *other* filters.
//!
//! Steps 1-3 complete synchronously, so every response belonging to an earlier
//! generation is already stale by the time it can resolve.

use tracing::{debug, trace, warn};

use super::pagination::{FetchGeneration, FetchTicket, ListPaginationController, ResolveOutcome};
use crate::model::{
    Facet, FacetDimension, FacetList, FacetQuery, FetchError, FilterSnapshot, PageResponse,
};

/// Coordinator phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CoordinatorPhase {
    /// No work outstanding for the current filters.
    #[default]
    Stable,
    /// The list is being reset for new filters.
    Resetting,
    /// Page 1 and facet requests are in flight.
    Fetching,
}

/// A dispatched facet request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetTicket {
    /// Generation captured at dispatch time.
    pub generation: FetchGeneration,
    /// Request context; never filtered by its own dimension.
    pub query: FacetQuery,
}

impl FacetTicket {
    /// Dimension this ticket fetches options for.
    pub fn dimension(&self) -> FacetDimension {
        self.query.dimension
    }
}

/// Everything a filter change dispatches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPlan {
    /// Generation all tickets were issued under.
    pub generation: FetchGeneration,
    /// Page-1 fetch with `reset_collection` set.
    pub page: FetchTicket,
    /// One facet request per dimension.
    pub facets: Vec<FacetTicket>,
}

/// Result of resolving a facet ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetOutcome {
    /// Options replaced with the non-zero entries of the response.
    Applied {
        /// Number of selectable options.
        options: usize,
    },
    /// The request failed; options degraded to an empty list.
    Degraded(FetchError),
    /// Superseded by a later filter change; nothing changed.
    Stale,
}

/// Current options for each filter dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetState {
    /// Category options.
    pub categories: FacetList,
    /// Blog options.
    pub blogs: FacetList,
    /// Tag options.
    pub tags: FacetList,
}

impl FacetState {
    /// Options for `dimension`.
    pub fn get(&self, dimension: FacetDimension) -> &FacetList {
        match dimension {
            FacetDimension::Category => &self.categories,
            FacetDimension::Blog => &self.blogs,
            FacetDimension::Tag => &self.tags,
        }
    }

    fn get_mut(&mut self, dimension: FacetDimension) -> &mut FacetList {
        match dimension {
            FacetDimension::Category => &mut self.categories,
            FacetDimension::Blog => &mut self.blogs,
            FacetDimension::Tag => &mut self.tags,
        }
    }
}

/// Resets the list and schedules facet refetches on every filter change.
#[derive(Debug, Clone, Default)]
pub struct FilterCoordinator {
    phase: CoordinatorPhase,
    generation: FetchGeneration,
    facets: FacetState,
    outstanding_facets: Vec<FacetDimension>,
    page_outstanding: bool,
}

impl FilterCoordinator {
    /// Coordinator with no filters applied yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> CoordinatorPhase {
        self.phase
    }

    /// Generation of the most recent filter change.
    pub fn generation(&self) -> FetchGeneration {
        self.generation
    }

    /// Current facet options.
    pub fn facets(&self) -> &FacetState {
        &self.facets
    }

    /// Handle a filter change (or the initial load).
    pub fn on_filters_changed(
        &mut self,
        filters: FilterSnapshot,
        list: &mut ListPaginationController,
    ) -> FilterPlan {
        self.phase = CoordinatorPhase::Resetting;

        let page = list.restart(filters);
        self.generation = page.generation;

        let facets: Vec<FacetTicket> = FacetDimension::ALL
            .iter()
            .map(|&dimension| FacetTicket {
                generation: page.generation,
                query: page.request.filters.facet_query(dimension),
            })
            .collect();

        self.outstanding_facets = facets.iter().map(FacetTicket::dimension).collect();
        self.page_outstanding = true;
        self.phase = CoordinatorPhase::Fetching;

        debug!(
            generation = self.generation.get(),
            "filters.changed: page 1 and facets dispatched"
        );

        FilterPlan {
            generation: self.generation,
            page,
            facets,
        }
    }

    /// Resolve a page ticket through the list, tracking the page-1 completion.
    pub fn resolve_page(
        &mut self,
        list: &mut ListPaginationController,
        ticket: &FetchTicket,
        result: Result<PageResponse, FetchError>,
    ) -> ResolveOutcome {
        let outcome = list.resolve(ticket, result);
        if ticket.reset_collection
            && ticket.generation == self.generation
            && outcome != ResolveOutcome::Stale
        {
            self.page_outstanding = false;
            self.settle_if_done();
        }
        outcome
    }

    /// Resolve a facet ticket.
    ///
    /// Zero-count entries are dropped; failures degrade to an empty option list.
    pub fn resolve_facet(
        &mut self,
        ticket: &FacetTicket,
        result: Result<Vec<Facet>, FetchError>,
    ) -> FacetOutcome {
        if ticket.generation != self.generation {
            trace!(
                dimension = ?ticket.dimension(),
                ticket_generation = ticket.generation.get(),
                current_generation = self.generation.get(),
                "filters.facet: stale response discarded"
            );
            return FacetOutcome::Stale;
        }

        let dimension = ticket.dimension();
        let outcome = match result {
            Ok(items) => {
                let list = FacetList::from_response(items);
                let options = list.len();
                *self.facets.get_mut(dimension) = list;
                FacetOutcome::Applied { options }
            }
            Err(err) => {
                warn!(dimension = ?dimension, error = %err, "filters.facet: fetch failed");
                *self.facets.get_mut(dimension) = FacetList::default();
                FacetOutcome::Degraded(err)
            }
        };

        self.outstanding_facets.retain(|d| *d != dimension);
        self.settle_if_done();
        outcome
    }

    fn settle_if_done(&mut self) {
        if !self.page_outstanding && self.outstanding_facets.is_empty() {
            self.phase = CoordinatorPhase::Stable;
            debug!(generation = self.generation.get(), "filters.stable");
        }
    }
}

#[cfg(test)]
#[path = "filter_coordinator_tests.rs"]
mod tests;
