//! Feed state machines (pure).
//!
//! All transitions are synchronous and free of I/O. Fetches are described by tickets
//! and resolved by the caller, so every transition is testable without a runtime.

pub mod filter_coordinator;
pub mod pagination;
pub mod scroll_trigger;

pub use filter_coordinator::{
    CoordinatorPhase, FacetOutcome, FacetState, FacetTicket, FilterCoordinator, FilterPlan,
};
pub use pagination::{
    FetchBlocked, FetchGeneration, FetchTicket, ListPaginationController, ListPhase,
    PaginationCursor, ResolveOutcome,
};
pub use scroll_trigger::{InfiniteScrollTrigger, ScrollSample, DEFAULT_SCROLL_THRESHOLD_PX};
