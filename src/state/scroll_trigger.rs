//! Near-bottom detection for infinite scroll.
//!
//! Scroll samples arrive far more often than pages can load. The trigger only turns a
//! sample into a fetch when the viewport is within the threshold of the document end
//! and the list accepts another fetch.

use tracing::trace;

use super::pagination::{FetchBlocked, FetchTicket, ListPaginationController};

/// Default distance from the document end, in pixels, that triggers the next page.
pub const DEFAULT_SCROLL_THRESHOLD_PX: f64 = 200.0;

/// One observation of the scroll position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    /// Height of the visible viewport.
    pub viewport_height: f64,
    /// Distance scrolled from the top.
    pub scroll_y: f64,
    /// Total height of the document.
    pub document_height: f64,
}

/// Turns scroll samples into "load more" fetches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfiniteScrollTrigger {
    threshold_px: f64,
}

impl InfiniteScrollTrigger {
    /// Trigger firing within `threshold_px` of the document end.
    ///
    /// Negative or non-finite thresholds fall back to
    /// [`DEFAULT_SCROLL_THRESHOLD_PX`].
    pub fn new(threshold_px: f64) -> Self {
        let threshold_px = if threshold_px.is_finite() && threshold_px >= 0.0 {
            threshold_px
        } else {
            DEFAULT_SCROLL_THRESHOLD_PX
        };
        Self { threshold_px }
    }

    /// Configured threshold.
    pub fn threshold_px(&self) -> f64 {
        self.threshold_px
    }

    /// Whether the bottom of the viewport is within the threshold of the document end.
    pub fn near_bottom(&self, sample: ScrollSample) -> bool {
        sample.viewport_height + sample.scroll_y >= sample.document_height - self.threshold_px
    }

    /// Dispatch the next page if `sample` is near the bottom and the list can fetch.
    ///
    /// Samples taken while a fetch is in flight, or after the list is exhausted, are
    /// ignored.
    pub fn poll(
        &self,
        sample: ScrollSample,
        list: &mut ListPaginationController,
    ) -> Option<FetchTicket> {
        if !self.near_bottom(sample) {
            return None;
        }
        match list.load_more() {
            Ok(ticket) => Some(ticket),
            Err(FetchBlocked::InFlight) | Err(FetchBlocked::Exhausted) => {
                trace!(scroll_y = sample.scroll_y, "scroll.poll: near bottom, fetch blocked");
                None
            }
        }
    }
}

impl Default for InfiniteScrollTrigger {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_THRESHOLD_PX)
    }
}
