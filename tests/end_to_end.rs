//! End-to-end scenarios through the public engine API.
//!
//! A scripted in-memory feed stands in for the HTTP API. Time is paused, so request
//! latencies only decide completion order.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use feedstate::engine::{FeedEngine, PagedList};
use feedstate::model::{
    Facet, FacetQuery, FetchError, FilterChange, Item, PageRequest, PageResponse,
};
use feedstate::source::{FacetSource, PageSource};
use feedstate::state::{InfiniteScrollTrigger, ListPhase, ScrollSample};
use feedstate::url_state::UrlStateStore;
use serde_json::json;
use tokio::task::LocalSet;

/// Serves ids `1..=total` in order; the "Backend" category starts at 100.
#[derive(Clone)]
struct ScriptedFeed {
    total: u32,
    requests: Rc<RefCell<Vec<PageRequest>>>,
    latency_ms: Rc<RefCell<Vec<u64>>>,
}

impl ScriptedFeed {
    fn new(total: u32) -> Self {
        Self {
            total,
            requests: Rc::default(),
            latency_ms: Rc::default(),
        }
    }

    /// Latencies for the next requests, consumed in dispatch order.
    fn with_latencies(self, latencies: &[u64]) -> Self {
        *self.latency_ms.borrow_mut() = latencies.iter().rev().copied().collect();
        self
    }

    fn requested_pages(&self) -> Vec<u32> {
        self.requests.borrow().iter().map(|r| r.page).collect()
    }
}

#[async_trait(?Send)]
impl PageSource for ScriptedFeed {
    async fn fetch_page(&self, request: &PageRequest) -> Result<PageResponse, FetchError> {
        self.requests.borrow_mut().push(request.clone());
        let latency = self.latency_ms.borrow_mut().pop().unwrap_or(10);
        tokio::time::sleep(Duration::from_millis(latency)).await;

        let offset = if request.filters.category == "Backend" { 99 } else { 0 };
        let first = (request.page - 1) * request.page_size + 1;
        let last = (request.page * request.page_size).min(self.total);
        Ok(PageResponse {
            data: (first..=last)
                .map(|n| Item::new(json!({ "id": n + offset, "title": format!("Post {n}") })))
                .collect(),
            total: u64::from(self.total),
        })
    }
}

#[async_trait(?Send)]
impl FacetSource for ScriptedFeed {
    async fn fetch_facets(&self, _query: &FacetQuery) -> Result<Vec<Facet>, FetchError> {
        Ok(Vec::new())
    }
}

fn near_bottom() -> ScrollSample {
    ScrollSample {
        viewport_height: 900.0,
        scroll_y: 4000.0,
        document_height: 5000.0,
    }
}

fn ids(items: &[Item]) -> Vec<u64> {
    items
        .iter()
        .filter_map(|i| i.get("id").and_then(|v| v.as_u64()))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn scroll_through_seventeen_items() {
    LocalSet::new()
        .run_until(async {
            let feed = ScriptedFeed::new(17);
            let engine = FeedEngine::new(
                UrlStateStore::new(),
                feed.clone(),
                12,
                InfiniteScrollTrigger::default(),
            );

            engine.start();
            engine.settle().await;
            let first = engine.view();
            assert_eq!(ids(&first.items), (1..=12).collect::<Vec<u64>>());
            assert!(first.cursor.has_more);

            assert!(engine.on_scroll(near_bottom()));
            engine.settle().await;
            let second = engine.view();
            assert_eq!(ids(&second.items), (1..=17).collect::<Vec<u64>>());
            assert!(!second.cursor.has_more);
            assert_eq!(second.phase, ListPhase::Exhausted);

            for _ in 0..5 {
                assert!(!engine.on_scroll(near_bottom()));
            }
            engine.settle().await;
            assert_eq!(feed.requested_pages(), vec![1, 2]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn category_change_discards_in_flight_page() {
    LocalSet::new()
        .run_until(async {
            // Page 2 of the unfiltered feed is slow; Backend page 1 is fast.
            let feed = ScriptedFeed::new(40).with_latencies(&[10, 500, 10]);
            let engine = FeedEngine::new(
                UrlStateStore::new(),
                feed.clone(),
                12,
                InfiniteScrollTrigger::default(),
            );
            engine.start();
            engine.settle().await;
            assert!(engine.on_scroll(near_bottom()));

            let navigation = engine
                .change_filter(&FilterChange::Category("Backend".into()))
                .unwrap();
            assert_eq!(navigation.query, "category=Backend");

            let reset = engine.view();
            assert!(reset.items.is_empty(), "Collection cleared before page 1 returns");
            assert_eq!(reset.cursor.page_number, 1);

            engine.settle().await;

            let view = engine.view();
            assert_eq!(ids(&view.items), (100..=111).collect::<Vec<u64>>());
            assert_eq!(view.cursor.page_number, 1);
            assert_eq!(feed.requested_pages(), vec![1, 2, 1]);
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn reload_from_shared_link_restores_filters() {
    LocalSet::new()
        .run_until(async {
            let feed = ScriptedFeed::new(5);
            let engine = FeedEngine::new(
                UrlStateStore::from_query("?category=Backend&tags=ai,cloud"),
                feed.clone(),
                12,
                InfiniteScrollTrigger::default(),
            );

            engine.start();
            engine.settle().await;

            let requests = feed.requests.borrow();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].filters.category, "Backend");
            assert_eq!(requests[0].filters.tags, vec!["ai", "cloud"]);
            assert_eq!(engine.store().revision(), 0, "Loading never writes the URL");
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn bookmarks_load_on_explicit_request() {
    LocalSet::new()
        .run_until(async {
            let feed = ScriptedFeed::new(20);
            let bookmarks = PagedList::new(feed.clone(), 12, InfiniteScrollTrigger::default());

            bookmarks.refresh();
            bookmarks.settle().await;
            assert_eq!(bookmarks.view().items.len(), 12);

            assert!(bookmarks.load_more());
            assert!(!bookmarks.load_more(), "Second request while loading is ignored");
            bookmarks.settle().await;

            let view = bookmarks.view();
            assert_eq!(ids(&view.items), (1..=20).collect::<Vec<u64>>());
            assert!(view.is_exhausted());
            assert!(!bookmarks.load_more());
            assert_eq!(feed.requested_pages(), vec![1, 2]);
        })
        .await;
}
