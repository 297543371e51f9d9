//! Property-based tests for codec, merge and pagination invariants.
//!
//! Tests validate:
//! 1. Every codec satisfies parse(serialize(x)) == x
//! 2. Values survive a write/flush/read cycle through the query string
//! 3. Merging is idempotent and never yields duplicate ids
//! 4. Paging a finite collection fetches total / page_size + 1 pages and nothing more

use std::collections::HashSet;

use feedstate::codec::{Codec, ListCodec, NumberCodec, TextCodec, TriStateCodec};
use feedstate::merge::merge_unique_by_key;
use feedstate::model::{Item, PageResponse, QueryKey};
use feedstate::state::ListPaginationController;
use feedstate::url_state::UrlStateStore;
use proptest::prelude::*;
use serde_json::json;

fn tag_list() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z0-9 &=+%?#/-]{1,8}", 0..6)
}

fn items(ids: &[u8]) -> Vec<Item> {
    ids.iter().map(|id| Item::new(json!({ "id": id }))).collect()
}

// ===== Property 1: Codec round-trip law =====

proptest! {
    #[test]
    fn list_codec_round_trips(tags in prop::collection::vec("[a-z0-9-]{1,8}", 0..6)) {
        let serialized = ListCodec.serialize(&tags);
        prop_assert_eq!(ListCodec.parse(&serialized).unwrap(), tags);
    }

    #[test]
    fn number_codec_round_trips(n in any::<u32>()) {
        let codec = NumberCodec::<u32>::new();
        prop_assert_eq!(codec.parse(&codec.serialize(&n)).unwrap(), n);
    }

    #[test]
    fn text_codec_round_trips(s in any::<String>()) {
        prop_assert_eq!(TextCodec.parse(&TextCodec.serialize(&s)).unwrap(), s);
    }

    #[test]
    fn tri_state_round_trips_when_specified(b in any::<bool>()) {
        let value = Some(b);
        prop_assert_eq!(TriStateCodec.parse(&TriStateCodec.serialize(&value)).unwrap(), value);
    }
}

// ===== Property 2: Store round-trip =====

proptest! {
    #[test]
    fn tags_survive_query_string_encoding(tags in tag_list()) {
        let store = UrlStateStore::new();
        let binding = store.bind(QueryKey::new("tags").unwrap(), Vec::new(), ListCodec);

        binding.set(&tags);
        store.flush();

        let reloaded = UrlStateStore::from_query(&store.query_string());
        let rebound = reloaded.bind(QueryKey::new("tags").unwrap(), Vec::new(), ListCodec);
        let value = rebound.value();
        prop_assert_eq!(value.as_ref(), &tags);
    }

    #[test]
    fn default_value_is_always_elided(page in 1u32..1000) {
        let store = UrlStateStore::from_query(&format!("page={page}"));
        let binding = store.bind(QueryKey::new("page").unwrap(), 1u32, NumberCodec::new());

        binding.set(&1);
        store.flush();

        prop_assert!(!store.query_string().contains("page"));
    }
}

// ===== Property 3: Merge =====

proptest! {
    #[test]
    fn merge_is_idempotent(existing in prop::collection::vec(any::<u8>(), 0..20),
                           incoming in prop::collection::vec(any::<u8>(), 0..20)) {
        let once = merge_unique_by_key(items(&existing), items(&incoming), Item::id);
        let twice = merge_unique_by_key(once.clone(), items(&incoming), Item::id);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merge_never_duplicates(existing in prop::collection::vec(any::<u8>(), 0..20),
                              incoming in prop::collection::vec(any::<u8>(), 0..20)) {
        let merged = merge_unique_by_key(items(&existing), items(&incoming), Item::id);
        let unique: HashSet<_> = merged.iter().filter_map(Item::id).collect();
        prop_assert_eq!(unique.len(), merged.len());

        let expected: HashSet<u8> = existing.iter().chain(incoming.iter()).copied().collect();
        prop_assert_eq!(merged.len(), expected.len());
    }
}

// ===== Property 4: Paging a finite collection =====

proptest! {
    #[test]
    fn paging_stops_after_short_page(total in 0u32..60, page_size in 1u32..15) {
        let mut list = ListPaginationController::new(page_size);
        let mut requests = 0;

        while let Ok(ticket) = list.load_more() {
            requests += 1;
            let first = (ticket.page() - 1) * page_size;
            let last = (first + page_size).min(total);
            let data = (first..last).map(|n| Item::new(json!({ "id": n }))).collect();
            list.resolve(&ticket, Ok(PageResponse { data, total: u64::from(total) }));
            prop_assert!(requests <= total / page_size + 1, "Fetched past the last page");
        }

        prop_assert_eq!(requests, total / page_size + 1);
        prop_assert_eq!(list.items().len() as u32, total);
    }
}
