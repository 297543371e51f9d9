//! Typed binding sets for the views that keep their state in the query string.

use std::rc::Rc;

use super::store::{StateBinding, UrlStateStore};
use crate::codec::{ListCodec, NumberCodec, TextCodec, TriStateCodec};
use crate::model::{FilterChange, FilterSnapshot, QueryKey, BLOG_KEY, CATEGORY_KEY, TAGS_KEY};

/// Query key for the admin posts page number.
pub const PAGE_KEY: &str = "page";
/// Query key for the admin users page number.
pub const USER_PAGE_KEY: &str = "userPage";
/// Query key for the admin blogs page number.
pub const BLOG_PAGE_KEY: &str = "blogPage";
/// Query key for the "summarized" admin filter.
pub const SUMMARIZED_KEY: &str = "summarized";
/// Query key for the "embedded" admin filter.
pub const EMBEDDED_KEY: &str = "embedded";

/// First page of every numbered pager.
pub const FIRST_PAGE: u32 = 1;

// ===== Feed filters =====

/// The feed's filter keys: `category`, `blog`, `tags`.
#[derive(Debug)]
pub struct FilterBindings {
    /// Selected category; empty for all.
    pub category: StateBinding<TextCodec>,
    /// Selected blog id; empty for all.
    pub blog: StateBinding<TextCodec>,
    /// Selected tags; empty for all.
    pub tags: StateBinding<ListCodec>,
}

impl FilterBindings {
    /// Bind the feed filter keys on `store`.
    pub fn new(store: &UrlStateStore) -> Self {
        Self {
            category: store.bind(QueryKey::from_static(CATEGORY_KEY), String::new(), TextCodec),
            blog: store.bind(QueryKey::from_static(BLOG_KEY), String::new(), TextCodec),
            tags: store.bind(QueryKey::from_static(TAGS_KEY), Vec::new(), ListCodec),
        }
    }

    /// Current values, pointer-stable while the raw strings are unchanged.
    pub fn values(&self) -> (Rc<String>, Rc<String>, Rc<Vec<String>>) {
        (self.category.value(), self.blog.value(), self.tags.value())
    }

    /// Current values as a snapshot.
    pub fn snapshot(&self) -> FilterSnapshot {
        let (category, blog, tags) = self.values();
        FilterSnapshot {
            category: category.as_ref().clone(),
            blog: blog.as_ref().clone(),
            tags: tags.as_ref().clone(),
        }
    }

    /// Values including writes not yet flushed.
    pub fn pending_snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            category: self.category.pending_value(),
            blog: self.blog.pending_value(),
            tags: self.tags.pending_value(),
        }
    }

    /// Write the result of `change` as pending updates. Nothing is committed until the
    /// store is flushed.
    ///
    /// The change composes on earlier writes of the same turn.
    pub fn apply(&self, change: &FilterChange) -> FilterSnapshot {
        let next = self.pending_snapshot().apply(change);
        self.category.set(&next.category);
        self.blog.set(&next.blog);
        self.tags.set(&next.tags);
        next
    }
}

// ===== Admin tabs =====

/// Keys of the admin tabs: three independent pagers plus the posts filters.
#[derive(Debug)]
pub struct AdminBindings {
    /// Posts tab page.
    pub page: StateBinding<NumberCodec<u32>>,
    /// Users tab page.
    pub user_page: StateBinding<NumberCodec<u32>>,
    /// Blogs tab page.
    pub blog_page: StateBinding<NumberCodec<u32>>,
    /// Posts filter: summary generated. Absent means either.
    pub summarized: StateBinding<TriStateCodec>,
    /// Posts filter: embedding generated. Absent means either.
    pub embedded: StateBinding<TriStateCodec>,
    /// Posts filter: source blog id.
    pub blog: StateBinding<TextCodec>,
}

impl AdminBindings {
    /// Bind the admin keys on `store`.
    pub fn new(store: &UrlStateStore) -> Self {
        let pager = |key| store.bind(QueryKey::from_static(key), FIRST_PAGE, NumberCodec::new());
        Self {
            page: pager(PAGE_KEY),
            user_page: pager(USER_PAGE_KEY),
            blog_page: pager(BLOG_PAGE_KEY),
            summarized: store.bind(QueryKey::from_static(SUMMARIZED_KEY), None, TriStateCodec),
            embedded: store.bind(QueryKey::from_static(EMBEDDED_KEY), None, TriStateCodec),
            blog: store.bind(QueryKey::from_static(BLOG_KEY), String::new(), TextCodec),
        }
    }

    /// Change the summarized filter and go back to the first posts page.
    pub fn filter_summarized(&self, value: Option<bool>) {
        self.summarized.set(&value);
        self.page.set(&FIRST_PAGE);
    }

    /// Change the embedded filter and go back to the first posts page.
    pub fn filter_embedded(&self, value: Option<bool>) {
        self.embedded.set(&value);
        self.page.set(&FIRST_PAGE);
    }

    /// Change the blog filter and go back to the first posts page.
    pub fn filter_blog(&self, blog_id: &str) {
        self.blog.set(&blog_id.to_string());
        self.page.set(&FIRST_PAGE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_snapshot_reads_committed_values() {
        let store = UrlStateStore::from_query("category=Backend&tags=ai,cloud");
        let filters = FilterBindings::new(&store);

        assert_eq!(
            filters.snapshot(),
            FilterSnapshot {
                category: "Backend".into(),
                blog: String::new(),
                tags: vec!["ai".into(), "cloud".into()],
            }
        );
    }

    #[test]
    fn toggling_last_tag_removes_key() {
        let store = UrlStateStore::from_query("tags=ai");
        let filters = FilterBindings::new(&store);

        filters.apply(&FilterChange::ToggleTag("ai".into()));
        store.flush();

        assert_eq!(store.query_string(), "");
    }

    #[test]
    fn clear_all_drops_every_filter_in_one_commit() {
        let store = UrlStateStore::from_query("category=Backend&blog=7&tags=ai&q=keep");
        let filters = FilterBindings::new(&store);

        filters.apply(&FilterChange::ClearAll);
        let nav = store.flush().unwrap();

        assert_eq!(nav.query, "q=keep");
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn changes_in_one_turn_compose() {
        let store = UrlStateStore::from_query("q=rust");
        let filters = FilterBindings::new(&store);

        filters.apply(&FilterChange::Category("Backend".into()));
        filters.apply(&FilterChange::ToggleTag("ai".into()));
        let next = filters.apply(&FilterChange::ToggleTag("cloud".into()));
        let nav = store.flush().unwrap();

        assert_eq!(nav.query, "q=rust&category=Backend&tags=ai%2Ccloud");
        assert_eq!(next.tags, vec!["ai", "cloud"]);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn pending_snapshot_sees_unflushed_writes() {
        let store = UrlStateStore::from_query("category=Backend");
        let filters = FilterBindings::new(&store);

        filters.apply(&FilterChange::Blog("7".into()));

        assert_eq!(filters.snapshot().blog, "");
        assert_eq!(filters.pending_snapshot().blog, "7");
        assert_eq!(filters.pending_snapshot().category, "Backend");
    }

    #[test]
    fn admin_filter_change_resets_page_atomically() {
        let store = UrlStateStore::from_query("page=4");
        let admin = AdminBindings::new(&store);

        admin.filter_summarized(Some(false));
        let nav = store.flush().unwrap();

        assert_eq!(nav.query, "summarized=false");
        assert_eq!(store.revision(), 1);
        assert_eq!(*admin.page.value(), 1);
        assert_eq!(*admin.summarized.value(), Some(false));
    }

    #[test]
    fn pagers_are_independent() {
        let store = UrlStateStore::from_query("userPage=3");
        let admin = AdminBindings::new(&store);

        admin.blog_page.set(&2);
        store.flush();

        assert_eq!(*admin.page.value(), 1);
        assert_eq!(*admin.user_page.value(), 3);
        assert_eq!(*admin.blog_page.value(), 2);
    }

    #[test]
    fn unparsable_tri_state_reads_as_unspecified() {
        let store = UrlStateStore::from_query("embedded=yes");
        let admin = AdminBindings::new(&store);
        assert_eq!(*admin.embedded.value(), None);
    }

    #[test]
    fn key_constants_are_valid() {
        for key in [
            PAGE_KEY,
            USER_PAGE_KEY,
            BLOG_PAGE_KEY,
            SUMMARIZED_KEY,
            EMBEDDED_KEY,
            CATEGORY_KEY,
            BLOG_KEY,
            TAGS_KEY,
        ] {
            assert!(QueryKey::new(key).is_ok());
        }
    }
}
