//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod filters;
pub mod identifiers;
pub mod item;
pub mod page;

// Re-export for convenience
pub use error::{CodecError, FetchError};
pub use filters::{
    Facet, FacetDimension, FacetList, FacetQuery, FilterChange, FilterSnapshot, BLOG_KEY,
    CATEGORY_KEY, TAGS_KEY,
};
pub use identifiers::{InvalidItemId, InvalidQueryKey, ItemId, QueryKey};
pub use item::{Item, ID_FIELD};
pub use page::{FacetResponse, PageRequest, PageResponse, DEFAULT_PAGE_SIZE};
