//! Feed filter dimensions and facet contexts.

use serde::{Deserialize, Deserializer, Serialize};

/// Query key for the selected category.
pub const CATEGORY_KEY: &str = "category";
/// Query key for the selected blog id.
pub const BLOG_KEY: &str = "blog";
/// Query key for the selected tag set.
pub const TAGS_KEY: &str = "tags";

/// The active feed filters, as read from the query string.
///
/// Empty strings and an empty tag list mean "no filter on this dimension".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FilterSnapshot {
    /// Selected category name, or empty for all categories.
    pub category: String,
    /// Selected blog id, or empty for all blogs.
    pub blog: String,
    /// Selected tags, in selection order.
    pub tags: Vec<String>,
}

impl FilterSnapshot {
    /// Build the context for a facet request on `dimension`.
    ///
    /// The queried dimension is always left out. Otherwise the selected
    /// value would filter its own option list down to itself.
    pub fn facet_query(&self, dimension: FacetDimension) -> FacetQuery {
        let category = non_empty(&self.category);
        let blog = non_empty(&self.blog);
        let tags = (!self.tags.is_empty()).then(|| self.tags.clone());

        match dimension {
            FacetDimension::Category => FacetQuery {
                dimension,
                category: None,
                blog,
                tags,
            },
            FacetDimension::Blog => FacetQuery {
                dimension,
                category,
                blog: None,
                tags,
            },
            FacetDimension::Tag => FacetQuery {
                dimension,
                category,
                blog,
                tags: None,
            },
        }
    }

    /// Apply a filter UI event, returning the resulting snapshot.
    pub fn apply(&self, change: &FilterChange) -> FilterSnapshot {
        let mut next = self.clone();
        match change {
            FilterChange::Category(category) => next.category = category.clone(),
            FilterChange::Blog(blog) => next.blog = blog.clone(),
            FilterChange::Tags(tags) => next.tags = tags.clone(),
            FilterChange::ToggleTag(tag) => {
                if let Some(pos) = next.tags.iter().position(|t| t == tag) {
                    next.tags.remove(pos);
                } else {
                    next.tags.push(tag.clone());
                }
            }
            FilterChange::ClearAll => next = FilterSnapshot::default(),
        }
        next
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

/// A filter UI event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    /// Select a category; empty selects all.
    Category(String),
    /// Select a blog; empty selects all.
    Blog(String),
    /// Replace the tag set; empty selects all.
    Tags(Vec<String>),
    /// Add the tag if absent, remove it if present.
    ToggleTag(String),
    /// Drop every filter.
    ClearAll,
}

/// A filterable dimension of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetDimension {
    /// Post category.
    Category,
    /// Source blog.
    Blog,
    /// Post tag.
    Tag,
}

impl FacetDimension {
    /// All dimensions, in the order facet requests are dispatched.
    pub const ALL: [FacetDimension; 3] = [
        FacetDimension::Category,
        FacetDimension::Blog,
        FacetDimension::Tag,
    ];

    /// Path segment of the facet endpoint for this dimension.
    pub fn endpoint(self) -> &'static str {
        match self {
            FacetDimension::Category => "categories",
            FacetDimension::Blog => "blogs",
            FacetDimension::Tag => "tags",
        }
    }
}

/// Context for one facet request: the other two active filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetQuery {
    /// Dimension whose options are being requested.
    pub dimension: FacetDimension,
    /// Category context, never set when `dimension` is `Category`.
    pub category: Option<String>,
    /// Blog context, never set when `dimension` is `Blog`.
    pub blog: Option<String>,
    /// Tag context, never set when `dimension` is `Tag`.
    pub tags: Option<Vec<String>>,
}

/// One selectable value of a facet with the number of matching items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    /// Machine id, when the facet value is not its display name (blogs).
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Matching item count.
    pub count: u64,
}

impl Facet {
    /// The value to store in the filter when this facet is selected.
    pub fn value(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Ordered facet values with zero-count entries removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetList(Vec<Facet>);

impl FacetList {
    /// Build from a raw response, dropping zero-count entries.
    pub fn from_response(items: Vec<Facet>) -> Self {
        Self(items.into_iter().filter(|f| f.count > 0).collect())
    }

    /// Facet values in server order.
    pub fn items(&self) -> &[Facet] {
        &self.0
    }

    /// Number of selectable values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there is nothing to select.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
