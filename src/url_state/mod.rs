//! Query-string backed state.
//!
//! Filter and pagination state lives in the address bar so that a reload or a shared
//! link restores the same view. Keys holding their default value are elided, which
//! keeps URLs canonical.

pub mod bindings;
pub mod query;
pub mod store;

pub use bindings::{AdminBindings, FilterBindings};
pub use query::QueryString;
pub use store::{Navigation, NavigationMode, StateBinding, UrlStateStore};
