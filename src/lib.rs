//! feedstate
//!
//! Client-side list state engine for a filtered content feed: filter and paging state
//! synchronized with the query string, incremental page fetches merged idempotently,
//! and facet refetches coordinated on every filter change.
//!
//! Pure Core / Impure Shell: `codec`, `url_state`, `merge` and `state` are
//! synchronous and free of I/O; `source`, `engine` and `chat` perform the requests.

pub mod chat;
pub mod codec;
pub mod config;
pub mod engine;
pub mod logging;
pub mod merge;
pub mod model;
pub mod notify;
pub mod source;
pub mod state;
pub mod url_state;
