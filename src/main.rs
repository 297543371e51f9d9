//! feedstate - Entry Point

use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use tokio::task::LocalSet;
use tracing::info;

use feedstate::config::ResolvedConfig;
use feedstate::engine::{FeedEngine, ListView, PagedList};
use feedstate::model::FilterChange;
use feedstate::source::{HttpBookmarkSource, HttpFeedSource};
use feedstate::state::InfiniteScrollTrigger;
use feedstate::url_state::UrlStateStore;

/// feedstate - page through a filtered content feed the way the web client does
#[derive(Parser, Debug)]
#[command(name = "feedstate")]
#[command(version)]
#[command(about = "Drive the feed list engine from the command line and print a JSON summary")]
pub struct Args {
    /// Initial query string (e.g. "category=Backend&tags=ai,cloud")
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// Select a category (empty string selects all)
    #[arg(long)]
    pub category: Option<String>,

    /// Select a blog id (empty string selects all)
    #[arg(long)]
    pub blog: Option<String>,

    /// Toggle a tag; repeat for several tags
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Drop all filters before applying the flags above
    #[arg(long)]
    pub clear: bool,

    /// Number of pages to load (must be positive)
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: u32,

    /// Page through bookmarks instead of the feed
    #[arg(long)]
    pub bookmarks: bool,

    /// Bearer token for authenticated endpoints
    #[arg(long, env = "FEEDSTATE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Print every item instead of only the summary
    #[arg(long)]
    pub items: bool,

    /// API base URL
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Items per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Filter events requested on the command line, in application order.
    pub fn filter_changes(&self) -> Vec<FilterChange> {
        let mut changes = Vec::new();
        if self.clear {
            changes.push(FilterChange::ClearAll);
        }
        if let Some(category) = &self.category {
            changes.push(FilterChange::Category(category.clone()));
        }
        if let Some(blog) = &self.blog {
            changes.push(FilterChange::Blog(blog.clone()));
        }
        changes.extend(self.tags.iter().cloned().map(FilterChange::ToggleTag));
        changes
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = feedstate::config::load_config_with_precedence(args.config.clone())?;
        let merged = feedstate::config::merge_config(config_file);
        let with_env = feedstate::config::apply_env_overrides(merged);
        feedstate::config::apply_cli_overrides(with_env, args.api_base_url.clone(), args.page_size)
    };

    feedstate::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = LocalSet::new();
    let summary = local.block_on(&runtime, async {
        if args.bookmarks {
            run_bookmarks(&args, &config).await
        } else {
            run_feed(&args, &config).await
        }
    })?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn run_feed(
    args: &Args,
    config: &ResolvedConfig,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let source = HttpFeedSource::new(&config.api_base_url, config.request_timeout())?;
    let store = UrlStateStore::from_query(&args.query);
    let engine = FeedEngine::new(
        store.clone(),
        source,
        config.page_size,
        InfiniteScrollTrigger::new(config.scroll_threshold_px),
    );

    for change in args.filter_changes() {
        engine.filters().apply(&change);
    }
    if let Some(navigation) = store.flush() {
        info!(query = %navigation.query, "Filters applied from command line");
    }

    engine.start();
    engine.settle().await;
    for _ in 1..args.pages {
        if !engine.load_more() {
            break;
        }
        engine.settle().await;
    }

    let facets = engine.facets();
    let mut summary = list_summary(&engine.view(), args.items);
    summary["query"] = json!(store.query_string());
    summary["filters"] = json!(engine.filters().snapshot());
    summary["facets"] = json!({
        "categories": facets.categories.items(),
        "blogs": facets.blogs.items(),
        "tags": facets.tags.items(),
    });
    Ok(summary)
}

async fn run_bookmarks(
    args: &Args,
    config: &ResolvedConfig,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let mut source = HttpBookmarkSource::new(&config.api_base_url, config.request_timeout())?;
    if let Some(token) = &args.token {
        source = source.with_bearer_token(token.clone());
    }
    let list = PagedList::new(
        source,
        config.page_size,
        InfiniteScrollTrigger::new(config.scroll_threshold_px),
    );

    list.refresh();
    list.settle().await;
    for _ in 1..args.pages {
        if !list.load_more() {
            break;
        }
        list.settle().await;
    }

    Ok(list_summary(&list.view(), args.items))
}

fn list_summary(view: &ListView, include_items: bool) -> serde_json::Value {
    let mut summary = json!({
        "loaded": view.items.len(),
        "total": view.total,
        "last_page": view.cursor.page_number,
        "has_more": view.cursor.has_more,
        "phase": format!("{:?}", view.phase),
    });
    if include_items {
        summary["items"] = json!(view.items);
    }
    summary
}
