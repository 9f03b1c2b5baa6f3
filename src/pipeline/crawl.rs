// src/pipeline/crawl.rs

//! Forum crawling pipeline.

use std::sync::Arc;

use chrono::Utc;

use crate::error::Result;
use crate::models::Config;
use crate::services::{CrawlCoordinator, HttpFetcher, PageParser};
use crate::storage::{ArchiveStorage, WriteSummary};

/// Crawl the configured forum end to end and persist the archive document.
pub async fn run_crawl(config: Arc<Config>, storage: &dyn ArchiveStorage) -> Result<WriteSummary> {
    let start_time = Utc::now();
    log::info!(
        "Archiving forum '{}' from {}",
        config.forum.id,
        config.forum.start_url
    );

    let fetcher = Arc::new(HttpFetcher::new(&config.crawler)?);
    let parser = Arc::new(PageParser::new()?);
    let mut coordinator = CrawlCoordinator::new(Arc::clone(&config), fetcher, parser);

    let archive = coordinator.run().await?;
    let counters = coordinator.counters();

    let elapsed = Utc::now().signed_duration_since(start_time);
    log::info!(
        "Crawl finished in {}s: {} boards, {}/{} threads, {} comments",
        elapsed.num_seconds(),
        counters.boards_discovered,
        counters.threads_completed,
        counters.threads_discovered,
        counters.comments_extracted
    );

    let summary = storage.write_archive(&archive).await?;
    log::info!("Archive saved to {}", summary.path.display());

    Ok(summary)
}
