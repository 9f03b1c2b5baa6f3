//! Crawl orchestration.
//!
//! Drives discovery → accumulation → insertion for one run. Fetches for
//! different boards and threads progress concurrently under a bounded limit;
//! each thread's own pagination chain stays strictly sequential because the
//! continuation request is only issued after the previous page is parsed.
//! The coordinator owns the counters and the forum tree for the run's
//! lifetime and is the only code that mutates either.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{
    Archive, Config, CrawlCounters, CrawledThread, DEFAULT_BOARD_NAME, DEFAULT_THREAD_TITLE,
};
use crate::services::{Fetcher, ForumTree, PageParser, ThreadAccumulator};
use crate::utils::get_domain;
use crate::utils::url::canonicalize;

/// A finished thread chain, ready for insertion into the tree.
struct CompletedThread {
    board_key: String,
    thread: CrawledThread,
}

/// Orchestrates one crawl run.
pub struct CrawlCoordinator {
    config: Arc<Config>,
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<PageParser>,
    tree: ForumTree,
    counters: CrawlCounters,
    /// Host of the start URL; links elsewhere are ignored
    allowed_domain: Option<String>,
}

impl CrawlCoordinator {
    pub fn new(config: Arc<Config>, fetcher: Arc<dyn Fetcher>, parser: Arc<PageParser>) -> Self {
        let tree = ForumTree::new(&config.forum.id);
        let allowed_domain = get_domain(&config.forum.start_url);
        Self {
            config,
            fetcher,
            parser,
            tree,
            counters: CrawlCounters::default(),
            allowed_domain,
        }
    }

    /// Run discovery and accumulation to completion, then assemble the
    /// archive. Individual fetch and parse failures truncate or skip the
    /// affected chain; they never abort the run.
    pub async fn run(&mut self) -> Result<Archive> {
        let start_url = self.config.forum.start_url.clone();
        let root_key = canonicalize(&start_url);

        // Forum index: discover boards and their display names.
        let board_urls = self.discover_boards(&start_url).await;

        // Stage 1: walk each board's pagination chain for thread first pages.
        let thread_urls = self.collect_thread_links(board_urls).await;

        // Stage 2: crawl thread chains and insert completions as they land.
        self.crawl_threads(thread_urls, &root_key).await;

        Ok(self.finalize())
    }

    /// Assemble the archive from whatever has been accumulated so far.
    /// Callable even after an aborted run; the tree is always consistent.
    pub fn finalize(&self) -> Archive {
        self.tree.finalize(&self.counters, Utc::now())
    }

    pub fn counters(&self) -> CrawlCounters {
        self.counters
    }

    async fn discover_boards(&mut self, start_url: &str) -> Vec<String> {
        let page = match self.fetcher.fetch(start_url).await {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Failed to fetch forum index {start_url}: {e}");
                return Vec::new();
            }
        };

        let content = self.parser.extract(&page);
        let mut queue = Vec::new();
        for link in content.board_links {
            if !self.same_domain(&link.url) {
                continue;
            }
            let key = canonicalize(&link.url);
            if self.tree.register_board(&key, link.name.as_deref()) {
                self.counters.boards_discovered += 1;
                log::info!(
                    "Board discovered: '{}' (total: {})",
                    link.name.as_deref().unwrap_or(DEFAULT_BOARD_NAME),
                    self.counters.boards_discovered
                );
                queue.push(key);
            }
        }
        queue
    }

    /// Fetch board pages concurrently, following each board's own
    /// pagination, and collect thread first-page links deduplicated by
    /// canonical key. Each distinct key counts as one discovered thread.
    async fn collect_thread_links(&mut self, board_urls: Vec<String>) -> Vec<String> {
        let concurrency = self.config.crawler.max_concurrent.max(1);
        let delay = Duration::from_millis(self.config.crawler.request_delay_ms);

        let fetcher = Arc::clone(&self.fetcher);
        let parser = Arc::clone(&self.parser);
        let mut pages = stream::iter(board_urls)
            .map(move |url| {
                let fetcher = Arc::clone(&fetcher);
                let parser = Arc::clone(&parser);
                async move { walk_board_pages(fetcher, parser, url).await }
            })
            .buffer_unordered(concurrency);

        let mut seen = HashSet::new();
        let mut thread_urls = Vec::new();
        while let Some(links) = pages.next().await {
            for link in links {
                if !self.same_domain(&link) {
                    continue;
                }
                if seen.insert(canonicalize(&link)) {
                    self.counters.threads_discovered += 1;
                    thread_urls.push(link);
                }
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        thread_urls
    }

    /// Crawl thread chains with bounded concurrency and record completions
    /// as they arrive, in whatever order they finish.
    async fn crawl_threads(&mut self, thread_urls: Vec<String>, root_key: &str) {
        let concurrency = self.config.crawler.max_concurrent.max(1);
        let delay = Duration::from_millis(self.config.crawler.request_delay_ms);

        let fetcher = Arc::clone(&self.fetcher);
        let parser = Arc::clone(&self.parser);
        let root = root_key.to_string();
        let mut completions = stream::iter(thread_urls)
            .map(move |url| {
                let fetcher = Arc::clone(&fetcher);
                let parser = Arc::clone(&parser);
                let root = root.clone();
                async move { crawl_thread_chain(fetcher, parser, url, root).await }
            })
            .buffer_unordered(concurrency);

        while let Some(result) = completions.next().await {
            match result {
                Ok(completed) => self.record_completion(completed),
                Err(e) => log::warn!("Thread crawl failed: {e}"),
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Insert a completed thread and update counters atomically with the
    /// insert outcome: duplicates leave the completion counters untouched.
    fn record_completion(&mut self, completed: CompletedThread) {
        let CompletedThread { board_key, thread } = completed;

        // A board first reached through a breadcrumb is still a discovery.
        if self.tree.register_board(&board_key, None) {
            self.counters.boards_discovered += 1;
            log::debug!("Board {board_key} first seen via thread breadcrumb");
        }

        let title = thread
            .title
            .clone()
            .unwrap_or_else(|| DEFAULT_THREAD_TITLE.to_string());
        let comment_count = thread.posts.len();

        if self.tree.insert(&board_key, thread) {
            self.counters.threads_completed += 1;
            self.counters.comments_extracted += comment_count;
            log::info!(
                "Thread completed: '{}' with {} comments ({}/{} threads, {} comments total)",
                title,
                comment_count,
                self.counters.threads_completed,
                self.counters.threads_discovered,
                self.counters.comments_extracted
            );
        } else {
            log::debug!("Duplicate thread '{title}' under {board_key}, discarded");
        }
    }

    fn same_domain(&self, url: &str) -> bool {
        match (&self.allowed_domain, get_domain(url)) {
            (Some(allowed), Some(domain)) => *allowed == domain,
            _ => true,
        }
    }
}

/// Follow one board's pagination chain, collecting thread first-page links.
/// A fetch failure truncates the chain at the pages already walked.
async fn walk_board_pages(
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<PageParser>,
    first_page: String,
) -> Vec<String> {
    let mut links = Vec::new();
    let mut visited = HashSet::new();
    let mut next = Some(first_page);

    while let Some(url) = next {
        // Guard against pagination cycles. Keyed on the raw URL: successive
        // board pages share one canonical key, so canonicalizing here would
        // cut the walk off after the first continuation.
        if !visited.insert(url.clone()) {
            break;
        }
        let page = match fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Failed to fetch board page {url}: {e}");
                break;
            }
        };
        let content = parser.extract(&page);
        links.extend(content.thread_links);
        next = content.next_page;
    }
    links
}

/// Crawl one thread from its first page through its continuation chain.
///
/// Continuation pages are requested one at a time from each page's "next"
/// link, so posts always arrive in page order. A continuation fetch failure
/// ends the chain at the posts accumulated so far rather than losing them;
/// only a failure on the first page fails the whole thread.
async fn crawl_thread_chain(
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<PageParser>,
    first_page: String,
    root_board_key: String,
) -> Result<CompletedThread> {
    let page = fetcher
        .fetch(&first_page)
        .await
        .map_err(|e| AppError::crawl(&first_page, e))?;
    let content = parser.extract(&page);

    let board_key = content
        .breadcrumb_board
        .as_deref()
        .map(canonicalize)
        .unwrap_or(root_board_key);

    let mut accumulator = ThreadAccumulator::new(canonicalize(&page.url), content.title);
    if content.posts.is_empty() {
        log::warn!("No posts found on {}", page.url);
    }
    accumulator.append_page(content.posts);

    let mut visited = HashSet::from([accumulator.canonical_url().to_string()]);
    let mut next = content.next_page;
    while let Some(url) = next {
        if !visited.insert(url.clone()) {
            break;
        }
        let page = match fetcher.fetch(&url).await {
            Ok(page) => page,
            Err(e) => {
                log::warn!(
                    "Failed to fetch continuation {url}: {e}; keeping {} posts",
                    accumulator.post_count()
                );
                break;
            }
        };
        let content = parser.extract(&page);
        if content.posts.is_empty() {
            log::warn!("No posts found on {}", page.url);
        }
        let added = accumulator.append_page(content.posts);
        log::debug!(
            "Continuation page {}: +{added} comments (total: {})",
            page.url,
            accumulator.post_count()
        );
        next = content.next_page;
    }

    Ok(CompletedThread {
        board_key,
        thread: accumulator.complete(),
    })
}
