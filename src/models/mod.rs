// src/models/mod.rs

//! Domain models for the archiver application.

mod archive;
mod config;
mod post;
mod thread;

// Re-export all public types
pub use archive::{
    Archive, ArchiveStats, BoardOutput, DEFAULT_BOARD_NAME, DEFAULT_THREAD_TITLE, ThreadOutput,
};
pub use config::{Config, CrawlerConfig, ForumConfig, PathsConfig};
pub use post::{DEFAULT_AUTHOR, ExtractedPost, Post};
pub use thread::CrawledThread;

/// Running progress counters for one crawl run.
///
/// Owned and mutated exclusively by the crawl coordinator; each increment is
/// tied to the outcome of the corresponding tree operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlCounters {
    /// Distinct boards seen, via index links or thread breadcrumbs.
    pub boards_discovered: usize,
    /// Distinct thread first pages seen (duplicates across crawl paths excluded).
    pub threads_discovered: usize,
    /// Threads actually inserted into the tree (duplicates excluded).
    pub threads_completed: usize,
    /// Post total across newly inserted threads only.
    pub comments_extracted: usize,
}
