//! Finalized archive document.
//!
//! These structures define the JSON contract read by downstream consumers:
//!
//! ```text
//! {
//!   "forum": "223",
//!   "crawled_at": "...",
//!   "stats": { ... },
//!   "boards": [ { "board_name": ..., "threads": [ { "comments": [...] } ] } ]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CrawledThread, Post};

/// Board name recorded when no index page ever named the board.
pub const DEFAULT_BOARD_NAME: &str = "Unknown Board";

/// Thread title recorded when none could be extracted.
pub const DEFAULT_THREAD_TITLE: &str = "Untitled Thread";

/// Root archive document for one crawl run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Archive {
    pub forum: String,
    pub crawled_at: DateTime<Utc>,
    pub stats: ArchiveStats,
    /// Boards sorted by name
    pub boards: Vec<BoardOutput>,
}

/// Aggregate statistics: the coordinator's running counters alongside totals
/// derived from the tree itself.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchiveStats {
    pub boards_discovered: usize,
    pub threads_discovered: usize,
    pub threads_completed: usize,
    pub comments_extracted: usize,
    pub boards: usize,
    pub threads: usize,
    pub comments: usize,
}

/// One board in the archive output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoardOutput {
    pub board_name: String,
    /// Canonical board URL
    pub board_url: String,
    pub discovered_at: DateTime<Utc>,
    /// Threads in insertion order
    pub threads: Vec<ThreadOutput>,
}

/// One thread in the archive output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThreadOutput {
    pub thread_title: String,
    /// Canonical thread URL
    pub thread_url: String,
    pub crawled_at: DateTime<Utc>,
    /// Posts in page order
    pub comments: Vec<Post>,
}

impl From<&CrawledThread> for ThreadOutput {
    fn from(thread: &CrawledThread) -> Self {
        Self {
            thread_title: thread
                .title
                .clone()
                .unwrap_or_else(|| DEFAULT_THREAD_TITLE.to_string()),
            thread_url: thread.canonical_url.clone(),
            crawled_at: thread.crawled_at,
            comments: thread.posts.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_output_applies_title_default() {
        let thread = CrawledThread {
            canonical_url: "https://example.com/groups/223/topic-t5.html".to_string(),
            title: None,
            crawled_at: Utc::now(),
            posts: Vec::new(),
        };
        let output = ThreadOutput::from(&thread);
        assert_eq!(output.thread_title, DEFAULT_THREAD_TITLE);
        assert!(output.comments.is_empty());
    }

    #[test]
    fn test_post_json_keys() {
        let post = Post::from_extracted(0, crate::models::ExtractedPost::default());
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["post_index"], 0);
        assert_eq!(json["author"], "Anonymous");
        assert!(json["post_id"].is_null());
        assert!(json["content_html"].is_null());
        assert!(json["post_date"].is_null());
    }
}
