//! Per-thread accumulation state.
//!
//! One accumulator exists per in-flight thread chain and is owned by that
//! chain alone. Pages are appended in crawl-follow order; the continuation
//! request for page N+1 is only issued after page N is parsed, so appends
//! never race. Completion consumes the accumulator, which makes the
//! OPEN → COMPLETE transition one-way: a completed thread cannot be
//! re-entered or appended to.

use chrono::{DateTime, Utc};

use crate::models::{CrawledThread, ExtractedPost, Post};

/// In-progress state of a single thread across its pagination pages.
#[derive(Debug)]
pub struct ThreadAccumulator {
    canonical_url: String,
    title: Option<String>,
    crawled_at: DateTime<Utc>,
    posts: Vec<Post>,
}

impl ThreadAccumulator {
    /// Start accumulating a thread seen for the first time.
    pub fn new(canonical_url: impl Into<String>, title: Option<String>) -> Self {
        Self {
            canonical_url: canonical_url.into(),
            title,
            crawled_at: Utc::now(),
            posts: Vec::new(),
        }
    }

    /// Append one page's worth of posts, assigning indices that continue
    /// from the current post count. Indices are never renumbered afterwards.
    /// Returns the number of posts appended.
    pub fn append_page(&mut self, batch: Vec<ExtractedPost>) -> usize {
        let start = self.posts.len();
        for (offset, raw) in batch.into_iter().enumerate() {
            self.posts.push(Post::from_extracted(start + offset, raw));
        }
        self.posts.len() - start
    }

    pub fn canonical_url(&self) -> &str {
        &self.canonical_url
    }

    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    /// Finish accumulation and hand the thread off for insertion.
    pub fn complete(self) -> CrawledThread {
        CrawledThread {
            canonical_url: self.canonical_url,
            title: self.title,
            crawled_at: self.crawled_at,
            posts: self.posts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(text: &str) -> ExtractedPost {
        ExtractedPost {
            text: text.to_string(),
            ..ExtractedPost::default()
        }
    }

    #[test]
    fn test_indices_continue_across_pages() {
        let mut acc = ThreadAccumulator::new(
            "https://example.com/groups/223/topic-t5.html",
            Some("Topic".to_string()),
        );
        assert_eq!(acc.append_page(vec![post("a"), post("b")]), 2);
        assert_eq!(acc.append_page(vec![post("c"), post("d")]), 2);

        let thread = acc.complete();
        let contents: Vec<_> = thread.posts.iter().map(|p| p.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b", "c", "d"]);
        let indices: Vec<_> = thread.posts.iter().map(|p| p.post_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_empty_page_is_accepted() {
        let mut acc = ThreadAccumulator::new("https://example.com/groups/223/empty-t9.html", None);
        assert_eq!(acc.append_page(Vec::new()), 0);

        let thread = acc.complete();
        assert!(thread.posts.is_empty());
        assert_eq!(thread.title, None);
    }
}
