//! Completed thread data.

use chrono::{DateTime, Utc};

use crate::models::Post;

/// A fully accumulated thread, frozen once inserted into the forum tree.
///
/// The title stays optional here so that "never observed" is distinguishable
/// from a legitimately empty string; the documented default is applied only
/// when materializing archive output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawledThread {
    /// Canonical URL, stable across all pagination pages of the thread
    pub canonical_url: String,
    pub title: Option<String>,
    /// Time of first discovery
    pub crawled_at: DateTime<Utc>,
    /// Posts in page order, indices contiguous from 0
    pub posts: Vec<Post>,
}
