//! Shared hierarchical store for the in-progress crawl.
//!
//! Maps canonical board keys to board entries, each holding the completed
//! threads inserted so far. This is the only state touched from multiple
//! logical flows; every mutation goes through [`ForumTree::insert`] or
//! [`ForumTree::register_board`], and the interior mutex makes each
//! check-then-insert a single atomic unit. The lock is never held across an
//! await.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::models::{
    Archive, ArchiveStats, BoardOutput, CrawlCounters, CrawledThread, DEFAULT_BOARD_NAME,
    ThreadOutput,
};
use crate::utils::url::canonicalize;

/// One board's accumulated state.
#[derive(Debug)]
struct BoardEntry {
    /// Display name; `None` until an index page names the board
    name: Option<String>,
    discovered_at: DateTime<Utc>,
    /// Completed threads in insertion order
    threads: Vec<CrawledThread>,
}

impl BoardEntry {
    fn new() -> Self {
        Self {
            name: None,
            discovered_at: Utc::now(),
            threads: Vec::new(),
        }
    }
}

/// The shared board → threads store.
#[derive(Debug)]
pub struct ForumTree {
    forum: String,
    boards: Mutex<HashMap<String, BoardEntry>>,
}

impl ForumTree {
    pub fn new(forum: impl Into<String>) -> Self {
        Self {
            forum: forum.into(),
            boards: Mutex::new(HashMap::new()),
        }
    }

    /// Register a board key, creating a provisional entry if it is new, and
    /// record its display name the first time a real one is observed. A name
    /// that is already set is never overwritten, so a late default can never
    /// downgrade it. Returns whether the entry was newly created.
    pub fn register_board(&self, board_key: &str, name: Option<&str>) -> bool {
        let mut boards = self.boards.lock().unwrap();
        let created = !boards.contains_key(board_key);
        let entry = boards
            .entry(board_key.to_string())
            .or_insert_with(BoardEntry::new);

        if let Some(name) = name {
            let name = name.trim();
            if !name.is_empty() && entry.name.is_none() {
                entry.name = Some(name.to_string());
            }
        }
        created
    }

    /// Insert a completed thread under a board, creating the board if it is
    /// not yet known (threads regularly finish before their board's own page
    /// has been fetched). Returns `false` and leaves the tree unchanged when
    /// a thread with the same canonical URL already exists under the board;
    /// the duplicate's data is discarded, not merged.
    pub fn insert(&self, board_key: &str, thread: CrawledThread) -> bool {
        let mut boards = self.boards.lock().unwrap();
        let entry = boards
            .entry(board_key.to_string())
            .or_insert_with(BoardEntry::new);

        let key = canonicalize(&thread.canonical_url);
        if entry
            .threads
            .iter()
            .any(|existing| canonicalize(&existing.canonical_url) == key)
        {
            log::debug!("Thread {key} already exists under {board_key}, skipping");
            return false;
        }

        entry.threads.push(thread);
        true
    }

    /// Materialize the archive document: boards sorted by name, threads in
    /// insertion order. Read-only, so it can be called at any point (an
    /// aborted run still yields a consistent partial archive) and repeated
    /// calls over unchanged state produce identical output for the same
    /// `generated_at`.
    ///
    /// The tree-derived totals are cross-checked against the coordinator's
    /// running counters; a mismatch points at a bookkeeping bug and is
    /// surfaced as a warning rather than silently reconciled.
    pub fn finalize(&self, counters: &CrawlCounters, generated_at: DateTime<Utc>) -> Archive {
        let boards = self.boards.lock().unwrap();

        let mut outputs: Vec<BoardOutput> = boards
            .iter()
            .map(|(url, entry)| BoardOutput {
                board_name: entry
                    .name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_BOARD_NAME.to_string()),
                board_url: url.clone(),
                discovered_at: entry.discovered_at,
                threads: entry.threads.iter().map(ThreadOutput::from).collect(),
            })
            .collect();
        outputs.sort_by(|a, b| {
            a.board_name
                .cmp(&b.board_name)
                .then_with(|| a.board_url.cmp(&b.board_url))
        });

        let thread_total: usize = outputs.iter().map(|b| b.threads.len()).sum();
        let comment_total: usize = outputs
            .iter()
            .flat_map(|b| b.threads.iter())
            .map(|t| t.comments.len())
            .sum();

        let stats = ArchiveStats {
            boards_discovered: counters.boards_discovered,
            threads_discovered: counters.threads_discovered,
            threads_completed: counters.threads_completed,
            comments_extracted: counters.comments_extracted,
            boards: outputs.len(),
            threads: thread_total,
            comments: comment_total,
        };

        if stats.boards != counters.boards_discovered
            || stats.threads != counters.threads_completed
            || stats.comments != counters.comments_extracted
        {
            log::warn!(
                "Stat mismatch: tree holds {}/{}/{} boards/threads/comments but counters say {}/{}/{}",
                stats.boards,
                stats.threads,
                stats.comments,
                counters.boards_discovered,
                counters.threads_completed,
                counters.comments_extracted
            );
        }

        Archive {
            forum: self.forum.clone(),
            crawled_at: generated_at,
            stats,
            boards: outputs,
        }
    }
}
