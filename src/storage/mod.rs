//! Storage abstractions for archive persistence.
//!
//! Each crawl run produces one immutable, timestamped archive document:
//!
//! ```text
//! archives/
//! ├── 223-archive-2026-08-29-14-03-11.json
//! └── 223-archive-2026-08-30-02-17-45.json
//! ```
//!
//! Documents are never rewritten; a rerun writes a new file.

pub mod local;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::Archive;

pub use local::LocalStorage;

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteSummary {
    /// Where the archive document landed
    pub path: PathBuf,
    /// Timestamp embedded in the document name
    pub timestamp: DateTime<Utc>,
}

/// Trait for archive storage backends.
#[async_trait]
pub trait ArchiveStorage: Send + Sync {
    /// Persist one archive document under a timestamped name.
    async fn write_archive(&self, archive: &Archive) -> Result<WriteSummary>;
}
