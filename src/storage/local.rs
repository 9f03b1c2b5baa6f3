//! Local filesystem storage implementation.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::Archive;
use crate::storage::{ArchiveStorage, WriteSummary};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    output_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage writing into the given directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Document name for one run: `{forum}-archive-{timestamp}.json`.
    fn archive_key(forum: &str, timestamp: DateTime<Utc>) -> String {
        format!(
            "{forum}-archive-{}.json",
            timestamp.format("%Y-%m-%d-%H-%M-%S")
        )
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(key);

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(path)
    }
}

#[async_trait]
impl ArchiveStorage for LocalStorage {
    async fn write_archive(&self, archive: &Archive) -> Result<WriteSummary> {
        let timestamp = archive.crawled_at;
        let key = Self::archive_key(&archive.forum, timestamp);
        let bytes = serde_json::to_vec_pretty(archive)?;

        let path = self.write_bytes(&key, &bytes).await?;
        log::info!(
            "Archive: {} boards, {} threads, {} comments written to {}",
            archive.stats.boards,
            archive.stats.threads,
            archive.stats.comments,
            path.display()
        );

        Ok(WriteSummary { path, timestamp })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArchiveStats, BoardOutput};
    use tempfile::TempDir;

    fn archive() -> Archive {
        Archive {
            forum: "223".to_string(),
            crawled_at: "2026-08-30T12:00:00Z".parse().unwrap(),
            stats: ArchiveStats {
                boards_discovered: 1,
                threads_discovered: 0,
                threads_completed: 0,
                comments_extracted: 0,
                boards: 1,
                threads: 0,
                comments: 0,
            },
            boards: vec![BoardOutput {
                board_name: "General".to_string(),
                board_url: "https://example.com/groups/223/general-f1/".to_string(),
                discovered_at: Utc::now(),
                threads: Vec::new(),
            }],
        }
    }

    #[tokio::test]
    async fn test_write_archive_creates_timestamped_document() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let summary = storage.write_archive(&archive()).await.unwrap();
        assert_eq!(
            summary.path,
            tmp.path().join("223-archive-2026-08-30-12-00-00.json")
        );
        assert!(summary.path.exists());

        let loaded: Archive =
            serde_json::from_slice(&tokio::fs::read(&summary.path).await.unwrap()).unwrap();
        assert_eq!(loaded.forum, "223");
        assert_eq!(loaded.boards.len(), 1);
        assert_eq!(loaded.boards[0].board_name, "General");
    }

    #[tokio::test]
    async fn test_write_archive_creates_missing_output_dir() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("nested").join("archives"));

        let summary = storage.write_archive(&archive()).await.unwrap();
        assert!(summary.path.exists());
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        storage.write_archive(&archive()).await.unwrap();

        let mut entries = tokio::fs::read_dir(tmp.path()).await.unwrap();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            assert_ne!(
                entry.path().extension().and_then(|e| e.to_str()),
                Some("tmp")
            );
        }
    }
}
