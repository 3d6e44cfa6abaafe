//! The article manifest (`articles.json`).
//!
//! The manifest is the single source of truth for the index page: a JSON
//! array of `{title, url, date}` ordered by date, newest first. Every append
//! rewrites the whole file.
//!
//! # Ordering
//!
//! Records are sorted by `date` descending with a stable sort after the new
//! record is pushed to the end. A record published on a day that already has
//! entries therefore lands after them.
//!
//! # Locking
//!
//! The read-modify-write cycle runs while holding `<manifest>.lock`, created
//! with exclusive-create semantics. A second publisher fails fast instead of
//! losing an update. The lock file is removed when the guard drops; a lock
//! left behind by a crashed process must be deleted by hand.

use crate::fs::write_atomic;
use chrono::{DateTime, Utc};
use inkpipe_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the manifest inside the publish root.
pub const MANIFEST_FILE: &str = "articles.json";

/// One published article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    /// File name relative to the publish root
    pub url: String,
    /// `YYYY-MM-DD`
    pub date: String,
}

impl ArticleRecord {
    pub fn new(title: impl Into<String>, url: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            date: date.into(),
        }
    }
}

/// Reads and appends to a manifest file.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Manifest stored as `articles.json` in a publish root.
    pub fn in_dir(root: &Path) -> Self {
        Self::new(root.join(MANIFEST_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the manifest; a missing or blank file is an empty manifest.
    pub fn load(&self) -> AppResult<Vec<ArticleRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            AppError::Serialization(format!(
                "Failed to parse manifest {:?}: {}",
                self.path, e
            ))
        })
    }

    /// Append one record, re-sort, and rewrite the manifest.
    pub fn append(&self, record: ArticleRecord) -> AppResult<()> {
        let _lock = ManifestLock::acquire(&self.path)?;

        let mut records = self.load()?;
        tracing::debug!(
            "Appending '{}' ({}) to manifest with {} record(s)",
            record.title,
            record.date,
            records.len()
        );
        records.push(record);
        sort_newest_first(&mut records);

        self.write(&records)
    }

    /// Replace the manifest content.
    fn write(&self, records: &[ArticleRecord]) -> AppResult<()> {
        let mut json = serde_json::to_string_pretty(records)?;
        json.push('\n');
        write_atomic(&self.path, json.as_bytes())
    }
}

/// Stable sort by date, newest first.
pub fn sort_newest_first(records: &mut [ArticleRecord]) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
}

#[derive(Debug, Serialize, Deserialize)]
struct LockMetadata {
    pid: u32,
    created_at: DateTime<Utc>,
}

/// Exclusive lock on a manifest, released on drop.
#[derive(Debug)]
pub struct ManifestLock {
    path: PathBuf,
}

impl ManifestLock {
    /// Lock the manifest at `manifest_path` by creating `<manifest>.lock`.
    pub fn acquire(manifest_path: &Path) -> AppResult<Self> {
        let path = lock_path(manifest_path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(AppError::Publish(format!(
                    "Manifest is locked by another publisher ({}). Remove the lock file if no publish is running.",
                    path.display()
                )));
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        let metadata = LockMetadata {
            pid: std::process::id(),
            created_at: Utc::now(),
        };
        // The lock is held by the file's existence; metadata is informational.
        if let Err(e) = serde_json::to_vec(&metadata)
            .map_err(std::io::Error::other)
            .and_then(|bytes| file.write_all(&bytes))
        {
            tracing::warn!("Failed to write lock metadata to {:?}: {}", path, e);
        }

        tracing::debug!("Acquired manifest lock {:?}", path);
        Ok(Self { path })
    }
}

impl Drop for ManifestLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Failed to release manifest lock {:?}: {}", self.path, e);
        }
    }
}

fn lock_path(manifest_path: &Path) -> PathBuf {
    let mut name = manifest_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| MANIFEST_FILE.into());
    name.push(".lock");
    manifest_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> ManifestStore {
        ManifestStore::in_dir(temp.path())
    }

    #[test]
    fn test_missing_manifest_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(store(&temp).load().unwrap().is_empty());
    }

    #[test]
    fn test_newer_date_sorts_first() {
        let temp = TempDir::new().unwrap();
        let manifest = store(&temp);

        manifest
            .append(ArticleRecord::new("A", "a.html", "2026-02-22"))
            .unwrap();
        manifest
            .append(ArticleRecord::new("B", "b.html", "2026-02-23"))
            .unwrap();

        let titles: Vec<_> = manifest
            .load()
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["B", "A"]);
    }

    #[test]
    fn test_same_day_keeps_append_order() {
        let temp = TempDir::new().unwrap();
        let manifest = store(&temp);

        for (title, date) in [
            ("first", "2026-02-22"),
            ("later day", "2026-02-24"),
            ("second", "2026-02-22"),
            ("third", "2026-02-22"),
        ] {
            manifest
                .append(ArticleRecord::new(title, format!("{}.html", title), date))
                .unwrap();
        }

        let titles: Vec<_> = manifest
            .load()
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["later day", "first", "second", "third"]);
    }

    #[test]
    fn test_append_many_is_non_increasing() {
        let temp = TempDir::new().unwrap();
        let manifest = store(&temp);
        let dates = [
            "2026-02-23",
            "2025-12-31",
            "2026-02-24",
            "2026-01-01",
            "2026-02-23",
            "2024-07-09",
        ];

        for (i, date) in dates.iter().enumerate() {
            manifest
                .append(ArticleRecord::new(format!("t{}", i), format!("t{}.html", i), *date))
                .unwrap();
        }

        let records = manifest.load().unwrap();
        assert_eq!(records.len(), dates.len());
        assert!(records.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn test_round_trip_preserves_non_ascii() {
        let temp = TempDir::new().unwrap();
        let manifest = store(&temp);
        let record = ArticleRecord::new(
            "理解‘聚光灯效应’：你没那么多人关注",
            "理解‘聚光灯效应’：你没那么多人关注.html",
            "2026-02-22",
        );

        manifest.append(record.clone()).unwrap();
        assert_eq!(manifest.load().unwrap(), vec![record]);

        let raw = fs::read_to_string(manifest.path()).unwrap();
        assert!(raw.contains("聚光灯效应"));
        assert!(!raw.contains("\\u"));
        // Pretty printed
        assert!(raw.starts_with("[\n  {\n    \"title\""));
    }

    #[test]
    fn test_lock_released_after_append() {
        let temp = TempDir::new().unwrap();
        let manifest = store(&temp);
        manifest
            .append(ArticleRecord::new("A", "a.html", "2026-02-22"))
            .unwrap();
        assert!(!temp.path().join("articles.json.lock").exists());
    }

    #[test]
    fn test_held_lock_blocks_append() {
        let temp = TempDir::new().unwrap();
        let manifest = store(&temp);

        let lock = ManifestLock::acquire(manifest.path()).unwrap();
        let result = manifest.append(ArticleRecord::new("A", "a.html", "2026-02-22"));
        assert!(matches!(result, Err(AppError::Publish(_))));
        assert!(manifest.load().unwrap().is_empty());

        drop(lock);
        manifest
            .append(ArticleRecord::new("A", "a.html", "2026-02-22"))
            .unwrap();
        assert_eq!(manifest.load().unwrap().len(), 1);
    }

    #[test]
    fn test_corrupt_manifest_is_not_overwritten() {
        let temp = TempDir::new().unwrap();
        let manifest = store(&temp);
        fs::write(manifest.path(), "{not json").unwrap();

        let result = manifest.append(ArticleRecord::new("A", "a.html", "2026-02-22"));
        assert!(matches!(result, Err(AppError::Serialization(_))));
        assert_eq!(fs::read_to_string(manifest.path()).unwrap(), "{not json");
    }
}
