//! Publishing rendered articles to a static site root.

use crate::fs::write_atomic;
use crate::manifest::{ArticleRecord, ManifestStore, MANIFEST_FILE};
use crate::naming::basename;
use crate::pages::{render_article_page, render_index_page, INDEX_FILE};
use crate::vcs::VersionControl;
use chrono::NaiveDate;
use inkpipe_core::{AppError, AppResult};
use std::path::PathBuf;

/// Date format of manifest records and the `--date` flag.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// What a publish wrote and whether the remote sync went through.
#[derive(Debug, Clone)]
pub struct PublishReport {
    pub article_path: PathBuf,
    pub index_path: PathBuf,
    pub manifest_path: PathBuf,
    pub synced: bool,
    pub sync_error: Option<String>,
}

/// Writes article pages, the manifest and the index into `root`, then syncs.
pub struct Publisher {
    root: PathBuf,
    manifest: ManifestStore,
    vcs: Box<dyn VersionControl>,
}

impl Publisher {
    pub fn new(root: impl Into<PathBuf>, vcs: Box<dyn VersionControl>) -> Self {
        let root = root.into();
        let manifest = ManifestStore::in_dir(&root);
        Self {
            root,
            manifest,
            vcs,
        }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub fn manifest(&self) -> &ManifestStore {
        &self.manifest
    }

    /// Publish one article.
    ///
    /// Only the last path component of `filename` is used. Local files are
    /// complete before version control runs; a sync failure is logged and
    /// reported in [`PublishReport::sync_error`], not returned.
    pub fn publish(
        &self,
        filename: &str,
        html_body: &str,
        title: &str,
        date: &str,
    ) -> AppResult<PublishReport> {
        validate_date(date)?;
        let name = article_name(filename)?;

        tracing::info!("Publishing '{}' as {} ({})", title, name, date);

        let article_path = self.root.join(name);
        let page = render_article_page(title, date, html_body);
        write_atomic(&article_path, page.as_bytes())?;

        self.manifest
            .append(ArticleRecord::new(title, name, date))?;

        let index_path = self.root.join(INDEX_FILE);
        write_atomic(&index_path, render_index_page().as_bytes())?;

        let (synced, sync_error) = match self.sync(name) {
            Ok(()) => {
                tracing::info!("Pushed {} to remote", name);
                (true, None)
            }
            Err(e) => {
                tracing::warn!("Version control sync failed, local files kept: {}", e);
                (false, Some(e.to_string()))
            }
        };

        Ok(PublishReport {
            article_path,
            index_path,
            manifest_path: self.manifest.path().to_path_buf(),
            synced,
            sync_error,
        })
    }

    fn sync(&self, name: &str) -> AppResult<()> {
        self.vcs.add(&[self.root.as_path()])?;
        self.vcs.commit(&format!("Deploy article: {}", name))?;
        self.vcs.push()
    }
}

/// Basename of `filename`, rejecting names the publish root keeps for itself.
pub fn article_name(filename: &str) -> AppResult<&str> {
    let name = basename(filename)
        .ok_or_else(|| AppError::Publish(format!("Invalid article file name: {:?}", filename)))?;

    let lock_file = format!("{}.lock", MANIFEST_FILE);
    if name == INDEX_FILE || name == MANIFEST_FILE || name == lock_file || name.starts_with('.') {
        return Err(AppError::Publish(format!(
            "Article file name '{}' is reserved in the publish root; choose another title",
            name
        )));
    }
    Ok(name)
}

/// Manifest order compares dates as strings, so only the zero-padded form is accepted.
pub fn validate_date(date: &str) -> AppResult<()> {
    let invalid = || AppError::Publish(format!("Invalid date '{}', expected YYYY-MM-DD", date));
    if date.len() != 10 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map(|_| ())
        .map_err(|_| invalid())
}
