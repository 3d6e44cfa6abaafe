//! Publishing for finished articles.
//!
//! A published article becomes a static HTML page under the publish root,
//! a record in `articles.json`, and a regenerated `index.html`. The root is
//! then committed and pushed through a [`VersionControl`] implementation.
//! Articles can also be uploaded as drafts to a WeChat official account.

pub mod fs;
pub mod manifest;
pub mod markdown;
pub mod naming;
pub mod pages;
pub mod publisher;
pub mod vcs;
pub mod wechat;

pub use manifest::{ArticleRecord, ManifestStore, MANIFEST_FILE};
pub use markdown::markdown_to_html;
pub use naming::{article_filename, sanitize_title};
pub use publisher::{article_name, validate_date, PublishReport, Publisher, DATE_FORMAT};
pub use vcs::{GitCli, VersionControl};
pub use wechat::{DraftArticle, WeChatClient};
