//! Publish command handler.

use super::{print_report, publish_date, publish_to_pages};
use anyhow::Context;
use clap::Args;
use inkpipe_core::AppConfig;
use inkpipe_publish::{article_filename, markdown_to_html};
use std::path::PathBuf;

/// Publish an existing markdown file to Pages
#[derive(Args, Debug)]
pub struct PublishCommand {
    /// Article title
    #[arg(short, long)]
    pub title: String,

    /// Markdown source of the article
    #[arg(short, long)]
    pub file: PathBuf,

    /// Publish date, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,
}

impl PublishCommand {
    pub fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing publish command");
        tracing::debug!("Publish options: {:?}", self);

        let date = publish_date(self.date.as_deref())?;
        let markdown = std::fs::read_to_string(&self.file)
            .with_context(|| format!("Failed to read {:?}", self.file))?;
        let html = markdown_to_html(&markdown);

        let report = publish_to_pages(
            config,
            &article_filename(&self.title),
            &html,
            &self.title,
            &date,
        )?;
        print_report(&report);

        Ok(())
    }
}
