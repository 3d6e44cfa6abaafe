//! Write command handler.
//!
//! Non-interactive stages 2–4 for a known title and angle, followed by a
//! Pages publish.

use super::{load_templates, print_report, publish_date, publish_to_pages};
use clap::Args;
use inkpipe_core::AppConfig;
use inkpipe_llm::client_for_config;
use inkpipe_pipeline::StagePipeline;
use inkpipe_publish::{article_filename, article_name, markdown_to_html};

/// Write an article for a given title and publish it to Pages
#[derive(Args, Debug)]
pub struct WriteCommand {
    /// Article title
    #[arg(short, long)]
    pub title: String,

    /// Angle or concept the article is built on
    #[arg(short, long)]
    pub angle: String,

    /// Publish date, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,
}

impl WriteCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing write command");
        tracing::debug!("Write options: {:?}", self);

        let date = publish_date(self.date.as_deref())?;
        let filename = article_filename(&self.title);
        article_name(&filename)?;
        config.validate()?;
        let store = load_templates(config)?;
        let client = client_for_config(config)?;
        let mut pipeline = StagePipeline::from_store(&store, client, config.pipeline_config())?;

        eprintln!("--- Writing: {} ---", self.title);
        let run = pipeline.write_article(&self.title, &self.angle).await?;

        let html = markdown_to_html(&run.markdown);
        let report = publish_to_pages(
            config,
            &filename,
            &html,
            &self.title,
            &date,
        )?;
        print_report(&report);

        Ok(())
    }
}
