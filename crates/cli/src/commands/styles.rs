//! Styles command handler.

use super::load_templates;
use clap::Args;
use inkpipe_core::AppConfig;

/// List available template styles
#[derive(Args, Debug)]
pub struct StylesCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StylesCommand {
    pub fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing styles command");

        let store = load_templates(config)?;

        if self.json {
            let output: Vec<_> = store
                .documents()
                .map(|doc| {
                    serde_json::json!({
                        "style": doc.style,
                        "stages": doc.stage_names().collect::<Vec<_>>(),
                        "default": doc.style == config.style,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        for doc in store.documents() {
            let marker = if doc.style == config.style { "*" } else { " " };
            let stages: Vec<_> = doc.stage_names().collect();
            println!("{} {}  ({})", marker, doc.style, stages.join(", "));
        }

        Ok(())
    }
}
