//! Generate command handler.
//!
//! The interactive flow: stage 1 proposes titles, the user picks a title and
//! angle, stages 2–4 write the article, and the result is deployed.

use super::{
    load_templates, print_report, prompt_line, prompt_required, publish_date, publish_to_pages,
};
use anyhow::Context;
use clap::{Args, ValueEnum};
use inkpipe_core::AppConfig;
use inkpipe_llm::client_for_config;
use inkpipe_pipeline::StagePipeline;
use inkpipe_prompt::Stage;
use inkpipe_publish::fs::write_atomic;
use inkpipe_publish::{article_filename, article_name, markdown_to_html, DraftArticle, WeChatClient};

/// Where a finished article goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeployTarget {
    /// Static site root, committed and pushed with git
    Github,
    /// Draft box of a WeChat official account
    Wechat,
    /// Keep the local HTML only
    Local,
}

impl DeployTarget {
    fn parse_answer(answer: &str) -> Option<Self> {
        match answer.trim().to_lowercase().as_str() {
            "1" | "github" | "g" => Some(DeployTarget::Github),
            "2" | "wechat" | "w" => Some(DeployTarget::Wechat),
            "3" | "local" | "l" | "" => Some(DeployTarget::Local),
            _ => None,
        }
    }
}

/// Interactive run: propose titles, write, then deploy
#[derive(Args, Debug)]
pub struct GenerateCommand {
    /// Topic for stage 1 (asked for when omitted)
    pub topic: Option<String>,

    /// Deploy target (asked for when omitted)
    #[arg(short, long, value_enum)]
    pub deploy: Option<DeployTarget>,

    /// Publish date for Pages, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub date: Option<String>,
}

impl GenerateCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing generate command");
        tracing::debug!("Generate options: {:?}", self);

        let date = publish_date(self.date.as_deref())?;
        config.validate()?;
        let store = load_templates(config)?;
        let client = client_for_config(config)?;
        let mut pipeline = StagePipeline::from_store(&store, client, config.pipeline_config())?;
        // Catch template problems before the first paid call
        pipeline.preflight(&Stage::ALL)?;
        if self.deploy == Some(DeployTarget::Wechat) {
            config.resolve_wechat()?;
        }

        let topic = match &self.topic {
            Some(topic) => topic.clone(),
            None => prompt_required("Topic: ")?,
        };

        eprintln!(
            "\n[1/4] Style: {} | Model: {} | Proposing titles...",
            config.style,
            config.model()
        );
        let proposals = pipeline.propose_titles(&topic).await?;
        println!("{}", proposals.text);

        let title = loop {
            let title = prompt_required("\nChosen title: ")?;
            match article_name(&article_filename(&title)) {
                Ok(_) => break title,
                Err(e) => eprintln!("{}", e),
            }
        };
        let angle = prompt_required("Angle or concept to build on: ")?;

        eprintln!("[2/4] Outlining, drafting and polishing...");
        let run = pipeline.write_article(&title, &angle).await?;

        let html = markdown_to_html(&run.markdown);
        let filename = article_filename(&title);
        let local_path = config.output_path().join(&filename);
        write_atomic(&local_path, html.as_bytes())
            .with_context(|| format!("Failed to save {:?}", local_path))?;
        println!("Saved: {}", local_path.display());

        let target = match self.deploy {
            Some(target) => target,
            None => ask_target()?,
        };

        match target {
            DeployTarget::Github => {
                let report = publish_to_pages(config, &filename, &html, &title, &date)?;
                print_report(&report);
            }
            DeployTarget::Wechat => {
                let credentials = config.resolve_wechat()?;
                let wechat = WeChatClient::from_credentials(&credentials);
                let draft = DraftArticle::new(&title, &html, &credentials.thumb_media_id);
                let media_id = wechat.upload_draft(&draft).await?;
                println!("WeChat draft created: {}", media_id);
            }
            DeployTarget::Local => {
                tracing::info!("Keeping local copy only");
            }
        }

        Ok(())
    }
}

fn ask_target() -> anyhow::Result<DeployTarget> {
    loop {
        let answer = prompt_line("\nDeploy to: 1) GitHub Pages  2) WeChat draft  3) local only [3]: ")?;
        if let Some(target) = DeployTarget::parse_answer(&answer) {
            return Ok(target);
        }
        eprintln!("Please answer 1, 2 or 3.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deploy_answer() {
        assert_eq!(DeployTarget::parse_answer("1"), Some(DeployTarget::Github));
        assert_eq!(DeployTarget::parse_answer(" WeChat "), Some(DeployTarget::Wechat));
        assert_eq!(DeployTarget::parse_answer(""), Some(DeployTarget::Local));
        assert_eq!(DeployTarget::parse_answer("ftp"), None);
    }
}
