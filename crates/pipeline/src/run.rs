//! Stage execution.

use inkpipe_core::{AppError, AppResult, PipelineConfig};
use inkpipe_llm::{LlmClient, LlmRequest};
use inkpipe_prompt::{placeholders, render, Stage, TemplateDocument, TemplateStore};
use std::collections::HashMap;
use std::sync::Arc;

/// Output of stage 1, handed to whoever picks the title and angle.
#[derive(Debug, Clone)]
pub struct TitleProposals {
    pub topic: String,
    pub text: String,
}

/// Everything one run of stages 2–4 produced.
#[derive(Debug, Clone)]
pub struct ArticleRun {
    pub title: String,
    pub angle: String,
    pub outline: String,
    pub draft: String,
    /// Stage 4 output, markdown source of the final article
    pub markdown: String,
}

/// Runs template stages against a generation backend.
pub struct StagePipeline<'a> {
    document: &'a TemplateDocument,
    client: Arc<dyn LlmClient>,
    config: PipelineConfig,
    calls: usize,
}

impl<'a> StagePipeline<'a> {
    pub fn new(
        document: &'a TemplateDocument,
        client: Arc<dyn LlmClient>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            document,
            client,
            config,
            calls: 0,
        }
    }

    /// Build a pipeline for the style named in `config`.
    pub fn from_store(
        store: &'a TemplateStore,
        client: Arc<dyn LlmClient>,
        config: PipelineConfig,
    ) -> AppResult<Self> {
        let document = store.require(&config.style)?;
        Ok(Self::new(document, client, config))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Check that every stage exists and only references the values it will
    /// be given. Runs before any backend call.
    pub fn preflight(&self, stages: &[Stage]) -> AppResult<()> {
        for stage in stages {
            let template = self.document.stage(stage.key()).ok_or_else(|| {
                AppError::Template(format!(
                    "Style '{}' has no '{}'",
                    self.document.style,
                    stage.key()
                ))
            })?;

            for name in placeholders(&template.body)? {
                if !stage.inputs().contains(&name.as_str()) {
                    return Err(AppError::Template(format!(
                        "'{}' of style '{}' references {{{}}}, but only {} is supplied",
                        stage.key(),
                        self.document.style,
                        name,
                        stage
                            .inputs()
                            .iter()
                            .map(|i| format!("{{{}}}", i))
                            .collect::<Vec<_>>()
                            .join(", ")
                    )));
                }
            }
        }
        Ok(())
    }

    /// Stage 1: propose titles for a topic.
    pub async fn propose_titles(&mut self, topic: &str) -> AppResult<TitleProposals> {
        self.preflight(&[Stage::Titles])?;
        let text = self.run_stage(Stage::Titles, &[("topic", topic)]).await?;
        Ok(TitleProposals {
            topic: topic.to_string(),
            text,
        })
    }

    /// Stages 2–4: outline, draft and polish an article for a chosen title.
    pub async fn write_article(&mut self, title: &str, angle: &str) -> AppResult<ArticleRun> {
        self.preflight(&[Stage::Outline, Stage::Draft, Stage::Polish])?;

        let outline = self
            .run_stage(Stage::Outline, &[("title", title), ("angle", angle)])
            .await?;
        let draft = self.run_stage(Stage::Draft, &[("outline", outline.as_str())]).await?;
        let markdown = self.run_stage(Stage::Polish, &[("content", draft.as_str())]).await?;

        Ok(ArticleRun {
            title: title.to_string(),
            angle: angle.to_string(),
            outline,
            draft,
            markdown,
        })
    }

    async fn run_stage(&mut self, stage: Stage, values: &[(&str, &str)]) -> AppResult<String> {
        let document = self.document;
        let template = document.stage(stage.key()).ok_or_else(|| {
            AppError::Template(format!(
                "Style '{}' has no '{}'",
                document.style,
                stage.key()
            ))
        })?;

        let values: HashMap<String, String> = values
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let prompt = render(&template.body, &values)?;

        if self.calls > 0 && !self.config.rate_limit_delay.is_zero() {
            tracing::info!(
                "Waiting {:?} before {} to respect rate limits",
                self.config.rate_limit_delay,
                stage
            );
            tokio::time::sleep(self.config.rate_limit_delay).await;
        }

        tracing::info!(
            style = %document.style,
            model = %self.config.model,
            "[{}/4] Running {} ({})",
            stage.number(),
            stage,
            stage.label()
        );

        let request = LlmRequest::new(prompt, &self.config.model)
            .with_optional_system(template.system.as_deref());

        self.calls += 1;
        let response = self.client.complete(&request).await.map_err(|e| {
            tracing::error!("{} failed: {}", stage, e);
            e
        })?;

        tracing::debug!(
            "{} returned {} bytes ({} tokens)",
            stage,
            response.content.len(),
            response.usage.total_tokens
        );
        Ok(response.content)
    }
}
