//! Command handlers for the inkpipe CLI.
//!
//! Each command lives in its own submodule; the helpers below are shared
//! between them.

pub mod generate;
pub mod publish;
pub mod styles;
pub mod write;

pub use generate::GenerateCommand;
pub use publish::PublishCommand;
pub use styles::StylesCommand;
pub use write::WriteCommand;

use anyhow::Context;
use inkpipe_core::AppConfig;
use inkpipe_publish::{validate_date, GitCli, PublishReport, Publisher, DATE_FORMAT};
use inkpipe_prompt::TemplateStore;
use std::io::{self, BufRead, Write};

/// Load every template style from the configured prompts directory.
pub(crate) fn load_templates(config: &AppConfig) -> anyhow::Result<TemplateStore> {
    let directory = config.prompts_path();
    let store = TemplateStore::load(&directory)?;
    tracing::debug!("Loaded {} style(s) from {:?}", store.len(), directory);
    Ok(store)
}

/// The `--date` value, or today in local time.
///
/// Checked here so a bad flag fails before any generation call.
pub(crate) fn publish_date(date: Option<&str>) -> anyhow::Result<String> {
    let date = match date {
        Some(date) if !date.trim().is_empty() => date.trim().to_string(),
        _ => chrono::Local::now().format(DATE_FORMAT).to_string(),
    };
    validate_date(&date)?;
    Ok(date)
}

/// Publish to the Pages root, syncing through git in the workspace.
pub(crate) fn publish_to_pages(
    config: &AppConfig,
    filename: &str,
    html_body: &str,
    title: &str,
    date: &str,
) -> anyhow::Result<PublishReport> {
    let publisher = Publisher::new(
        config.publish_path(),
        Box::new(GitCli::new(&config.workspace)),
    );
    let report = publisher
        .publish(filename, html_body, title, date)
        .with_context(|| format!("Failed to publish '{}'", title))?;
    Ok(report)
}

pub(crate) fn print_report(report: &PublishReport) {
    println!("Article: {}", report.article_path.display());
    println!("Index:   {}", report.index_path.display());
    match &report.sync_error {
        None => println!("Pushed to remote."),
        Some(e) => println!("Saved locally, push failed: {}", e),
    }
}

/// Ask a question on stderr and read one trimmed line from stdin.
pub(crate) fn prompt_line(question: &str) -> anyhow::Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{}", question)?;
    stderr.flush()?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    if read == 0 {
        anyhow::bail!("Input closed while waiting for: {}", question.trim());
    }
    Ok(line.trim().to_string())
}

/// Like [`prompt_line`], repeating until the answer is not empty.
pub(crate) fn prompt_required(question: &str) -> anyhow::Result<String> {
    loop {
        let answer = prompt_line(question)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_date_prefers_flag() {
        assert_eq!(publish_date(Some(" 2026-02-22 ")).unwrap(), "2026-02-22");
    }

    #[test]
    fn test_publish_date_defaults_to_today() {
        let today = publish_date(None).unwrap();
        assert_eq!(today.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&today, DATE_FORMAT).is_ok());
        assert_eq!(publish_date(Some("  ")).unwrap(), today);
    }

    #[test]
    fn test_publish_date_rejects_malformed_flag() {
        for date in ["2026-2-3", "2026-02-30", "tomorrow"] {
            let err = publish_date(Some(date)).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<inkpipe_core::AppError>(),
                Some(inkpipe_core::AppError::Publish(_))
            ));
        }
    }
}
