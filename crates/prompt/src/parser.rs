//! Line-oriented parser for staged template documents.
//!
//! ```text
//! ## Stage 1: Titles
//! System: You are a headline editor.
//! User: Suggest five titles about {topic}.
//!
//! ## Stage 2: Outline
//! Write an outline for "{title}" from the angle {angle}.
//! ```

use crate::types::{StageTemplate, TemplateDocument};
use inkpipe_core::{AppError, AppResult};

const STAGE_MARKER: &str = "## Stage";
const SYSTEM_PREFIX: &str = "System:";
const USER_PREFIX: &str = "User:";

struct OpenStage {
    name: String,
    system: Option<String>,
    lines: Vec<String>,
}

impl OpenStage {
    fn finish(self) -> StageTemplate {
        StageTemplate {
            name: self.name,
            system: self.system,
            body: self.lines.join("\n").trim().to_string(),
        }
    }
}

/// Parse template text into its stages.
///
/// Lines before the first `## Stage` header are dropped, and a document
/// without headers yields no stages. A repeated stage name is an error.
pub fn parse_stages(text: &str) -> AppResult<Vec<StageTemplate>> {
    let mut stages: Vec<StageTemplate> = Vec::new();
    let mut current: Option<OpenStage> = None;

    for line in text.lines() {
        if line.starts_with(STAGE_MARKER) {
            if let Some(open) = current.take() {
                stages.push(open.finish());
            }

            let name = stage_name(line);
            if stages.iter().any(|s| s.name == name) {
                return Err(AppError::Template(format!(
                    "Duplicate stage header: '{}'",
                    name
                )));
            }

            current = Some(OpenStage {
                name,
                system: None,
                lines: Vec::new(),
            });
            continue;
        }

        let Some(open) = current.as_mut() else {
            continue;
        };

        if let Some(system) = line.strip_prefix(SYSTEM_PREFIX) {
            open.system = Some(system.trim().to_string());
        } else if let Some(user) = line.strip_prefix(USER_PREFIX) {
            open.lines.push(user.trim().to_string());
        } else {
            open.lines.push(line.to_string());
        }
    }

    if let Some(open) = current {
        stages.push(open.finish());
    }

    Ok(stages)
}

/// Parse a whole document for a style.
pub fn parse_document(style: &str, text: &str) -> AppResult<TemplateDocument> {
    let stages = parse_stages(text).map_err(|e| match e {
        AppError::Template(msg) => AppError::Template(format!("style '{}': {}", style, msg)),
        other => other,
    })?;

    Ok(TemplateDocument {
        style: style.to_string(),
        stages,
    })
}

/// `## Stage 2: Outline` → `Stage 2`
fn stage_name(line: &str) -> String {
    let head = line.split(':').next().unwrap_or(line);
    head.replace('#', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_parse_single_stage_with_system() {
        let doc = parse_document(
            "t",
            "## Stage 1: Title\nSystem: Be concise.\nUser: Topic is {topic}\n",
        )
        .unwrap();

        let mut expected = BTreeMap::new();
        expected.insert("Stage 1".to_string(), "Topic is {topic}".to_string());
        expected.insert("Stage 1_system".to_string(), "Be concise.".to_string());
        assert_eq!(doc.sections(), expected);
    }

    #[test]
    fn test_body_keeps_blank_lines_and_formatting() {
        let text = "## Stage 3: Draft\n\nWrite it.\n\n  - keep indent\n\n{outline}\n\n";
        let stages = parse_stages(text).unwrap();
        assert_eq!(stages[0].body, "Write it.\n\n  - keep indent\n\n{outline}");
    }

    #[test]
    fn test_multiple_stages_in_order() {
        let text = "\
## Stage 1: Titles
User: Titles for {topic}
## Stage 2: Outline
System: You outline.
Outline {title} via {angle}
### not a stage marker
## Stage 3
Draft from {outline}
";
        let stages = parse_stages(text).unwrap();
        let names: Vec<_> = stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Stage 1", "Stage 2", "Stage 3"]);
        assert_eq!(stages[0].system, None);
        assert_eq!(stages[1].system.as_deref(), Some("You outline."));
        assert_eq!(
            stages[1].body,
            "Outline {title} via {angle}\n### not a stage marker"
        );
        assert_eq!(stages[2].body, "Draft from {outline}");
    }

    #[test]
    fn test_text_before_first_stage_is_discarded() {
        let text = "# Psychology style\nSystem: ignored\nintro text\n## Stage 1: T\nbody";
        let stages = parse_stages(text).unwrap();
        assert_eq!(stages.len(), 1);
        assert_eq!(stages[0].system, None);
        assert_eq!(stages[0].body, "body");
    }

    #[test]
    fn test_no_markers_yields_empty() {
        let stages = parse_stages("just some notes\nSystem: x\n").unwrap();
        assert!(stages.is_empty());
    }

    #[test]
    fn test_duplicate_stage_is_error() {
        let result = parse_stages("## Stage 1: A\nx\n## Stage 1: B\ny\n");
        assert!(matches!(result, Err(AppError::Template(_))));
    }

    #[test]
    fn test_header_without_colon() {
        assert_eq!(stage_name("## Stage 4"), "Stage 4");
        assert_eq!(stage_name("## Stage 2: Outline: long"), "Stage 2");
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = "## Stage 1: A\nSystem: s\nUser: {topic}\n\n## Stage 2: B\n{title}\n";
        assert_eq!(parse_stages(text).unwrap(), parse_stages(text).unwrap());
    }

    #[test]
    fn test_crlf_lines() {
        let stages = parse_stages("## Stage 1: A\r\nSystem: s\r\nUser: hi {topic}\r\n").unwrap();
        assert_eq!(stages[0].system.as_deref(), Some("s"));
        assert_eq!(stages[0].body, "hi {topic}");
    }
}
