//! Template types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Suffix of the flattened key holding a stage's system instruction.
pub const SYSTEM_SUFFIX: &str = "_system";

/// The four generation stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// topic → candidate titles
    Titles,
    /// title, angle → outline
    Outline,
    /// outline → draft content
    Draft,
    /// content → polished markdown
    Polish,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Titles, Stage::Outline, Stage::Draft, Stage::Polish];

    /// Key of this stage in a template document.
    pub fn key(&self) -> &'static str {
        match self {
            Stage::Titles => "Stage 1",
            Stage::Outline => "Stage 2",
            Stage::Draft => "Stage 3",
            Stage::Polish => "Stage 4",
        }
    }

    /// 1-based position in the pipeline.
    pub fn number(&self) -> usize {
        match self {
            Stage::Titles => 1,
            Stage::Outline => 2,
            Stage::Draft => 3,
            Stage::Polish => 4,
        }
    }

    /// Placeholder names this stage is supplied with.
    pub fn inputs(&self) -> &'static [&'static str] {
        match self {
            Stage::Titles => &["topic"],
            Stage::Outline => &["title", "angle"],
            Stage::Draft => &["outline"],
            Stage::Polish => &["content"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stage::Titles => "titles",
            Stage::Outline => "outline",
            Stage::Draft => "draft",
            Stage::Polish => "polish",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One stage of a template document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTemplate {
    /// Stage name as written in the header (e.g. "Stage 2")
    pub name: String,

    /// System instruction, kept apart from the body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Prompt body with `{placeholder}` fields
    pub body: String,
}

/// The parsed stages of one template style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDocument {
    /// Style name (file stem)
    pub style: String,

    /// Stages in document order; names are unique
    pub stages: Vec<StageTemplate>,
}

impl TemplateDocument {
    pub fn stage(&self, name: &str) -> Option<&StageTemplate> {
        self.stages.iter().find(|s| s.name == name)
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.iter().map(|s| s.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Flattened view: `"<stage>"` → body and `"<stage>_system"` → system instruction.
    pub fn sections(&self) -> BTreeMap<String, String> {
        let mut sections = BTreeMap::new();
        for stage in &self.stages {
            sections.insert(stage.name.clone(), stage.body.clone());
            if let Some(ref system) = stage.system {
                sections.insert(format!("{}{}", stage.name, SYSTEM_SUFFIX), system.clone());
            }
        }
        sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_and_keys() {
        let keys: Vec<_> = Stage::ALL.iter().map(|s| s.key()).collect();
        assert_eq!(keys, vec!["Stage 1", "Stage 2", "Stage 3", "Stage 4"]);
        assert_eq!(Stage::Draft.number(), 3);
        assert_eq!(Stage::Outline.inputs(), &["title", "angle"]);
    }

    #[test]
    fn test_sections_flatten_system() {
        let doc = TemplateDocument {
            style: "test".to_string(),
            stages: vec![
                StageTemplate {
                    name: "Stage 1".to_string(),
                    system: Some("Be concise.".to_string()),
                    body: "Topic is {topic}".to_string(),
                },
                StageTemplate {
                    name: "Stage 2".to_string(),
                    system: None,
                    body: "Outline {title}".to_string(),
                },
            ],
        };

        let sections = doc.sections();
        assert_eq!(sections.len(), 3);
        assert_eq!(sections["Stage 1_system"], "Be concise.");
        assert!(!sections.contains_key("Stage 2_system"));
        assert_eq!(doc.stage("Stage 2").unwrap().body, "Outline {title}");
    }
}
