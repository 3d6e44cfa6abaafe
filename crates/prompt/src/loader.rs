//! Template store: loads every `*.md` template in a directory.

use crate::parser::parse_document;
use crate::types::TemplateDocument;
use inkpipe_core::{AppError, AppResult};
use std::collections::BTreeMap;
use std::path::Path;

/// Parsed template documents keyed by style name.
///
/// Documents are read once and never modified afterwards.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    documents: BTreeMap<String, TemplateDocument>,
}

impl TemplateStore {
    /// Load all templates in `directory`.
    ///
    /// Each `<style>.md` file directly inside the directory becomes one
    /// document named `<style>`.
    ///
    /// # Errors
    /// `AppError::NotFound` if the directory is missing or holds no `.md`
    /// files; `AppError::Template` if a document has a duplicate stage header.
    ///
    /// # Example
    /// ```no_run
    /// use inkpipe_prompt::TemplateStore;
    /// use std::path::Path;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let store = TemplateStore::load(Path::new("prompts"))?;
    /// let doc = store.require("psychology")?;
    /// println!("{} stages", doc.stages.len());
    /// # Ok(())
    /// # }
    /// ```
    pub fn load(directory: &Path) -> AppResult<Self> {
        if !directory.is_dir() {
            return Err(AppError::NotFound(format!(
                "Template directory not found: {:?}",
                directory
            )));
        }

        let mut documents = BTreeMap::new();

        for entry in walkdir::WalkDir::new(directory)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("md") {
                continue;
            }
            let Some(style) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!("Skipping template with non UTF-8 name: {:?}", path);
                continue;
            };

            tracing::debug!("Loading template from: {:?}", path);
            let contents = std::fs::read_to_string(path)?;
            let document = parse_document(style, &contents)?;

            if document.is_empty() {
                tracing::warn!("Template '{}' defines no stages", style);
            }
            documents.insert(style.to_string(), document);
        }

        if documents.is_empty() {
            return Err(AppError::NotFound(format!(
                "No .md templates in {:?}",
                directory
            )));
        }

        tracing::info!(
            "Loaded {} template style(s) from {:?}",
            documents.len(),
            directory
        );

        Ok(Self { documents })
    }

    /// Build a store from already parsed documents.
    pub fn from_documents(documents: impl IntoIterator<Item = TemplateDocument>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .map(|d| (d.style.clone(), d))
                .collect(),
        }
    }

    pub fn get(&self, style: &str) -> Option<&TemplateDocument> {
        self.documents.get(style)
    }

    /// Look up a style, failing with the list of available ones.
    pub fn require(&self, style: &str) -> AppResult<&TemplateDocument> {
        self.get(style).ok_or_else(|| {
            AppError::NotFound(format!(
                "Style '{}' not found. Available: {}",
                style,
                self.styles().join(", ")
            ))
        })
    }

    /// Style names, sorted.
    pub fn styles(&self) -> Vec<&str> {
        self.documents.keys().map(String::as_str).collect()
    }

    pub fn documents(&self) -> impl Iterator<Item = &TemplateDocument> {
        self.documents.values()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PSYCHOLOGY: &str = "\
# Psychology column
## Stage 1: Titles
System: You write headlines.
User: Five titles about {topic}.
## Stage 2: Outline
Outline \"{title}\" using {angle}.
";

    #[test]
    fn test_load_styles() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("psychology.md"), PSYCHOLOGY).unwrap();
        fs::write(temp.path().join("history.md"), "## Stage 1: T\n{topic}").unwrap();
        fs::write(temp.path().join("notes.txt"), "## Stage 1: ignored").unwrap();

        let store = TemplateStore::load(temp.path()).unwrap();
        assert_eq!(store.styles(), vec!["history", "psychology"]);

        let doc = store.require("psychology").unwrap();
        assert_eq!(doc.stage_names().collect::<Vec<_>>(), vec!["Stage 1", "Stage 2"]);
        assert_eq!(
            doc.stage("Stage 1").unwrap().system.as_deref(),
            Some("You write headlines.")
        );
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let result = TemplateStore::load(&temp.path().join("prompts"));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_directory_without_templates() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("readme.txt"), "nothing").unwrap();
        let result = TemplateStore::load(temp.path());
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_document_without_stages_is_loaded() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("blank.md"), "no headers here").unwrap();
        let store = TemplateStore::load(temp.path()).unwrap();
        assert!(store.require("blank").unwrap().is_empty());
    }

    #[test]
    fn test_require_unknown_style_lists_available() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("psychology.md"), PSYCHOLOGY).unwrap();
        let store = TemplateStore::load(temp.path()).unwrap();

        match store.require("poetry") {
            Err(AppError::NotFound(msg)) => assert!(msg.contains("psychology")),
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[test]
    fn test_subdirectories_are_not_scanned() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("psychology.md"), PSYCHOLOGY).unwrap();
        fs::create_dir(temp.path().join("drafts")).unwrap();
        fs::write(temp.path().join("drafts/old.md"), "## Stage 1: x").unwrap();

        let store = TemplateStore::load(temp.path()).unwrap();
        assert_eq!(store.len(), 1);
    }
}
