use crate::error::DiagramError;
use crate::ir::{Branch, BranchName, DEFAULT_TITLE, Diagram, Step};
use crate::theme::Theme;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json5,
}

impl DocumentFormat {
    /// `.json` and `.json5` files are JSON5; everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") | Some("json5") => Self::Json5,
            _ => Self::Yaml,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct DocumentFile {
    title: Option<String>,
    width: Option<f32>,
    #[serde(default)]
    branches: Vec<BranchEntry>,
    #[serde(default)]
    steps: Vec<StepEntry>,
}

#[derive(Debug, Deserialize)]
struct BranchEntry {
    name: Option<BranchName>,
    title: Option<String>,
    #[serde(rename = "color-light")]
    color_light: Option<String>,
    #[serde(rename = "color-dark")]
    color_dark: Option<String>,
    system: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StepEntry {
    #[serde(rename = "type")]
    kind: Option<String>,
    source: Option<BranchName>,
    target: Option<BranchName>,
}

pub fn load_document(path: &Path, theme: &Theme) -> Result<Diagram> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_document(&text, DocumentFormat::from_path(path), theme)
}

/// Builds a diagram from a document, registering branches and then steps in
/// file order. The first invalid branch or step aborts the whole document.
pub fn parse_document(text: &str, format: DocumentFormat, theme: &Theme) -> Result<Diagram> {
    let file: DocumentFile = match format {
        DocumentFormat::Yaml if text.trim().is_empty() => DocumentFile::default(),
        DocumentFormat::Yaml => serde_yaml::from_str(text)?,
        DocumentFormat::Json5 => json5::from_str(text)?,
    };

    let mut diagram = Diagram::new(file.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()));
    diagram.width = file.width;

    for entry in file.branches {
        let name = entry
            .name
            .ok_or_else(|| DiagramError::InvalidName("null".to_string()))?;
        let mut branch = Branch::new(
            entry
                .color_light
                .unwrap_or_else(|| theme.branch_fill_color.clone()),
            entry
                .color_dark
                .unwrap_or_else(|| theme.branch_stroke_color.clone()),
        );
        branch.set_target_system(entry.system);
        if let Some(title) = entry.title {
            branch.set_title(title);
        }
        diagram.add_branch(name, branch)?;
    }

    for entry in file.steps {
        let step = Step::new(entry.kind.as_deref().unwrap_or_default(), entry.source, entry.target)?;
        diagram.add_step(step);
    }

    tracing::debug!(
        title = %diagram.title,
        branches = diagram.branches.count(),
        steps = diagram.steps.count(),
        "document parsed"
    );
    Ok(diagram)
}
