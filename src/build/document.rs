use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::markdown::TocEntry;

// =============================================================================
// Front matter
// =============================================================================

/// Front matter metadata parsed from the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrontMatter {
    /// Page title (overrides the first heading and the filename)
    pub title: Option<String>,
    /// Page description for templates
    pub description: Option<String>,
    /// Additional arbitrary metadata (available in templates as `page.extra.*`)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// Result of parsing front matter from markdown content.
#[derive(Debug)]
pub struct ParsedContent {
    /// The parsed front matter (empty if none found)
    pub front_matter: FrontMatter,
    /// The markdown content without the front matter block
    pub content: String,
}

/// Parse front matter from markdown content.
///
/// Front matter is a YAML block delimited by `---` at the start of the file:
///
/// ```markdown
/// ---
/// title: My Page
/// description: A description
/// ---
///
/// # Content starts here
/// ```
///
/// Invalid YAML is reported as a warning and treated as empty front matter.
pub fn parse_front_matter(content: &str) -> ParsedContent {
    let trimmed = content.trim_start();

    let Some(after_opening) = trimmed.strip_prefix("---") else {
        return ParsedContent {
            front_matter: FrontMatter::default(),
            content: content.to_string(),
        };
    };

    let Some(closing_pos) = after_opening.find("\n---") else {
        return ParsedContent {
            front_matter: FrontMatter::default(),
            content: content.to_string(),
        };
    };

    let yaml_content = after_opening[..closing_pos].trim_start_matches('\n');
    let markdown_content = after_opening[closing_pos + 4..]
        .trim_start_matches(['\r', '\n'])
        .to_string();

    let front_matter = if yaml_content.trim().is_empty() {
        FrontMatter::default()
    } else {
        match serde_yaml::from_str(yaml_content) {
            Ok(fm) => fm,
            Err(e) => {
                tracing::warn!(error = %e, "failed to parse front matter");
                FrontMatter::default()
            }
        }
    };

    ParsedContent {
        front_matter,
        content: markdown_content,
    }
}

// =============================================================================
// Expanded documents
// =============================================================================

/// A registered page after template expansion.
///
/// Produced by the expand stage, rewritten in place by the cross-reference
/// stage, and consumed by the check and render stages.
#[derive(Debug, Clone)]
pub struct ExpandedDocument {
    /// Absolute source path (the page registry key)
    pub source_path: PathBuf,
    /// Absolute destination in the build tree
    pub dest_path: PathBuf,
    /// Source path relative to the source root (e.g. "guide/setup.md")
    pub relative_path: PathBuf,
    /// Front matter metadata
    pub front_matter: FrontMatter,
    /// Markdown with templates expanded (and references resolved after stage 4)
    pub content: String,
    /// Headings found in the expanded content
    pub toc: Vec<TocEntry>,
}

impl ExpandedDocument {
    /// Get the document title.
    ///
    /// Prefers front matter, then the first level-one heading, then the
    /// file name.
    pub fn title(&self) -> String {
        if let Some(title) = &self.front_matter.title {
            return title.clone();
        }
        if let Some(heading) = self.toc.iter().find(|entry| entry.level == 1) {
            return heading.text.clone();
        }
        title_from_path(&self.relative_path)
    }
}

/// Title derived from a page's file name: `first-steps.md` becomes
/// "First Steps". Separator runs collapse, so `a--b` is "A B".
fn title_from_path(path: &Path) -> String {
    let words: Vec<String> = path
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default()
        .split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect())
                .unwrap_or_default()
        })
        .collect();

    if words.is_empty() {
        "Untitled".to_string()
    } else {
        words.join(" ")
    }
}
