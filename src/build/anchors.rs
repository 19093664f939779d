//! Heading anchors collected during template expansion.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::paths::to_url_path;

/// Where an anchor lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Page path relative to the source root
    pub page: PathBuf,
    /// Heading id within the page
    pub id: String,
    /// Heading text
    pub text: String,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AnchorError {
    #[error("no heading with id '{0}'")]
    Missing(String),

    #[error("'{id}' is defined on {} pages: {}", .pages.len(), .pages.join(", "))]
    Ambiguous { id: String, pages: Vec<String> },
}

/// Anchors keyed by heading id.
#[derive(Debug, Clone, Default)]
pub struct AnchorIndex {
    anchors: HashMap<String, Vec<Anchor>>,
}

impl AnchorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, anchor: Anchor) {
        self.anchors.entry(anchor.id.clone()).or_default().push(anchor);
    }

    /// Resolve a reference key as seen from `current_page`.
    ///
    /// Keys are either a bare id (`setup`) or page-qualified
    /// (`guide/install.md#setup`). A bare id defined on the current page
    /// resolves there; otherwise it must be defined on exactly one page.
    pub fn resolve(&self, key: &str, current_page: &Path) -> Result<&Anchor, AnchorError> {
        if let Some((page, id)) = key.rsplit_once('#') {
            return self
                .anchors
                .get(id)
                .and_then(|candidates| {
                    candidates
                        .iter()
                        .find(|a| to_url_path(&a.page) == to_url_path(Path::new(page)))
                })
                .ok_or_else(|| AnchorError::Missing(key.to_string()));
        }

        let candidates = self
            .anchors
            .get(key)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AnchorError::Missing(key.to_string()))?;

        if let Some(local) = candidates.iter().find(|a| a.page == current_page) {
            return Ok(local);
        }

        match candidates.as_slice() {
            [only] => Ok(only),
            many => Err(AnchorError::Ambiguous {
                id: key.to_string(),
                pages: many.iter().map(|a| to_url_path(&a.page)).collect(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.anchors.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
