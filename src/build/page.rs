//! Registered pages.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A document source destined for rendering.
///
/// Registering a page never touches the filesystem; the destination is only
/// written by the render stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Absolute path of the markdown source
    pub source_path: PathBuf,
    /// Absolute path the page is mirrored to in the build tree
    pub dest_path: PathBuf,
}

/// Pages keyed by source path, iterated in registration order.
#[derive(Debug, Clone, Default)]
pub struct PageRegistry {
    pages: Vec<Page>,
    index: HashMap<PathBuf, usize>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page. Returns `false` when the exact pair was already known.
    ///
    /// Re-registering a source with a new destination updates it in place.
    pub fn add(&mut self, source_path: PathBuf, dest_path: PathBuf) -> bool {
        if let Some(&position) = self.index.get(&source_path) {
            let page = &mut self.pages[position];
            if page.dest_path == dest_path {
                return false;
            }
            page.dest_path = dest_path;
            return true;
        }

        self.index.insert(source_path.clone(), self.pages.len());
        self.pages.push(Page {
            source_path,
            dest_path,
        });
        true
    }

    pub fn get(&self, source_path: &Path) -> Option<&Page> {
        self.index.get(source_path).map(|&i| &self.pages[i])
    }

    pub fn contains(&self, source_path: &Path) -> bool {
        self.index.contains_key(source_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
