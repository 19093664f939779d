//! Path and link conversion utilities.
//!
//! This module handles conversions between:
//! - Source-relative page paths (e.g. "guide/setup.md")
//! - Output paths in the build tree (where rendered pages are written)
//! - Relative hrefs between rendered pages

use std::path::{Component, Path, PathBuf};

use crate::config::OutputFormat;

/// Convert a registered destination into the file the render stage writes.
///
/// # Examples
/// ```ignore
/// output_path("build/guide/setup.md", Html) => "build/guide/setup.html"
/// output_path("build/guide/setup.md", Markdown) => "build/guide/setup.md"
/// ```
pub fn output_path(dest_path: &Path, format: OutputFormat) -> PathBuf {
    match format {
        OutputFormat::Html => dest_path.with_extension("html"),
        OutputFormat::Markdown => dest_path.to_path_buf(),
    }
}

/// Join path components with `/`, whatever the platform separator.
pub fn to_url_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Prefix leading from a page back to the build root.
///
/// # Examples
/// ```ignore
/// root_prefix("index.md") => ""
/// root_prefix("guide/advanced/setup.md") => "../../"
/// ```
pub fn root_prefix(relative_page: &Path) -> String {
    let depth = relative_page
        .parent()
        .map(|p| p.components().filter(|c| matches!(c, Component::Normal(_))).count())
        .unwrap_or(0);
    "../".repeat(depth)
}

/// Relative href from one output file to another, both relative to the build root.
///
/// # Examples
/// ```ignore
/// relative_href("guide/setup.html", "guide/usage.html") => "usage.html"
/// relative_href("guide/setup.html", "index.html") => "../index.html"
/// relative_href("index.html", "api/types.html") => "api/types.html"
/// ```
pub fn relative_href(from: &Path, to: &Path) -> String {
    let from_dir: Vec<_> = from
        .parent()
        .map(|p| p.components().collect())
        .unwrap_or_default();
    let to_parts: Vec<_> = to.components().collect();

    let common = from_dir
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = std::iter::repeat_n("..".to_string(), from_dir.len() - common).collect();
    parts.extend(
        to_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

/// Get the base path from a config file path (its parent directory).
pub fn base_path_from_config(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}
