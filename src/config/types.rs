//! Configuration type definitions.
//!
//! This module contains the data structures read from `quire.yaml`.
//! These types are pure data - no I/O or complex logic.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// =============================================================================
// Root config
// =============================================================================

/// The build configuration for one documentation project.
///
/// ```yaml
/// site:
///   name: My Project
/// source: src
/// build: build
/// clean: true
/// format: html
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Site metadata available to templates as `site.*`
    #[serde(default)]
    pub site: SiteConfig,

    /// Directory holding the documentation sources
    #[serde(default = "default_source")]
    pub source: PathBuf,

    /// Directory the build tree is mirrored into
    #[serde(default = "default_build")]
    pub build: PathBuf,

    /// Remove the build directory before mirroring
    #[serde(default = "default_true")]
    pub clean: bool,

    /// Output format written by the render stage
    #[serde(default)]
    pub format: OutputFormat,

    /// Document checks run before rendering
    #[serde(default)]
    pub checks: ChecksConfig,

    /// Optional page template replacing the built-in one (html format only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            source: default_source(),
            build: default_build(),
            clean: true,
            format: OutputFormat::default(),
            checks: ChecksConfig::default(),
            template: None,
        }
    }
}

impl BuildConfig {
    /// Resolve the source directory against the config file's directory.
    pub fn source_dir(&self, base_path: &Path) -> PathBuf {
        resolve_path(base_path, &self.source)
    }

    /// Resolve the build directory against the config file's directory.
    pub fn build_dir(&self, base_path: &Path) -> PathBuf {
        resolve_path(base_path, &self.build)
    }

    /// Resolve the custom template path, if any.
    pub fn template_path(&self, base_path: &Path) -> Option<PathBuf> {
        self.template.as_deref().map(|t| resolve_path(base_path, t))
    }
}

fn resolve_path(base_path: &Path, path: &Path) -> PathBuf {
    if path.is_relative() {
        base_path.join(path)
    } else {
        path.to_path_buf()
    }
}

fn default_source() -> PathBuf {
    PathBuf::from("src")
}

fn default_build() -> PathBuf {
    PathBuf::from("build")
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Site
// =============================================================================

/// Site-level metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site name shown in page titles
    #[serde(default = "default_site_name")]
    pub name: String,

    /// Public URL of the deployed site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: default_site_name(),
            url: None,
        }
    }
}

fn default_site_name() -> String {
    "Documentation".to_string()
}

// =============================================================================
// Output format
// =============================================================================

/// How registered pages are emitted by the render stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown rendered to HTML and wrapped in the page template
    #[default]
    Html,
    /// Expanded markdown written verbatim
    Markdown,
}

// =============================================================================
// Checks
// =============================================================================

/// Document check settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecksConfig {
    /// Run `doctest` code blocks and compare their output
    #[serde(default = "default_true")]
    pub doctest: bool,

    /// Treat missing documentation as an error instead of a warning
    #[serde(default)]
    pub strict: bool,

    /// Pages (relative to the source directory) that must exist
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<PathBuf>,
}

impl Default for ChecksConfig {
    fn default() -> Self {
        Self {
            doctest: true,
            strict: false,
            required: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config: BuildConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.source, PathBuf::from("src"));
        assert_eq!(config.build, PathBuf::from("build"));
        assert!(config.clean);
        assert_eq!(config.format, OutputFormat::Html);
        assert!(config.checks.doctest);
        assert!(!config.checks.strict);
        assert_eq!(config.site.name, "Documentation");
    }

    #[test]
    fn test_format_is_lowercase() {
        let config: BuildConfig = serde_yaml::from_str("format: markdown").unwrap();
        assert_eq!(config.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_relative_paths_resolve_against_base() {
        let config: BuildConfig =
            serde_yaml::from_str("source: docs/src\nbuild: /tmp/out\ntemplate: page.html").unwrap();
        let base = Path::new("/project");
        assert_eq!(config.source_dir(base), PathBuf::from("/project/docs/src"));
        assert_eq!(config.build_dir(base), PathBuf::from("/tmp/out"));
        assert_eq!(
            config.template_path(base),
            Some(PathBuf::from("/project/page.html"))
        );
    }
}
