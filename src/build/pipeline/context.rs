//! Build context shared by every stage of one run.

use std::path::{Path, PathBuf};

use crate::build::anchors::AnchorIndex;
use crate::build::capture::OutputCapture;
use crate::build::document::ExpandedDocument;
use crate::build::mirror::MirrorStats;
use crate::build::page::PageRegistry;
use crate::build::render::SiteContext;
use crate::config::{BuildConfig, OutputFormat};

/// Shared mutable state threaded through the document pipeline.
///
/// Created once per build by the caller, passed by `&mut` to every stage and
/// dropped when the run ends. Stages read the configuration fields and fill
/// in the output fields as they go.
#[derive(Debug)]
pub struct BuildContext {
    // === Layout ===
    /// Directory holding the documentation sources
    pub source_root: PathBuf,

    /// Directory the source tree is mirrored into
    pub build_root: PathBuf,

    /// Remove the build directory before mirroring
    pub clean_before_build: bool,

    // === Settings ===
    /// Site metadata for templates
    pub site: SiteContext,

    /// How pages are emitted
    pub format: OutputFormat,

    /// Run doctests during the check stage
    pub doctest: bool,

    /// Fail on missing documentation instead of warning
    pub strict_checks: bool,

    /// Pages (relative to the source root) that must be registered
    pub required_pages: Vec<PathBuf>,

    /// Custom page template
    pub template: Option<PathBuf>,

    // === Stage output ===
    /// Markdown files registered by the setup stage
    pub pages: PageRegistry,

    /// Counts from the setup stage
    pub mirror: MirrorStats,

    /// Expanded pages, in registration order
    pub documents: Vec<ExpandedDocument>,

    /// Heading anchors collected during expansion
    pub anchors: AnchorIndex,

    /// Output capture held between the redirect and restore stages
    pub capture: Option<OutputCapture>,

    /// Everything captured while output was redirected
    pub captured_output: String,

    /// Non-fatal problems reported by the check stage
    pub warnings: Vec<String>,

    /// Files written by the render stage
    pub written: Vec<PathBuf>,
}

impl BuildContext {
    /// Create a context with default settings.
    pub fn new(source_root: impl Into<PathBuf>, build_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            build_root: build_root.into(),
            clean_before_build: true,
            site: SiteContext {
                name: "Documentation".to_string(),
                url: None,
            },
            format: OutputFormat::default(),
            doctest: true,
            strict_checks: false,
            required_pages: Vec::new(),
            template: None,
            pages: PageRegistry::new(),
            mirror: MirrorStats::default(),
            documents: Vec::new(),
            anchors: AnchorIndex::new(),
            capture: None,
            captured_output: String::new(),
            warnings: Vec::new(),
            written: Vec::new(),
        }
    }

    /// Create a context from a loaded config.
    ///
    /// Relative paths resolve against `base_path` (the config file's directory).
    pub fn from_config(config: &BuildConfig, base_path: &Path) -> Self {
        let mut ctx = Self::new(config.source_dir(base_path), config.build_dir(base_path));
        ctx.clean_before_build = config.clean;
        ctx.site = SiteContext {
            name: config.site.name.clone(),
            url: config.site.url.clone(),
        };
        ctx.format = config.format;
        ctx.doctest = config.checks.doctest;
        ctx.strict_checks = config.checks.strict;
        ctx.required_pages = config.checks.required.clone();
        ctx.template = config.template_path(base_path);
        ctx
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean_before_build = clean;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_doctest(mut self, doctest: bool) -> Self {
        self.doctest = doctest;
        self
    }

    /// Report stage progress. Never fails.
    pub fn log(&self, message: &str) {
        tracing::info!(
            source = %self.source_root.display(),
            build = %self.build_root.display(),
            "{message}"
        );
    }

    /// Register a page. Idempotent per (source, destination) pair.
    pub fn add_page(&mut self, source_path: PathBuf, dest_path: PathBuf) -> bool {
        self.pages.add(source_path, dest_path)
    }

    /// Source path relative to the source root.
    pub fn relative_to_source<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.source_root).unwrap_or(path)
    }
}
