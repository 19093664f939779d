//! Pipeline error types.

use std::path::PathBuf;

use super::dispatch::DispatchError;
use crate::build::capture::CaptureError;
use crate::build::doctest::DoctestFailure;
use crate::build::render::RenderError;

/// Errors that can occur during pipeline processing.
///
/// Every variant is fatal: the run stops at the first error and leaves any
/// partially written build tree in place.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source directory does not exist: {0}")]
    MissingSourceDirectory(PathBuf),

    #[error("build directory {build} contains the source directory {source_dir}")]
    BuildRootContainsSource { build: PathBuf, source_dir: PathBuf },

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("output capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("template error in {page}: {source}")]
    Template {
        page: PathBuf,
        #[source]
        source: tera::Error,
    },

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("unresolved reference '{target}' in {page}: {reason}")]
    CrossReference {
        page: PathBuf,
        target: String,
        reason: String,
    },

    #[error("missing documentation: {}", .0.join("; "))]
    MissingDocs(Vec<String>),

    #[error("{} doctest(s) failed:\n{}", .0.len(), format_failures(.0))]
    Doctest(Vec<DoctestFailure>),

    #[error("stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },
}

impl PipelineError {
    /// Create an IO error tied to a path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a stage-specific error.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

fn format_failures(failures: &[DoctestFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("  {f}"))
        .collect::<Vec<_>>()
        .join("\n")
}
