//! Build directory setup.
//!
//! Mirrors the source tree into the build tree: every source directory gets
//! a build directory, non-markdown files are copied verbatim, and markdown
//! files are registered as pages without being written.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use super::pipeline::{BuildContext, PipelineError};

/// What a mirror pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStats {
    /// Build directories created (existing ones are not counted)
    pub directories: usize,
    /// Files copied into the build tree
    pub files: usize,
    /// Markdown files registered as pages
    pub pages: usize,
}

/// Whether a file name marks a page. The match is case-sensitive.
pub fn is_document(file_name: &OsStr) -> bool {
    file_name.as_encoded_bytes().ends_with(b".md")
}

/// Mirror `ctx.source_root` into `ctx.build_root`.
///
/// Both roots are canonicalized and written back to the context. Fails with
/// [`PipelineError::MissingSourceDirectory`] before touching anything when
/// the source root is not a directory, and with
/// [`PipelineError::BuildRootContainsSource`] when the build root is the
/// source root or one of its ancestors. Any later filesystem error aborts the
/// mirror and leaves whatever was already created in place.
pub fn mirror(ctx: &mut BuildContext) -> Result<MirrorStats, PipelineError> {
    if !ctx.source_root.is_dir() {
        return Err(PipelineError::MissingSourceDirectory(ctx.source_root.clone()));
    }
    let source_root = ctx
        .source_root
        .canonicalize()
        .map_err(|e| PipelineError::io(&ctx.source_root, e))?;

    // The build root must not be the source root or one of its ancestors.
    if let Ok(existing_build) = ctx.build_root.canonicalize()
        && source_root.starts_with(&existing_build)
    {
        return Err(PipelineError::BuildRootContainsSource {
            build: existing_build,
            source_dir: source_root,
        });
    }

    if ctx.clean_before_build && ctx.build_root.exists() {
        tracing::debug!(path = %ctx.build_root.display(), "cleaning build directory");
        fs::remove_dir_all(&ctx.build_root).map_err(|e| PipelineError::io(&ctx.build_root, e))?;
    }

    let mut stats = MirrorStats::default();
    if !ctx.build_root.is_dir() {
        fs::create_dir(&ctx.build_root).map_err(|e| PipelineError::io(&ctx.build_root, e))?;
        stats.directories += 1;
    }
    let build_root = ctx
        .build_root
        .canonicalize()
        .map_err(|e| PipelineError::io(&ctx.build_root, e))?;

    ctx.source_root = source_root.clone();
    ctx.build_root = build_root.clone();

    // A build root nested in the source tree is never mirrored into itself.
    let walker = WalkDir::new(&source_root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.path() != build_root.as_path());

    for entry in walker {
        let entry = entry.map_err(|e| walk_error(&source_root, e))?;
        let Ok(relative) = entry.path().strip_prefix(&source_root) else {
            continue;
        };
        let target = build_root.join(relative);

        if entry.file_type().is_dir() {
            if !target.is_dir() {
                fs::create_dir(&target).map_err(|e| PipelineError::io(&target, e))?;
                stats.directories += 1;
            }
        } else if entry.path().is_file() {
            if is_document(entry.file_name()) {
                ctx.add_page(entry.path().to_path_buf(), target);
                stats.pages += 1;
            } else {
                fs::copy(entry.path(), &target).map_err(|e| PipelineError::io(&target, e))?;
                stats.files += 1;
            }
        }
    }

    Ok(stats)
}

fn walk_error(source_root: &Path, error: walkdir::Error) -> PipelineError {
    let path = error
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| source_root.to_path_buf());
    let message = error.to_string();
    let source = error
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::other(message));
    PipelineError::Io { path, source }
}
