//! Document check stage.
//!
//! Runs the missing-documentation check, then the doctests, over the fully
//! expanded pages.

use crate::build::doctest::{extract_doctests, run_doctest};
use crate::build::paths::to_url_path;
use crate::build::pipeline::{BuildContext, PipelineError};

pub fn run(ctx: &mut BuildContext) -> Result<(), PipelineError> {
    check_missing_docs(ctx)?;
    run_doctests(ctx)
}

/// Report required pages that were never registered and pages with no content.
///
/// Problems are warnings unless strict checks are on.
pub fn check_missing_docs(ctx: &mut BuildContext) -> Result<(), PipelineError> {
    let mut problems = Vec::new();

    for required in &ctx.required_pages {
        let source = ctx.source_root.join(required);
        if !ctx.pages.contains(&source) {
            problems.push(format!("required page '{}' is missing", to_url_path(required)));
        }
    }

    for doc in &ctx.documents {
        if doc.content.trim().is_empty() {
            problems.push(format!(
                "page '{}' has no content",
                to_url_path(&doc.relative_path)
            ));
        }
    }

    if problems.is_empty() {
        return Ok(());
    }
    if ctx.strict_checks {
        return Err(PipelineError::MissingDocs(problems));
    }
    for problem in &problems {
        tracing::warn!("{problem}");
    }
    ctx.warnings.extend(problems);
    Ok(())
}

/// Run every doctest found in the expanded pages.
///
/// All doctests run even after a failure, so the error lists every mismatch.
pub fn run_doctests(ctx: &BuildContext) -> Result<(), PipelineError> {
    if !ctx.doctest {
        tracing::debug!("doctests disabled");
        return Ok(());
    }

    let mut failures = Vec::new();
    let mut total = 0;
    for doc in &ctx.documents {
        for test in extract_doctests(&doc.content) {
            total += 1;
            let outcome = run_doctest(&test, &doc.relative_path, &ctx.source_root)
                .map_err(|e| PipelineError::io(&doc.source_path, e))?;
            if let Some(failure) = outcome {
                failures.push(failure);
            }
        }
    }

    tracing::debug!(total, failed = failures.len(), "ran doctests");
    if failures.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::Doctest(failures))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;
    use crate::build::capture::{self, OutputCapture};
    use crate::build::document::{ExpandedDocument, FrontMatter};

    fn doc(root: &std::path::Path, relative: &str, content: &str) -> ExpandedDocument {
        ExpandedDocument {
            source_path: root.join(relative),
            dest_path: PathBuf::from("/build").join(relative),
            relative_path: PathBuf::from(relative),
            front_matter: FrontMatter::default(),
            content: content.to_string(),
            toc: vec![],
        }
    }

    #[test]
    fn test_missing_required_page_warns() {
        let mut ctx = BuildContext::new("/src", "/build");
        ctx.required_pages = vec![PathBuf::from("index.md"), PathBuf::from("api.md")];
        ctx.add_page("/src/index.md".into(), "/build/index.md".into());

        check_missing_docs(&mut ctx).unwrap();

        assert_eq!(ctx.warnings, vec!["required page 'api.md' is missing".to_string()]);
    }

    #[test]
    fn test_empty_page_is_error_when_strict() {
        let mut ctx = BuildContext::new("/src", "/build");
        ctx.strict_checks = true;
        ctx.documents = vec![doc(std::path::Path::new("/src"), "blank.md", "  \n")];

        let err = check_missing_docs(&mut ctx).unwrap_err();
        assert!(matches!(err, PipelineError::MissingDocs(ref problems) if problems.len() == 1));
    }

    #[test]
    fn test_doctests_pass_and_are_captured() {
        let _guard = capture::serial();
        let dir = TempDir::new().unwrap();
        let mut ctx = BuildContext::new(dir.path(), dir.path().join("build"));
        ctx.documents = vec![doc(
            dir.path(),
            "index.md",
            "```doctest\n$ echo ok\nok\n```\n",
        )];

        let capture = OutputCapture::acquire().unwrap();
        run_doctests(&ctx).unwrap();
        assert_eq!(capture.release(), "ok\n");
    }

    #[test]
    fn test_doctest_failures_are_collected() {
        let _guard = capture::serial();
        let dir = TempDir::new().unwrap();
        let mut ctx = BuildContext::new(dir.path(), dir.path().join("build"));
        ctx.documents = vec![
            doc(dir.path(), "a.md", "```doctest\n$ echo one\ntwo\n```\n"),
            doc(dir.path(), "b.md", "```doctest\n$ echo three\nfour\n```\n"),
        ];

        let capture = OutputCapture::acquire().unwrap();
        let err = run_doctests(&ctx).unwrap_err();
        capture.release();

        assert!(matches!(err, PipelineError::Doctest(ref failures) if failures.len() == 2));
    }

    #[test]
    fn test_doctests_can_be_disabled() {
        let mut ctx = BuildContext::new("/src", "/build").with_doctest(false);
        ctx.documents = vec![doc(
            std::path::Path::new("/src"),
            "a.md",
            "```doctest\n$ false\n```\n",
        )];
        run_doctests(&ctx).unwrap();
    }
}
