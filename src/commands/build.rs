use quire::build::{BuildContext, base_path_from_config, build_document};
use quire::config::BuildConfig;

use crate::BuildArgs;

pub async fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    let config_path = BuildConfig::resolve_config_path(args.config_file.as_deref())?;
    let config = BuildConfig::load_from_file(&config_path)?;

    // Get the base path for resolving relative paths
    let base_path = base_path_from_config(&config_path);

    let mut ctx = BuildContext::from_config(&config, &base_path);
    if let Some(clean) = args.clean_override() {
        ctx.clean_before_build = clean;
    }

    // The pipeline does blocking filesystem and process work.
    let (ctx, result) = tokio::task::spawn_blocking(move || {
        let result = build_document(&mut ctx);
        (ctx, result)
    })
    .await?;

    if let Err(err) = result {
        if let Some(report) = captured_output_report(&ctx.captured_output) {
            eprintln!("{report}");
        }
        return Err(err.into());
    }
    if !ctx.captured_output.is_empty() {
        tracing::debug!(output = %ctx.captured_output, "captured build output");
    }

    println!(
        "Built {} to {} ({} pages, {} static files)",
        ctx.site.name,
        ctx.build_root.display(),
        ctx.written.len(),
        ctx.mirror.files
    );
    if !ctx.warnings.is_empty() {
        println!("{} warning(s) reported by document checks", ctx.warnings.len());
    }

    Ok(())
}

/// What the build printed before it failed, if anything.
fn captured_output_report(captured: &str) -> Option<String> {
    let captured = captured.trim_end();
    if captured.is_empty() {
        return None;
    }
    let indented: Vec<String> = captured.lines().map(|line| format!("  {line}")).collect();
    Some(format!("Output captured during the build:\n{}", indented.join("\n")))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use quire::build::PipelineError;
    use tempfile::TempDir;

    use super::*;

    fn project(dir: &Path, index: &str) -> BuildArgs {
        std::fs::write(dir.join("quire.yaml"), "site:\n  name: Handbook\n").unwrap();
        std::fs::create_dir(dir.join("src")).unwrap();
        std::fs::write(dir.join("src/index.md"), index).unwrap();
        BuildArgs {
            config_file: Some(dir.join("quire.yaml")),
            clean: false,
            no_clean: false,
        }
    }

    #[test]
    fn test_captured_output_report() {
        assert_eq!(captured_output_report(""), None);
        assert_eq!(captured_output_report(" \n"), None);
        assert_eq!(
            captured_output_report("one\ntwo\n").as_deref(),
            Some("Output captured during the build:\n  one\n  two")
        );
    }

    // Both builds hold the process-wide output capture, so they run in one test.
    #[tokio::test]
    async fn test_build_writes_site_and_fails_on_doctest() {
        let dir = TempDir::new().unwrap();
        let args = project(dir.path(), "# {{ site.name }}\n");

        run(&args).await.unwrap();

        let html = std::fs::read_to_string(dir.path().join("build/index.html")).unwrap();
        assert!(html.contains("<title>Handbook - Handbook</title>"));

        let dir = TempDir::new().unwrap();
        let args = project(dir.path(), "# Home\n\n```doctest\n$ echo actual\nexpected\n```\n");

        let err = run(&args).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Doctest(failures)) if failures.len() == 1
        ));
        assert!(!dir.path().join("build/index.html").exists());
    }
}
