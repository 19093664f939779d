use quire::build::base_path_from_config;
use quire::config::BuildConfig;

use crate::CleanArgs;

pub async fn run(args: &CleanArgs) -> Result<(), anyhow::Error> {
    let config_path = BuildConfig::resolve_config_path(args.config_file.as_deref())?;
    let config = BuildConfig::load_from_file(&config_path)?;
    let build_path = config.build_dir(&base_path_from_config(&config_path));

    if !build_path.exists() {
        println!("Nothing to clean at {}", build_path.display());
        return Ok(());
    }

    if args.dry_run {
        println!("Would delete {}", build_path.display());
    } else {
        tokio::fs::remove_dir_all(&build_path).await?;
        println!("Deleted {}", build_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;

    fn project(dir: &Path) -> CleanArgs {
        std::fs::write(dir.join("quire.yaml"), "build: out\n").unwrap();
        std::fs::create_dir_all(dir.join("out/guide")).unwrap();
        std::fs::write(dir.join("out/guide/setup.html"), "<p>old</p>").unwrap();
        CleanArgs {
            config_file: Some(dir.join("quire.yaml")),
            dry_run: false,
        }
    }

    #[tokio::test]
    async fn test_dry_run_keeps_build_directory() {
        let dir = TempDir::new().unwrap();
        let mut args = project(dir.path());
        args.dry_run = true;

        run(&args).await.unwrap();

        assert!(dir.path().join("out/guide/setup.html").exists());
    }

    #[tokio::test]
    async fn test_clean_deletes_build_directory() {
        let dir = TempDir::new().unwrap();
        let args = project(dir.path());

        run(&args).await.unwrap();

        assert!(!dir.path().join("out").exists());
        assert!(dir.path().join("quire.yaml").exists());
        // Nothing left to delete is not an error.
        run(&args).await.unwrap();
    }
}
