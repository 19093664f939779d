use quire::config::{BuildConfig, SiteConfig};

use crate::InitArgs;

const INDEX_PAGE: &str = "# {{ site.name }}\n\nWelcome! Edit `src/index.md` to get started.\n";

pub async fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = if args.path.is_relative() {
        std::env::current_dir()?.join(&args.path)
    } else {
        args.path.clone()
    };

    if !path.exists() {
        if args.create {
            tokio::fs::create_dir_all(&path).await?;
            println!("Created directory {path}", path = path.display());
        } else {
            return Err(anyhow::anyhow!(
                "Directory does not exist: {path}",
                path = path.display()
            ));
        }
    }

    let config_file = path.join("quire.yaml");
    if config_file.exists() {
        return Err(anyhow::anyhow!(
            "Config file already exists: {config_file}",
            config_file = config_file.display()
        ));
    }

    let default_config = BuildConfig {
        site: SiteConfig {
            name: "My Documentation".into(),
            url: None,
        },
        ..BuildConfig::default()
    };

    println!("Initializing project in {}", path.display());

    let config_text = serde_yaml::to_string(&default_config)?;
    tokio::fs::write(&config_file, config_text).await?;
    println!(
        "Created config file {config_file}",
        config_file = config_file.display()
    );

    let source_dir = default_config.source_dir(&path);
    let index = source_dir.join("index.md");
    if !index.exists() {
        tokio::fs::create_dir_all(&source_dir).await?;
        tokio::fs::write(&index, INDEX_PAGE).await?;
        println!("Created page {index}", index = index.display());
    }

    Ok(())
}
