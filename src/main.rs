use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "quire", version, about)]
struct Args {
    /// The command to execute
    #[command(subcommand)]
    command: QuireCommand,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
struct InitArgs {
    /// The path to initialize the project in
    path: PathBuf,

    /// Whether to create the directory if it doesn't exist
    #[arg(short, long, default_value = "false")]
    create: bool,
}

#[derive(Parser)]
struct BuildArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "quire.yaml")]
    config_file: Option<PathBuf>,

    /// Remove the build directory before mirroring (overrides the config)
    #[arg(long, conflicts_with = "no_clean")]
    clean: bool,

    /// Keep files left over from previous builds (overrides the config)
    #[arg(long)]
    no_clean: bool,
}

impl BuildArgs {
    fn clean_override(&self) -> Option<bool> {
        match (self.clean, self.no_clean) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Parser)]
struct CleanArgs {
    /// The path to the configuration file
    #[arg(short, long, default_value = "quire.yaml")]
    config_file: Option<PathBuf>,

    /// Print what would be deleted without deleting anything
    #[arg(long, default_value = "false")]
    dry_run: bool,
}

#[derive(Subcommand)]
enum QuireCommand {
    /// Initialize a new quire project
    Init(InitArgs),

    /// Build the documentation
    Build(BuildArgs),

    /// Delete the build directory
    Clean(CleanArgs),
}

fn init_tracing(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match args.verbose {
        0 => "quire=info",
        1 => "quire=debug",
        _ => "quire=trace",
    };

    let env_filter = EnvFilter::try_from_env("QUIRE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr; stdout carries build summaries and doctest output.
    match args.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    init_tracing(&args);

    match args.command {
        QuireCommand::Init(args) => {
            commands::init::run(&args).await?;
        }
        QuireCommand::Build(args) => {
            commands::build::run(&args).await?;
        }
        QuireCommand::Clean(args) => {
            commands::clean::run(&args).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_clean_flags() {
        let args = Args::parse_from(["quire", "build", "--no-clean"]);
        let QuireCommand::Build(build) = args.command else {
            panic!("expected build command");
        };
        assert_eq!(build.clean_override(), Some(false));
        assert_eq!(build.config_file, Some(PathBuf::from("quire.yaml")));

        let args = Args::parse_from(["quire", "-vv", "build"]);
        assert_eq!(args.verbose, 2);
        let QuireCommand::Build(build) = args.command else {
            panic!("expected build command");
        };
        assert_eq!(build.clean_override(), None);
    }

    #[test]
    fn test_clean_and_no_clean_conflict() {
        assert!(Args::try_parse_from(["quire", "build", "--clean", "--no-clean"]).is_err());
    }
}
