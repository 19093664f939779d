//! Configuration loading from files.
//!
//! The YAML file is layered under `QUIRE_`-prefixed environment variables,
//! so `QUIRE_CLEAN=false` or `QUIRE_SITE__NAME=Docs` override file values.

use std::path::{Path, PathBuf};

use ::config::Map;

use super::{BuildConfig, ConfigError};

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "QUIRE";

impl BuildConfig {
    /// Resolve the config file path given on the command line.
    ///
    /// Defaults to `quire.yaml`; relative paths resolve against the current
    /// working directory.
    pub fn resolve_config_path(config_file: Option<&Path>) -> Result<PathBuf, ConfigError> {
        let config_file = config_file.unwrap_or(Path::new("quire.yaml"));
        if config_file.is_relative() {
            Ok(std::env::current_dir()
                .map_err(ConfigError::CwdFailure)?
                .join(config_file))
        } else {
            Ok(config_file.to_path_buf())
        }
    }

    /// Load the config from the command line argument, defaulting to `quire.yaml`
    pub fn load_from_arg(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from_file(&Self::resolve_config_path(config_file)?)
    }

    /// Load the config from a file path, with overrides from the process
    /// environment.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Load the config from a file path. `env` stands in for the process
    /// environment when given.
    fn load_with_env(path: &Path, env: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path).format(::config::FileFormat::Yaml))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: BuildConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce a build.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.source.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "'source' must name a directory".to_string(),
            ));
        }
        if self.build.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "'build' must name a directory".to_string(),
            ));
        }
        if self.source == self.build {
            return Err(ConfigError::Validation(
                "'source' and 'build' must be different directories".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quire.yaml");
        std::fs::write(
            &path,
            "site:\n  name: Handbook\nsource: docs\nbuild: out\nclean: false\nformat: markdown\nchecks:\n  strict: true\n  required:\n    - index.md\n",
        )
        .unwrap();

        let config = BuildConfig::load_from_file(&path).unwrap();
        assert_eq!(config.site.name, "Handbook");
        assert_eq!(config.source, Path::new("docs"));
        assert_eq!(config.build, Path::new("out"));
        assert!(!config.clean);
        assert_eq!(config.format, OutputFormat::Markdown);
        assert!(config.checks.strict);
        assert_eq!(config.checks.required, vec![Path::new("index.md")]);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quire.yaml");
        std::fs::write(&path, "site:\n  name: Handbook\nclean: true\n").unwrap();

        let env: Map<String, String> = [
            ("QUIRE_CLEAN", "false"),
            ("QUIRE_SITE__NAME", "Field Guide"),
            ("OTHER_CLEAN", "true"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = BuildConfig::load_with_env(&path, Some(env)).unwrap();
        assert!(!config.clean);
        assert_eq!(config.site.name, "Field Guide");
        assert_eq!(config.source, Path::new("src"));
    }

    #[test]
    fn test_resolve_config_path() {
        let absolute = Path::new("/project/quire.yaml");
        assert_eq!(
            BuildConfig::resolve_config_path(Some(absolute)).unwrap(),
            absolute
        );

        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            BuildConfig::resolve_config_path(None).unwrap(),
            cwd.join("quire.yaml")
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = BuildConfig::load_from_file(&dir.path().join("nope.yaml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_same_source_and_build_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quire.yaml");
        std::fs::write(&path, "source: docs\nbuild: docs\n").unwrap();

        let result = BuildConfig::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }
}
