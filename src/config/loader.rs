use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;
use crate::invocation::{GrammarError, OptionGrammar};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `~/.config/callinfo/config.toml` on Unix/macOS,
    /// or equivalent on other platforms via `dirs::config_dir()`.
    /// Falls back to current directory if config_dir is unavailable.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("callinfo").join("config.toml")
    }

    /// Loads configuration from the default config file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`.
    ///
    /// - If the file doesn't exist, returns `Config::default()`.
    /// - If the file exists, parses it as TOML and validates.
    /// - Returns an error if reading, parsing, or validation fails.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The grammar patterns parse
    /// - Environment variable names are non-empty and contain no `=`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(short) = &self.grammar.short {
            OptionGrammar::parse(short, self.grammar.long.as_slice()).map_err(|e: GrammarError| {
                ConfigError::ValidationError {
                    message: format!("Invalid grammar: {}", e),
                }
            })?;
        }

        if let Some(bad) = self
            .report
            .env
            .iter()
            .find(|name| name.is_empty() || name.contains('='))
        {
            return Err(ConfigError::ValidationError {
                message: format!("Invalid environment variable name '{}'", bad),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.report.pretty);
    }

    #[test]
    fn full_file_parses() {
        let file = write_config(
            r#"
[grammar]
short = "a:h"
long = ["all::"]

[report]
env = ["HOME"]
pretty = false
read_stdin = true
stdin_timeout_ms = 250
"#,
        );
        let config = Config::load_from(file.path()).unwrap();

        assert_eq!(config.grammar.short.as_deref(), Some("a:h"));
        assert_eq!(config.grammar.long, vec!["all::".to_string()]);
        assert_eq!(config.report.env, vec!["HOME".to_string()]);
        assert!(!config.report.pretty);
        assert!(config.report.read_stdin);
        assert_eq!(config.report.stdin_timeout_ms, Some(250));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let file = write_config("[grammar\nshort = ");
        assert!(matches!(
            Config::load_from(file.path()),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn bad_grammar_is_validation_error() {
        let file = write_config("[grammar]\nshort = \":a\"\n");
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
        assert!(err.to_string().contains("Invalid grammar"));
    }

    #[test]
    fn bad_env_name_is_validation_error() {
        let config = Config {
            report: crate::config::ReportConfig {
                env: vec!["A=B".into()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_path_ends_with_app_dir() {
        assert!(Config::config_path().ends_with("callinfo/config.toml"));
    }
}
