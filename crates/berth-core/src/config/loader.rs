//! Configuration loader.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use super::error::ConfigError;
use super::schema::Config;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").unwrap_or_else(|e| unreachable!("static pattern: {e}"))
});

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load and validate configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();
        for cap in ENV_VAR.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::Duration;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::ports::{Capability, StoreKey};

    #[test]
    fn empty_config_uses_defaults() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.requirements.package, "pex");
        assert_eq!(
            config.storage.slow_query_threshold(),
            Duration::from_millis(25)
        );
    }

    #[test]
    fn full_config() {
        let content = r#"
            [storage]
            key_qualifier = "in_mem"
            slow_query_threshold_ms = 5

            [requirements]
            package = "pip-tools"
            version_file = "tools/version"
            output = "tools/requirements.txt"
            python = "python3.11"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.storage.key_qualifier.as_deref(), Some("in_mem"));
        assert_eq!(config.requirements.package, "pip-tools");
        assert_eq!(config.requirements.output, PathBuf::from("tools/requirements.txt"));
        assert_eq!(
            config.storage.key_factory().create(Capability::TaskStore),
            StoreKey::qualified(Capability::TaskStore, "in_mem")
        );
    }

    #[test]
    fn missing_qualifier_gives_plain_keys() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(
            config.storage.key_factory().create(Capability::CronJobStore),
            StoreKey::primary(Capability::CronJobStore)
        );
    }

    #[test]
    fn empty_package_is_rejected() {
        let result = ConfigLoader::load_str("[requirements]\npackage = \"\"\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { field, .. }) if field == "requirements.package"
        ));
    }

    #[test]
    fn blank_qualifier_is_rejected() {
        let result = ConfigLoader::load_str("[storage]\nkey_qualifier = \" \"\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn unset_env_var_is_an_error() {
        let result = ConfigLoader::load_str(
            "[requirements]\npackage = \"${BERTH_TEST_SURELY_UNSET_VARIABLE}\"\n",
        );
        assert!(matches!(
            result,
            Err(ConfigError::EnvVarNotSet(name)) if name == "BERTH_TEST_SURELY_UNSET_VARIABLE"
        ));
    }

    #[test]
    fn env_vars_are_expanded() {
        // PATH is set in any test environment.
        let path = std::env::var("PATH").unwrap();
        let config =
            ConfigLoader::load_str("[storage]\nkey_qualifier = \"q${PATH}\"\n").unwrap();
        assert_eq!(config.storage.key_qualifier, Some(format!("q{path}")));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let result = ConfigLoader::load_str("[storage\n");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[requirements]\npython = \"python3.12\"").unwrap();
        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.requirements.python, "python3.12");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
