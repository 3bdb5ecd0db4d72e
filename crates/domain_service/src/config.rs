//! Toolkit configuration

use std::path::Path;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;

use core_kernel::{init_tracing, CoreError, LogConfig};
use domain_entity::ClonePolicy;

/// Environment variable prefix, e.g. `XRM_LOG__LEVEL=debug`
pub const ENV_PREFIX: &str = "XRM";

/// Toolkit configuration
///
/// Every field has a default, so an empty environment yields a usable
/// configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Logging setup
    pub log: LogConfig,
    /// Attributes left out when records are cloned
    pub clone_policy: ClonePolicy,
}

impl ToolkitConfig {
    /// Loads configuration from environment
    ///
    /// Every loader returns `CoreError::Configuration` when a source cannot
    /// be read or a value does not fit its field.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::load(Config::builder(), environment())
    }

    /// Loads configuration from a file, with environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        Self::load(
            Config::builder().add_source(File::from(path.as_ref())),
            environment(),
        )
    }

    /// Loads configuration from TOML text, with environment overrides
    pub fn from_toml(contents: &str) -> Result<Self, CoreError> {
        Self::load(
            Config::builder().add_source(File::from_str(contents, FileFormat::Toml)),
            environment(),
        )
    }

    fn load(builder: ConfigBuilder<DefaultState>, env: Environment) -> Result<Self, CoreError> {
        builder
            .add_source(env)
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| CoreError::configuration(e.to_string()))
    }

    /// Installs the global tracing subscriber described by `log`
    pub fn init_tracing(&self) -> Result<(), CoreError> {
        init_tracing(&self.log)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::LogFormat;

    #[test]
    fn test_defaults() {
        let config = ToolkitConfig::default();
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.format, LogFormat::Compact);
        assert_eq!(config.clone_policy, ClonePolicy::default());
    }

    #[test]
    fn test_from_toml() {
        let config = ToolkitConfig::from_toml(
            r#"
            [log]
            level = "domain_service=debug,info"
            format = "json"

            [clone_policy]
            skip_primary_key = false
            conditional_exclusions = []

            [clone_policy.child_exclusions]
            activityparty = ["activitypartyid"]
            "#,
        )
        .unwrap();

        assert_eq!(config.log.level, "domain_service=debug,info");
        assert_eq!(config.log.format, LogFormat::Json);
        assert!(!config.clone_policy.skip_primary_key);
        assert!(config.clone_policy.conditional_exclusions.is_empty());
        assert_eq!(
            config.clone_policy.child_exclusions.get("activityparty"),
            Some(&vec!["activitypartyid".to_string()])
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ToolkitConfig::from_toml("[log]\nformat = \"json\"\n").unwrap();
        assert_eq!(config.log.level, "info");
        assert_eq!(config.clone_policy, ClonePolicy::default());
    }

    #[test]
    fn test_environment_overrides() {
        let vars = config::Map::from([
            ("XRM_LOG__LEVEL".to_string(), "warn".to_string()),
            ("XRM_CLONE_POLICY__SKIP_PRIMARY_KEY".to_string(), "false".to_string()),
        ]);
        let builder = Config::builder()
            .add_source(File::from_str("[log]\nlevel = \"debug\"\n", FileFormat::Toml));
        let config = ToolkitConfig::load(builder, environment().source(Some(vars))).unwrap();

        assert_eq!(config.log.level, "warn");
        assert!(!config.clone_policy.skip_primary_key);
    }

    #[test]
    fn test_environment_alone() {
        let vars = config::Map::from([
            ("XRM_LOG__FORMAT".to_string(), "json".to_string()),
            ("OTHER_LOG__LEVEL".to_string(), "error".to_string()),
        ]);
        let config = ToolkitConfig::load(Config::builder(), environment().source(Some(vars))).unwrap();

        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = ToolkitConfig::from_file("/nonexistent/xrm-toolkit.toml").unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
    }

    #[test]
    fn test_bad_value_is_a_configuration_error() {
        let err = ToolkitConfig::from_toml("[clone_policy]\nskip_primary_key = \"sometimes\"\n").unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
    }
}
