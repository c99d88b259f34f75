//! Loader configuration, persisted as TOML.
//!
//! ```toml
//! env_prefix = "GRAPHWIRE_"
//! base_dir = "/srv/config"
//! auto_configure = true
//!
//! [app_settings]
//! StoreUser = "admin"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::paths::BaseDirResolver;
use crate::resolver::Resolver;
use crate::settings::{EnvSettings, LayeredSettings};

/// Settings for a [`crate::ConfigurationLoader`] session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Values for `appsetting:<key>` IRIs. These win over environment variables.
    #[serde(default)]
    pub app_settings: BTreeMap<String, String>,
    /// When set, `appsetting:<key>` also falls back to the environment
    /// variable `<env_prefix><key>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_prefix: Option<String>,
    /// Base directory for relative paths in the graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
    /// Register graph-declared factories before loading.
    #[serde(default = "default_auto_configure")]
    pub auto_configure: bool,
}

fn default_auto_configure() -> bool {
    true
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            app_settings: BTreeMap::new(),
            env_prefix: None,
            base_dir: None,
            auto_configure: default_auto_configure(),
        }
    }
}

impl LoaderConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Parse from a TOML string.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".into(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// The settings provider described by this config.
    pub fn settings(&self) -> LayeredSettings {
        let layered = LayeredSettings::new().push(self.app_settings.clone());
        match &self.env_prefix {
            Some(prefix) => layered.push(EnvSettings::with_prefix(prefix.clone())),
            None => layered,
        }
    }

    /// A resolver with the built-in factories, these settings and the base directory.
    pub fn build_resolver(&self) -> Resolver {
        let mut resolver = Resolver::with_builtins().with_settings(self.settings());
        if let Some(base) = &self.base_dir {
            resolver.set_path_resolver(Some(Box::new(BaseDirResolver::new(base.clone()))));
        }
        resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsProvider;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let config = LoaderConfig::from_toml_str("").unwrap();
        assert_eq!(config, LoaderConfig::default());
        assert!(config.auto_configure);
    }

    #[test]
    fn parse_full_config() {
        let config = LoaderConfig::from_toml_str(
            r#"
            env_prefix = "GW_TEST_"
            base_dir = "/srv/config"
            auto_configure = false

            [app_settings]
            X = "42"
            "#,
        )
        .unwrap();
        assert!(!config.auto_configure);
        assert_eq!(config.settings().get_setting("X").as_deref(), Some("42"));

        let resolver = config.build_resolver();
        assert_eq!(resolver.resolve_path("a.json"), "/srv/config/a.json");
        assert_eq!(resolver.settings().get_setting("X").as_deref(), Some("42"));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = LoaderConfig::from_toml_str("auto_configure = \"maybe\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("loader.toml");
        let mut config = LoaderConfig::default();
        config.app_settings.insert("Key".into(), "value".into());
        config.save(&path).unwrap();
        assert_eq!(LoaderConfig::load(&path).unwrap(), config);
    }
}
