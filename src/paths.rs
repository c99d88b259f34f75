//! Path resolution for factories that read files, and XDG locations for the CLI.
//!
//! Factories that take filesystem paths from the configuration graph pass them
//! through the resolver's [`PathResolver`] slot. With nothing installed a path
//! is used as written.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};

/// Strategy for interpreting paths found in configuration graphs.
pub trait PathResolver {
    fn resolve_path(&self, path: &str) -> String;
}

impl<F> PathResolver for F
where
    F: Fn(&str) -> String,
{
    fn resolve_path(&self, path: &str) -> String {
        self(path)
    }
}

/// Resolves relative paths against a fixed base directory.
///
/// Absolute paths are returned unchanged.
#[derive(Debug, Clone)]
pub struct BaseDirResolver {
    base: PathBuf,
}

impl BaseDirResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl PathResolver for BaseDirResolver {
    fn resolve_path(&self, path: &str) -> String {
        let p = Path::new(path);
        if p.is_absolute() {
            path.to_string()
        } else {
            self.base.join(p).to_string_lossy().into_owned()
        }
    }
}

/// XDG-compliant locations used by the `graphwire` binary.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// `$XDG_CONFIG_HOME/graphwire/`
    pub config_dir: PathBuf,
}

impl ConfigPaths {
    /// Resolve directories from the environment with the standard fallbacks.
    pub fn resolve() -> ConfigResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| ConfigError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("graphwire");

        Ok(Self { config_dir })
    }

    /// Build from an explicit config directory (tests, custom setups).
    pub fn from_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// `config_dir/loader.toml`
    pub fn loader_config(&self) -> PathBuf {
        self.config_dir.join("loader.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_dir_joins_relative_paths() {
        let r = BaseDirResolver::new("/srv/config");
        assert_eq!(r.resolve_path("data/a.json"), "/srv/config/data/a.json");
        assert_eq!(r.resolve_path("/etc/b.json"), "/etc/b.json");
    }

    #[test]
    fn closures_are_resolvers() {
        let upper = |p: &str| p.to_uppercase();
        assert_eq!(upper.resolve_path("abc"), "ABC");
    }

    #[test]
    fn loader_config_lives_in_config_dir() {
        let paths = ConfigPaths::from_dir("/tmp/gw");
        assert_eq!(paths.loader_config(), PathBuf::from("/tmp/gw/loader.toml"));
    }
}
