//! App-setting resolution.
//!
//! An IRI of the form `appsetting:<key>` defers a scalar value to deployment
//! time: whenever a value accessor reads such a node it is replaced by a
//! plain literal carrying the value of external setting `<key>`. The key is
//! everything after the first `:`.

use std::collections::{BTreeMap, HashMap};

use crate::node::Node;
use crate::vocab::APP_SETTING_SCHEME;

/// Source of external setting values.
pub trait SettingsProvider {
    /// Value of setting `key`, or `None` when it is undefined.
    fn get_setting(&self, key: &str) -> Option<String>;
}

impl SettingsProvider for HashMap<String, String> {
    fn get_setting(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl SettingsProvider for BTreeMap<String, String> {
    fn get_setting(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// A provider that defines no settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSettings;

impl SettingsProvider for NoSettings {
    fn get_setting(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Settings read from process environment variables.
///
/// With a prefix, key `Db` is read from `<prefix>Db`.
#[derive(Debug, Clone, Default)]
pub struct EnvSettings {
    prefix: String,
}

impl EnvSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl SettingsProvider for EnvSettings {
    fn get_setting(&self, key: &str) -> Option<String> {
        std::env::var(format!("{}{}", self.prefix, key)).ok()
    }
}

/// A stack of providers; the first one defining a key wins.
#[derive(Default)]
pub struct LayeredSettings {
    layers: Vec<Box<dyn SettingsProvider + Send + Sync>>,
}

impl LayeredSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider below the existing ones.
    pub fn push(mut self, provider: impl SettingsProvider + Send + Sync + 'static) -> Self {
        self.layers.push(Box::new(provider));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl SettingsProvider for LayeredSettings {
    fn get_setting(&self, key: &str) -> Option<String> {
        self.layers.iter().find_map(|layer| layer.get_setting(key))
    }
}

impl std::fmt::Debug for LayeredSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayeredSettings")
            .field("layers", &self.layers.len())
            .finish()
    }
}

/// The setting key named by an `appsetting:` IRI, if `node` is one.
pub fn app_setting_key(node: &Node) -> Option<&str> {
    let iri = node.as_iri()?;
    let (scheme, key) = iri.split_once(':')?;
    (scheme == APP_SETTING_SCHEME).then_some(key)
}

/// Replace an `appsetting:` IRI with a literal holding the setting's value.
///
/// Returns `None` when the setting is undefined. Every other node is returned
/// unchanged.
pub fn resolve_app_setting(node: &Node, provider: &dyn SettingsProvider) -> Option<Node> {
    match app_setting_key(node) {
        Some(key) => provider.get_setting(key).map(Node::literal),
        None => Some(node.clone()),
    }
}
