//! Lookup of known plugin names.
//!
//! The set of plugins is owned by whoever hosts the automations; validation
//! only ever reads it through [`PluginRegistry`].

use std::collections::{BTreeMap, HashMap};

/// Read-only name to description lookup of available plugins.
pub trait PluginRegistry {
    /// Whether a plugin with this name is available.
    fn contains(&self, name: &str) -> bool;

    /// Help text for the plugin, if it is known.
    fn description(&self, name: &str) -> Option<&str>;
}

/// Registry backed by an ordered map, filled once at startup.
#[derive(Debug, Clone, Default)]
pub struct HelpRegistry {
    plugins: BTreeMap<String, String>,
}

impl HelpRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin, returning the registry for chaining.
    pub fn with_plugin(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.plugins.insert(name.into(), description.into());
        self
    }

    /// Registered plugins in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.plugins.iter().map(|(n, d)| (n.as_str(), d.as_str()))
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl<N: Into<String>, D: Into<String>> FromIterator<(N, D)> for HelpRegistry {
    fn from_iter<I: IntoIterator<Item = (N, D)>>(iter: I) -> Self {
        Self {
            plugins: iter
                .into_iter()
                .map(|(n, d)| (n.into(), d.into()))
                .collect(),
        }
    }
}

impl PluginRegistry for HelpRegistry {
    fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    fn description(&self, name: &str) -> Option<&str> {
        self.plugins.get(name).map(String::as_str)
    }
}

impl PluginRegistry for HashMap<String, String> {
    fn contains(&self, name: &str) -> bool {
        self.contains_key(name)
    }

    fn description(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}
