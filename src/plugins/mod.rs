//! Plugin configuration.
//!
//! Which automation plugins are enabled per `org` or `org/repo` scope, and the
//! settings of each built-in plugin.
//!
//! ## Validation pipeline
//! 1. **Defaulting** - fill in every unset value
//! 2. **Compilation** - compile regexps and grace periods, first failure wins
//! 3. **Scope checks** - unknown plugins and org/repo duplicates, all reported
//!    together
//!
//! [`ConfigAgent`] loads a plugin config file, validates it against a
//! [`PluginRegistry`] and publishes it only once it passed.

mod compile;
mod defaults;
mod registry;
mod types;
mod validate;

pub use defaults::{
    DEFAULT_CHERRY_PICK_BRANCH_REGEXP, DEFAULT_CHERRY_PICK_COMMENT, DEFAULT_CONFIG_FILE,
    DEFAULT_GRACE_PERIOD, DEFAULT_MILESTONE_MAINTAINERS_NAME, DEFAULT_PLUGIN_FILE,
    DEFAULT_SIG_MENTION_REGEXP,
};
pub use registry::{HelpRegistry, PluginRegistry};
pub use types::*;
pub use validate::{
    find_duplicated_plugin_config, validate_blunderbuss, validate_config_updater,
    validate_require_matching_label, validate_sizes,
};

use crate::agent::Agent;
use crate::error::{ConfigError, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Parse a plugin config file without validating it.
pub fn load(path: impl AsRef<Path>) -> Result<Configuration> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    serde_yaml::from_str(&content).map_err(|e| ConfigError::parse(path, e))
}

/// Loads, validates and publishes plugin configuration.
pub struct ConfigAgent {
    registry: Arc<dyn PluginRegistry + Send + Sync>,
    snapshot: Agent<Configuration>,
}

impl ConfigAgent {
    pub fn new(registry: Arc<dyn PluginRegistry + Send + Sync>) -> Self {
        Self {
            registry,
            snapshot: Agent::new(),
        }
    }

    /// Load the plugin config at `path` and publish it if it is valid.
    ///
    /// On failure the previously published configuration stays in effect.
    /// Concurrent loads run one at a time.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config = self.snapshot.reload(|| {
            let mut config = load(path)?;
            config.validate(self.registry.as_ref())?;
            Ok::<_, ConfigError>(config)
        })?;
        info!(
            path = %path.display(),
            scopes = config.plugins.len(),
            "loaded plugin configuration"
        );
        Ok(())
    }

    /// Publish an already validated configuration.
    pub fn set(&self, config: Configuration) {
        self.snapshot.set(config);
    }

    /// The last published configuration.
    pub fn config(&self) -> Option<Arc<Configuration>> {
        self.snapshot.get()
    }

    pub fn registry(&self) -> &(dyn PluginRegistry + Send + Sync) {
        self.registry.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn agent() -> ConfigAgent {
        let registry: HelpRegistry = [("trigger", "Runs tests"), ("lgtm", "Adds lgtm")]
            .into_iter()
            .collect();
        ConfigAgent::new(Arc::new(registry))
    }

    #[test]
    fn test_failed_load_keeps_previous_snapshot() {
        let temp = TempDir::new().unwrap();
        let good = temp.path().join("good.yaml");
        let bad = temp.path().join("bad.yaml");
        std::fs::write(&good, "plugins:\n  org: [trigger]\n").unwrap();
        std::fs::write(
            &bad,
            "plugins:\n  org: [trigger]\n  org/repo: [trigger, lgtm]\n",
        )
        .unwrap();

        let agent = agent();
        agent.load(&good).unwrap();
        let err = agent.load(&bad).unwrap_err();
        assert!(err.to_string().contains("org/repo and org"));

        let current = agent.config().unwrap();
        assert_eq!(current.plugins.len(), 1);
        assert!(current.sig_mention.re.is_some());
    }

    #[test]
    fn test_missing_file_names_path() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yaml");
        let err = agent().load(&missing).unwrap_err();
        assert!(err.to_string().contains("nope.yaml"));
    }
}
