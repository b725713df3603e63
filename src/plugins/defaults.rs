//! Default values applied to plugin configuration before validation.
//!
//! Every function here is idempotent: running the defaulting pass twice leaves
//! the configuration exactly as one pass does.

use super::types::{ConfigUpdater, ConfigMapSpec, Configuration, DEFAULT_BLUNDERBUSS_REVIEWER_COUNT};
use std::collections::BTreeMap;
use tracing::warn;

/// Matches `@kubernetes/sig-<name>-<suffix>` team mentions.
pub const DEFAULT_SIG_MENTION_REGEXP: &str = r"(?m)@kubernetes/sig-([\w-]*)-(misc|test-failures|bugs|feature-requests|proposals|pr-reviews|api-reviews)";

pub const DEFAULT_CHERRY_PICK_BRANCH_REGEXP: &str = "^release-.*$";

pub const DEFAULT_CHERRY_PICK_COMMENT: &str = "This PR is not for the master branch but does not have the `cherry-pick-approved`  label. Adding the `do-not-merge/cherry-pick-not-approved`  label.

To approve the cherry-pick, please assign the patch release manager for the release branch by writing `/assign @username` in a comment when ready.

The list of patch release managers for each release can be found [here](https://git.k8s.io/sig-release/release-managers.md).";

pub const DEFAULT_GRACE_PERIOD: &str = "5s";

pub const DEFAULT_MILESTONE_MAINTAINERS_NAME: &str = "SIG Chairs/TLs";

pub const DEFAULT_CONFIG_FILE: &str = "prow/config.json";

pub const DEFAULT_PLUGIN_FILE: &str = "prow/plugins.yaml";

impl ConfigUpdater {
    /// Fill in `maps` and resolve the namespaces of every entry.
    ///
    /// A non-empty `maps` always takes precedence; the deprecated
    /// `config_file`/`plugin_file` fields are only consulted when it is empty.
    pub fn set_defaults(&mut self) {
        if self.maps.is_empty() {
            let config_file = if self.config_file.is_empty() {
                DEFAULT_CONFIG_FILE.to_string()
            } else {
                warn!(
                    r#"config_file is deprecated, please switch to "maps": {{"{}": "config"}}"#,
                    self.config_file
                );
                self.config_file.clone()
            };
            let plugin_file = if self.plugin_file.is_empty() {
                DEFAULT_PLUGIN_FILE.to_string()
            } else {
                warn!(
                    r#"plugin_file is deprecated, please switch to "maps": {{"{}": "plugins"}}"#,
                    self.plugin_file
                );
                self.plugin_file.clone()
            };

            let mut maps = BTreeMap::new();
            maps.insert(config_file, ConfigMapSpec::new("config"));
            maps.insert(plugin_file, ConfigMapSpec::new("plugins"));
            self.maps = maps;
        } else {
            for (field, value) in [
                ("config_file", &self.config_file),
                ("plugin_file", &self.plugin_file),
            ] {
                if !value.is_empty() {
                    warn!(
                        "{} is deprecated and ignored because maps is set: {}",
                        field, value
                    );
                }
            }
        }

        for spec in self.maps.values_mut() {
            spec.namespaces = std::iter::once(spec.namespace.clone())
                .chain(spec.additional_namespaces.iter().cloned())
                .collect();
        }
    }
}

impl Configuration {
    /// Apply every default. Runs fully even if later checks will fail.
    pub(crate) fn set_defaults(&mut self) {
        self.config_updater.set_defaults();

        for plugins in self.external_plugins.values_mut() {
            for plugin in plugins.iter_mut().filter(|p| p.endpoint.is_empty()) {
                plugin.endpoint = format!("http://{}", plugin.name);
            }
        }

        if self.blunderbuss.reviewer_count.is_none() && self.blunderbuss.file_weight_count.is_none()
        {
            self.blunderbuss.reviewer_count = Some(DEFAULT_BLUNDERBUSS_REVIEWER_COUNT);
        }

        for trigger in &mut self.triggers {
            if trigger.trusted_org.is_empty() || !trigger.join_org_url.is_empty() {
                continue;
            }
            trigger.join_org_url = format!("https://github.com/orgs/{}/people", trigger.trusted_org);
        }

        if self.sig_mention.regexp.is_empty() {
            self.sig_mention.regexp = DEFAULT_SIG_MENTION_REGEXP.to_string();
        }

        for milestone in self.repo_milestone.values_mut() {
            if milestone.maintainers_friendly_name.is_empty() {
                milestone.maintainers_friendly_name = DEFAULT_MILESTONE_MAINTAINERS_NAME.to_string();
            }
        }

        if self.cherry_pick_unapproved.branch_regexp.is_empty() {
            self.cherry_pick_unapproved.branch_regexp = DEFAULT_CHERRY_PICK_BRANCH_REGEXP.to_string();
        }
        if self.cherry_pick_unapproved.comment.is_empty() {
            self.cherry_pick_unapproved.comment = DEFAULT_CHERRY_PICK_COMMENT.to_string();
        }

        for rml in &mut self.require_matching_label {
            if rml.grace_period.is_empty() {
                rml.grace_period = DEFAULT_GRACE_PERIOD.to_string();
            }
        }
    }
}
