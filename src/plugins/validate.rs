//! Validation of plugin configuration.
//!
//! [`Configuration::validate`] runs a fixed pipeline: defaulting, then
//! compilation (fail-fast), then the scope checks, whose violations are all
//! collected and reported together.
//!
//! The companion rules at the bottom of this module are not part of that
//! pipeline. Callers that want them run [`Configuration::validate_companion_rules`].

use super::compile::compile_regexps_and_durations;
use super::registry::PluginRegistry;
use super::types::{
    Blunderbuss, ConfigUpdater, Configuration, ExternalPlugin, RequireMatchingLabel, Size,
};
use crate::error::{ConfigError, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::warn;

/// The org part of an `org/repo` scope, or `None` for an org scope.
fn parent_org(scope: &str) -> Option<&str> {
    scope.split_once('/').map(|(org, _)| org)
}

/// Whether `scope` has the form `org` or `org/repo`.
fn is_valid_scope(scope: &str) -> bool {
    let mut parts = scope.split('/');
    let valid_part = |p: Option<&str>| p.is_some_and(|p| !p.is_empty() && p.trim() == p);
    match (parts.next(), parts.next(), parts.next()) {
        (org, None, None) => valid_part(org),
        (org, repo @ Some(_), None) => valid_part(org) && valid_part(repo),
        _ => false,
    }
}

/// Names enabled in both the repo-level and org-level lists, in repo order.
pub fn find_duplicated_plugin_config<'a>(repo_config: &'a [String], org_config: &[String]) -> Vec<&'a str> {
    repo_config
        .iter()
        .filter(|p| org_config.contains(*p))
        .map(String::as_str)
        .collect()
}

fn check_scopes<T>(kind: &str, scopes: &BTreeMap<String, Vec<T>>, errors: &mut Vec<String>) {
    for scope in scopes.keys() {
        if !is_valid_scope(scope) {
            errors.push(format!(
                "invalid {} scope {:?}: expected \"org\" or \"org/repo\"",
                kind, scope
            ));
        }
    }
}

/// Collect unknown and org/repo duplicated plugin names.
fn validate_plugins(
    plugins: &BTreeMap<String, Vec<String>>,
    registry: &dyn PluginRegistry,
) -> Vec<String> {
    let mut errors = Vec::new();
    check_scopes("plugins", plugins, &mut errors);

    for (scope, names) in plugins {
        for name in names {
            if !registry.contains(name) {
                errors.push(format!("unknown plugin: {} (enabled for {})", name, scope));
            }
        }
    }

    for (repo, repo_config) in plugins {
        let Some(org) = parent_org(repo) else {
            continue;
        };
        let Some(org_config) = plugins.get(org) else {
            continue;
        };
        let dupes = find_duplicated_plugin_config(repo_config, org_config);
        if !dupes.is_empty() {
            errors.push(format!(
                "plugins {:?} are duplicated for {} and {}",
                dupes, repo, org
            ));
        }
    }
    errors
}

/// Collect org/repo duplicated external plugins, keyed by name.
fn validate_external_plugins(
    external: &BTreeMap<String, Vec<ExternalPlugin>>,
) -> Vec<String> {
    let mut errors = Vec::new();
    check_scopes("external_plugins", external, &mut errors);

    for (repo, plugins) in external {
        let Some(org) = parent_org(repo) else {
            continue;
        };
        let org_config: Vec<String> = external
            .get(org)
            .map(|ps| ps.iter().map(|p| p.name.clone()).collect())
            .unwrap_or_default();
        let repo_config: Vec<String> = plugins.iter().map(|p| p.name.clone()).collect();

        let dupes = find_duplicated_plugin_config(&repo_config, &org_config);
        if !dupes.is_empty() {
            errors.push(format!(
                "external plugins {:?} are duplicated for {} and {}",
                dupes, repo, org
            ));
        }
    }
    errors
}

impl Configuration {
    /// Default, compile and validate this configuration in place.
    ///
    /// On error the configuration may be partially defaulted and must be
    /// discarded. Only publish it once this returns `Ok`.
    pub fn validate(&mut self, registry: &dyn PluginRegistry) -> Result<()> {
        if self.plugins.is_empty() {
            warn!("no plugins specified-- check syntax?");
        }

        self.set_defaults();
        compile_regexps_and_durations(self)?;

        let mut errors = validate_plugins(&self.plugins, registry);
        errors.extend(validate_external_plugins(&self.external_plugins));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::InvalidPlugins(errors))
        }
    }

    /// Run the optional companion checks and report every violation at once.
    pub fn validate_companion_rules(&self) -> Result<()> {
        let results = [
            validate_blunderbuss(&self.blunderbuss),
            validate_config_updater(&self.config_updater),
            validate_sizes(self.size.as_ref()),
            validate_require_matching_label(&self.require_matching_label),
        ];
        let errors: Vec<String> = results
            .into_iter()
            .filter_map(|r| r.err())
            .flat_map(|e| e.violations())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::InvalidPlugins(errors))
        }
    }
}

/// Size bounds must be non-decreasing from S to XXL. Equal bounds are allowed.
pub fn validate_sizes(size: Option<&Size>) -> Result<()> {
    let Some(size) = size else {
        return Ok(());
    };
    if size.s > size.m || size.m > size.l || size.l > size.xl || size.xl > size.xxl {
        return Err(ConfigError::InvalidRule(
            "size plugin configuration - one of the smaller sizes is bigger than a larger one"
                .to_string(),
        ));
    }
    Ok(())
}

/// `request_count` and `file_weight_count` are exclusive and must be positive.
pub fn validate_blunderbuss(b: &Blunderbuss) -> Result<()> {
    if b.reviewer_count.is_some() && b.file_weight_count.is_some() {
        return Err(ConfigError::InvalidRule(
            "blunderbuss configuration - cannot use both request_count and file_weight_count"
                .to_string(),
        ));
    }
    if b.reviewer_count == Some(0) {
        return Err(ConfigError::InvalidRule(
            "blunderbuss request_count: 0 (needs to be positive)".to_string(),
        ));
    }
    if b.file_weight_count == Some(0) {
        return Err(ConfigError::InvalidRule(
            "blunderbuss file_weight_count: 0 (needs to be positive)".to_string(),
        ));
    }
    Ok(())
}

/// No two files may update the same key of the same ConfigMap.
pub fn validate_config_updater(updater: &ConfigUpdater) -> Result<()> {
    let mut config_map_keys: HashMap<String, HashSet<String>> = HashMap::new();
    for (file, spec) in &updater.maps {
        let key = if spec.key.is_empty() {
            file.rsplit('/').next().unwrap_or(file.as_str()).to_string()
        } else {
            spec.key.clone()
        };
        let namespaces =
            std::iter::once(&spec.namespace).chain(spec.additional_namespaces.iter());
        for namespace in namespaces {
            let map_name = format!("{}/{}", namespace, spec.name);
            if !config_map_keys.entry(map_name.clone()).or_default().insert(key.clone()) {
                return Err(ConfigError::InvalidRule(format!(
                    "config_updater - key {} in configmap {} updated with more than one file",
                    key, map_name
                )));
            }
        }
    }
    Ok(())
}

/// Every entry needs an org, a target kind and a label to apply.
pub fn validate_require_matching_label(entries: &[RequireMatchingLabel]) -> Result<()> {
    for (i, r) in entries.iter().enumerate() {
        let problem = if r.org.is_empty() {
            Some("'org' field cannot be empty")
        } else if !r.prs && !r.issues {
            Some("neither 'prs' nor 'issues' is set")
        } else if !r.branch.is_empty() && !r.prs {
            Some("'branch' is only valid when 'prs' is set")
        } else if r.missing_label.is_empty() {
            Some("'missing_label' is required")
        } else {
            None
        };
        if let Some(problem) = problem {
            return Err(ConfigError::InvalidRule(format!(
                "require_matching_label[{}]: {}",
                i, problem
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::registry::HelpRegistry;
    use crate::plugins::types::ConfigMapSpec;

    fn registry() -> HelpRegistry {
        ["trigger", "lgtm", "heart", "approve"]
            .into_iter()
            .map(|n| (n, format!("the {} plugin", n)))
            .collect()
    }

    fn plugins(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
        entries
            .iter()
            .map(|(scope, names)| {
                (
                    scope.to_string(),
                    names.iter().map(|n| n.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_valid_scopes() {
        assert!(is_valid_scope("kubernetes"));
        assert!(is_valid_scope("kubernetes/test-infra"));
        assert!(!is_valid_scope(""));
        assert!(!is_valid_scope("a/b/c"));
        assert!(!is_valid_scope("/repo"));
        assert!(!is_valid_scope("org/"));
    }

    #[test]
    fn test_find_duplicates() {
        let repo = vec!["trigger".to_string(), "lgtm".to_string()];
        let org = vec!["heart".to_string(), "trigger".to_string()];
        assert_eq!(find_duplicated_plugin_config(&repo, &org), vec!["trigger"]);
        assert!(find_duplicated_plugin_config(&repo, &[]).is_empty());
    }

    #[test]
    fn test_duplicate_plugin_names_both_scopes() {
        let errors = validate_plugins(
            &plugins(&[("org", &["trigger"]), ("org/repo", &["trigger", "lgtm"])]),
            &registry(),
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("\"trigger\""));
        assert!(errors[0].contains("org/repo"));
        assert!(errors[0].contains(" and org"));
    }

    #[test]
    fn test_unknown_plugins_are_aggregated() {
        let errors = validate_plugins(
            &plugins(&[("org", &["cat", "dog"]), ("other", &["trigger"])]),
            &registry(),
        );
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("unknown plugin: cat"));
        assert!(errors[1].starts_with("unknown plugin: dog"));
    }

    #[test]
    fn test_repo_without_org_entry_is_fine() {
        let errors = validate_plugins(&plugins(&[("org/repo", &["trigger"])]), &registry());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_duplicate_external_plugins() {
        let ext = |name: &str| ExternalPlugin {
            name: name.to_string(),
            ..ExternalPlugin::default()
        };
        let mut external = BTreeMap::new();
        external.insert("org".to_string(), vec![ext("needs-rebase")]);
        external.insert(
            "org/repo".to_string(),
            vec![ext("needs-rebase"), ext("cherrypicker")],
        );
        let errors = validate_external_plugins(&external);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("external plugins [\"needs-rebase\"]"));
    }

    #[test]
    fn test_validate_joins_builtin_and_external_errors() {
        let mut c = Configuration {
            plugins: plugins(&[("org", &["trigger", "bogus"]), ("org/repo", &["trigger"])]),
            ..Configuration::default()
        };
        c.external_plugins.insert(
            "org".to_string(),
            vec![ExternalPlugin {
                name: "x".to_string(),
                ..ExternalPlugin::default()
            }],
        );
        c.external_plugins.insert(
            "org/repo".to_string(),
            vec![ExternalPlugin {
                name: "x".to_string(),
                ..ExternalPlugin::default()
            }],
        );
        let err = c.validate(&registry()).unwrap_err();
        assert_eq!(err.violations().len(), 3);
        let msg = err.to_string();
        assert!(msg.contains("unknown plugin: bogus"));
        assert!(msg.contains("external plugins"));
    }

    #[test]
    fn test_validate_success_fills_compiled_fields() {
        let mut c = Configuration {
            plugins: plugins(&[("org", &["trigger"]), ("org/repo", &["lgtm"])]),
            require_matching_label: vec![RequireMatchingLabel {
                org: "org".to_string(),
                issues: true,
                regexp: "^kind/".to_string(),
                missing_label: "needs-kind".to_string(),
                ..RequireMatchingLabel::default()
            }],
            ..Configuration::default()
        };
        c.validate(&registry()).unwrap();
        assert!(c.sig_mention.re.is_some());
        assert_eq!(
            c.require_matching_label[0].grace_period_duration,
            std::time::Duration::from_secs(5)
        );
        assert!(c.validate_companion_rules().is_ok());
    }

    #[test]
    fn test_compile_failure_precedes_plugin_checks() {
        let mut c = Configuration {
            plugins: plugins(&[("org", &["trigger"]), ("org/repo", &["trigger"])]),
            require_matching_label: vec![RequireMatchingLabel {
                regexp: "(".to_string(),
                ..RequireMatchingLabel::default()
            }],
            ..Configuration::default()
        };
        let err = c.validate(&registry()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegexp { .. }));
    }

    #[test]
    fn test_sizes() {
        let ok = Size { s: 1, m: 5, l: 20, xl: 20, xxl: 100 };
        assert!(validate_sizes(Some(&ok)).is_ok());
        let bad = Size { s: 10, m: 5, l: 20, xl: 30, xxl: 100 };
        assert!(validate_sizes(Some(&bad)).is_err());
        assert!(validate_sizes(None).is_ok());
    }

    #[test]
    fn test_blunderbuss_rules() {
        assert!(validate_blunderbuss(&Blunderbuss::default()).is_ok());
        let both = Blunderbuss {
            reviewer_count: Some(2),
            file_weight_count: Some(3),
            ..Blunderbuss::default()
        };
        assert!(validate_blunderbuss(&both).is_err());
        let zero = Blunderbuss {
            reviewer_count: Some(0),
            ..Blunderbuss::default()
        };
        assert!(validate_blunderbuss(&zero).is_err());
    }

    #[test]
    fn test_config_updater_conflicting_keys() {
        let mut updater = ConfigUpdater::default();
        updater
            .maps
            .insert("a/config.yaml".to_string(), ConfigMapSpec::new("config"));
        updater
            .maps
            .insert("b/config.yaml".to_string(), ConfigMapSpec::new("config"));
        let err = validate_config_updater(&updater).unwrap_err();
        assert!(err.to_string().contains("key config.yaml in configmap /config"));

        let mut distinct = ConfigUpdater::default();
        distinct
            .maps
            .insert("a/config.yaml".to_string(), ConfigMapSpec::new("config"));
        distinct.maps.insert(
            "b/config.yaml".to_string(),
            ConfigMapSpec {
                name: "config".to_string(),
                key: "other.yaml".to_string(),
                ..ConfigMapSpec::default()
            },
        );
        assert!(validate_config_updater(&distinct).is_ok());
    }

    #[test]
    fn test_require_matching_label_rules() {
        let good = RequireMatchingLabel {
            org: "org".to_string(),
            prs: true,
            branch: "master".to_string(),
            missing_label: "needs-sig".to_string(),
            ..RequireMatchingLabel::default()
        };
        assert!(validate_require_matching_label(std::slice::from_ref(&good)).is_ok());

        let branch_without_prs = RequireMatchingLabel {
            prs: false,
            issues: true,
            ..good.clone()
        };
        let err = validate_require_matching_label(&[good, branch_without_prs]).unwrap_err();
        assert!(err.to_string().contains("require_matching_label[1]"));
    }

    #[test]
    fn test_companion_rules_aggregate() {
        let c = Configuration {
            size: Some(Size { s: 9, m: 1, l: 2, xl: 3, xxl: 4 }),
            blunderbuss: Blunderbuss {
                reviewer_count: Some(1),
                file_weight_count: Some(1),
                ..Blunderbuss::default()
            },
            ..Configuration::default()
        };
        let err = c.validate_companion_rules().unwrap_err();
        assert_eq!(err.violations().len(), 2);
    }
}
