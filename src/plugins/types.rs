//! Plugin configuration types.
//!
//! Field names mirror the keys of the plugin config file, which is shared with
//! the tooling that authors it. Raw pattern and duration strings are the
//! serialized source of truth; their compiled counterparts are skipped by serde
//! and only filled in by [`Configuration::validate`].

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Minimum number of reviewers blunderbuss requests when nothing is configured.
pub const DEFAULT_BLUNDERBUSS_REVIEWER_COUNT: usize = 2;

/// Top-level plugin configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Scope (`org` or `org/repo`) to the plugins enabled there.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub plugins: BTreeMap<String, Vec<String>>,

    /// Scope to the external plugins enabled there.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub external_plugins: BTreeMap<String, Vec<ExternalPlugin>>,

    pub owners: Owners,

    // Built-in plugin settings.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub approve: Vec<Approve>,
    #[serde(
        rename = "use_deprecated_2018_implicit_self_approve_default_migrate_before_july_2019",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub use_deprecated_self_approve: bool,
    #[serde(
        rename = "use_deprecated_2018_review_acts_as_approve_default_migrate_before_july_2019",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub use_deprecated_review_approve: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blockades: Vec<Blockade>,
    pub blunderbuss: Blunderbuss,
    pub cherry_pick_unapproved: CherryPickUnapproved,
    pub config_updater: ConfigUpdater,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub golint: Option<Golint>,
    pub heart: Heart,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lgtm: Vec<Lgtm>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub repo_milestone: BTreeMap<String, Milestone>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub require_matching_label: Vec<RequireMatchingLabel>,
    #[serde(rename = "sigmention")]
    pub sig_mention: SigMention,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<Trigger>,
}

/// An out-of-process plugin that receives demuxed webhook events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalPlugin {
    pub name: String,
    /// Defaults to `http://{name}`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub endpoint: String,
    /// Events forwarded to the plugin. Empty means all events.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
}

/// Configuration for handling OWNERS files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Owners {
    /// `org` and `org/repo` scopes whose markdown files may carry a YAML
    /// OWNERS header.
    #[serde(rename = "mdyamlrepos", skip_serializing_if = "Vec::is_empty")]
    pub mdyaml_repos: Vec<String>,
    /// Scopes where approve and lgtm rely solely on OWNERS files.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skip_collaborators: Vec<String>,
    /// Labels that must never appear in an OWNERS file.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels_blacklist: Vec<String>,
}

/// Configuration for a single approve entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Approve {
    pub repos: Vec<String>,
    pub issue_required: bool,
    #[serde(rename = "implicit_self_approve", skip_serializing_if = "Option::is_none")]
    pub deprecated_implicit_self_approve: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_self_approval: Option<bool>,
    pub lgtm_acts_as_approve: bool,
    #[serde(rename = "review_acts_as_approve", skip_serializing_if = "Option::is_none")]
    pub deprecated_review_acts_as_approve: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_review_state: Option<bool>,
}

impl Approve {
    /// Whether the PR author implicitly approves their own PR.
    ///
    /// The deprecated flag wins when set, then the inverse of
    /// `require_self_approval`; unset everywhere means true.
    pub fn has_self_approval(&self) -> bool {
        if let Some(implicit) = self.deprecated_implicit_self_approve {
            return implicit;
        }
        if let Some(require) = self.require_self_approval {
            return !require;
        }
        true
    }

    /// Whether GitHub review states count as approve/cancel.
    pub fn consider_review_state(&self) -> bool {
        if let Some(acts) = self.deprecated_review_acts_as_approve {
            return acts;
        }
        if let Some(ignore) = self.ignore_review_state {
            return !ignore;
        }
        true
    }
}

/// Paths that may not be changed in the matching repos.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Blockade {
    pub repos: Vec<String>,
    #[serde(rename = "blockregexps")]
    pub block_regexps: Vec<String>,
    #[serde(rename = "exceptionregexps")]
    pub exception_regexps: Vec<String>,
    pub explanation: String,
}

/// Lower bounds, in lines changed, for each size label. XS is always zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Size {
    pub s: usize,
    pub m: usize,
    pub l: usize,
    pub xl: usize,
    pub xxl: usize,
}

/// Reviewer selection settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Blunderbuss {
    /// Minimum number of reviewers to request.
    #[serde(rename = "request_count", skip_serializing_if = "Option::is_none")]
    pub reviewer_count: Option<usize>,
    /// Maximum number of reviewers to request. Zero means no limit.
    #[serde(rename = "max_request_count")]
    pub max_reviewer_count: usize,
    /// Reviewer count selected by file weighting. Exclusive with `request_count`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_weight_count: Option<usize>,
    pub exclude_approvers: bool,
}

/// Settings for the require-matching-label plugin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequireMatchingLabel {
    pub org: String,
    /// Omit to apply across every repo in `org`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub repo: String,
    /// Only meaningful with `prs: true`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub branch: String,
    pub prs: bool,
    pub issues: bool,

    pub regexp: String,
    #[serde(skip)]
    pub re: Option<Regex>,

    pub missing_label: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub missing_comment: String,

    /// Delay before acting on newly opened items. Defaults to `5s`.
    pub grace_period: String,
    #[serde(skip)]
    pub grace_period_duration: Duration,
}

impl RequireMatchingLabel {
    /// Short human description of where this entry applies.
    pub fn describe(&self) -> String {
        let mut target = self.org.clone();
        if !self.repo.is_empty() {
            target = format!("{}/{}", target, self.repo);
        }
        if !self.branch.is_empty() {
            target = format!("{} branch {}", target, self.branch);
        }
        let mut kinds = Vec::new();
        if self.prs {
            kinds.push("PRs");
        }
        if self.issues {
            kinds.push("issues");
        }
        format!(
            "Applies the '{}' label to {} in {} that lack a label matching {:?}",
            self.missing_label,
            kinds.join(" and "),
            target,
            self.regexp
        )
    }
}

/// Milestone maintainer settings for a repo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Milestone {
    pub maintainers_id: u64,
    pub maintainers_team: String,
    pub maintainers_friendly_name: String,
}

/// Configuration for a single lgtm entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Lgtm {
    pub repos: Vec<String>,
    pub review_acts_as_lgtm: bool,
    pub store_tree_hash: bool,
    /// Team trusted with sticky LGTM. Bypasses re-review after minor updates.
    #[serde(rename = "trusted_team_for_sticky_lgtm")]
    pub sticky_lgtm_team: String,
}

/// Extra labels enabled on top of the standard kind/priority/area sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub additional_labels: Vec<String>,
}

/// Settings for the heart plugin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Heart {
    pub adorees: Vec<String>,
    #[serde(rename = "commentregexp")]
    pub comment_regexp: String,
    #[serde(skip)]
    pub comment_re: Option<Regex>,
}

/// Settings for the golint plugin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Golint {
    /// Confidence in (0,1] above which problems are reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_confidence: Option<f64>,
}

/// Where the config-updater plugin syncs a repository file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMapSpec {
    pub name: String,
    /// Defaults to the basename of the source file.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_namespaces: Vec<String>,
    /// `namespace` followed by `additional_namespaces`. Derived, never read
    /// from config.
    #[serde(skip)]
    pub namespaces: Vec<String>,
}

impl ConfigMapSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Settings for the config-updater plugin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdater {
    /// Repository file path to the ConfigMap it is synced into.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub maps: BTreeMap<String, ConfigMapSpec>,
    /// Deprecated: use `maps`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub config_file: String,
    /// Deprecated: use `maps`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub plugin_file: String,
}

/// Settings for the cherry-pick-unapproved plugin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CherryPickUnapproved {
    /// Branches whose PRs count as cherry-picks.
    #[serde(rename = "branchregexp")]
    pub branch_regexp: String,
    #[serde(skip)]
    pub branch_re: Option<Regex>,
    pub comment: String,
}

/// Settings for the sigmention plugin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SigMention {
    /// Matches team mentions in comments. Capture 1 is the SIG name and
    /// capture 2 the team suffix.
    pub regexp: String,
    #[serde(skip)]
    pub re: Option<Regex>,
}

/// Configuration for a single trigger entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Trigger {
    pub repos: Vec<String>,
    /// Org whose members' PRs are built automatically. Defaults to the PR's org.
    pub trusted_org: String,
    /// Where users learn how to join `trusted_org`.
    pub join_org_url: String,
    pub only_org_members: bool,
    pub ignore_ok_to_test: bool,
}

fn scope_matches(entries: &[String], org: &str, full_name: &str) -> (bool, bool) {
    let repo_match = entries.iter().any(|r| r == full_name);
    let org_match = entries.iter().any(|r| r == org);
    (repo_match, org_match)
}

impl Configuration {
    /// The approve entry for `org/repo`, preferring a repo-level entry over an
    /// org-level one.
    ///
    /// The global `use_deprecated_2018_*` flags restore the 2018 defaults (no
    /// implicit self approval, reviews do not act as approval) for entries
    /// that set neither the new nor the deprecated field.
    pub fn approve_for(&self, org: &str, repo: &str) -> Approve {
        let full_name = format!("{}/{}", org, repo);
        let mut repo_entry = None;
        let mut org_entry = None;
        for approve in &self.approve {
            let (repo_match, org_match) = scope_matches(&approve.repos, org, &full_name);
            if repo_match {
                repo_entry = Some(approve);
                break;
            }
            if org_match && org_entry.is_none() {
                org_entry = Some(approve);
            }
        }
        let mut approve = repo_entry.or(org_entry).cloned().unwrap_or_default();

        if self.use_deprecated_self_approve
            && approve.deprecated_implicit_self_approve.is_none()
            && approve.require_self_approval.is_none()
        {
            approve.deprecated_implicit_self_approve = Some(false);
        }
        if self.use_deprecated_review_approve
            && approve.deprecated_review_acts_as_approve.is_none()
            && approve.ignore_review_state.is_none()
        {
            approve.deprecated_review_acts_as_approve = Some(false);
        }
        approve
    }

    /// The lgtm entry for `org/repo`, if any.
    pub fn lgtm_for(&self, org: &str, repo: &str) -> Option<&Lgtm> {
        let full_name = format!("{}/{}", org, repo);
        self.lgtm
            .iter()
            .find(|l| l.repos.iter().any(|r| *r == full_name))
            .or_else(|| self.lgtm.iter().find(|l| l.repos.iter().any(|r| r == org)))
    }

    /// The trigger entry for `org/repo`, falling back to an empty one.
    pub fn trigger_for(&self, org: &str, repo: &str) -> Trigger {
        let full_name = format!("{}/{}", org, repo);
        self.triggers
            .iter()
            .find(|t| t.repos.iter().any(|r| *r == full_name))
            .or_else(|| self.triggers.iter().find(|t| t.repos.iter().any(|r| r == org)))
            .cloned()
            .unwrap_or_default()
    }

    /// Every scope that enables `plugin`, in scope order.
    pub fn enabled_repos_for_plugin(&self, plugin: &str) -> Vec<String> {
        self.plugins
            .iter()
            .filter(|(_, names)| names.iter().any(|n| n == plugin))
            .map(|(scope, _)| scope.clone())
            .collect()
    }

    /// Whether markdown OWNERS headers are honored in `org/repo`.
    pub fn mdyaml_enabled(&self, org: &str, repo: &str) -> bool {
        let full_name = format!("{}/{}", org, repo);
        let (repo_match, org_match) = scope_matches(&self.owners.mdyaml_repos, org, &full_name);
        repo_match || org_match
    }

    /// Whether collaborator checks are skipped in `org/repo`.
    pub fn skip_collaborators(&self, org: &str, repo: &str) -> bool {
        let full_name = format!("{}/{}", org, repo);
        let (repo_match, org_match) =
            scope_matches(&self.owners.skip_collaborators, org, &full_name);
        repo_match || org_match
    }
}
