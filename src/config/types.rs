//! Main configuration types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::jobs::JobConfig;

/// Namespace used for jobs and pods when none is configured.
pub const DEFAULT_NAMESPACE: &str = "default";

/// A read-only snapshot of the main config plus all job config fragments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub job_config: JobConfig,
    #[serde(flatten)]
    pub prow_config: ProwConfig,
}

/// Operational settings shared by all components.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProwConfig {
    /// Namespace for looking up ProwJobs. Defaults to `default`.
    #[serde(rename = "prowjob_namespace")]
    pub prow_job_namespace: String,
    /// Namespace for looking up pods owned by ProwJobs. Defaults to `default`.
    pub pod_namespace: String,
    /// Directories to ignore when searching for OWNERS files.
    pub owners_dir_blacklist: OwnersDirBlacklist,
}

impl ProwConfig {
    pub(crate) fn set_defaults(&mut self) {
        if self.prow_job_namespace.is_empty() {
            self.prow_job_namespace = DEFAULT_NAMESPACE.to_string();
        }
        if self.pod_namespace.is_empty() {
            self.pod_namespace = DEFAULT_NAMESPACE.to_string();
        }
    }
}

/// Per-scope directory blacklists for OWNERS file discovery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwnersDirBlacklist {
    /// Blacklist per `org` or `org/repo`.
    pub repos: BTreeMap<String, Vec<String>>,
    /// Blacklist for scopes without their own entry.
    pub default: Vec<String>,
}

impl OwnersDirBlacklist {
    /// The blacklist for `org/repo`: its own entry, else the org's, else the default.
    pub fn dir_blacklist(&self, org: &str, repo: &str) -> &[String] {
        self.repos
            .get(&format!("{}/{}", org, repo))
            .or_else(|| self.repos.get(org))
            .unwrap_or(&self.default)
    }
}
