//! Job configuration fragments.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Configuration shared by all jobs. May be split across many files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Presets apply to all job types.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<Preset>,
}

/// Pod fragments applied to every job carrying all of `labels`.
///
/// `env`, `volumes` and `volume_mounts` are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub labels: BTreeMap<String, String>,
    pub env: Vec<Value>,
    pub volumes: Vec<Value>,
    #[serde(rename = "volumeMounts")]
    pub volume_mounts: Vec<Value>,
}

impl Preset {
    /// The `label:value` pairs identifying this preset.
    pub fn label_pairs(&self) -> impl Iterator<Item = String> + '_ {
        self.labels.iter().map(|(label, value)| format!("{}:{}", label, value))
    }
}
