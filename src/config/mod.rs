//! Main and job configuration.
//!
//! The main config file carries operational settings and may also carry job
//! config. Job config can additionally live in its own file or in a directory
//! tree of fragments, which are merged in file name order.
//!
//! ## Directory layout rules
//! - Only `.yaml` and `.yml` files are read
//! - Entries whose name starts with `..` are skipped, and such directories are
//!   never descended into (mounted-volume artifacts like `..data`)
//! - Basenames must be unique across the tree
//! - Preset `label:value` pairs must be unique across all fragments
//!
//! ## Environment Variables
//! - `CI_BOT_CONFIG_PATH` - Main config file
//! - `CI_BOT_JOB_CONFIG_PATH` - Job config file or directory
//! - `CI_BOT_PLUGIN_CONFIG` - Plugin config file

mod jobs;
mod loader;
mod merge;
mod types;

pub use jobs::{JobConfig, Preset};
pub use loader::{ConfigPaths, load};
pub use merge::merge_job_config;
pub use types::*;

use crate::agent::Agent;
use crate::error::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Loads and publishes the main configuration.
#[derive(Debug, Default)]
pub struct ConfigAgent {
    snapshot: Agent<Config>,
}

impl ConfigAgent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the config and publish it on success.
    ///
    /// On failure the previously published config stays in effect.
    /// Concurrent loads run one at a time.
    pub fn load(&self, prow_config: &Path, job_config: Option<&Path>) -> Result<()> {
        let config = self.snapshot.reload(|| load(prow_config, job_config))?;
        info!(
            path = %prow_config.display(),
            presets = config.job_config.presets.len(),
            "loaded config"
        );
        Ok(())
    }

    /// The last published config.
    pub fn config(&self) -> Option<Arc<Config>> {
        self.snapshot.get()
    }
}
