//! Configuration loader.
//!
//! Loads the main config file and folds every job config fragment into it.
//! The job config path may be a single file or a directory tree of
//! `.yaml`/`.yml` files.

use super::jobs::JobConfig;
use super::merge::merge_job_config;
use super::types::Config;
use crate::error::{ConfigError, Result};
use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Paths of the config files, resolved from explicit values or the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Main config file
    pub config_path: Option<PathBuf>,
    /// Job config file or directory
    pub job_config_path: Option<PathBuf>,
    /// Plugin config file
    pub plugin_config_path: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover paths from `CI_BOT_CONFIG_PATH`, `CI_BOT_JOB_CONFIG_PATH` and
    /// `CI_BOT_PLUGIN_CONFIG`.
    pub fn discover() -> Self {
        let var = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            config_path: var("CI_BOT_CONFIG_PATH"),
            job_config_path: var("CI_BOT_JOB_CONFIG_PATH"),
            plugin_config_path: var("CI_BOT_PLUGIN_CONFIG"),
        }
    }

    /// Prefer explicitly given paths over discovered ones.
    pub fn with_overrides(
        mut self,
        config_path: Option<PathBuf>,
        job_config_path: Option<PathBuf>,
        plugin_config_path: Option<PathBuf>,
    ) -> Self {
        if config_path.is_some() {
            self.config_path = config_path;
        }
        if job_config_path.is_some() {
            self.job_config_path = job_config_path;
        }
        if plugin_config_path.is_some() {
            self.plugin_config_path = plugin_config_path;
        }
        self
    }
}

/// Load the main config and any job config.
///
/// A panic anywhere while loading is turned into [`ConfigError::Panic`] so a
/// malformed config can never take down a long-running caller.
pub fn load(prow_config: &Path, job_config: Option<&Path>) -> Result<Config> {
    guard(|| load_config(prow_config, job_config))
}

/// Run `f`, converting a panic into [`ConfigError::Panic`].
fn guard<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(ConfigError::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn load_config(prow_config: &Path, job_config: Option<&Path>) -> Result<Config> {
    let stat = std::fs::metadata(prow_config).map_err(|e| ConfigError::io(prow_config, e))?;
    if stat.is_dir() {
        return Err(ConfigError::IsDirectory(prow_config.to_path_buf()));
    }

    let mut nc: Config = yaml_to_config(prow_config)?;
    nc.prow_config.set_defaults();

    let Some(job_config) = job_config.filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(nc);
    };

    let stat = std::fs::metadata(job_config).map_err(|e| ConfigError::io(job_config, e))?;
    if !stat.is_dir() {
        let jc: JobConfig = yaml_to_config(job_config)?;
        merge_job_config(&mut nc.job_config, jc)?;
        return Ok(nc);
    }

    load_job_config_dir(job_config, &mut nc.job_config)?;
    Ok(nc)
}

/// Whether a directory entry is a mounted-volume artifact such as `..data`.
fn is_hidden_mount_entry(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with("..")
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Merge every YAML file under `dir` into `acc`, in file name order.
///
/// Basenames must be unique across the whole tree since they become keys of
/// the same ConfigMap.
fn load_job_config_dir(dir: &Path, acc: &mut JobConfig) -> Result<()> {
    let mut unique_basenames = HashSet::new();

    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden_mount_entry(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // One unreadable entry should not stop us from parsing the rest.
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                error!(path = %path, error = %e, "error walking job config directory");
                continue;
            }
        };

        if entry.file_type().is_dir() || !is_yaml(entry.path()) {
            continue;
        }

        let base = entry.file_name().to_string_lossy().into_owned();
        if !unique_basenames.insert(base.clone()) {
            return Err(ConfigError::DuplicateBasename(base));
        }

        let fragment: JobConfig = yaml_to_config(entry.path())?;
        debug!(
            path = %entry.path().display(),
            presets = fragment.presets.len(),
            "merging job config fragment"
        );
        merge_job_config(acc, fragment)?;
    }
    Ok(())
}

/// Whether a YAML document holds nothing but comments and separators.
fn is_blank_document(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

/// Read and parse a YAML (or JSON) file. Blank files parse to the default value.
pub(crate) fn yaml_to_config<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    if is_blank_document(&content) {
        warn!(path = %path.display(), "config file is empty");
        return Ok(T::default());
    }
    serde_yaml::from_str(&content).map_err(|e| ConfigError::parse(path, e))
}
