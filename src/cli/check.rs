//! Check subcommand for ci-bot-config CLI
//!
//! Loads every configured file the way the hook server would and reports the
//! first structural error or all semantic ones.

use crate::config::{self, ConfigPaths};
use crate::plugins::{self, PluginRegistry};
use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the check subcommand
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Main config file (falls back to CI_BOT_CONFIG_PATH)
    #[arg(long, value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Job config file or directory (falls back to CI_BOT_JOB_CONFIG_PATH)
    #[arg(long, value_name = "PATH")]
    pub job_config_path: Option<PathBuf>,

    /// Plugin config file (falls back to CI_BOT_PLUGIN_CONFIG)
    #[arg(long, value_name = "FILE")]
    pub plugin_config: Option<PathBuf>,

    /// Also run the companion rules (size, blunderbuss, config_updater,
    /// require_matching_label)
    #[arg(long)]
    pub strict: bool,

    /// Output format: text (default) or json
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    pub format: CheckFormat,
}

/// Output format for check results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CheckFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for CheckFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(CheckFormat::Text),
            "json" => Ok(CheckFormat::Json),
            _ => Err(format!("Invalid format '{}'. Valid options: text, json", s)),
        }
    }
}

/// What a successful check found.
#[derive(Debug, Default, Serialize)]
pub struct CheckReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
    pub presets: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_config: Option<PathBuf>,
    pub plugin_scopes: usize,
    pub external_plugin_scopes: usize,
}

impl CheckReport {
    pub fn render(&self, format: CheckFormat) -> Result<String> {
        match format {
            CheckFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            CheckFormat::Text => {
                let mut lines = Vec::new();
                if let Some(path) = &self.config_path {
                    lines.push(format!("{}: ok ({} presets)", path.display(), self.presets));
                }
                if let Some(path) = &self.plugin_config {
                    lines.push(format!(
                        "{}: ok ({} plugin scopes, {} external plugin scopes)",
                        path.display(),
                        self.plugin_scopes,
                        self.external_plugin_scopes
                    ));
                }
                Ok(lines.join("\n"))
            }
        }
    }
}

/// Run the check against `paths`, already merged with the environment.
pub fn run(args: &CheckArgs, registry: &dyn PluginRegistry) -> Result<CheckReport> {
    let paths = ConfigPaths::discover().with_overrides(
        args.config_path.clone(),
        args.job_config_path.clone(),
        args.plugin_config.clone(),
    );
    check_paths(&paths, args.strict, registry)
}

/// Validate the files named by `paths`.
pub fn check_paths(
    paths: &ConfigPaths,
    strict: bool,
    registry: &dyn PluginRegistry,
) -> Result<CheckReport> {
    if paths.config_path.is_none() && paths.plugin_config_path.is_none() {
        bail!("nothing to check: pass --config-path and/or --plugin-config");
    }

    let mut report = CheckReport::default();

    if let Some(config_path) = &paths.config_path {
        let config = config::load(config_path, paths.job_config_path.as_deref())
            .with_context(|| format!("invalid config {}", config_path.display()))?;
        report.config_path = Some(config_path.clone());
        report.presets = config.job_config.presets.len();
    } else if paths.job_config_path.is_some() {
        bail!("--job-config-path requires --config-path");
    }

    if let Some(plugin_path) = &paths.plugin_config_path {
        let mut pc = plugins::load(plugin_path)?;
        pc.validate(registry)
            .with_context(|| format!("invalid plugin config {}", plugin_path.display()))?;
        if strict {
            pc.validate_companion_rules()
                .with_context(|| format!("invalid plugin config {}", plugin_path.display()))?;
        }
        report.plugin_config = Some(plugin_path.clone());
        report.plugin_scopes = pc.plugins.len();
        report.external_plugin_scopes = pc.external_plugins.len();
    }

    Ok(report)
}
