//! CLI command definitions for ci-bot-config
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod check;

use crate::plugins::HelpRegistry;
use check::CheckArgs;
use clap::{Parser, Subcommand};

/// Validate configuration for the GitHub automation bot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate main, job and plugin configuration
    Check(CheckArgs),

    /// List the plugins known to this build
    Plugins,
}

/// Plugins shipped with the bot, as registered by the hook server.
pub fn builtin_registry() -> HelpRegistry {
    HelpRegistry::new()
        .with_plugin("approve", "Manages the approved label from OWNERS approvals")
        .with_plugin("assign", "Assigns or requests reviews from users on /assign and /cc")
        .with_plugin("blockade", "Blocks PRs that touch protected paths")
        .with_plugin("blunderbuss", "Requests reviews from OWNERS reviewers")
        .with_plugin(
            "cherry-pick-unapproved",
            "Labels cherry-pick PRs lacking cherry-pick approval",
        )
        .with_plugin("config-updater", "Syncs repository files into ConfigMaps")
        .with_plugin("golint", "Comments on lint problems in Go changes")
        .with_plugin("heart", "Reacts to comments from adorees")
        .with_plugin("label", "Adds and removes labels on /kind, /area and /priority")
        .with_plugin("lgtm", "Manages the lgtm label")
        .with_plugin("milestone", "Sets milestones on /milestone")
        .with_plugin("owners-label", "Applies labels configured in OWNERS files")
        .with_plugin(
            "require-matching-label",
            "Labels issues and PRs missing a label matching a pattern",
        )
        .with_plugin("sigmention", "Labels issues and PRs mentioning SIG teams")
        .with_plugin("size", "Labels PRs by the number of changed lines")
        .with_plugin("trigger", "Starts test jobs for trusted contributors")
        .with_plugin("verify-owners", "Validates changes to OWNERS files")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::PluginRegistry;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::parse_from([
            "ci-bot-config",
            "check",
            "--config-path",
            "config.yaml",
            "--strict",
        ]);
        match cli.command {
            Command::Check(args) => {
                assert_eq!(args.config_path.as_deref(), Some(std::path::Path::new("config.yaml")));
                assert!(args.strict);
            }
            Command::Plugins => panic!("expected check"),
        }
        assert_eq!(cli.log, "2");
    }

    #[test]
    fn test_builtin_registry_has_defaults_referenced_plugins() {
        let registry = builtin_registry();
        for name in ["trigger", "lgtm", "config-updater", "require-matching-label"] {
            assert!(registry.contains(name), "{}", name);
        }
    }
}
