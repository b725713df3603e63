//! Configuration model for a GitHub automation bot.
//!
//! This module exports the loaders, validators and snapshot agents used by
//! the hook server and by the `ci-bot-config` command line tool.

pub mod agent;
pub mod cli;
pub mod config;
pub mod duration;
pub mod error;
pub mod logging;
pub mod plugins;

pub use error::{ConfigError, Result};
