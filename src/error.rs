//! Error types for configuration loading and validation.
//!
//! Structural problems (IO, parse, compile) fail fast and carry the offending
//! path or pattern. Authoring mistakes found by the plugin checks are collected
//! and reported together in a single multi-line error.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Unified error type for configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error unmarshaling {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("config path cannot be a directory: {}", .0.display())]
    IsDirectory(PathBuf),

    #[error("duplicated basename is not allowed: {0}")]
    DuplicateBasename(String),

    #[error("duplicated preset 'label:value' pair: {0}")]
    DuplicatePresetPair(String),

    #[error("failed to compile {field} regexp {pattern:?}: {source}")]
    InvalidRegexp {
        field: String,
        pattern: String,
        #[source]
        source: regex_lite::Error,
    },

    #[error("failed to compile {field} duration {value:?}: {source}")]
    InvalidDuration {
        field: String,
        value: String,
        #[source]
        source: crate::duration::DurationError,
    },

    #[error("invalid plugin configuration:\n\t{}", .0.join("\n\t"))]
    InvalidPlugins(Vec<String>),

    #[error("invalid {0}")]
    InvalidRule(String),

    #[error("panic loading config: {0}")]
    Panic(String),
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }

    /// The individual violations for aggregated errors, or the message itself.
    pub fn violations(&self) -> Vec<String> {
        match self {
            ConfigError::InvalidPlugins(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregated_message_is_multiline() {
        let err = ConfigError::InvalidPlugins(vec![
            "unknown plugin: foo".to_string(),
            "unknown plugin: bar".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid plugin configuration:\n\tunknown plugin: foo\n\tunknown plugin: bar"
        );
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_is_directory_names_path() {
        let err = ConfigError::IsDirectory(PathBuf::from("/etc/bot"));
        assert!(err.to_string().contains("/etc/bot"));
    }
}
