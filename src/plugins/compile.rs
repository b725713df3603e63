//! Compilation of raw pattern and duration strings.

use super::types::Configuration;
use crate::duration::parse_duration;
use crate::error::{ConfigError, Result};
use regex_lite::Regex;
use std::time::Duration;

fn compile_regexp(field: impl Into<String>, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidRegexp {
        field: field.into(),
        pattern: pattern.to_string(),
        source,
    })
}

fn compile_duration(field: impl Into<String>, value: &str) -> Result<Duration> {
    parse_duration(value).map_err(|source| ConfigError::InvalidDuration {
        field: field.into(),
        value: value.to_string(),
        source,
    })
}

/// Compile every raw regexp and duration, stopping at the first failure.
///
/// Order: sigmention, cherry_pick_unapproved, heart, then each
/// require_matching_label entry (regexp before grace period).
pub(crate) fn compile_regexps_and_durations(pc: &mut Configuration) -> Result<()> {
    pc.sig_mention.re = Some(compile_regexp("sigmention.regexp", &pc.sig_mention.regexp)?);

    pc.cherry_pick_unapproved.branch_re = Some(compile_regexp(
        "cherry_pick_unapproved.branchregexp",
        &pc.cherry_pick_unapproved.branch_regexp,
    )?);

    pc.heart.comment_re = Some(compile_regexp(
        "heart.commentregexp",
        &pc.heart.comment_regexp,
    )?);

    for (i, rml) in pc.require_matching_label.iter_mut().enumerate() {
        rml.re = Some(compile_regexp(
            format!("require_matching_label[{}].regexp", i),
            &rml.regexp,
        )?);
        rml.grace_period_duration = compile_duration(
            format!("require_matching_label[{}].grace_period", i),
            &rml.grace_period,
        )?;
    }
    Ok(())
}
