//! Merging of job config fragments.
//!
//! Fragments are combined, never reconciled: anything that would make two
//! fragments ambiguous is rejected, so the merge order only decides which
//! conflict gets reported first.

use super::jobs::JobConfig;
use crate::error::{ConfigError, Result};
use std::collections::HashSet;

/// Append `fragment` to `acc`.
///
/// Fails if any `label:value` pair appears in more than one preset across the
/// combined list. On failure `acc` is left untouched.
pub fn merge_job_config(acc: &mut JobConfig, fragment: JobConfig) -> Result<()> {
    let mut seen = HashSet::new();
    for preset in acc.presets.iter().chain(fragment.presets.iter()) {
        for pair in preset.label_pairs() {
            if !seen.insert(pair.clone()) {
                return Err(ConfigError::DuplicatePresetPair(pair));
            }
        }
    }

    acc.presets.extend(fragment.presets);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::jobs::Preset;

    fn preset(labels: &[(&str, &str)]) -> Preset {
        Preset {
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Preset::default()
        }
    }

    fn job_config(presets: Vec<Preset>) -> JobConfig {
        JobConfig { presets }
    }

    #[test]
    fn test_merge_appends_in_order() {
        let mut acc = job_config(vec![preset(&[("team", "x")])]);
        merge_job_config(&mut acc, job_config(vec![preset(&[("team", "y")])])).unwrap();
        assert_eq!(acc.presets.len(), 2);
        assert_eq!(acc.presets[1].labels["team"], "y");
    }

    #[test]
    fn test_duplicate_pair_rejected_without_mutation() {
        let mut acc = job_config(vec![preset(&[("team", "x")])]);
        let err = merge_job_config(
            &mut acc,
            job_config(vec![preset(&[("env", "prod"), ("team", "x")])]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicatePresetPair(ref p) if p == "team:x"));
        assert_eq!(acc.presets.len(), 1);
    }

    #[test]
    fn test_duplicate_within_one_fragment() {
        let mut acc = JobConfig::default();
        let err = merge_job_config(
            &mut acc,
            job_config(vec![preset(&[("a", "1")]), preset(&[("a", "1")])]),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "duplicated preset 'label:value' pair: a:1");
    }

    #[test]
    fn test_same_label_different_value_is_fine() {
        let mut acc = job_config(vec![preset(&[("team", "x")])]);
        merge_job_config(&mut acc, job_config(vec![preset(&[("team", "z")])])).unwrap();
        merge_job_config(&mut acc, JobConfig::default()).unwrap();
        assert_eq!(acc.presets.len(), 2);
    }
}
