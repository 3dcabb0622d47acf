//! Partitioning of a flat probe-sample stream into per-target sequences.

use std::collections::HashMap;

use crate::model::ProbeSample;

/// Key used for samples that arrive without a target id.
pub const MISSING_TARGET_KEY: &str = "undefined";

/// Samples of a single target, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesGroup {
    pub key: String,
    pub samples: Vec<ProbeSample>,
}

/// Per-target partitions keyed by the stringified target id.
///
/// Groups are kept in order of first appearance; samples inside a group
/// keep their relative source order. Nothing is sorted, deduplicated or
/// clipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedSamples {
    groups: Vec<SeriesGroup>,
    index: HashMap<String, usize>,
}

impl GroupedSamples {
    pub fn group(results: &[ProbeSample]) -> Self {
        let mut grouped = Self::default();
        for sample in results {
            let key = target_key(sample);
            let slot = match grouped.index.get(&key) {
                Some(slot) => *slot,
                None => {
                    grouped.groups.push(SeriesGroup { key: key.clone(), samples: Vec::new() });
                    grouped.index.insert(key, grouped.groups.len() - 1);
                    grouped.groups.len() - 1
                }
            };
            grouped.groups[slot].samples.push(sample.clone());
        }
        grouped
    }

    pub fn get(&self, key: &str) -> Option<&[ProbeSample]> {
        self.index.get(key).map(|slot| self.groups[*slot].samples.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of samples across all groups.
    pub fn sample_count(&self) -> usize {
        self.groups.iter().map(|g| g.samples.len()).sum()
    }
}

fn target_key(sample: &ProbeSample) -> String {
    match sample.target_id {
        Some(id) => id.to_string(),
        None => MISSING_TARGET_KEY.to_string(),
    }
}
