// SPDX-License-Identifier: GPL-3.0-or-later
// src/records/alias.rs
//
// Flexible column lookup across inconsistently named record keys.

use serde_json::Value;
use unicode_normalization::UnicodeNormalization;

use super::Record;

/// Normalized keys shorter than this only match when equal; otherwise a
/// column like `id` would be found inside any candidate ending in "id".
const MIN_CONTAINED_KEY_LEN: usize = 3;

/// Fold a column name for comparison: lowercase, strip accents, drop spaces.
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .map(|c| if c == 'đ' { 'd' } else { c })
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn keys_match(record_key: &str, candidate: &str) -> bool {
    if record_key.is_empty() || candidate.is_empty() {
        return false;
    }
    if record_key == candidate {
        return true;
    }
    (candidate.contains(record_key) && record_key.chars().count() >= MIN_CONTAINED_KEY_LEN)
        || record_key.contains(candidate)
}

/// Actual key of `record` that answers to one of `candidates`.
///
/// Candidates are tried in order. Each first looks for an exact key, then
/// for a key whose folded form contains (or is contained in) the folded
/// candidate.
pub fn resolve_key<'r>(record: &'r Record, candidates: &[&str]) -> Option<&'r str> {
    for candidate in candidates {
        if let Some((key, _)) = record.get_key_value(*candidate) {
            return Some(key.as_str());
        }

        let folded = normalize_key(candidate);
        if let Some(key) = record
            .keys()
            .find(|key| keys_match(&normalize_key(key), &folded))
        {
            return Some(key.as_str());
        }
    }
    None
}

/// Value of the first column answering to `candidates`.
pub fn lookup<'r>(record: &'r Record, candidates: &[&str]) -> Option<&'r Value> {
    resolve_key(record, candidates).and_then(|key| record.get(key))
}
