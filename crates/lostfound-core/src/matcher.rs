//! Keyword matching between lost reports and found items.
//!
//! A best-effort fuzzy filter, not a ranked search: results keep the order of
//! the found collection. A found item matches when any keyword pair overlaps,
//! or either record's name or location contains the other's.

use crate::types::{FoundRecord, LostRecord};

/// Tokens of this many UTF-16 code units or fewer are ignored.
const MAX_IGNORED_TOKEN_UNITS: usize = 2;
/// Minimum keyword score for a match on its own.
const MIN_MATCH_SCORE: usize = 1;

/// Why a found item was (or was not) considered a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchAssessment {
    /// Overlapping keyword pairs; every pair counts.
    pub score: usize,
    /// One name contains the other.
    pub type_match: bool,
    /// One location contains the other.
    pub location_match: bool,
}

impl MatchAssessment {
    pub fn is_match(&self) -> bool {
        self.score >= MIN_MATCH_SCORE || self.type_match || self.location_match
    }
}

/// A found item that passed the filter, with its assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedItem {
    pub item: FoundRecord,
    pub assessment: MatchAssessment,
}

/// Lowercased whitespace-separated keywords of a name and description.
///
/// Token length is measured in UTF-16 code units, the unit stored records were
/// first scored in, so a single emoji outside the BMP counts as two.
pub fn keywords(name: &str, description: &str) -> Vec<String> {
    format!("{name} {description}")
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.encode_utf16().count() > MAX_IGNORED_TOKEN_UNITS)
        .map(str::to_string)
        .collect()
}

/// Count keyword pairs where either word contains the other.
pub fn keyword_score(lost: &[String], found: &[String]) -> usize {
    lost.iter()
        .map(|lost_word| {
            found
                .iter()
                .filter(|found_word| {
                    lost_word.contains(found_word.as_str()) || found_word.contains(lost_word.as_str())
                })
                .count()
        })
        .sum()
}

/// Case-insensitive containment in either direction.
///
/// An empty side is contained in everything, so it always overlaps.
pub fn overlaps(left: &str, right: &str) -> bool {
    let left = left.to_lowercase();
    let right = right.to_lowercase();
    left.contains(&right) || right.contains(&left)
}

/// Score one found item against a lost report.
pub fn assess(lost: &LostRecord, found: &FoundRecord) -> MatchAssessment {
    let lost_keywords = keywords(&lost.name, &lost.description);
    assess_with_keywords(&lost_keywords, lost, found)
}

fn assess_with_keywords(
    lost_keywords: &[String],
    lost: &LostRecord,
    found: &FoundRecord,
) -> MatchAssessment {
    let found_keywords = keywords(&found.name, &found.description);
    MatchAssessment {
        score: keyword_score(lost_keywords, &found_keywords),
        type_match: overlaps(&lost.name, &found.name),
        location_match: overlaps(&lost.location, &found.location),
    }
}

/// Found items plausibly matching `lost`, in the order they were given.
pub fn find_matches(lost: &LostRecord, found: &[FoundRecord]) -> Vec<MatchedItem> {
    let lost_keywords = keywords(&lost.name, &lost.description);
    found
        .iter()
        .filter_map(|item| {
            let assessment = assess_with_keywords(&lost_keywords, lost, item);
            assessment.is_match().then(|| MatchedItem {
                item: item.clone(),
                assessment,
            })
        })
        .collect()
}
