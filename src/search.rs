//! Kind search
//!
//! [`search`] is a case-insensitive substring filter over kind number,
//! description and tag names. [`suggest`] ranks kinds by fuzzy score and
//! is meant for "did you mean" hints when a search comes back empty.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::Serialize;

use crate::schema::KindRecord;

/// A fuzzy match
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion<'a> {
    pub kind: &'a KindRecord,
    pub score: i64,
}

/// Records matching `query`, in their original order.
///
/// An empty query matches everything.
pub fn search<'a>(records: &'a [KindRecord], query: &str) -> Vec<&'a KindRecord> {
    let query = query.to_lowercase();
    if query.is_empty() {
        return records.iter().collect();
    }

    records.iter().filter(|record| matches(record, &query)).collect()
}

/// Does `record` match an already lower-cased, non-empty query
fn matches(record: &KindRecord, query: &str) -> bool {
    record.number.to_string().contains(query)
        || record.description.to_lowercase().contains(query)
        || record.tag_names().to_lowercase().contains(query)
}

/// Up to `limit` records ranked by fuzzy match against
/// `"<number> <description>"`, best first
pub fn suggest<'a>(records: &'a [KindRecord], query: &str, limit: usize) -> Vec<Suggestion<'a>> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default().ignore_case();
    let mut results: Vec<Suggestion<'a>> = records
        .iter()
        .filter_map(|kind| {
            let haystack = format!("{} {}", kind.number, kind.description);
            matcher
                .fuzzy_match(&haystack, query)
                .map(|score| Suggestion { kind, score })
        })
        .collect();

    // Highest score first; ties keep kind order
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(limit);
    results
}
