//! Fuzzy ranking of file lists
//!
//! Matching is done by `fuse-rust`, which scores with bitap semantics: 0.0 is
//! a perfect match and 1.0 a complete mismatch, combining the edits needed
//! with how far from the start of the candidate the match sits.

use crate::config::FuzzyOptions;
use fuse_rust::Fuse;

/// Longest query handed to the bitap matcher; longer ones match as substrings
const MAX_PATTERN_BYTES: usize = 32;

/// One ranked hit
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyHit<'a> {
    /// The matched item
    pub item: &'a str,
    /// Position of the item in the indexed list
    pub index: usize,
    /// Match score when `include_score` is set
    pub score: Option<f64>,
}

/// Fuzzy engine built once over an ordered list of candidates
pub struct FuzzyEngine {
    items: Vec<String>,
    options: FuzzyOptions,
    fuse: Fuse,
}

impl FuzzyEngine {
    pub fn new(items: Vec<String>, options: FuzzyOptions) -> Self {
        let fuse = Fuse {
            threshold: options.threshold,
            distance: i32::try_from(options.distance).unwrap_or(i32::MAX),
            is_case_sensitive: options.case_sensitive,
            ..Fuse::default()
        };
        Self {
            items,
            options,
            fuse,
        }
    }

    /// Rank every candidate against `query`, best first
    ///
    /// Ties keep the order of the indexed list.
    pub fn search(&self, query: &str) -> Vec<FuzzyHit<'_>> {
        if query.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(f64, usize)> = if query.len() > MAX_PATTERN_BYTES {
            self.substring_scores(query)
        } else {
            self.fuse
                .search_text_in_iterable(query, self.items.iter())
                .into_iter()
                .map(|result| (result.score, result.index))
                .collect()
        };

        scored.retain(|(score, _)| *score <= self.options.threshold);
        scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        scored
            .into_iter()
            .map(|(score, index)| FuzzyHit {
                item: &self.items[index],
                index,
                score: self.options.include_score.then_some(score),
            })
            .collect()
    }

    /// Exact occurrences scored by how far in they start
    fn substring_scores(&self, query: &str) -> Vec<(f64, usize)> {
        let fold = |text: &str| {
            if self.options.case_sensitive {
                text.to_string()
            } else {
                text.to_lowercase()
            }
        };
        let needle = fold(query);
        let distance = self.options.distance.max(1) as f64;

        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                fold(item)
                    .find(&needle)
                    .map(|start| (start as f64 / distance, index))
            })
            .collect()
    }
}

impl std::fmt::Debug for FuzzyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuzzyEngine")
            .field("items", &self.items.len())
            .field("options", &self.options)
            .finish()
    }
}
