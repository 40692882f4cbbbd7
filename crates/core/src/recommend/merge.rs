use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

/// Candidate lists feeding the merge, in priority order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CandidateGroups {
    pub personalized: Vec<String>,
    pub co_viewed: Vec<String>,
    pub popular: Vec<String>,
    /// Popularity candidates before category filtering, used only for backfill.
    pub popular_unfiltered: Vec<String>,
}

/// Why an item made the final list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Source {
    #[serde(rename = "Personalized")]
    Personalized,
    #[serde(rename = "Co-view")]
    CoView,
    #[serde(rename = "Popular")]
    Popular,
}

impl Source {
    pub fn label(self) -> &'static str {
        match self {
            Self::Personalized => "Personalized",
            Self::CoView => "Co-view",
            Self::Popular => "Popular",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Strict-priority merge of the filtered groups, deduplicated and capped at
/// `count`, then topped up from unfiltered popularity.
pub fn merge(groups: &CandidateGroups, count: usize) -> Vec<String> {
    let mut merged = Vec::with_capacity(count);
    let mut seen = HashSet::with_capacity(count);

    let prioritized = [&groups.personalized, &groups.co_viewed, &groups.popular];
    'groups: for group in prioritized {
        for item in group {
            if merged.len() >= count {
                break 'groups;
            }
            if seen.insert(item.as_str()) {
                merged.push(item.clone());
            }
        }
    }

    for item in &groups.popular_unfiltered {
        if merged.len() >= count {
            break;
        }
        if seen.insert(item.as_str()) {
            merged.push(item.clone());
        }
    }

    merged
}

/// Per-item source, by membership in the filtered groups. Does not affect order.
pub fn attribute(groups: &CandidateGroups, merged: &[String]) -> Vec<Source> {
    let personalized: HashSet<&str> = groups.personalized.iter().map(String::as_str).collect();
    let co_viewed: HashSet<&str> = groups.co_viewed.iter().map(String::as_str).collect();

    merged
        .iter()
        .map(|item| {
            if personalized.contains(item.as_str()) {
                Source::Personalized
            } else if co_viewed.contains(item.as_str()) {
                Source::CoView
            } else {
                Source::Popular
            }
        })
        .collect()
}
