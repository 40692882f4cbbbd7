use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

/// One-way "viewed together" lists keyed by item code, pre-sorted by relevance.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoViewMap {
    related: HashMap<u32, Vec<u32>>,
}

/// Codes in the exported table show up both as JSON numbers and as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCode {
    Number(u32),
    Text(String),
    Other(serde_json::Value),
}

impl RawCode {
    fn into_code(self) -> Result<u32, String> {
        match self {
            Self::Number(code) => Ok(code),
            Self::Text(text) => parse_code(&text),
            Self::Other(value) => Err(format!("`{value}` is not an item code")),
        }
    }
}

fn parse_code(text: &str) -> Result<u32, String> {
    text.trim().parse::<u32>().map_err(|_| format!("`{text}` is not an item code"))
}

impl CoViewMap {
    /// Parses the exported table. Rows whose key or targets are not item codes
    /// are dropped with a warning; only a malformed document is an error.
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let table: HashMap<String, Vec<RawCode>> =
            serde_json::from_str(raw).map_err(|error| error.to_string())?;

        let mut related = HashMap::with_capacity(table.len());
        for (key, codes) in table {
            let row = parse_code(&key).and_then(|source| {
                let codes = codes.into_iter().map(RawCode::into_code).collect::<Result<_, _>>()?;
                Ok((source, codes))
            });
            match row {
                Ok((source, codes)) => {
                    related.insert(source, codes);
                }
                Err(reason) => warn!(
                    event_name = "system.artifacts.row_skipped",
                    correlation_id = "bootstrap",
                    artifact = "co_view",
                    key = %key,
                    reason = %reason,
                    "co-view row skipped"
                ),
            }
        }
        Ok(Self { related })
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (u32, Vec<u32>)>) -> Self {
        Self { related: entries.into_iter().collect() }
    }

    pub fn related(&self, code: u32) -> Option<&[u32]> {
        self.related.get(&code).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.related.len()
    }

    pub fn is_empty(&self) -> bool {
        self.related.is_empty()
    }

    /// Every code mentioned in the table, as key or target.
    pub fn codes(&self) -> impl Iterator<Item = u32> + '_ {
        self.related
            .iter()
            .flat_map(|(source, targets)| std::iter::once(source).chain(targets.iter()))
            .copied()
    }
}

/// Item codes ordered by descending global popularity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PopularityList {
    codes: Vec<u32>,
}

impl PopularityList {
    pub fn new(codes: Vec<u32>) -> Self {
        Self { codes }
    }

    /// Parses the exported list, dropping entries that are not item codes.
    pub fn from_json(raw: &str) -> Result<Self, String> {
        let entries: Vec<RawCode> = serde_json::from_str(raw).map_err(|error| error.to_string())?;

        let mut codes = Vec::with_capacity(entries.len());
        for (position, entry) in entries.into_iter().enumerate() {
            match entry.into_code() {
                Ok(code) => codes.push(code),
                Err(reason) => warn!(
                    event_name = "system.artifacts.row_skipped",
                    correlation_id = "bootstrap",
                    artifact = "popular",
                    position,
                    reason = %reason,
                    "popularity entry skipped"
                ),
            }
        }
        Ok(Self { codes })
    }

    pub fn top(&self, count: usize) -> &[u32] {
        &self.codes[..count.min(self.codes.len())]
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn codes(&self) -> &[u32] {
        &self.codes
    }
}

#[cfg(test)]
mod tests {
    use super::{CoViewMap, PopularityList};

    #[test]
    fn accepts_numeric_and_string_codes() {
        let map = CoViewMap::from_json(r#"{"3": [7, "9", 1], "7": []}"#).expect("valid table");

        assert_eq!(map.related(3), Some(&[7, 9, 1][..]));
        assert_eq!(map.related(7), Some(&[][..]));
        assert_eq!(map.related(1), None);
        assert_eq!(map.codes().max(), Some(9));
    }

    #[test]
    fn unparsable_rows_are_skipped_not_fatal() {
        let map = CoViewMap::from_json(r#"{"p1": [1], "3": [7], "4": [2, "x"], "5": [null]}"#)
            .expect("document is well formed");

        assert_eq!(map.len(), 1);
        assert_eq!(map.related(3), Some(&[7][..]));
        assert_eq!(map.related(4), None);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(CoViewMap::from_json("[1, 2]").is_err());
        assert!(PopularityList::from_json("{\"0\": 1}").is_err());
    }

    #[test]
    fn popularity_skips_entries_that_are_not_codes() {
        let popular = PopularityList::from_json(r#"[4, "2", "hat", 9, -1]"#).expect("valid list");

        assert_eq!(popular.codes(), &[4, 2, 9]);
    }

    #[test]
    fn popularity_top_is_bounded_by_list_length() {
        let popular: PopularityList = serde_json::from_str("[4, 2, 9]").expect("valid list");

        assert_eq!(popular.top(2), &[4, 2]);
        assert_eq!(popular.top(10), &[4, 2, 9]);
        assert!(PopularityList::default().top(3).is_empty());
    }
}
