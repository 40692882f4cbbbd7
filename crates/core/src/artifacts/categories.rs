use std::collections::{BTreeSet, HashMap};
use std::io;

/// Category → related categories. Not symmetric: look up by the exact key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryRelationships {
    related: HashMap<String, BTreeSet<String>>,
}

impl CategoryRelationships {
    /// Reads `main_category,related_category` rows; rows with a blank side are skipped.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = reader.headers()?.clone();
        let main = headers.iter().position(|header| header.trim() == "main_category");
        let related = headers.iter().position(|header| header.trim() == "related_category");

        let mut relationships = Self::default();
        for record in reader.records() {
            let record = record?;
            let value = |column: Option<usize>| {
                column.and_then(|index| record.get(index)).map(str::trim).unwrap_or_default()
            };
            let (main, related) = (value(main), value(related));
            if !main.is_empty() && !related.is_empty() {
                relationships.insert(main, related);
            }
        }
        Ok(relationships)
    }

    pub fn insert(&mut self, main: impl Into<String>, related: impl Into<String>) {
        self.related.entry(main.into()).or_default().insert(related.into());
    }

    pub fn related_to(&self, category: &str) -> Option<&BTreeSet<String>> {
        self.related.get(category)
    }

    pub fn len(&self) -> usize {
        self.related.len()
    }

    pub fn is_empty(&self) -> bool {
        self.related.is_empty()
    }
}
