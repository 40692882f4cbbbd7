use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Bijective mapping between external identifiers and dense codes.
///
/// The position of a class in `classes` is its code, so the serialized form is
/// just the ordered class list.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "EncoderFile", into = "EncoderFile")]
pub struct LabelEncoder {
    classes: Vec<String>,
    codes: HashMap<String, u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct EncoderFile {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn from_classes(classes: Vec<String>) -> Result<Self, String> {
        let mut codes = HashMap::with_capacity(classes.len());
        for (position, class) in classes.iter().enumerate() {
            let code = u32::try_from(position)
                .map_err(|_| format!("too many classes ({}) for u32 codes", classes.len()))?;
            if codes.insert(class.clone(), code).is_some() {
                return Err(format!("duplicate class `{class}`"));
            }
        }
        Ok(Self { classes, codes })
    }

    pub fn encode(&self, label: &str) -> Option<u32> {
        self.codes.get(label).copied()
    }

    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.codes.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

impl TryFrom<EncoderFile> for LabelEncoder {
    type Error = String;

    fn try_from(value: EncoderFile) -> Result<Self, Self::Error> {
        Self::from_classes(value.classes)
    }
}

impl From<LabelEncoder> for EncoderFile {
    fn from(value: LabelEncoder) -> Self {
        Self { classes: value.classes }
    }
}

#[cfg(test)]
mod tests {
    use super::LabelEncoder;

    fn encoder(classes: &[&str]) -> LabelEncoder {
        LabelEncoder::from_classes(classes.iter().map(|c| c.to_string()).collect())
            .expect("classes are unique")
    }

    #[test]
    fn encode_and_decode_are_inverse() {
        let items = encoder(&["p1000", "p1001", "p1002"]);

        assert_eq!(items.encode("p1001"), Some(1));
        assert_eq!(items.decode(1), Some("p1001"));
        assert_eq!(items.len(), 3);
        assert!(items.contains("p1002"));
    }

    #[test]
    fn unknown_labels_and_codes_are_absent() {
        let items = encoder(&["p1000"]);

        assert_eq!(items.encode("p9999"), None);
        assert_eq!(items.decode(7), None);
    }

    #[test]
    fn duplicate_classes_are_rejected() {
        let error = LabelEncoder::from_classes(vec!["u1".into(), "u2".into(), "u1".into()])
            .expect_err("duplicates must fail");
        assert!(error.contains("u1"));
    }

    #[test]
    fn deserializes_from_class_list() {
        let users: LabelEncoder =
            serde_json::from_str(r#"{"classes": ["u1", "u2"]}"#).expect("valid encoder json");
        assert_eq!(users.encode("u2"), Some(1));

        let duplicate = serde_json::from_str::<LabelEncoder>(r#"{"classes": ["u1", "u1"]}"#);
        assert!(duplicate.is_err());
    }
}
