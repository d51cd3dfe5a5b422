//! Plain record types for one Folkets Lexikon `<word>` element.

use serde::Serialize;

/// Word class given to entries whose source record carried none.
pub const UNKNOWN_WORD_CLASS: &str = "unknown";

/// Default language code for headwords.
pub const DEFAULT_LANG: &str = "sv";

/// Source-language text with an optional target-language rendering.
///
/// Shared by examples, idioms and definitions, which all carry a Swedish
/// `value` and an optional nested English `<translation>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Phrase {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

impl Phrase {
    pub fn new(source: impl Into<String>, target: Option<String>) -> Self {
        Self {
            source: source.into(),
            target: target.filter(|t| !t.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Synonym {
    pub value: String,
    /// Proficiency level, e.g. "3.5".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub value: String,
    /// Alternate-form note, e.g. "also".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrossReference {
    pub value: String,
    /// Reference type, e.g. "saldo".
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A complete dictionary entry as parsed from the XML export.
///
/// `headword` is never empty: records without one are dropped by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub headword: String,
    pub word_class: String,
    pub lang: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub translations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_file: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inflections: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Phrase>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub idioms: Vec<Phrase>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub definitions: Vec<Phrase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<Synonym>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<Variant>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub see_also: Vec<CrossReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar: Option<String>,
}

impl Entry {
    pub fn new(
        headword: impl Into<String>,
        word_class: impl Into<String>,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            headword: headword.into(),
            word_class: word_class.into(),
            lang: lang.into(),
            translations: Vec::new(),
            phonetic: None,
            sound_file: None,
            inflections: Vec::new(),
            examples: Vec::new(),
            idioms: Vec::new(),
            definitions: Vec::new(),
            usage: None,
            synonyms: Vec::new(),
            variants: Vec::new(),
            see_also: Vec::new(),
            grammar: None,
        }
    }

    /// True when the word class is missing or the `unknown` sentinel.
    pub fn has_unknown_class(&self) -> bool {
        self.word_class.is_empty() || self.word_class == UNKNOWN_WORD_CLASS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serialized_entry_omits_empty_fields() {
        let mut entry = Entry::new("bil", "nn", DEFAULT_LANG);
        entry.translations = vec!["car".to_string()];
        entry.examples = vec![Phrase::new("köra bil", Some(String::new()))];
        entry.see_also = vec![CrossReference {
            value: "bil..1".to_string(),
            kind: Some("saldo".to_string()),
        }];

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "headword": "bil",
                "word_class": "nn",
                "lang": "sv",
                "translations": ["car"],
                "examples": [{"source": "köra bil"}],
                "see_also": [{"value": "bil..1", "type": "saldo"}],
            })
        );
    }

    #[test]
    fn unknown_class() {
        assert!(Entry::new("x", "", DEFAULT_LANG).has_unknown_class());
        assert!(Entry::new("x", UNKNOWN_WORD_CLASS, DEFAULT_LANG).has_unknown_class());
        assert!(!Entry::new("x", "nn", DEFAULT_LANG).has_unknown_class());
    }
}
