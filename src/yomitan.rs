//! Yomitan dictionary records.
//!
//! Term-bank rows are fixed-position JSON arrays:
//! `[term, reading, definition_tags, rules, score, definitions, sequence, term_tags]`.
//! Swedish headwords have no separate reading and no deinflection rules, so
//! those positions stay empty.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use crate::pos::{PosTable, UnmappedClasses};
use crate::render::{render, Element};
use crate::resolve::EntryGraph;
use crate::text::clean_text;

pub const DEFAULT_TITLE: &str = "Folkets Lexikon Yomitanized";

const FORMAT: u32 = 3;
const VERSION: u32 = 2;
const AUTHOR: &str = "Community";
const URL: &str = "https://github.com/zhangdoa/Folkets-Lexikon-Yomitanized";
const DESCRIPTION: &str = "Swedish-English dictionary converted from Folkets Lexikon XML data \
with enhanced inflection processing.";
const ATTRIBUTION: &str = "Original data: Folkets Lexikon (https://folkets-lexikon.csc.kth.se/)";
const SOURCE_LANGUAGE: &str = "sv";
const TARGET_LANGUAGE: &str = "en";

/// Category of every row in the tag bank.
const POS_CATEGORY: &str = "pos";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Definition {
    StructuredContent { content: Element },
}

/// One term-bank row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermEntry(
    pub String,
    pub String,
    pub String,
    pub String,
    pub i64,
    pub Vec<Definition>,
    pub u64,
    pub String,
);

impl TermEntry {
    pub fn new(headword: String, pos_tag: String, content: Element, sequence: u64) -> Self {
        Self(
            headword,
            String::new(),
            pos_tag,
            String::new(),
            0,
            vec![Definition::StructuredContent { content }],
            sequence,
            String::new(),
        )
    }

    pub fn headword(&self) -> &str {
        &self.0
    }

    pub fn pos_tag(&self) -> &str {
        &self.2
    }

    pub fn sequence(&self) -> u64 {
        self.6
    }
}

/// One tag-bank row: `[name, category, order, notes, score]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagRow(pub String, pub &'static str, pub i32, pub String, pub i32);

/// Contents of `index.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryIndex {
    pub title: String,
    pub format: u32,
    pub version: u32,
    pub revision: String,
    pub sequenced: bool,
    pub author: String,
    pub url: String,
    pub description: String,
    pub attribution: String,
    pub source_language: String,
    pub target_language: String,
}

impl DictionaryIndex {
    pub fn new(title: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            format: FORMAT,
            version: VERSION,
            revision: revision.into(),
            sequenced: true,
            author: AUTHOR.to_string(),
            url: URL.to_string(),
            description: DESCRIPTION.to_string(),
            attribution: ATTRIBUTION.to_string(),
            source_language: SOURCE_LANGUAGE.to_string(),
            target_language: TARGET_LANGUAGE.to_string(),
        }
    }
}

/// Today's date in the `YYYY.MM.DD` revision format.
pub fn today_revision() -> String {
    chrono::Local::now().format("%Y.%m.%d").to_string()
}

/// Output of one conversion pass.
#[derive(Debug, Default)]
pub struct Conversion {
    pub terms: Vec<TermEntry>,
    /// Distinct tags of the emitted terms.
    pub tags: BTreeSet<String>,
    pub unmapped: UnmappedClasses,
    /// Nodes left out because they had nothing to render.
    pub skipped: usize,
}

pub struct Converter<'a> {
    pos: &'a PosTable,
}

impl<'a> Converter<'a> {
    pub fn new(pos: &'a PosTable) -> Self {
        Self { pos }
    }

    pub fn convert(&self, graph: &EntryGraph) -> Conversion {
        self.convert_with(graph, || {})
    }

    /// Convert every node in group order, calling `tick` once per node.
    pub fn convert_with(&self, graph: &EntryGraph, mut tick: impl FnMut()) -> Conversion {
        let mut conversion = Conversion::default();
        let mut sequence = 1;

        for id in graph.nodes_in_order() {
            tick();
            let entry = graph.entry(id);
            let pos_tag = self.pos.classify(&entry.word_class, &mut conversion.unmapped);

            match render(graph, id, pos_tag) {
                Some(content) => {
                    conversion.tags.insert(pos_tag.to_string());
                    conversion.terms.push(TermEntry::new(
                        clean_text(&entry.headword),
                        pos_tag.to_string(),
                        content,
                        sequence,
                    ));
                    sequence += 1;
                }
                None => conversion.skipped += 1,
            }
        }

        info!(
            "conversion complete: {} terms created, {} entries without content skipped",
            conversion.terms.len(),
            conversion.skipped
        );
        conversion
    }

    pub fn tag_bank(&self, tags: &BTreeSet<String>) -> Vec<TagRow> {
        tags.iter()
            .map(|tag| {
                TagRow(
                    tag.clone(),
                    POS_CATEGORY,
                    0,
                    self.pos.description(tag).to_string(),
                    0,
                )
            })
            .collect()
    }
}
