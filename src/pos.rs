//! Word class → part-of-speech tag classification.
//!
//! The table is loaded from a YAML schema of `pos_classes`, each listing the
//! source word-class variants that map to its tag `code`. A copy of
//! `schema/pos.yaml` is compiled into the crate and used unless a schema path
//! is given.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use once_cell::sync::OnceCell;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ConvertError, Result};
use crate::model::UNKNOWN_WORD_CLASS;

/// Tag for non-empty word classes that no schema variant covers.
pub const MISC_TAG: &str = "misc";

const BUILTIN_SCHEMA: &str = include_str!("../schema/pos.yaml");

static BUILTIN: OnceCell<PosTable> = OnceCell::new();

// === POS Schema YAML structures ===

#[derive(Debug, Deserialize)]
struct PosSchema {
    pos_classes: Vec<PosClass>,
}

#[derive(Debug, Deserialize)]
struct PosClass {
    code: String,
    #[allow(dead_code)]
    name: String,
    description: String,
    #[allow(dead_code)]
    short_description: Option<String>,
    variants: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PosTable {
    variants: HashMap<String, String>,
    descriptions: HashMap<String, String>,
}

impl PosTable {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let schema: PosSchema = serde_yaml::from_str(contents)?;

        let mut variants = HashMap::new();
        let mut descriptions = HashMap::new();
        for class in schema.pos_classes {
            for variant in class.variants {
                variants.insert(normalize(&variant), class.code.clone());
            }
            descriptions.insert(class.code, class.description);
        }

        Ok(Self {
            variants,
            descriptions,
        })
    }

    pub fn load(schema_path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(schema_path)
            .map_err(ConvertError::io("read POS schema", schema_path))?;
        let table = Self::from_yaml(&contents)?;
        info!(
            "loaded {} word-class variants from {}",
            table.variants.len(),
            schema_path.display()
        );
        Ok(table)
    }

    /// The table compiled from `schema/pos.yaml`.
    pub fn builtin() -> Result<&'static PosTable> {
        BUILTIN.get_or_try_init(|| Self::from_yaml(BUILTIN_SCHEMA))
    }

    /// Map a word-class code to its tag.
    ///
    /// Lookup ignores case and surrounding whitespace. The `unknown` sentinel
    /// passes through as its own tag. Any other code without a table entry is
    /// recorded in `unmapped` and falls back to [`MISC_TAG`].
    pub fn classify(&self, word_class: &str, unmapped: &mut UnmappedClasses) -> &str {
        let word_class = normalize(word_class);

        if let Some(tag) = self.variants.get(&word_class) {
            return tag;
        }

        if word_class == UNKNOWN_WORD_CLASS {
            return UNKNOWN_WORD_CLASS;
        }

        if !word_class.is_empty() {
            unmapped.record(word_class);
        }

        MISC_TAG
    }

    /// Human-readable description of a tag, falling back to the tag itself.
    pub fn description<'a>(&'a self, tag: &'a str) -> &'a str {
        self.descriptions.get(tag).map(String::as_str).unwrap_or(tag)
    }
}

fn normalize(word_class: &str) -> String {
    word_class.trim().to_lowercase()
}

/// Word-class codes seen during a run that had no table entry.
///
/// Diagnostic only: classification never fails because of them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UnmappedClasses(BTreeSet<String>);

impl UnmappedClasses {
    pub fn record(&mut self, word_class: String) {
        self.0.insert(word_class);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Codes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn report(&self) {
        if self.is_empty() {
            info!("all word classes were recognized or handled");
            return;
        }
        warn!("found {} unmapped word classes", self.len());
        for class in self.iter() {
            warn!("  - '{}'", class);
        }
    }
}
