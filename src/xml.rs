//! Reader for the Folkets Lexikon XML export.
//!
//! The export is a flat list of `<word>` elements under a single root. Every
//! fact about a word is an attribute, either on the `<word>` itself or on one
//! of its direct children:
//!
//! ```xml
//! <dictionary>
//!   <word value="springa" class="vb" lang="sv">
//!     <translation value="run"/>
//!     <phonetic value="sprIN:a" soundFile="springa.swf"/>
//!     <paradigm><inflection value="sprang"/></paradigm>
//!     <example value="springa fort"><translation value="run fast"/></example>
//!   </word>
//! </dictionary>
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use bzip2::read::BzDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{info, warn};

use crate::error::{ConvertError, Result};
use crate::model::{CrossReference, Entry, Phrase, Synonym, Variant, DEFAULT_LANG};

const READ_BUFFER: usize = 256 * 1024;

// Element depths: the root is 1, words 2, their children 3.
const WORD_LEVEL: usize = 2;
const CHILD_LEVEL: usize = 3;
const NESTED_LEVEL: usize = 4;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    /// `<word>` elements seen.
    pub words: usize,
    /// Entries kept.
    pub entries: usize,
    /// Words dropped for lacking a headword.
    pub missing_headword: usize,
}

#[derive(Debug, Default)]
pub struct Parsed {
    pub entries: Vec<Entry>,
    pub stats: ParseStats,
}

/// Open an export file, decompressing `.bz2` inputs on the fly.
pub fn parse_file(path: &Path) -> Result<Parsed> {
    let file = File::open(path).map_err(ConvertError::io("open", path))?;
    let reader: Box<dyn BufRead> = if path.to_string_lossy().ends_with(".bz2") {
        Box::new(BufReader::with_capacity(READ_BUFFER, BzDecoder::new(file)))
    } else {
        Box::new(BufReader::with_capacity(READ_BUFFER, file))
    };
    parse_reader(reader)
}

pub fn parse_reader(input: impl BufRead) -> Result<Parsed> {
    let mut reader = Reader::from_reader(input);
    reader.config_mut().trim_text(true);

    let mut builder = EntryBuilder::default();
    let mut buf = Vec::new();
    let mut depth = 0usize;

    loop {
        let event = reader.read_event_into(&mut buf);
        let step = match event {
            Ok(Event::Start(ref element)) => {
                depth += 1;
                builder.open(depth, element)
            }
            Ok(Event::Empty(ref element)) => builder.open(depth + 1, element).map(|()| {
                builder.close(depth + 1);
            }),
            Ok(Event::End(_)) => {
                builder.close(depth);
                depth = depth.saturating_sub(1);
                Ok(())
            }
            Ok(Event::Eof) => break,
            Ok(_) => Ok(()),
            Err(err) => Err(err),
        };

        step.map_err(|source| ConvertError::Xml {
            position: reader.buffer_position() as u64,
            source,
        })?;
        buf.clear();
    }

    let parsed = builder.finish();
    info!(
        "parsed {} entries from {} words",
        parsed.stats.entries, parsed.stats.words
    );
    if parsed.stats.missing_headword > 0 {
        warn!(
            "dropped {} words without a headword",
            parsed.stats.missing_headword
        );
    }
    Ok(parsed)
}

/// Child element whose own children carry data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nested {
    Paradigm,
    Example,
    Idiom,
    Definition,
}

#[derive(Debug, Default)]
struct EntryBuilder {
    parsed: Parsed,
    word: Option<Entry>,
    nested: Option<Nested>,
    /// Whether the current example/idiom/definition already has its translation.
    translated: bool,
}

impl EntryBuilder {
    fn open(&mut self, level: usize, element: &BytesStart<'_>) -> quick_xml::Result<()> {
        let name = element.name();
        let name = name.as_ref();

        match level {
            WORD_LEVEL if name == b"word" => {
                let headword = attribute(element, b"value")?.unwrap_or_default();
                let word_class = attribute(element, b"class")?.unwrap_or_default();
                let lang = attribute(element, b"lang")?.unwrap_or_else(|| DEFAULT_LANG.to_string());
                self.word = Some(Entry::new(headword, word_class, lang));
            }
            CHILD_LEVEL => {
                if let Some(entry) = self.word.as_mut() {
                    self.nested = read_child(entry, name, element)?;
                    self.translated = false;
                }
            }
            NESTED_LEVEL => {
                if let (Some(entry), Some(nested)) = (self.word.as_mut(), self.nested) {
                    self.translated |= read_nested(entry, nested, self.translated, name, element)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, level: usize) {
        match level {
            CHILD_LEVEL => self.nested = None,
            WORD_LEVEL => {
                if let Some(entry) = self.word.take() {
                    self.parsed.stats.words += 1;
                    if entry.headword.is_empty() {
                        self.parsed.stats.missing_headword += 1;
                    } else {
                        self.parsed.entries.push(entry);
                    }
                }
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Parsed {
        self.parsed.stats.entries = self.parsed.entries.len();
        self.parsed
    }
}

/// Record a direct child of `<word>`, returning what its own children mean.
fn read_child(
    entry: &mut Entry,
    name: &[u8],
    element: &BytesStart<'_>,
) -> quick_xml::Result<Option<Nested>> {
    let value = attribute(element, b"value")?;

    match name {
        b"translation" => {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                entry.translations.push(value);
            }
        }
        b"phonetic" => {
            entry.phonetic = value.filter(|v| !v.is_empty());
            if let Some(sound_file) = attribute(element, b"soundFile")?.filter(|v| !v.is_empty()) {
                entry.sound_file = Some(sound_file);
            }
        }
        b"paradigm" => return Ok(Some(Nested::Paradigm)),
        b"example" => {
            entry.examples.push(Phrase::new(value.unwrap_or_default(), None));
            return Ok(Some(Nested::Example));
        }
        b"idiom" => {
            entry.idioms.push(Phrase::new(value.unwrap_or_default(), None));
            return Ok(Some(Nested::Idiom));
        }
        b"definition" => {
            entry.definitions.push(Phrase::new(value.unwrap_or_default(), None));
            return Ok(Some(Nested::Definition));
        }
        b"use" => entry.usage = value.filter(|v| !v.is_empty()),
        b"grammar" => entry.grammar = value.filter(|v| !v.is_empty()),
        b"synonym" => entry.synonyms.push(Synonym {
            value: value.unwrap_or_default(),
            level: non_empty(attribute(element, b"level")?),
        }),
        b"variant" => entry.variants.push(Variant {
            value: value.unwrap_or_default(),
            alt: non_empty(attribute(element, b"alt")?),
        }),
        b"see" => entry.see_also.push(CrossReference {
            value: value.unwrap_or_default(),
            kind: non_empty(attribute(element, b"type")?),
        }),
        _ => {}
    }

    Ok(None)
}

/// Record a grandchild of `<word>`. Returns true if it was the translation of
/// the enclosing example, idiom or definition.
fn read_nested(
    entry: &mut Entry,
    nested: Nested,
    translated: bool,
    name: &[u8],
    element: &BytesStart<'_>,
) -> quick_xml::Result<bool> {
    let phrases = match (nested, name) {
        (Nested::Paradigm, b"inflection") => {
            if let Some(value) = attribute(element, b"value")?.filter(|v| !v.is_empty()) {
                entry.inflections.push(value);
            }
            return Ok(false);
        }
        (Nested::Example, b"translation") => &mut entry.examples,
        (Nested::Idiom, b"translation") => &mut entry.idioms,
        (Nested::Definition, b"translation") => &mut entry.definitions,
        _ => return Ok(false),
    };

    // Only the first translation counts
    if translated {
        return Ok(false);
    }
    if let Some(phrase) = phrases.last_mut() {
        phrase.target = non_empty(attribute(element, b"value")?);
    }
    Ok(true)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Look up an attribute and unescape it.
///
/// Values with entities XML does not define (`&nbsp;` and friends) are kept
/// raw for the text cleaner to decode later.
fn attribute(element: &BytesStart<'_>, key: &[u8]) -> quick_xml::Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
            };
            return Ok(Some(value));
        }
    }
    Ok(None)
}
