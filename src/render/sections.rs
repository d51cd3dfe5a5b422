//! Builders for the individual blocks of a rendered entry.

use std::collections::HashSet;

use crate::model::{Entry, Phrase, Synonym};
use crate::phonetic::normalize_phonetic;
use crate::text::{clean_text, split_usage};

use super::document::{Content, Element, ElementTag, Style};

const MAX_BASE_TRANSLATIONS: usize = 3;
const MAX_BASE_EXAMPLES: usize = 3;
const MAX_IDIOMS: usize = 5;
const MAX_BASE_SYNONYMS: usize = 5;

// === Styles ===

const HEADER: Style = Style {
    font_size: Some("1.0em"),
    margin_bottom: Some("0.5em"),
    ..Style::NONE
};

const HEADWORD: Style = Style {
    font_weight: Some("bold"),
    font_size: Some("1.3em"),
    ..Style::NONE
};

const POS_TAG: Style = Style {
    color: Some("DarkBlue"),
    font_size: Some("1.0em"),
    font_weight: Some("bold"),
    ..Style::NONE
};

const PRONUNCIATION: Style = Style {
    font_size: Some("1.0em"),
    color: Some("#2563eb"),
    font_weight: Some("bold"),
    margin_bottom: Some("0.3em"),
    ..Style::NONE
};

const USAGE: Style = Style {
    font_size: Some("0.9em"),
    color: Some("#64748b"),
    font_style: Some("italic"),
    margin_bottom: Some("0.2em"),
    ..Style::NONE
};

const DEFINITION: Style = Style {
    font_size: Some("1.0em"),
    margin_bottom: Some("0.2em"),
    font_weight: Some("bold"),
    ..Style::NONE
};

const EXAMPLE: Style = Style {
    color: Some("darkgreen"),
    font_size: Some("0.9em"),
    margin_bottom: Some("0.2em"),
    ..Style::NONE
};

const IDIOM_HEADER: Style = Style {
    color: Some("darkorange"),
    font_size: Some("0.9em"),
    font_weight: Some("bold"),
    margin_top: Some("0.3em"),
    margin_bottom: Some("0.1em"),
    ..Style::NONE
};

const IDIOM: Style = Style {
    color: Some("darkorange"),
    font_size: Some("0.9em"),
    margin_bottom: Some("0.2em"),
    ..Style::NONE
};

const SYNONYMS: Style = Style {
    color: Some("#22c55e"),
    font_size: Some("0.9em"),
    margin_top: Some("0.5em"),
    margin_bottom: Some("0.5em"),
    ..Style::NONE
};

const BASE_SEPARATOR: Style = Style {
    font_size: Some("1.0em"),
    color: Some("#059669"),
    font_weight: Some("bold"),
    margin_top: Some("1.0em"),
    margin_bottom: Some("0.5em"),
    text_align: Some("center"),
    ..Style::NONE
};

const BASE_SYNONYMS: Style = Style {
    color: Some("#16a34a"),
    font_size: Some("0.85em"),
    margin_top: Some("0.3em"),
    ..Style::NONE
};

// === Sections ===

/// Headword followed by its bracketed part-of-speech tag.
pub fn header(headword: &str, pos_tag: &str) -> Element {
    Element::new(
        ElementTag::Div,
        vec![
            Content::from(Element::span(clean_text(headword), HEADWORD)),
            Content::from(Element::span(format!(" ⟨{}⟩", pos_tag), POS_TAG)),
        ],
        Some(HEADER),
    )
}

pub fn pronunciation(entry: &Entry) -> Option<Element> {
    let phonetic = entry.phonetic.as_deref().filter(|p| !p.is_empty())?;
    Some(Element::line(
        format!("[{}]", normalize_phonetic(phonetic)),
        PRONUNCIATION,
    ))
}

/// Usage clauses, then grammar, paradigm and variant notes.
pub fn usage(entry: &Entry) -> Vec<Element> {
    let mut lines = Vec::new();

    if let Some(usage) = entry.usage.as_deref() {
        for clause in split_usage(usage) {
            let clause = clean_text(&clause);
            if !clause.is_empty() {
                lines.push(Element::line(clause, USAGE));
            }
        }
    }

    if let Some(grammar) = entry.grammar.as_deref().filter(|g| !g.is_empty()) {
        lines.push(Element::line(
            format!("Grammar: {}", clean_text(grammar)),
            USAGE,
        ));
    }

    if !entry.inflections.is_empty() {
        let paradigm: Vec<String> = entry.inflections.iter().map(|i| clean_text(i)).collect();
        lines.push(Element::line(
            format!("Paradigm: {}", paradigm.join(", ")),
            USAGE,
        ));
    }

    if !entry.variants.is_empty() {
        let variants: Vec<String> = entry
            .variants
            .iter()
            .map(|v| annotated(&v.value, v.alt.as_deref()))
            .collect();
        lines.push(Element::line(
            format!("Also: {}", variants.join(", ")),
            USAGE,
        ));
    }

    lines
}

/// The entry's own translation line followed by its distinct examples.
///
/// Several translations are folded into one comma-joined line paired with
/// the first definition.
pub fn definitions(entry: &Entry) -> Vec<Element> {
    if entry.translations.is_empty() {
        return Vec::new();
    }

    let translation = entry.translations.join(", ");
    let mut lines = vec![definition_line(0, &translation, &entry.definitions)];

    let mut seen = HashSet::new();
    for example in &entry.examples {
        let source = clean_text(&example.source);
        if !source.is_empty() && seen.insert(source) {
            lines.push(phrase_line(example, EXAMPLE));
        }
    }

    lines
}

/// Abbreviated rendering of the entry an inflected form derives from.
pub fn base_form(base: &Entry) -> Vec<Element> {
    let mut lines = vec![Element::line(
        format!("━━━ Base form: \"{}\" ━━━", clean_text(&base.headword)),
        BASE_SEPARATOR,
    )];

    for (index, translation) in base
        .translations
        .iter()
        .take(MAX_BASE_TRANSLATIONS)
        .enumerate()
    {
        lines.push(definition_line(index, translation, &base.definitions));
    }

    for example in base.examples.iter().take(MAX_BASE_EXAMPLES) {
        lines.push(phrase_line(example, EXAMPLE));
    }

    lines.extend(idioms(&base.idioms));

    lines.extend(synonym_line(
        "Base synonyms",
        &base.synonyms,
        MAX_BASE_SYNONYMS,
        BASE_SYNONYMS,
    ));

    lines
}

/// Section header plus up to five distinct idioms. Empty without idioms.
pub fn idioms(idioms: &[Phrase]) -> Vec<Element> {
    if idioms.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![Element::line("Idioms:", IDIOM_HEADER)];
    let mut seen = HashSet::new();
    for idiom in idioms {
        if seen.len() >= MAX_IDIOMS {
            break;
        }
        let source = clean_text(&idiom.source);
        if !source.is_empty() && seen.insert(source) {
            lines.push(phrase_line(idiom, IDIOM));
        }
    }

    lines
}

pub fn synonyms(entry: &Entry) -> Option<Element> {
    synonym_line("Synonyms", &entry.synonyms, usize::MAX, SYNONYMS)
}

fn synonym_line(
    label: &str,
    synonyms: &[Synonym],
    limit: usize,
    style: Style,
) -> Option<Element> {
    if synonyms.is_empty() {
        return None;
    }
    let items: Vec<String> = synonyms
        .iter()
        .take(limit)
        .map(|s| annotated(&s.value, s.level.as_deref()))
        .collect();
    Some(Element::line(format!("{}: {}", label, items.join(", ")), style))
}

/// `source / target → translation`, using the definition at `index` if any.
fn definition_line(index: usize, translation: &str, definitions: &[Phrase]) -> Element {
    let mut text = String::new();

    if let Some(definition) = definitions.get(index).filter(|d| !d.source.is_empty()) {
        text.push_str(&clean_text(&definition.source));
        if let Some(target) = definition.target.as_deref() {
            text.push_str(" / ");
            text.push_str(&clean_text(target));
        }
        text.push(' ');
    }

    text.push_str("→ ");
    text.push_str(&clean_text(translation));

    Element::line(text, DEFINITION)
}

/// `「source」 target`
fn phrase_line(phrase: &Phrase, style: Style) -> Element {
    let mut text = format!("「{}」", clean_text(&phrase.source));
    if let Some(target) = phrase.target.as_deref() {
        text.push(' ');
        text.push_str(&clean_text(target));
    }
    Element::line(text, style)
}

fn annotated(value: &str, note: Option<&str>) -> String {
    match note.filter(|n| !n.is_empty()) {
        Some(note) => format!("{} ({})", clean_text(value), clean_text(note)),
        None => clean_text(value),
    }
}
