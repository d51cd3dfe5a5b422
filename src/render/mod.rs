//! Rendering of resolved entries into styled structured-content documents.

mod document;
mod sections;

pub use document::{Content, Element, ElementTag, Style};

use crate::resolve::{EntryGraph, NodeId};

/// Render one node of the graph.
///
/// Returns `None` for nodes with neither translations nor a base form: they
/// have nothing to show. The base form contributes one abbreviated section
/// and is never followed further.
pub fn render(graph: &EntryGraph, id: NodeId, pos_tag: &str) -> Option<Element> {
    let entry = graph.entry(id);
    let base = graph.base_form(id).map(|node| node.entry());
    let has_translations = !entry.translations.is_empty();

    if !has_translations && base.is_none() {
        return None;
    }

    let mut blocks = vec![sections::header(&entry.headword, pos_tag)];
    blocks.extend(sections::pronunciation(entry));
    blocks.extend(sections::usage(entry));

    if has_translations {
        blocks.extend(sections::definitions(entry));
    }

    if let Some(base) = base {
        blocks.extend(sections::base_form(base));
    }

    if has_translations {
        blocks.extend(sections::idioms(&entry.idioms));
        blocks.extend(sections::synonyms(entry));
    }

    Some(Element::div(blocks))
}
