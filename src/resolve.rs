//! Entry relationship resolution.
//!
//! Groups parsed entries by headword, creates placeholder entries for
//! inflected forms that have no entry of their own, and links every
//! inflected-form entry back to the entry it was derived from.
//!
//! Nodes live in a flat arena owned by [`EntryGraph`]; the base-form relation
//! is an optional [`NodeId`] rather than a reference, so the graph holds no
//! ownership cycles. A node is linked at most once and never to itself or to
//! anything that already derives from it, which keeps the relation a forest.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::model::{Entry, UNKNOWN_WORD_CLASS};

/// Stable index of a node inside an [`EntryGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One resolved entry plus its optional base form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryNode {
    entry: Entry,
    base_form: Option<NodeId>,
}

impl EntryNode {
    fn new(entry: Entry, base_form: Option<NodeId>) -> Self {
        Self { entry, base_form }
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn base_form(&self) -> Option<NodeId> {
        self.base_form
    }
}

/// Counters reported after a resolution pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolveStats {
    pub input_entries: usize,
    pub headwords: usize,
    pub total_entries: usize,
    /// Placeholder entries created for inflections without an entry.
    pub generated: usize,
    /// Existing entries linked to a base form.
    pub linked: usize,
}

/// Headword → homograph nodes, in first-seen order.
#[derive(Debug, Default, Clone)]
pub struct EntryGraph {
    nodes: Vec<EntryNode>,
    groups: IndexMap<String, Vec<NodeId>>,
    stats: ResolveStats,
}

impl EntryGraph {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn stats(&self) -> ResolveStats {
        self.stats
    }

    pub fn node(&self, id: NodeId) -> &EntryNode {
        &self.nodes[id.0]
    }

    pub fn entry(&self, id: NodeId) -> &Entry {
        &self.nodes[id.0].entry
    }

    /// The node `id` was linked to as its base form, if any.
    pub fn base_form(&self, id: NodeId) -> Option<&EntryNode> {
        self.nodes[id.0].base_form.map(|base| &self.nodes[base.0])
    }

    /// All nodes sharing a headword, in input order.
    pub fn group(&self, headword: &str) -> Option<&[NodeId]> {
        self.groups.get(headword).map(Vec::as_slice)
    }

    /// Headword groups in the order they were created.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[NodeId])> {
        self.groups.iter().map(|(headword, ids)| (headword.as_str(), ids.as_slice()))
    }

    pub fn headwords(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Every node, group by group, in the order groups were created.
    pub fn nodes_in_order(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.groups.values().flatten().copied()
    }

    fn push(&mut self, node: EntryNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// True if following base forms from `from` reaches `target`.
    fn derives_from(&self, from: NodeId, target: NodeId) -> bool {
        let mut current = Some(from);
        // A forest path can visit each node at most once.
        for _ in 0..=self.nodes.len() {
            match current {
                Some(id) if id == target => return true,
                Some(id) => current = self.nodes[id.0].base_form,
                None => return false,
            }
        }
        false
    }

    fn link(&mut self, id: NodeId, base: NodeId) {
        let base_headword = self.nodes[base.0].entry.headword.clone();
        let node = &mut self.nodes[id.0];
        node.base_form = Some(base);
        annotate_inflection(&mut node.entry, &base_headword);
    }
}

/// Build the resolution graph from parsed entries.
pub fn resolve(entries: Vec<Entry>) -> EntryGraph {
    info!("processing {} raw entries", entries.len());

    let mut graph = EntryGraph::default();
    graph.stats.input_entries = entries.len();

    for mut entry in entries {
        if entry.word_class.is_empty() {
            entry.word_class = UNKNOWN_WORD_CLASS.to_string();
        }
        let headword = entry.headword.clone();
        let id = graph.push(EntryNode::new(entry, None));
        graph.groups.entry(headword).or_default().push(id);
    }

    // Only parsed entries can be sources; placeholders never carry inflections.
    let sources: Vec<NodeId> = graph.nodes_in_order().collect();

    for source in sources {
        let (headword, inflections) = {
            let entry = graph.entry(source);
            (entry.headword.clone(), entry.inflections.clone())
        };

        for inflection in inflections {
            if inflection.is_empty() || inflection == headword {
                continue;
            }

            match graph.groups.get(&inflection).cloned() {
                None => {
                    let placeholder = placeholder_entry(&inflection, graph.entry(source));
                    let id = graph.push(EntryNode::new(placeholder, Some(source)));
                    graph.groups.insert(inflection, vec![id]);
                    graph.stats.generated += 1;
                }
                Some(existing) => {
                    for candidate in existing {
                        if can_link(&graph, candidate, source) {
                            debug!("linking '{}' to base form '{}'", inflection, headword);
                            graph.link(candidate, source);
                            graph.stats.linked += 1;
                        }
                    }
                }
            }
        }
    }

    graph.stats.headwords = graph.groups.len();
    graph.stats.total_entries = graph.nodes.len();
    info!(
        "built {} headwords with {} total entries (generated {} missing, linked {} existing)",
        graph.stats.headwords, graph.stats.total_entries, graph.stats.generated, graph.stats.linked
    );

    graph
}

fn can_link(graph: &EntryGraph, candidate: NodeId, source: NodeId) -> bool {
    if candidate == source || graph.node(candidate).base_form.is_some() {
        return false;
    }

    let candidate_entry = graph.entry(candidate);
    let class_matches = candidate_entry.word_class == graph.entry(source).word_class
        || candidate_entry.has_unknown_class();

    class_matches && !graph.derives_from(source, candidate)
}

fn inflection_note(base_headword: &str) -> String {
    format!("inflected form of \"{}\"", base_headword)
}

fn placeholder_entry(inflection: &str, base: &Entry) -> Entry {
    let mut entry = Entry::new(inflection, base.word_class.clone(), base.lang.clone());
    entry.usage = Some(inflection_note(&base.headword));
    entry
}

fn annotate_inflection(entry: &mut Entry, base_headword: &str) {
    let note = inflection_note(base_headword);
    entry.usage = Some(match entry.usage.as_deref() {
        Some(existing) if !existing.trim().is_empty() => {
            let existing = existing.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());
            format!("{}; {}", existing, note)
        }
        _ => note,
    });
}
