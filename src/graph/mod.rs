//! Configuration graph: an ordered, de-duplicated set of triples.
//!
//! Every [`Graph`] receives a process-unique [`GraphId`] when it is created.
//! The id stands in for the graph's identity wherever a (graph, node) pair must
//! be keyed, so cached objects never outlive the question of which graph they
//! came from.
//!
//! - [`Graph`]: triples plus a subject index for property lookups
//! - [`GraphDocument`]: serde representation used to load graphs from JSON

pub mod document;

use std::collections::{HashMap, HashSet};
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use oxigraph::model::{BlankNode, NamedNode};

use crate::node::Node;

pub use document::{GraphDocument, TermDocument, TripleDocument};

/// Process-unique identity of a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct GraphId(NonZeroU64);

impl GraphId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        let raw = NEXT.fetch_add(1, Ordering::Relaxed);
        // Wrapping past u64::MAX would take centuries of graph creation.
        GraphId(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for GraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "graph:{}", self.0)
    }
}

/// A triple (subject, predicate, object) of a configuration graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
    /// The subject: normally an IRI or blank node.
    pub subject: Node,
    /// The predicate (property).
    pub predicate: NamedNode,
    /// The object value.
    pub object: Node,
}

impl Triple {
    pub fn new(subject: Node, predicate: NamedNode, object: Node) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl std::fmt::Display for Triple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// An in-memory RDF graph.
///
/// Triples keep their insertion order, so "the first value of a property" is
/// stable for a given graph. Inserting a triple that is already present is a no-op.
pub struct Graph {
    id: GraphId,
    base_iri: Option<NamedNode>,
    triples: Vec<Triple>,
    members: HashSet<Triple>,
    /// Subject → positions in `triples`.
    by_subject: HashMap<Node, Vec<usize>>,
}

impl Graph {
    /// Create a new empty graph with a fresh identity.
    pub fn new() -> Self {
        Self {
            id: GraphId::next(),
            base_iri: None,
            triples: Vec::new(),
            members: HashSet::new(),
            by_subject: HashMap::new(),
        }
    }

    /// The identity of this graph.
    pub fn id(&self) -> GraphId {
        self.id
    }

    /// The base IRI assigned to this graph, if any.
    pub fn base_iri(&self) -> Option<&NamedNode> {
        self.base_iri.as_ref()
    }

    pub fn set_base_iri(&mut self, iri: Option<NamedNode>) {
        self.base_iri = iri;
    }

    /// Insert a triple. Returns `false` if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.members.contains(&triple) {
            return false;
        }
        let pos = self.triples.len();
        self.by_subject
            .entry(triple.subject.clone())
            .or_default()
            .push(pos);
        self.members.insert(triple.clone());
        self.triples.push(triple);
        true
    }

    /// Insert a triple from its parts.
    pub fn insert_spo(&mut self, subject: Node, predicate: NamedNode, object: Node) -> bool {
        self.insert(Triple::new(subject, predicate, object))
    }

    /// All objects of `subject` for `predicate`, in insertion order.
    pub fn objects_for<'a, 'p>(
        &'a self,
        subject: &Node,
        predicate: &'p str,
    ) -> impl Iterator<Item = &'a Node> + use<'a, 'p> {
        self.by_subject
            .get(subject)
            .map(|positions| positions.as_slice())
            .unwrap_or_default()
            .iter()
            .map(move |&pos| &self.triples[pos])
            .filter(move |t| t.predicate.as_str() == predicate)
            .map(|t| &t.object)
    }

    /// The first object of `subject` for `predicate`.
    pub fn first_object(&self, subject: &Node, predicate: &str) -> Option<&Node> {
        self.objects_for(subject, predicate).next()
    }

    /// Every object of `predicate`, whatever the subject, in insertion order.
    pub fn objects_of_predicate(&self, predicate: &str) -> Vec<&Node> {
        self.triples
            .iter()
            .filter(|t| t.predicate.as_str() == predicate)
            .map(|t| &t.object)
            .collect()
    }

    /// All subjects having `object` as a value of `predicate`, in insertion order.
    pub fn subjects_with(&self, predicate: &str, object: &Node) -> Vec<&Node> {
        self.triples
            .iter()
            .filter(|t| t.predicate.as_str() == predicate && &t.object == object)
            .map(|t| &t.subject)
            .collect()
    }

    /// Whether `node` occurs anywhere in the graph.
    pub fn contains_node(&self, node: &Node) -> bool {
        self.by_subject.contains_key(node) || self.triples.iter().any(|t| &t.object == node)
    }

    /// Locate an IRI node that occurs in the graph.
    pub fn find_iri(&self, iri: &str) -> Option<Node> {
        let node = Node::Iri(NamedNode::new(iri).ok()?);
        self.contains_node(&node).then_some(node)
    }

    /// Locate a blank node that occurs in the graph by its label.
    pub fn find_blank(&self, label: &str) -> Option<Node> {
        let node = Node::Blank(BlankNode::new(label).ok()?);
        self.contains_node(&node).then_some(node)
    }

    /// Distinct subjects, in order of first appearance.
    pub fn subjects(&self) -> Vec<&Node> {
        let mut seen = HashSet::new();
        self.triples
            .iter()
            .map(|t| &t.subject)
            .filter(|s| seen.insert(*s))
            .collect()
    }

    /// Copy every triple of `other` into this graph.
    ///
    /// Blank nodes of `other` are relabelled with its graph id so they stay
    /// distinct from blank nodes already present here. Returns the number of
    /// triples added.
    pub fn merge(&mut self, other: &Graph) -> usize {
        if other.id == self.id {
            return 0;
        }
        let relabel = |node: &Node| match node {
            Node::Blank(b) => BlankNode::new(format!("g{}_{}", other.id.get(), b.as_str()))
                .map(Node::Blank)
                .unwrap_or_else(|_| node.clone()),
            _ => node.clone(),
        };
        let mut added = 0;
        for t in &other.triples {
            let triple = Triple::new(relabel(&t.subject), t.predicate.clone(), relabel(&t.object));
            if self.insert(triple) {
                added += 1;
            }
        }
        added
    }

    /// Iterate over all triples in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Number of triples.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Whether the graph has no triples.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("id", &self.id)
            .field("base_iri", &self.base_iri)
            .field("triples", &self.triples.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Node {
        Node::iri(s).unwrap()
    }

    fn pred(s: &str) -> NamedNode {
        NamedNode::new(s).unwrap()
    }

    #[test]
    fn graphs_get_distinct_ids() {
        let a = Graph::new();
        let b = Graph::new();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn insert_deduplicates() {
        let mut g = Graph::new();
        assert!(g.insert_spo(iri("urn:s"), pred("urn:p"), Node::literal("v")));
        assert!(!g.insert_spo(iri("urn:s"), pred("urn:p"), Node::literal("v")));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn objects_keep_insertion_order() {
        let mut g = Graph::new();
        let s = iri("urn:s");
        g.insert_spo(s.clone(), pred("urn:p"), Node::literal("1"));
        g.insert_spo(s.clone(), pred("urn:q"), Node::literal("x"));
        g.insert_spo(s.clone(), pred("urn:p"), Node::literal("2"));

        let values: Vec<_> = g
            .objects_for(&s, "urn:p")
            .filter_map(|n| n.lexical())
            .collect();
        assert_eq!(values, vec!["1", "2"]);
        assert_eq!(g.first_object(&s, "urn:q"), Some(&Node::literal("x")));
        assert_eq!(g.first_object(&s, "urn:missing"), None);
    }

    #[test]
    fn first_object_outlives_the_predicate_string() {
        let mut g = Graph::new();
        let s = iri("urn:s");
        g.insert_spo(s.clone(), pred("urn:p"), Node::literal("v"));
        let found = {
            let predicate = String::from("urn:p");
            g.first_object(&s, &predicate)
        };
        assert_eq!(found, Some(&Node::literal("v")));
        assert_eq!(g.objects_of_predicate("urn:p"), vec![&Node::literal("v")]);
    }

    #[test]
    fn subjects_with_finds_declared_instances() {
        let mut g = Graph::new();
        let class = iri("urn:Class");
        g.insert_spo(iri("urn:a"), pred("urn:type"), class.clone());
        g.insert_spo(iri("urn:b"), pred("urn:type"), iri("urn:Other"));
        g.insert_spo(iri("urn:c"), pred("urn:type"), class.clone());

        let found = g.subjects_with("urn:type", &class);
        assert_eq!(found, vec![&iri("urn:a"), &iri("urn:c")]);
    }

    #[test]
    fn find_nodes_by_identifier() {
        let mut g = Graph::new();
        g.insert_spo(Node::blank("b0").unwrap(), pred("urn:p"), iri("urn:o"));
        assert!(g.find_blank("b0").is_some());
        assert!(g.find_iri("urn:o").is_some());
        assert!(g.find_iri("urn:nowhere").is_none());
        assert!(g.find_blank("b1").is_none());
    }

    #[test]
    fn merge_relabels_blank_nodes() {
        let mut a = Graph::new();
        a.insert_spo(Node::blank("x").unwrap(), pred("urn:p"), Node::literal("a"));

        let mut b = Graph::new();
        b.insert_spo(Node::blank("x").unwrap(), pred("urn:p"), Node::literal("b"));
        b.insert_spo(iri("urn:s"), pred("urn:p"), Node::literal("c"));

        assert_eq!(a.merge(&b), 2);
        assert_eq!(a.len(), 3);
        // The original `_:x` is untouched and still has exactly one value.
        assert_eq!(a.objects_for(&Node::blank("x").unwrap(), "urn:p").count(), 1);
    }

    #[test]
    fn subjects_are_distinct_and_ordered() {
        let mut g = Graph::new();
        g.insert_spo(iri("urn:b"), pred("urn:p"), Node::literal("1"));
        g.insert_spo(iri("urn:a"), pred("urn:p"), Node::literal("2"));
        g.insert_spo(iri("urn:b"), pred("urn:q"), Node::literal("3"));
        assert_eq!(g.subjects(), vec![&iri("urn:b"), &iri("urn:a")]);
    }
}
