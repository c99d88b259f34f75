//! Node identities and the object cache.
//!
//! Every resolution is memoized per [`NodeIdentity`]. An entry moves through
//! a small state machine:
//!
//! ```text
//! (absent) --set_pending--> Pending --set_instance--> Instance
//!                              \------set_unloadable--> Unloadable
//! ```
//!
//! Only [`ObjectCache::clear`] takes an entry back to absent.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::graph::{Graph, GraphId};
use crate::node::Node;

/// A produced object. Callers downcast to the concrete type they expect.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Cache key: a node within one particular graph.
///
/// Two identities are equal only when both the graph and the node match, so
/// blank nodes with the same label in different graphs never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeIdentity {
    graph: GraphId,
    node: Node,
}

impl NodeIdentity {
    pub fn new(graph: &Graph, node: &Node) -> Self {
        Self {
            graph: graph.id(),
            node: node.clone(),
        }
    }

    pub fn graph(&self) -> GraphId {
        self.graph
    }

    pub fn node(&self) -> &Node {
        &self.node
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.node, self.graph)
    }
}

/// State of one cached identity.
#[derive(Clone)]
pub enum CacheEntry {
    /// Resolution has started and not finished yet.
    Pending,
    /// A previous resolution failed; the failure is final until the cache is cleared.
    Unloadable,
    /// A finished object and the descriptor it was produced for.
    Instance {
        instance: Instance,
        target: TypeDescriptor,
    },
}

impl CacheEntry {
    pub fn is_pending(&self) -> bool {
        matches!(self, CacheEntry::Pending)
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheEntry::Pending => f.write_str("Pending"),
            CacheEntry::Unloadable => f.write_str("Unloadable"),
            CacheEntry::Instance { target, .. } => write!(f, "Instance({target})"),
        }
    }
}

/// Memoization table keyed by [`NodeIdentity`]. Not thread-safe.
#[derive(Debug, Default)]
pub struct ObjectCache {
    entries: HashMap<NodeIdentity, CacheEntry>,
}

impl ObjectCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &NodeIdentity) -> Option<&CacheEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &NodeIdentity) -> bool {
        self.entries.contains_key(id)
    }

    pub fn set_pending(&mut self, id: NodeIdentity) {
        self.entries.insert(id, CacheEntry::Pending);
    }

    pub fn set_unloadable(&mut self, id: NodeIdentity) {
        self.entries.insert(id, CacheEntry::Unloadable);
    }

    pub fn set_instance(&mut self, id: NodeIdentity, instance: Instance, target: TypeDescriptor) {
        self.entries
            .insert(id, CacheEntry::Instance { instance, target });
    }

    /// Drop every entry, including failures.
    ///
    /// Instances handed out earlier stay valid; the cache only forgets them.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of identities currently Pending.
    pub fn pending(&self) -> usize {
        self.entries.values().filter(|e| e.is_pending()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_nodes_are_scoped_to_their_graph() {
        let a = Graph::new();
        let b = Graph::new();
        let node = Node::blank("x").unwrap();
        assert_eq!(NodeIdentity::new(&a, &node), NodeIdentity::new(&a, &node));
        assert_ne!(NodeIdentity::new(&a, &node), NodeIdentity::new(&b, &node));
    }

    #[test]
    fn entries_follow_the_state_machine() {
        let g = Graph::new();
        let id = NodeIdentity::new(&g, &Node::iri("urn:a").unwrap());
        let mut cache = ObjectCache::new();
        assert!(cache.get(&id).is_none());

        cache.set_pending(id.clone());
        assert!(cache.get(&id).unwrap().is_pending());
        assert_eq!(cache.pending(), 1);

        let value: Instance = Arc::new(7u32);
        let target = TypeDescriptor::of_kind(crate::descriptor::ObjectKind::Other);
        cache.set_instance(id.clone(), value.clone(), target);
        match cache.get(&id) {
            Some(CacheEntry::Instance { instance, .. }) => assert!(Arc::ptr_eq(instance, &value)),
            other => panic!("expected instance, got {other:?}"),
        }
        assert_eq!(cache.pending(), 0);
    }

    #[test]
    fn clear_drops_failures_too() {
        let g = Graph::new();
        let id = NodeIdentity::new(&g, &Node::iri("urn:a").unwrap());
        let mut cache = ObjectCache::new();
        cache.set_unloadable(id.clone());
        assert!(matches!(cache.get(&id), Some(CacheEntry::Unloadable)));
        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.contains(&id));
    }
}
