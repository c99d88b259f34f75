//! Data container factories: graphs and triple stores.

use std::path::Path;
use std::sync::Arc;

use oxigraph::model::NamedNode;

use crate::descriptor::{ObjectKind, TypeDescriptor};
use crate::graph::{Graph, GraphDocument, GraphId};
use crate::node::Node;
use crate::resolver::Resolver;
use crate::vocab;

use super::{FactoryDescriptor, FactoryError, FactoryResult, ObjectFactory, invalid_configuration};

/// A collection of graphs, each addressable by its base IRI.
#[derive(Debug, Default)]
pub struct TripleStore {
    graphs: Vec<Arc<Graph>>,
}

impl TripleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a graph. Adding the same graph twice is a no-op.
    pub fn add(&mut self, graph: Arc<Graph>) -> bool {
        if self.contains(graph.id()) {
            return false;
        }
        self.graphs.push(graph);
        true
    }

    pub fn contains(&self, id: GraphId) -> bool {
        self.graphs.iter().any(|g| g.id() == id)
    }

    /// The graph whose base IRI is `iri`.
    pub fn graph(&self, iri: &str) -> Option<&Graph> {
        self.graphs
            .iter()
            .find(|g| g.base_iri().is_some_and(|b| b.as_str() == iri))
            .map(Arc::as_ref)
    }

    pub fn graphs(&self) -> &[Arc<Graph>] {
        &self.graphs
    }

    /// Total number of triples over all graphs.
    pub fn triple_count(&self) -> usize {
        self.graphs.iter().map(|g| g.len()).sum()
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

/// Read a JSON graph document named by a `cfg:fromFile` value.
fn load_file(resolver: &Resolver, node: &Node, source: &Node) -> Result<Graph, FactoryError> {
    let Some(path) = source.lexical() else {
        return Err(invalid_configuration(
            node,
            format!("cfg:fromFile value {source} is not a literal"),
        ));
    };
    let path = resolver.resolve_path(path);
    GraphDocument::read(Path::new(&path))
        .and_then(|doc| doc.to_graph())
        .map_err(|e| FactoryError::caused_by(format!("cannot load graph file {path}"), e))
}

/// Builds [`Graph`]s.
///
/// Reads `cfg:fromGraph` (graphs merged in), `cfg:fromFile` (JSON graph
/// documents, paths go through the resolver's path resolver), `cfg:fromStore`
/// with `cfg:withUri` (graphs copied out of a triple store) and `cfg:assignUri`
/// (base IRI of the result).
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphFactory;

impl ObjectFactory for GraphFactory {
    fn descriptor(&self) -> FactoryDescriptor {
        FactoryDescriptor::of::<Self>()
    }

    fn can_produce(&self, target: &TypeDescriptor) -> bool {
        target.is(ObjectKind::Graph)
    }

    fn try_produce(
        &self,
        resolver: &mut Resolver,
        graph: &Graph,
        node: &Node,
        _target: &TypeDescriptor,
    ) -> FactoryResult {
        let values = resolver.values(graph);
        let mut output = Graph::new();

        for source in values.all(node, vocab::PROP_FROM_GRAPH) {
            resolver.check_direct_reference(node, &source, vocab::PROP_FROM_GRAPH)?;
            let instance = resolver.resolve_untyped(graph, &source)?;
            let Some(sub) = instance.downcast_ref::<Graph>() else {
                return Err(invalid_configuration(
                    node,
                    format!("cfg:fromGraph value {source} did not resolve to a graph"),
                ));
            };
            output.merge(sub);
        }

        for source in values.all(node, vocab::PROP_FROM_FILE) {
            let loaded = load_file(resolver, node, &source)?;
            output.merge(&loaded);
        }

        let stores = values.all(node, vocab::PROP_FROM_STORE);
        let uris = values.all(node, vocab::PROP_WITH_URI);
        for store_node in stores {
            resolver.check_direct_reference(node, &store_node, vocab::PROP_FROM_STORE)?;
            let instance = resolver.resolve_untyped(graph, &store_node)?;
            let Some(store) = instance.downcast_ref::<TripleStore>() else {
                return Err(invalid_configuration(
                    node,
                    format!("cfg:fromStore value {store_node} did not resolve to a triple store"),
                ));
            };
            for uri in &uris {
                let name = match uri {
                    Node::Iri(n) => n.as_str(),
                    Node::Literal(l) => l.value(),
                    Node::Blank(_) => {
                        return Err(invalid_configuration(
                            node,
                            format!("cfg:withUri value {uri} must be an IRI or literal"),
                        ));
                    }
                };
                let Some(found) = store.graph(name) else {
                    return Err(invalid_configuration(
                        node,
                        format!("store {store_node} holds no graph <{name}>"),
                    ));
                };
                output.merge(found);
            }
        }

        match values.node(node, vocab::PROP_ASSIGN_URI) {
            Some(Node::Iri(iri)) => output.set_base_iri(Some(iri)),
            Some(Node::Literal(lit)) => {
                let iri = NamedNode::new(lit.value()).map_err(|e| {
                    invalid_configuration(node, format!("cfg:assignUri is not a valid IRI: {e}"))
                })?;
                output.set_base_iri(Some(iri));
            }
            Some(other) => {
                return Err(invalid_configuration(
                    node,
                    format!("cfg:assignUri value {other} must be an IRI or literal"),
                ));
            }
            None => {}
        }

        Ok(Some(Arc::new(output)))
    }
}

/// Builds [`TripleStore`]s from `cfg:usingGraph` and `cfg:fromFile` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct TripleStoreFactory;

impl ObjectFactory for TripleStoreFactory {
    fn descriptor(&self) -> FactoryDescriptor {
        FactoryDescriptor::of::<Self>()
    }

    fn can_produce(&self, target: &TypeDescriptor) -> bool {
        target.is(ObjectKind::TripleStore)
    }

    fn try_produce(
        &self,
        resolver: &mut Resolver,
        graph: &Graph,
        node: &Node,
        _target: &TypeDescriptor,
    ) -> FactoryResult {
        let values = resolver.values(graph);
        let mut store = TripleStore::new();

        for source in values.all(node, vocab::PROP_USING_GRAPH) {
            resolver.check_direct_reference(node, &source, vocab::PROP_USING_GRAPH)?;
            let instance = resolver.resolve_untyped(graph, &source)?;
            let Ok(member) = instance.downcast::<Graph>() else {
                return Err(invalid_configuration(
                    node,
                    format!("cfg:usingGraph value {source} did not resolve to a graph"),
                ));
            };
            store.add(member);
        }

        for source in values.all(node, vocab::PROP_FROM_FILE) {
            let loaded = load_file(resolver, node, &source)?;
            store.add(Arc::new(loaded));
        }

        Ok(Some(Arc::new(store)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(base: &str) -> Arc<Graph> {
        let mut g = Graph::new();
        g.set_base_iri(Some(NamedNode::new(base).unwrap()));
        Arc::new(g)
    }

    #[test]
    fn store_finds_graphs_by_base_iri() {
        let mut store = TripleStore::new();
        let a = named("urn:a");
        assert!(store.add(Arc::clone(&a)));
        assert!(!store.add(a));
        store.add(named("urn:b"));
        assert_eq!(store.len(), 2);
        assert!(store.graph("urn:b").is_some());
        assert!(store.graph("urn:c").is_none());
    }
}
