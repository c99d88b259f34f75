//! Configuration loader: a graph paired with the resolver that builds its objects.

use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::Instance;
use crate::config::LoaderConfig;
use crate::error::{GraphError, GraphResult, ResolveError, ResolveResult, WireResult};
use crate::graph::{Graph, GraphDocument};
use crate::node::Node;
use crate::resolver::Resolver;
use crate::settings::resolve_app_setting;
use crate::vocab;

/// Loads objects out of one configuration graph.
///
/// ```no_run
/// use graphwire::{ConfigurationLoader, Graph, GraphDocument, Resolver};
///
/// let graph = GraphDocument::read("config.json".as_ref())?.to_graph()?;
/// let mut loader = ConfigurationLoader::auto_configured(graph, Resolver::with_builtins())?;
/// let store = loader.load_as::<graphwire::TripleStore>("https://example.org/store")?;
/// println!("{} graphs", store.len());
/// # Ok::<(), graphwire::WireError>(())
/// ```
#[derive(Debug)]
pub struct ConfigurationLoader {
    graph: Graph,
    resolver: Resolver,
}

impl ConfigurationLoader {
    /// Pair `graph` with `resolver` without auto-configuration.
    pub fn new(graph: Graph, resolver: Resolver) -> Self {
        Self { graph, resolver }
    }

    /// Pair `graph` with `resolver` and register the factories the graph declares.
    pub fn auto_configured(graph: Graph, mut resolver: Resolver) -> ResolveResult<Self> {
        resolver.auto_configure(&graph)?;
        Ok(Self { graph, resolver })
    }

    /// Build the resolver from `config`, auto-configuring if it says so.
    pub fn from_config(graph: Graph, config: &LoaderConfig) -> WireResult<Self> {
        let resolver = config.build_resolver();
        if config.auto_configure {
            Ok(Self::auto_configured(graph, resolver)?)
        } else {
            Ok(Self::new(graph, resolver))
        }
    }

    /// Read the graph document at `path` together with everything it
    /// imports, then pair it with `resolver`.
    ///
    /// `cfg:imports` values are followed transitively; see [`read_with_imports`].
    pub fn from_file(path: &Path, resolver: Resolver, auto_configure: bool) -> WireResult<Self> {
        let graph = read_with_imports(path, &resolver)?;
        if auto_configure {
            Ok(Self::auto_configured(graph, resolver)?)
        } else {
            Ok(Self::new(graph, resolver))
        }
    }

    /// Load the object identified by `iri`.
    pub fn load(&mut self, iri: &str) -> ResolveResult<Instance> {
        let node = self.graph.find_iri(iri).ok_or_else(|| ResolveError::MissingNode {
            identifier: format!("<{iri}>"),
        })?;
        self.resolver.resolve_untyped(&self.graph, &node)
    }

    /// Load the object identified by blank node `label`.
    pub fn load_blank(&mut self, label: &str) -> ResolveResult<Instance> {
        let node = self
            .graph
            .find_blank(label)
            .ok_or_else(|| ResolveError::MissingNode {
                identifier: format!("_:{label}"),
            })?;
        self.resolver.resolve_untyped(&self.graph, &node)
    }

    /// Load by identifier: `_:label` for blank nodes, anything else is an IRI.
    pub fn load_identifier(&mut self, identifier: &str) -> ResolveResult<Instance> {
        match identifier.strip_prefix("_:") {
            Some(label) => self.load_blank(label),
            None => self.load(identifier.trim_start_matches('<').trim_end_matches('>')),
        }
    }

    /// Load the object identified by `iri` and downcast it to `T`.
    pub fn load_as<T: Any + Send + Sync>(&mut self, iri: &str) -> ResolveResult<Arc<T>> {
        let instance = self.load(iri)?;
        instance
            .downcast::<T>()
            .map_err(|_| ResolveError::TypeMismatch {
                node: format!("<{iri}>"),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Resolve an arbitrary node of the graph.
    pub fn load_node(&mut self, node: &Node) -> ResolveResult<Instance> {
        self.resolver.resolve_untyped(&self.graph, node)
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut Resolver {
        &mut self.resolver
    }

    pub fn into_parts(self) -> (Graph, Resolver) {
        (self.graph, self.resolver)
    }
}

/// Read the graph document at `path` and merge in every document it imports.
///
/// Import targets are literal paths (interpreted by the resolver's path
/// resolver), `file:` IRIs, or `appsetting:` IRIs standing for either. Each
/// source is read once; the starting document counts as imported under its
/// path and its file name. Blank-node and remote targets are rejected.
pub fn read_with_imports(path: &Path, resolver: &Resolver) -> GraphResult<Graph> {
    let mut graph = GraphDocument::read(path)?.to_graph()?;

    let mut imported: HashSet<Node> = HashSet::new();
    imported.insert(Node::literal(path.to_string_lossy()));
    if let Some(name) = path.file_name() {
        imported.insert(Node::literal(name.to_string_lossy()));
    }

    let mut queue: VecDeque<Node> = graph
        .objects_of_predicate(vocab::PROP_IMPORTS)
        .into_iter()
        .cloned()
        .collect();

    let mut count = 0;
    while let Some(target) = queue.pop_front() {
        let source = import_source(&target, resolver)?;
        if !imported.insert(source.clone()) {
            continue;
        }
        let file = import_path(&target, &source, resolver)?;
        let data = GraphDocument::read(&file)?.to_graph()?;
        tracing::debug!(import = %source, path = %file.display(), triples = data.len(), "importing configuration");

        queue.extend(
            data.objects_of_predicate(vocab::PROP_IMPORTS)
                .into_iter()
                .filter(|n| !imported.contains(*n))
                .cloned(),
        );
        graph.merge(&data);
        count += 1;
    }

    if count > 0 {
        tracing::info!(path = %path.display(), imports = count, triples = graph.len(), "loaded configuration with imports");
    }
    Ok(graph)
}

/// The node an import target stands for, app-settings resolved.
fn import_source(target: &Node, resolver: &Resolver) -> GraphResult<Node> {
    match target {
        Node::Literal(_) => Ok(target.clone()),
        Node::Iri(_) => resolve_app_setting(target, resolver.settings().as_ref()).ok_or_else(|| {
            GraphError::InvalidImport {
                target: target.to_string(),
                message: "the app-setting is not defined".into(),
            }
        }),
        Node::Blank(_) => Err(GraphError::InvalidImport {
            target: target.to_string(),
            message: "imports must be literals or IRIs, not blank nodes".into(),
        }),
    }
}

fn import_path(target: &Node, source: &Node, resolver: &Resolver) -> GraphResult<PathBuf> {
    if let Some(path) = source.lexical() {
        return Ok(PathBuf::from(resolver.resolve_path(path)));
    }
    let iri = source.as_iri().unwrap_or_default();
    match iri.strip_prefix("file://").or_else(|| iri.strip_prefix("file:")) {
        Some(path) => Ok(PathBuf::from(path)),
        None => Err(GraphError::InvalidImport {
            target: target.to_string(),
            message: format!("only local files can be imported, not <{iri}>"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab;

    fn loader() -> ConfigurationLoader {
        let mut g = Graph::new();
        let rdf_type = vocab::term(vocab::RDF_TYPE);
        let graph_class = Node::Iri(vocab::term(vocab::CLASS_GRAPH));
        g.insert_spo(Node::iri("urn:g").unwrap(), rdf_type.clone(), graph_class.clone());
        g.insert_spo(Node::blank("b").unwrap(), rdf_type, graph_class);
        ConfigurationLoader::new(g, Resolver::with_builtins())
    }

    #[test]
    fn load_by_iri_and_blank_label() {
        let mut l = loader();
        assert!(l.load_as::<Graph>("urn:g").is_ok());
        assert!(l.load_blank("b").unwrap().downcast_ref::<Graph>().is_some());
        assert!(l.load_identifier("_:b").is_ok());
        assert!(l.load_identifier("<urn:g>").is_ok());
    }

    #[test]
    fn unknown_identifiers_are_missing_nodes() {
        let mut l = loader();
        match l.load("urn:nothing").unwrap_err() {
            ResolveError::MissingNode { identifier } => assert_eq!(identifier, "<urn:nothing>"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            l.load_blank("zz").unwrap_err(),
            ResolveError::MissingNode { .. }
        ));
    }
}
