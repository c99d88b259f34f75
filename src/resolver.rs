//! The resolver: turns configuration nodes into objects.
//!
//! A [`Resolver`] is one resolution session. It owns the object cache, the
//! factory registry, the type catalog, the factory constructors, the settings
//! used for `appsetting:` values and the optional path resolver. Whoever loads
//! configuration creates one and passes it (as `&mut`) into every factory call;
//! there is no process-wide state.
//!
//! # Algorithm
//!
//! [`Resolver::resolve`] for `(graph, node, target)`:
//!
//! 1. literals are rejected, objects are identified by IRIs and blank nodes only
//! 2. cache lookup: Pending → circular reference, Unloadable → previous
//!    failure, Instance → that instance (asking for a different descriptor
//!    that no factory can produce fails with `NoCapableFactory`)
//! 3. the node is marked Pending
//! 4. capable factories are tried in registration order; the first to produce
//!    an object wins, an error marks the node Unloadable and is returned
//! 5. no factory produced anything → Unloadable, `NoCapableFactory`
//! 6. the instance is cached and returned
//!
//! Nested resolution of a node that is still Pending fails immediately, so a
//! cyclic configuration fails instead of recursing forever.
//!
//! The resolver is plain mutable state. Callers that load configuration from
//! several threads serialize access themselves.

use std::any::Any;
use std::sync::Arc;

use crate::accessors::{SharedSettings, Values};
use crate::cache::{CacheEntry, Instance, NodeIdentity, ObjectCache};
use crate::descriptor::{ObjectKind, TypeCatalog, TypeDescriptor, default_type_for_class};
use crate::error::{ResolveError, ResolveResult};
use crate::factory::{
    Credentials, FactoryConstructor, FactoryConstructors, FactoryError, FactoryHandle,
    FactoryRegistry, ObjectFactory,
};
use crate::graph::Graph;
use crate::node::Node;
use crate::paths::PathResolver;
use crate::settings::{NoSettings, SettingsProvider};
use crate::vocab;

/// A resolution session.
pub struct Resolver {
    cache: ObjectCache,
    registry: FactoryRegistry,
    catalog: TypeCatalog,
    constructors: FactoryConstructors,
    settings: SharedSettings,
    path_resolver: Option<Box<dyn PathResolver>>,
}

impl Resolver {
    /// A resolver with no factories and the built-in type names.
    pub fn new() -> Self {
        Self {
            cache: ObjectCache::new(),
            registry: FactoryRegistry::new(),
            catalog: TypeCatalog::with_builtins(),
            constructors: FactoryConstructors::new(),
            settings: Arc::new(NoSettings),
            path_resolver: None,
        }
    }

    /// A resolver with the built-in factories registered in their fixed order.
    pub fn with_builtins() -> Self {
        Self {
            registry: FactoryRegistry::with_builtins(),
            ..Self::new()
        }
    }

    /// Use `settings` for `appsetting:` values.
    pub fn with_settings(mut self, settings: impl SettingsProvider + Send + Sync + 'static) -> Self {
        self.settings = Arc::new(settings);
        self
    }

    pub fn set_settings(&mut self, settings: SharedSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> &SharedSettings {
        &self.settings
    }

    /// A property reader for `graph` using this resolver's settings.
    pub fn values<'g>(&self, graph: &'g Graph) -> Values<'g> {
        Values::new(graph, Arc::clone(&self.settings))
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Resolve `node` of `graph` as an object of `target`.
    pub fn resolve(
        &mut self,
        graph: &Graph,
        node: &Node,
        target: &TypeDescriptor,
    ) -> ResolveResult<Instance> {
        if !node.is_resource() {
            return Err(ResolveError::LiteralNode {
                node: node.to_string(),
            });
        }

        let id = NodeIdentity::new(graph, node);
        match self.cache.get(&id) {
            Some(CacheEntry::Pending) => {
                return Err(ResolveError::CircularReference {
                    node: node.to_string(),
                });
            }
            Some(CacheEntry::Unloadable) => {
                return Err(ResolveError::PreviouslyFailed {
                    node: node.to_string(),
                });
            }
            Some(CacheEntry::Instance {
                instance,
                target: produced_for,
            }) => {
                if produced_for != target && self.registry.select_for(target).is_empty() {
                    return Err(ResolveError::NoCapableFactory {
                        node: node.to_string(),
                        type_name: target.name().to_string(),
                    });
                }
                tracing::debug!(node = %node, "cache hit");
                return Ok(Arc::clone(instance));
            }
            None => {}
        }

        self.cache.set_pending(id.clone());

        for factory in self.registry.select_for(target) {
            let name = factory.descriptor().name();
            tracing::debug!(node = %node, target = %target, factory = name, "trying factory");
            match factory.try_produce(self, graph, node, target) {
                Ok(Some(instance)) => {
                    self.cache
                        .set_instance(id, Arc::clone(&instance), target.clone());
                    return Ok(instance);
                }
                Ok(None) => {}
                Err(err) => {
                    self.cache.set_unloadable(id);
                    tracing::warn!(node = %node, factory = name, error = %err, "node is now unloadable");
                    return Err(match err {
                        FactoryError::Resolve(inner) => inner,
                        other => ResolveError::ConstructionFailed {
                            node: node.to_string(),
                            factory: name,
                            source: Box::new(other),
                        },
                    });
                }
            }
        }

        self.cache.set_unloadable(id);
        tracing::warn!(node = %node, target = %target, "no factory produced the node");
        Err(ResolveError::NoCapableFactory {
            node: node.to_string(),
            type_name: target.name().to_string(),
        })
    }

    /// Resolve `node` using the type named by its `cfg:type`, or else the
    /// default type of its declared class.
    pub fn resolve_untyped(&mut self, graph: &Graph, node: &Node) -> ResolveResult<Instance> {
        if !node.is_resource() {
            return Err(ResolveError::LiteralNode {
                node: node.to_string(),
            });
        }
        let target = self.target_for(graph, node)?;
        self.resolve(graph, node, &target)
    }

    /// Resolve and downcast to `T`.
    pub fn resolve_as<T: Any + Send + Sync>(
        &mut self,
        graph: &Graph,
        node: &Node,
        target: &TypeDescriptor,
    ) -> ResolveResult<Arc<T>> {
        let instance = self.resolve(graph, node, target)?;
        downcast(node, instance)
    }

    /// [`Resolver::resolve_untyped`], then downcast to `T`.
    pub fn resolve_untyped_as<T: Any + Send + Sync>(
        &mut self,
        graph: &Graph,
        node: &Node,
    ) -> ResolveResult<Arc<T>> {
        let instance = self.resolve_untyped(graph, node)?;
        downcast(node, instance)
    }

    /// The descriptor `resolve_untyped` would use for `node`.
    pub fn target_for(&self, graph: &Graph, node: &Node) -> ResolveResult<TypeDescriptor> {
        if let Some(name) = self.values(graph).string(node, vocab::PROP_TYPE) {
            return self.catalog.lookup(&name).cloned().ok_or_else(|| {
                ResolveError::MissingDescriptor {
                    node: node.to_string(),
                    type_name: Some(name),
                }
            });
        }
        self.default_type(graph, node)
            .ok_or_else(|| ResolveError::MissingTypeInformation {
                node: node.to_string(),
            })
    }

    /// Fails when `from` and `to` are the same node.
    ///
    /// Only catches a node listing itself as the value of `property`; deeper
    /// cycles are caught by `resolve`.
    pub fn check_direct_reference(&self, from: &Node, to: &Node, property: &str) -> ResolveResult<()> {
        if from == to {
            return Err(ResolveError::DirectCircularReference {
                node: from.to_string(),
                property: vocab::qname(property),
            });
        }
        Ok(())
    }

    /// The default type of `node` from its declared `rdf:type` classes.
    pub fn default_type(&self, graph: &Graph, node: &Node) -> Option<TypeDescriptor> {
        graph
            .objects_for(node, vocab::RDF_TYPE)
            .filter_map(Node::as_iri)
            .find_map(default_type_for_class)
    }

    /// Read `cfg:user` and `cfg:password` of `node`.
    ///
    /// When either is missing and `allow_credentials` is set, both are taken
    /// from the `cfg:credentials` object instead, if there is one.
    pub fn user_and_password(
        &mut self,
        graph: &Graph,
        node: &Node,
        allow_credentials: bool,
    ) -> ResolveResult<(Option<String>, Option<String>)> {
        let values = self.values(graph);
        let user = values.string(node, vocab::PROP_USER);
        let password = values.string(node, vocab::PROP_PASSWORD);
        if (user.is_some() && password.is_some()) || !allow_credentials {
            return Ok((user, password));
        }
        match values.node(node, vocab::PROP_CREDENTIALS) {
            Some(cred_node) => {
                self.check_direct_reference(node, &cred_node, vocab::PROP_CREDENTIALS)?;
                let target = TypeDescriptor::of_kind(ObjectKind::Credentials);
                let credentials = self.resolve_as::<Credentials>(graph, &cred_node, &target)?;
                Ok((
                    Some(credentials.user.clone()),
                    Some(credentials.password.clone()),
                ))
            }
            None => Ok((user, password)),
        }
    }

    // -----------------------------------------------------------------------
    // Cache
    // -----------------------------------------------------------------------

    /// Whether `node` of `graph` has a cache entry, in any state.
    pub fn is_cached(&self, graph: &Graph, node: &Node) -> bool {
        self.cache.contains(&NodeIdentity::new(graph, node))
    }

    /// Forget every cached object and failure.
    ///
    /// Objects handed out earlier stay valid; resolving the same node again
    /// builds a new one.
    pub fn clear_cache(&mut self) {
        tracing::debug!(entries = self.cache.len(), "clearing object cache");
        self.cache.clear();
    }

    pub fn cache(&self) -> &ObjectCache {
        &self.cache
    }

    // -----------------------------------------------------------------------
    // Factories and types
    // -----------------------------------------------------------------------

    /// Append a factory unless one of its kind is already registered.
    pub fn add_factory(&mut self, factory: impl ObjectFactory + 'static) -> bool {
        self.add_shared_factory(Arc::new(factory))
    }

    pub fn add_shared_factory(&mut self, factory: Arc<dyn ObjectFactory>) -> bool {
        let name = factory.descriptor().name();
        let added = self.registry.register(factory);
        if added {
            tracing::info!(factory = name, position = self.registry.len(), "registered factory");
        } else {
            tracing::debug!(factory = name, "factory kind already registered");
        }
        added
    }

    pub fn factories(&self) -> &FactoryRegistry {
        &self.registry
    }

    /// Make `descriptor` available as a `cfg:type` value.
    pub fn register_type(&mut self, descriptor: TypeDescriptor) -> Option<TypeDescriptor> {
        self.catalog.register(descriptor)
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Register a constructor for graph-declared factories of type `name`.
    ///
    /// `name` also becomes a known type name with kind
    /// [`ObjectKind::ObjectFactory`].
    pub fn register_factory_constructor<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&Values<'_>, &Node) -> Result<Arc<dyn ObjectFactory>, FactoryError>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        self.catalog
            .register(TypeDescriptor::new(name.clone(), ObjectKind::ObjectFactory));
        self.constructors.register(name, constructor);
    }

    pub fn factory_constructor(&self, name: &str) -> Option<FactoryConstructor> {
        self.constructors.get(name)
    }

    /// Resolve every node declared `rdf:type cfg:ObjectFactory` and register
    /// the produced factories, in graph order.
    ///
    /// Must run before resolving objects that need those factories. Returns
    /// the number of factories added.
    pub fn register_declared_factories(&mut self, graph: &Graph) -> ResolveResult<usize> {
        let class = Node::Iri(vocab::term(vocab::CLASS_OBJECT_FACTORY));
        let declared: Vec<Node> = graph
            .subjects_with(vocab::RDF_TYPE, &class)
            .into_iter()
            .cloned()
            .collect();

        let mut added = 0;
        for node in &declared {
            let instance = self.resolve_untyped(graph, node)?;
            let Some(handle) = instance.downcast_ref::<FactoryHandle>() else {
                return Err(ResolveError::AutoRegistrationMismatch {
                    node: node.to_string(),
                });
            };
            if self.add_shared_factory(handle.factory()) {
                added += 1;
            }
        }
        tracing::info!(declared = declared.len(), added, "registered graph-declared factories");
        Ok(added)
    }

    /// Apply the configuration-level settings of `graph`: currently the
    /// factories it declares.
    pub fn auto_configure(&mut self, graph: &Graph) -> ResolveResult<usize> {
        tracing::info!(graph = %graph.id(), triples = graph.len(), "auto-configuring");
        self.register_declared_factories(graph)
    }

    // -----------------------------------------------------------------------
    // Paths
    // -----------------------------------------------------------------------

    pub fn path_resolver(&self) -> Option<&dyn PathResolver> {
        self.path_resolver.as_deref()
    }

    /// Install (or, with `None`, remove) the path resolver.
    pub fn set_path_resolver(&mut self, resolver: Option<Box<dyn PathResolver>>) {
        self.path_resolver = resolver;
    }

    /// Interpret a path read from a configuration graph.
    pub fn resolve_path(&self, path: &str) -> String {
        match &self.path_resolver {
            Some(r) => r.resolve_path(path),
            None => path.to_string(),
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("cache", &self.cache.len())
            .field("registry", &self.registry)
            .field("types", &self.catalog.len())
            .field("constructors", &self.constructors)
            .field("path_resolver", &self.path_resolver.is_some())
            .finish()
    }
}

fn downcast<T: Any + Send + Sync>(node: &Node, instance: Instance) -> ResolveResult<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| ResolveError::TypeMismatch {
            node: node.to_string(),
            expected: std::any::type_name::<T>(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::BaseDirResolver;

    fn iri(s: &str) -> Node {
        Node::iri(s).unwrap()
    }

    #[test]
    fn literal_nodes_are_rejected() {
        let g = Graph::new();
        let mut r = Resolver::with_builtins();
        let err = r
            .resolve(&g, &Node::literal("x"), &TypeDescriptor::of_kind(ObjectKind::Graph))
            .unwrap_err();
        assert!(matches!(err, ResolveError::LiteralNode { .. }));
        assert!(!r.is_cached(&g, &Node::literal("x")));
    }

    #[test]
    fn direct_reference_check() {
        let r = Resolver::new();
        assert!(r.check_direct_reference(&iri("urn:a"), &iri("urn:b"), vocab::PROP_FROM_GRAPH).is_ok());
        let err = r
            .check_direct_reference(&iri("urn:a"), &iri("urn:a"), vocab::PROP_FROM_GRAPH)
            .unwrap_err();
        match err {
            ResolveError::DirectCircularReference { property, .. } => {
                assert_eq!(property, "cfg:fromGraph")
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn path_resolver_defaults_to_identity() {
        let mut r = Resolver::new();
        assert!(r.path_resolver().is_none());
        assert_eq!(r.resolve_path("data/a.json"), "data/a.json");

        r.set_path_resolver(Some(Box::new(BaseDirResolver::new("/srv"))));
        assert_eq!(r.resolve_path("data/a.json"), "/srv/data/a.json");

        r.set_path_resolver(None);
        assert_eq!(r.resolve_path("data/a.json"), "data/a.json");
    }

    #[test]
    fn missing_type_information() {
        let mut g = Graph::new();
        let n = iri("urn:thing");
        g.insert_spo(n.clone(), vocab::term(vocab::PROP_ENABLED), Node::literal("true"));
        let mut r = Resolver::with_builtins();
        let err = r.resolve_untyped(&g, &n).unwrap_err();
        assert!(matches!(err, ResolveError::MissingTypeInformation { .. }));
    }

    #[test]
    fn unknown_type_name_is_a_missing_descriptor() {
        let mut g = Graph::new();
        let n = iri("urn:thing");
        g.insert_spo(n.clone(), vocab::term(vocab::PROP_TYPE), Node::literal("acme::Nope"));
        let mut r = Resolver::with_builtins();
        match r.resolve_untyped(&g, &n).unwrap_err() {
            ResolveError::MissingDescriptor { type_name, .. } => {
                assert_eq!(type_name.as_deref(), Some("acme::Nope"))
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn type_name_may_come_from_an_app_setting() {
        let mut g = Graph::new();
        let n = iri("urn:thing");
        g.insert_spo(n.clone(), vocab::term(vocab::PROP_TYPE), iri("appsetting:GraphType"));
        let settings = std::collections::HashMap::from([(
            "GraphType".to_string(),
            "graphwire::Graph".to_string(),
        )]);
        let r = Resolver::with_builtins().with_settings(settings);
        assert_eq!(r.target_for(&g, &n).unwrap().kind(), ObjectKind::Graph);
    }

    #[test]
    fn default_type_uses_any_declared_class() {
        let mut g = Graph::new();
        let n = iri("urn:thing");
        let rdf_type = vocab::term(vocab::RDF_TYPE);
        g.insert_spo(n.clone(), rdf_type.clone(), iri("urn:unrelated"));
        g.insert_spo(n.clone(), rdf_type, Node::Iri(vocab::term(vocab::CLASS_PROXY)));
        let r = Resolver::new();
        assert_eq!(r.default_type(&g, &n).map(|d| d.kind()), Some(ObjectKind::Proxy));
        assert!(r.default_type(&g, &iri("urn:other")).is_none());
    }

    #[test]
    fn type_mismatch_on_wrong_downcast() {
        let mut g = Graph::new();
        let n = iri("urn:g");
        g.insert_spo(n.clone(), vocab::term(vocab::RDF_TYPE), Node::Iri(vocab::term(vocab::CLASS_GRAPH)));
        let mut r = Resolver::with_builtins();
        let err = r.resolve_untyped_as::<Credentials>(&g, &n).unwrap_err();
        assert!(matches!(err, ResolveError::TypeMismatch { .. }));
        assert!(r.resolve_untyped_as::<Graph>(&g, &n).is_ok());
    }
}
