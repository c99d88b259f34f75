//! Factories: the pluggable constructors behind resolution.
//!
//! # Architecture
//!
//! - [`ObjectFactory`] trait: `can_produce(&TypeDescriptor)`, then
//!   `try_produce(&mut Resolver, &Graph, &Node, &TypeDescriptor)`
//! - [`FactoryRegistry`]: ordered list, first capable factory that produces wins
//! - [`FactoryHandle`]: the object produced for `cfg:ObjectFactory` nodes, which
//!   auto-configuration registers
//! - [`FactoryConstructors`]: type name → constructor table used to build
//!   factories declared in a graph
//!
//! Built-in factories live in [`data`], [`access`] and [`meta`].
//!
//! # Contract
//!
//! `Ok(None)` means "not applicable here": required configuration is absent and
//! a later factory may still succeed. `Err` means the factory committed to
//! construction and failed; the failure is final for that node. A factory that
//! needs another object calls back into the resolver and propagates its errors
//! with `?`.

pub mod access;
pub mod data;
pub mod meta;

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::accessors::Values;
use crate::cache::Instance;
use crate::descriptor::TypeDescriptor;
use crate::error::{BoxError, ResolveError};
use crate::graph::Graph;
use crate::node::Node;
use crate::resolver::Resolver;

pub use access::{
    Credentials, CredentialsFactory, Permission, PermissionFactory, Proxy, ProxyFactory,
    UserGroup, UserGroupFactory,
};
pub use data::{GraphFactory, TripleStore, TripleStoreFactory};
pub use meta::ObjectFactoryFactory;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error raised by [`ObjectFactory::try_produce`].
#[derive(Debug, Error, Diagnostic)]
pub enum FactoryError {
    /// An engine error from a nested resolution, passed through unchanged.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),

    /// Any other failure; the resolver wraps it as `ConstructionFailed`.
    #[error("{message}")]
    #[diagnostic(code(graphwire::factory::failed))]
    Failed {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl FactoryError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            source: None,
        }
    }

    pub fn caused_by(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Failed {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// A committed failure caused by the shape of the configuration itself.
pub(crate) fn invalid_configuration(node: &Node, message: impl Into<String>) -> FactoryError {
    FactoryError::Resolve(ResolveError::InvalidConfiguration {
        node: node.to_string(),
        message: message.into(),
    })
}

/// Result type of [`ObjectFactory::try_produce`].
pub type FactoryResult = std::result::Result<Option<Instance>, FactoryError>;

// ---------------------------------------------------------------------------
// Factory contract
// ---------------------------------------------------------------------------

/// Identity of a factory's concrete kind.
///
/// The registry holds at most one factory per descriptor.
#[derive(Debug, Clone, Copy)]
pub struct FactoryDescriptor {
    type_id: TypeId,
    name: &'static str,
}

impl FactoryDescriptor {
    pub fn of<T: 'static>() -> Self {
        let full = std::any::type_name::<T>();
        Self {
            type_id: TypeId::of::<T>(),
            name: full.rsplit("::").next().unwrap_or(full),
        }
    }

    /// Short type name of the factory, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for FactoryDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for FactoryDescriptor {}

impl std::hash::Hash for FactoryDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for FactoryDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A constructor of objects from configuration graph nodes.
pub trait ObjectFactory: Send + Sync {
    /// Identity of this factory's kind, normally `FactoryDescriptor::of::<Self>()`.
    fn descriptor(&self) -> FactoryDescriptor;

    /// Whether this factory can build objects of `target`.
    fn can_produce(&self, target: &TypeDescriptor) -> bool;

    /// Build the object described by `node`.
    fn try_produce(
        &self,
        resolver: &mut Resolver,
        graph: &Graph,
        node: &Node,
        target: &TypeDescriptor,
    ) -> FactoryResult;
}

/// A factory produced from the configuration graph.
///
/// This is the object type of nodes declared `rdf:type cfg:ObjectFactory`.
#[derive(Clone)]
pub struct FactoryHandle {
    factory: Arc<dyn ObjectFactory>,
}

impl FactoryHandle {
    pub fn new(factory: impl ObjectFactory + 'static) -> Self {
        Self {
            factory: Arc::new(factory),
        }
    }

    pub fn factory(&self) -> Arc<dyn ObjectFactory> {
        Arc::clone(&self.factory)
    }

    pub fn descriptor(&self) -> FactoryDescriptor {
        self.factory.descriptor()
    }
}

impl From<Arc<dyn ObjectFactory>> for FactoryHandle {
    fn from(factory: Arc<dyn ObjectFactory>) -> Self {
        Self { factory }
    }
}

impl fmt::Debug for FactoryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FactoryHandle")
            .field(&self.factory.descriptor().name())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Ordered, de-duplicated list of factories.
///
/// Registration order is observable: the resolver tries capable factories in
/// this order and stops at the first that produces an object.
#[derive(Clone, Default)]
pub struct FactoryRegistry {
    factories: Vec<Arc<dyn ObjectFactory>>,
}

impl FactoryRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in factories in their fixed order.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(GraphFactory));
        registry.register(Arc::new(TripleStoreFactory));
        registry.register(Arc::new(UserGroupFactory));
        registry.register(Arc::new(PermissionFactory));
        registry.register(Arc::new(CredentialsFactory));
        registry.register(Arc::new(ProxyFactory));
        registry.register(Arc::new(ObjectFactoryFactory));
        registry
    }

    /// Append a factory unless one of the same kind is already registered.
    ///
    /// Returns whether the factory was added.
    pub fn register(&mut self, factory: Arc<dyn ObjectFactory>) -> bool {
        let descriptor = factory.descriptor();
        if self.contains(&descriptor) {
            return false;
        }
        self.factories.push(factory);
        true
    }

    pub fn contains(&self, descriptor: &FactoryDescriptor) -> bool {
        self.factories.iter().any(|f| f.descriptor() == *descriptor)
    }

    /// Factories able to produce `target`, in registration order.
    pub fn select_for(&self, target: &TypeDescriptor) -> Vec<Arc<dyn ObjectFactory>> {
        self.factories
            .iter()
            .filter(|f| f.can_produce(target))
            .cloned()
            .collect()
    }

    /// Names of all registered factories, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.factories.iter().map(|f| f.descriptor().name()).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("factories", &self.names())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Constructors for graph-declared factories
// ---------------------------------------------------------------------------

/// Builds a factory from its configuration node.
pub type FactoryConstructor = Arc<
    dyn Fn(&Values<'_>, &Node) -> std::result::Result<Arc<dyn ObjectFactory>, FactoryError>
        + Send
        + Sync,
>;

/// Type name → constructor table consulted by [`ObjectFactoryFactory`].
#[derive(Clone, Default)]
pub struct FactoryConstructors {
    constructors: HashMap<String, FactoryConstructor>,
}

impl FactoryConstructors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor, replacing any previous one for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(&Values<'_>, &Node) -> std::result::Result<Arc<dyn ObjectFactory>, FactoryError>
            + Send
            + Sync
            + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor));
    }

    pub fn get(&self, name: &str) -> Option<FactoryConstructor> {
        self.constructors.get(name.trim()).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name.trim())
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl fmt::Debug for FactoryConstructors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FactoryConstructors")
            .field("names", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ObjectKind;

    struct Declines;

    impl ObjectFactory for Declines {
        fn descriptor(&self) -> FactoryDescriptor {
            FactoryDescriptor::of::<Self>()
        }

        fn can_produce(&self, target: &TypeDescriptor) -> bool {
            target.is(ObjectKind::Reasoner)
        }

        fn try_produce(
            &self,
            _resolver: &mut Resolver,
            _graph: &Graph,
            _node: &Node,
            _target: &TypeDescriptor,
        ) -> FactoryResult {
            Ok(None)
        }
    }

    #[test]
    fn builtins_are_registered_in_fixed_order() {
        let registry = FactoryRegistry::with_builtins();
        assert_eq!(
            registry.names(),
            vec![
                "GraphFactory",
                "TripleStoreFactory",
                "UserGroupFactory",
                "PermissionFactory",
                "CredentialsFactory",
                "ProxyFactory",
                "ObjectFactoryFactory",
            ]
        );
    }

    #[test]
    fn register_is_idempotent_per_kind() {
        let mut registry = FactoryRegistry::new();
        assert!(registry.register(Arc::new(Declines)));
        assert!(!registry.register(Arc::new(Declines)));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&FactoryDescriptor::of::<Declines>()));
    }

    #[test]
    fn select_for_filters_by_capability() {
        let mut registry = FactoryRegistry::with_builtins();
        registry.register(Arc::new(Declines));
        let reasoners = registry.select_for(&TypeDescriptor::of_kind(ObjectKind::Reasoner));
        assert_eq!(reasoners.len(), 1);
        assert_eq!(reasoners[0].descriptor().name(), "Declines");

        let graphs = registry.select_for(&TypeDescriptor::of_kind(ObjectKind::Graph));
        assert_eq!(graphs.len(), 1);
        assert_eq!(graphs[0].descriptor().name(), "GraphFactory");
    }

    #[test]
    fn factory_error_helpers() {
        let err = FactoryError::caused_by(
            "cannot open",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "cannot open");
        assert!(std::error::Error::source(&err).is_some());
        assert!(std::error::Error::source(&FactoryError::failed("x")).is_none());
    }
}
