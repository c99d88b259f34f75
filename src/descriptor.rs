//! Target descriptors: the "what must be produced" side of resolution.
//!
//! A [`TypeDescriptor`] pairs a fully qualified type name with an
//! [`ObjectKind`], the closed family of capabilities callers and factories
//! agree on. Factories answer `can_produce` by looking at the kind (and, for
//! open-ended kinds, the name); nothing inspects runtime types.
//!
//! The [`TypeCatalog`] maps type names found in `cfg:type` triples to
//! descriptors. The default-type table used when a node only declares a class
//! lives here too, see [`default_type_for_class`].

use std::collections::HashMap;
use std::fmt;

use crate::vocab;

/// Capability family of a produced object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    Graph,
    TripleStore,
    GraphCollection,
    TripleCollection,
    StorageProvider,
    StorageServer,
    Dataset,
    Endpoint,
    QueryProcessor,
    UpdateProcessor,
    ProtocolProcessor,
    UserGroup,
    Permission,
    Credentials,
    Proxy,
    Reasoner,
    ObjectFactory,
    Parser,
    Writer,
    /// Application-defined objects outside the built-in families.
    Other,
}

impl ObjectKind {
    /// Every kind, in declaration order.
    pub const ALL: [ObjectKind; 20] = [
        ObjectKind::Graph,
        ObjectKind::TripleStore,
        ObjectKind::GraphCollection,
        ObjectKind::TripleCollection,
        ObjectKind::StorageProvider,
        ObjectKind::StorageServer,
        ObjectKind::Dataset,
        ObjectKind::Endpoint,
        ObjectKind::QueryProcessor,
        ObjectKind::UpdateProcessor,
        ObjectKind::ProtocolProcessor,
        ObjectKind::UserGroup,
        ObjectKind::Permission,
        ObjectKind::Credentials,
        ObjectKind::Proxy,
        ObjectKind::Reasoner,
        ObjectKind::ObjectFactory,
        ObjectKind::Parser,
        ObjectKind::Writer,
        ObjectKind::Other,
    ];

    /// The built-in type name for this kind.
    pub fn type_name(self) -> &'static str {
        match self {
            ObjectKind::Graph => "graphwire::Graph",
            ObjectKind::TripleStore => "graphwire::TripleStore",
            ObjectKind::GraphCollection => "graphwire::GraphCollection",
            ObjectKind::TripleCollection => "graphwire::TripleCollection",
            ObjectKind::StorageProvider => "graphwire::StorageProvider",
            ObjectKind::StorageServer => "graphwire::StorageServer",
            ObjectKind::Dataset => "graphwire::Dataset",
            ObjectKind::Endpoint => "graphwire::Endpoint",
            ObjectKind::QueryProcessor => "graphwire::QueryProcessor",
            ObjectKind::UpdateProcessor => "graphwire::UpdateProcessor",
            ObjectKind::ProtocolProcessor => "graphwire::ProtocolProcessor",
            ObjectKind::UserGroup => "graphwire::UserGroup",
            ObjectKind::Permission => "graphwire::Permission",
            ObjectKind::Credentials => "graphwire::Credentials",
            ObjectKind::Proxy => "graphwire::Proxy",
            ObjectKind::Reasoner => "graphwire::Reasoner",
            ObjectKind::ObjectFactory => "graphwire::ObjectFactory",
            ObjectKind::Parser => "graphwire::Parser",
            ObjectKind::Writer => "graphwire::Writer",
            ObjectKind::Other => "graphwire::Object",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// What the caller wants built.
///
/// The descriptor is a request, not a guarantee: callers still check the
/// concrete type of the returned instance (see `Resolver::resolve_as`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    name: String,
    kind: ObjectKind,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// The built-in descriptor of a kind.
    pub fn of_kind(kind: ObjectKind) -> Self {
        Self::new(kind.type_name(), kind)
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    /// Whether this descriptor asks for something of `kind`.
    pub fn is(&self, kind: ObjectKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Registry of type names usable as `cfg:type` values.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog with the built-in name of every kind except [`ObjectKind::Other`].
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for kind in ObjectKind::ALL {
            if kind != ObjectKind::Other {
                catalog.register(TypeDescriptor::of_kind(kind));
            }
        }
        catalog
    }

    /// Register a descriptor under its name, returning any descriptor it replaced.
    pub fn register(&mut self, descriptor: TypeDescriptor) -> Option<TypeDescriptor> {
        self.types.insert(descriptor.name.clone(), descriptor)
    }

    /// Look up a type name. Surrounding whitespace is ignored.
    pub fn lookup(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name.trim())
    }

    /// Registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Default type of a node that declares `class` via `rdf:type` but has no
/// `cfg:type`.
///
/// This is a closed convenience table over the well-known configuration
/// classes; anything else yields `None`.
pub fn default_type_for_class(class: &str) -> Option<TypeDescriptor> {
    let local = class.strip_prefix(vocab::CONFIG_NS)?;
    let kind = match local {
        "Graph" => ObjectKind::Graph,
        "GraphCollection" => ObjectKind::GraphCollection,
        "TripleCollection" => ObjectKind::TripleCollection,
        "TripleStore" => ObjectKind::TripleStore,
        "SparqlQueryProcessor" => ObjectKind::QueryProcessor,
        "SparqlUpdateProcessor" => ObjectKind::UpdateProcessor,
        "SparqlHttpProtocolProcessor" => ObjectKind::ProtocolProcessor,
        "User" => ObjectKind::Credentials,
        "UserGroup" => ObjectKind::UserGroup,
        "Proxy" => ObjectKind::Proxy,
        _ => return None,
    };
    Some(TypeDescriptor::of_kind(kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_knows_builtin_names() {
        let catalog = TypeCatalog::with_builtins();
        assert_eq!(catalog.len(), ObjectKind::ALL.len() - 1);
        let graph = catalog.lookup("graphwire::Graph").unwrap();
        assert_eq!(graph.kind(), ObjectKind::Graph);
        assert!(catalog.lookup(" graphwire::Proxy ").is_some());
        assert!(catalog.lookup("graphwire::Object").is_none());
        assert!(catalog.lookup("acme::Widget").is_none());
    }

    #[test]
    fn register_replaces_by_name() {
        let mut catalog = TypeCatalog::new();
        assert!(catalog.register(TypeDescriptor::new("acme::Widget", ObjectKind::Other)).is_none());
        let old = catalog.register(TypeDescriptor::new("acme::Widget", ObjectKind::Reasoner));
        assert_eq!(old.map(|d| d.kind()), Some(ObjectKind::Other));
        assert_eq!(catalog.lookup("acme::Widget").unwrap().kind(), ObjectKind::Reasoner);
        assert_eq!(catalog.names(), vec!["acme::Widget"]);
    }

    #[test]
    fn default_types_cover_the_closed_table() {
        let d = default_type_for_class(vocab::CLASS_GRAPH).unwrap();
        assert_eq!(d.name(), "graphwire::Graph");
        assert_eq!(
            default_type_for_class(vocab::CLASS_USER).map(|d| d.kind()),
            Some(ObjectKind::Credentials)
        );
        assert_eq!(
            default_type_for_class(vocab::CLASS_SPARQL_HTTP_PROTOCOL_PROCESSOR).map(|d| d.kind()),
            Some(ObjectKind::ProtocolProcessor)
        );
    }

    #[test]
    fn classes_outside_the_table_have_no_default() {
        assert!(default_type_for_class(vocab::CLASS_PERMISSION).is_none());
        assert!(default_type_for_class(vocab::CLASS_OBJECT_FACTORY).is_none());
        assert!(default_type_for_class("https://example.org/ns#Graph").is_none());
    }
}
