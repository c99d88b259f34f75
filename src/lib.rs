// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # graphwire
//!
//! Builds runtime objects from declarative configuration graphs.
//!
//! A configuration graph is a set of triples describing objects and their
//! construction parameters. A [`Resolver`] turns a node of that graph into a
//! live object by asking an ordered list of factories, memoizing the result so
//! every reference to the node yields the same instance.
//!
//! ## Architecture
//!
//! - **Graph** (`node`, `graph`, `vocab`): oxigraph terms, an ordered triple set, reserved names
//! - **Descriptors** (`descriptor`): what to build, the type catalog and default types
//! - **Cache** (`cache`): Pending / Unloadable / Instance per (graph, node)
//! - **Factories** (`factory`): the factory trait, registry and built-in factories
//! - **Values** (`accessors`, `settings`, `paths`): typed property reads, `appsetting:` values, paths
//! - **Resolver** (`resolver`, `loader`, `config`): the resolution session and its front end
//!
//! ## Library usage
//!
//! ```no_run
//! use graphwire::{Graph, Node, Resolver, TypeDescriptor, ObjectKind, vocab};
//!
//! let mut graph = Graph::new();
//! let data = Node::iri("https://example.org/data").unwrap();
//! graph.insert_spo(
//!     data.clone(),
//!     vocab::term(vocab::RDF_TYPE),
//!     Node::Iri(vocab::term(vocab::CLASS_GRAPH)),
//! );
//!
//! let mut resolver = Resolver::with_builtins();
//! let target = TypeDescriptor::of_kind(ObjectKind::Graph);
//! let loaded = resolver.resolve_as::<Graph>(&graph, &data, &target).unwrap();
//! assert!(loaded.is_empty());
//! ```

pub mod accessors;
pub mod cache;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod graph;
pub mod loader;
pub mod node;
pub mod paths;
pub mod resolver;
pub mod settings;
pub mod vocab;

pub use accessors::Values;
pub use cache::{CacheEntry, Instance, NodeIdentity, ObjectCache};
pub use config::LoaderConfig;
pub use descriptor::{ObjectKind, TypeCatalog, TypeDescriptor};
pub use error::{ResolveError, WireError, WireResult};
pub use factory::{
    Credentials, FactoryDescriptor, FactoryError, FactoryHandle, FactoryRegistry, ObjectFactory,
    Permission, Proxy, TripleStore, UserGroup,
};
pub use graph::{Graph, GraphDocument, GraphId, Triple};
pub use loader::ConfigurationLoader;
pub use node::Node;
pub use resolver::Resolver;
pub use settings::SettingsProvider;
