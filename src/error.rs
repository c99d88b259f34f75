//! Rich diagnostic error types for graphwire.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong in their configuration graph and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Boxed foreign error raised by a factory while constructing an object.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for graphwire.
#[derive(Debug, Error, Diagnostic)]
pub enum WireError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// Resolution errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error("node {identifier} does not occur in the configuration graph")]
    #[diagnostic(
        code(graphwire::resolve::missing_node),
        help(
            "Objects are located by the IRI or blank node label that identifies them. \
             Check the identifier for typos, or add triples describing the object."
        )
    )]
    MissingNode { identifier: String },

    #[error("no target type for node {node}{}", unknown_type_suffix(.type_name))]
    #[diagnostic(
        code(graphwire::resolve::missing_descriptor),
        help(
            "The cfg:type value must be a fully qualified type name known to the resolver. \
             Register it with `Resolver::register_type` or correct the name."
        )
    )]
    MissingDescriptor {
        node: String,
        type_name: Option<String>,
    },

    #[error("literal {node} cannot identify an object")]
    #[diagnostic(
        code(graphwire::resolve::literal_node),
        help("Objects are identified only by IRIs or blank nodes. Point the property at a resource instead.")
    )]
    LiteralNode { node: String },

    #[error("circular reference: node {node} is already being resolved")]
    #[diagnostic(
        code(graphwire::resolve::circular_reference),
        help(
            "Resolving this node required resolving itself again, directly or through \
             other objects. Break the cycle in the configuration graph."
        )
    )]
    CircularReference { node: String },

    #[error("circular reference: a value of {property} on node {node} refers back to the node itself")]
    #[diagnostic(
        code(graphwire::resolve::direct_circular_reference),
        help("An object cannot be its own dependency. Remove the self-referencing {property} triple.")
    )]
    DirectCircularReference { node: String, property: String },

    #[error("node {node} failed to resolve previously")]
    #[diagnostic(
        code(graphwire::resolve::previously_failed),
        help(
            "Failures are cached permanently so a broken dependency fails fast. \
             Fix the cause, then call `Resolver::clear_cache` before retrying."
        )
    )]
    PreviouslyFailed { node: String },

    #[error("no factory can produce node {node} as {type_name}")]
    #[diagnostic(
        code(graphwire::resolve::no_capable_factory),
        help(
            "Every registered factory declined this type. Register a factory for it with \
             `Resolver::add_factory`, or declare one in the graph as a cfg:ObjectFactory."
        )
    )]
    NoCapableFactory { node: String, type_name: String },

    #[error("factory {factory} failed while constructing node {node}")]
    #[diagnostic(
        code(graphwire::resolve::construction_failed),
        help("The factory committed to building this object and then hit an error. See the cause below.")
    )]
    ConstructionFailed {
        node: String,
        factory: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("node {node} has no cfg:type and no class with a default type")]
    #[diagnostic(
        code(graphwire::resolve::missing_type_information),
        help(
            "Add a cfg:type triple naming the type to build, or declare the node with \
             one of the well-known configuration classes via rdf:type."
        )
    )]
    MissingTypeInformation { node: String },

    #[error("node {node} is declared a cfg:ObjectFactory but did not resolve to a factory")]
    #[diagnostic(
        code(graphwire::resolve::auto_registration_mismatch),
        help("Check the cfg:type of the node; it must name a type registered as a factory constructor.")
    )]
    AutoRegistrationMismatch { node: String },

    #[error("invalid configuration for node {node}: {message}")]
    #[diagnostic(code(graphwire::resolve::invalid_configuration))]
    InvalidConfiguration { node: String, message: String },

    #[error("node {node} resolved to an object that is not a {expected}")]
    #[diagnostic(
        code(graphwire::resolve::type_mismatch),
        help("The produced object does not have the requested Rust type. Check the node's cfg:type.")
    )]
    TypeMismatch { node: String, expected: &'static str },
}

fn unknown_type_suffix(type_name: &Option<String>) -> String {
    match type_name {
        Some(name) => format!(": unknown type name \"{name}\""),
        None => String::new(),
    }
}

/// Result type for resolution.
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

// ---------------------------------------------------------------------------
// Graph errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum GraphError {
    #[error("invalid IRI <{iri}>: {message}")]
    #[diagnostic(
        code(graphwire::graph::invalid_iri),
        help("IRIs must be absolute, e.g. `https://example.org/thing` or `appsetting:Key`.")
    )]
    InvalidIri { iri: String, message: String },

    #[error("invalid blank node label \"{label}\": {message}")]
    #[diagnostic(
        code(graphwire::graph::invalid_blank),
        help("Blank node labels may contain letters, digits, '_', '-' and '.'.")
    )]
    InvalidBlankNode { label: String, message: String },

    #[error("invalid language tag \"{tag}\": {message}")]
    #[diagnostic(code(graphwire::graph::invalid_language))]
    InvalidLanguageTag { tag: String, message: String },

    #[error("a predicate must be an IRI, got {term}")]
    #[diagnostic(code(graphwire::graph::invalid_predicate))]
    InvalidPredicate { term: String },

    #[error("failed to read graph document {path}")]
    #[diagnostic(
        code(graphwire::graph::document_read),
        help("Ensure the file exists and is readable.")
    )]
    DocumentRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse graph document: {message}")]
    #[diagnostic(
        code(graphwire::graph::document_parse),
        help("Graph documents are JSON objects with a `triples` array of subject/predicate/object terms.")
    )]
    DocumentParse { message: String },

    #[error("invalid cfg:imports target {target}: {message}")]
    #[diagnostic(
        code(graphwire::graph::invalid_import),
        help(
            "cfg:imports takes a literal file path, a `file:` IRI, or an `appsetting:` IRI \
             whose value is one of those."
        )
    )]
    InvalidImport { target: String, message: String },
}

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read loader config: {path}")]
    #[diagnostic(
        code(graphwire::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse loader config {path}: {message}")]
    #[diagnostic(
        code(graphwire::config::parse),
        help("Check the TOML syntax in the loader config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write loader config: {path}")]
    #[diagnostic(
        code(graphwire::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot determine home directory")]
    #[diagnostic(
        code(graphwire::config::no_home),
        help("Set the HOME environment variable or pass an explicit --config path.")
    )]
    NoHome,
}

/// Result type for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Convenience alias for functions returning graphwire results.
pub type WireResult<T> = std::result::Result<T, WireError>;
