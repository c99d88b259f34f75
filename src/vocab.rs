//! Reserved vocabulary of configuration graphs.
//!
//! Properties and classes live in the configuration namespace
//! [`CONFIG_NS`]; the class property is `rdf:type`.

use oxigraph::model::NamedNode;

macro_rules! cfg {
    ($local:literal) => {
        concat!("https://graphwire.dev/config#", $local)
    };
}

/// Configuration namespace IRI.
pub const CONFIG_NS: &str = cfg!("");

/// `rdf:type`, the class property used for default-type inference.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

/// URI scheme whose IRIs are replaced by external settings at read time.
pub const APP_SETTING_SCHEME: &str = "appsetting";

/// Build a [`NamedNode`] for one of the vocabulary constants.
///
/// Only meant for the IRIs defined in this module, which are known to be valid.
pub fn term(iri: &'static str) -> NamedNode {
    NamedNode::new_unchecked(iri)
}

/// Compact `cfg:local` form of a configuration IRI, for diagnostics.
pub fn qname(iri: &str) -> String {
    match iri.strip_prefix(CONFIG_NS) {
        Some(local) => format!("cfg:{local}"),
        None => format!("<{iri}>"),
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// Fully qualified type name of the object to build.
pub const PROP_TYPE: &str = cfg!("type");
pub const PROP_ENABLED: &str = cfg!("enabled");

/// Further configuration documents merged into the loaded graph.
pub const PROP_IMPORTS: &str = cfg!("imports");

pub const PROP_USER: &str = cfg!("user");
pub const PROP_PASSWORD: &str = cfg!("password");
pub const PROP_CREDENTIALS: &str = cfg!("credentials");
pub const PROP_USE_CREDENTIALS_FOR_PROXY: &str = cfg!("useCredentialsForProxy");
pub const PROP_SERVER: &str = cfg!("server");

pub const PROP_FROM_GRAPH: &str = cfg!("fromGraph");
pub const PROP_FROM_FILE: &str = cfg!("fromFile");
pub const PROP_FROM_STORE: &str = cfg!("fromStore");
pub const PROP_WITH_URI: &str = cfg!("withUri");
pub const PROP_ASSIGN_URI: &str = cfg!("assignUri");
pub const PROP_USING_GRAPH: &str = cfg!("usingGraph");

pub const PROP_MEMBER: &str = cfg!("member");
pub const PROP_REQUIRES_AUTHENTICATION: &str = cfg!("requiresAuthentication");
pub const PROP_ALLOW: &str = cfg!("allow");
pub const PROP_DENY: &str = cfg!("deny");
pub const PROP_ACTION: &str = cfg!("action");

// ---------------------------------------------------------------------------
// Classes
// ---------------------------------------------------------------------------

/// Nodes of this class are resolved and registered as factories by auto-configuration.
pub const CLASS_OBJECT_FACTORY: &str = cfg!("ObjectFactory");

pub const CLASS_TRIPLE_STORE: &str = cfg!("TripleStore");
pub const CLASS_GRAPH_COLLECTION: &str = cfg!("GraphCollection");
pub const CLASS_GRAPH: &str = cfg!("Graph");
pub const CLASS_TRIPLE_COLLECTION: &str = cfg!("TripleCollection");

pub const CLASS_STORAGE_SERVER: &str = cfg!("StorageServer");
pub const CLASS_STORAGE_PROVIDER: &str = cfg!("StorageProvider");

pub const CLASS_SPARQL_ENDPOINT: &str = cfg!("SparqlEndpoint");
pub const CLASS_SPARQL_QUERY_PROCESSOR: &str = cfg!("SparqlQueryProcessor");
pub const CLASS_SPARQL_UPDATE_PROCESSOR: &str = cfg!("SparqlUpdateProcessor");
pub const CLASS_SPARQL_HTTP_PROTOCOL_PROCESSOR: &str = cfg!("SparqlHttpProtocolProcessor");
pub const CLASS_SPARQL_DATASET: &str = cfg!("SparqlDataset");

pub const CLASS_REASONER: &str = cfg!("Reasoner");
pub const CLASS_PROXY: &str = cfg!("Proxy");

pub const CLASS_USER_GROUP: &str = cfg!("UserGroup");
pub const CLASS_USER: &str = cfg!("User");
pub const CLASS_PERMISSION: &str = cfg!("Permission");

pub const CLASS_RDF_PARSER: &str = cfg!("RdfParser");
pub const CLASS_RDF_WRITER: &str = cfg!("RdfWriter");
