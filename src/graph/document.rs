//! JSON representation of a graph's triples.
//!
//! Terms are externally tagged: `{"iri": "..."}`, `{"blank": "b0"}` or
//! `{"literal": {"value": "42", "datatype": "...", "language": "en"}}`.

use std::path::Path;

use oxigraph::model::NamedNode;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::node::Node;

use super::Graph;

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// A single term of a [`TripleDocument`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermDocument {
    Iri(String),
    Blank(String),
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
}

impl TermDocument {
    fn to_node(&self) -> GraphResult<Node> {
        match self {
            TermDocument::Iri(iri) => Node::iri(iri.as_str()),
            TermDocument::Blank(label) => Node::blank(label.as_str()),
            TermDocument::Literal {
                value,
                language: Some(lang),
                ..
            } => Node::lang_literal(value.as_str(), lang),
            TermDocument::Literal {
                value,
                datatype: Some(dt),
                ..
            } => Node::typed_literal(value.as_str(), dt),
            TermDocument::Literal { value, .. } => Ok(Node::literal(value.as_str())),
        }
    }

    fn from_node(node: &Node) -> Self {
        match node {
            Node::Iri(n) => TermDocument::Iri(n.as_str().to_string()),
            Node::Blank(b) => TermDocument::Blank(b.as_str().to_string()),
            Node::Literal(l) => {
                let datatype = l.datatype().as_str();
                TermDocument::Literal {
                    value: l.value().to_string(),
                    datatype: (datatype != XSD_STRING && datatype != RDF_LANG_STRING)
                        .then(|| datatype.to_string()),
                    language: l.language().map(str::to_string),
                }
            }
        }
    }
}

/// One triple of a [`GraphDocument`]. The predicate is always an IRI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripleDocument {
    pub subject: TermDocument,
    pub predicate: String,
    pub object: TermDocument,
}

/// Serializable form of a [`Graph`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Optional base IRI of the graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default)]
    pub triples: Vec<TripleDocument>,
}

impl GraphDocument {
    /// Parse a document from a JSON string.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        serde_json::from_str(json).map_err(|e| GraphError::DocumentParse {
            message: e.to_string(),
        })
    }

    /// Read and parse a JSON document from disk.
    pub fn read(path: &Path) -> GraphResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| GraphError::DocumentRead {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> GraphResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| GraphError::DocumentParse {
            message: e.to_string(),
        })
    }

    /// Build a fresh [`Graph`] from this document.
    pub fn to_graph(&self) -> GraphResult<Graph> {
        let mut graph = Graph::new();
        if let Some(base) = &self.base {
            let base = NamedNode::new(base.as_str()).map_err(|e| GraphError::InvalidIri {
                iri: base.clone(),
                message: e.to_string(),
            })?;
            graph.set_base_iri(Some(base));
        }
        for t in &self.triples {
            let predicate = match Node::iri(t.predicate.as_str())? {
                Node::Iri(p) => p,
                other => {
                    return Err(GraphError::InvalidPredicate {
                        term: other.to_string(),
                    });
                }
            };
            graph.insert_spo(t.subject.to_node()?, predicate, t.object.to_node()?);
        }
        Ok(graph)
    }

    /// Capture the triples of an existing graph.
    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            base: graph.base_iri().map(|b| b.as_str().to_string()),
            triples: graph
                .iter()
                .map(|t| TripleDocument {
                    subject: TermDocument::from_node(&t.subject),
                    predicate: t.predicate.as_str().to_string(),
                    object: TermDocument::from_node(&t.object),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "base": "https://example.org/config",
        "triples": [
            {"subject": {"iri": "urn:g"}, "predicate": "urn:p", "object": {"literal": {"value": "42"}}},
            {"subject": {"blank": "b0"}, "predicate": "urn:p", "object": {"iri": "urn:g"}},
            {"subject": {"iri": "urn:g"}, "predicate": "urn:label", "object": {"literal": {"value": "hallo", "language": "de"}}}
        ]
    }"#;

    #[test]
    fn parse_to_graph() {
        let graph = GraphDocument::from_json(DOC).unwrap().to_graph().unwrap();
        assert_eq!(graph.len(), 3);
        assert_eq!(
            graph.base_iri().map(|b| b.as_str()),
            Some("https://example.org/config")
        );
        let g = Node::iri("urn:g").unwrap();
        assert_eq!(
            graph.first_object(&g, "urn:p").and_then(|n| n.lexical()),
            Some("42")
        );
        assert_eq!(
            graph.first_object(&g, "urn:label").and_then(|n| n.language()),
            Some("de")
        );
    }

    #[test]
    fn invalid_iri_is_reported() {
        let doc = r#"{"triples": [{"subject": {"iri": "no spaces allowed"}, "predicate": "urn:p", "object": {"iri": "urn:o"}}]}"#;
        let err = GraphDocument::from_json(doc).unwrap().to_graph().unwrap_err();
        assert!(matches!(err, GraphError::InvalidIri { .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = GraphDocument::from_json("{ not json").unwrap_err();
        assert!(matches!(err, GraphError::DocumentParse { .. }));
    }

    #[test]
    fn from_graph_omits_plain_string_datatype() {
        let graph = GraphDocument::from_json(DOC).unwrap().to_graph().unwrap();
        let doc = GraphDocument::from_graph(&graph);
        assert_eq!(
            doc.triples[0].object,
            TermDocument::Literal {
                value: "42".into(),
                datatype: None,
                language: None,
            }
        );
        assert_eq!(
            doc.triples[2].object,
            TermDocument::Literal {
                value: "hallo".into(),
                datatype: None,
                language: Some("de".into()),
            }
        );
    }
}
