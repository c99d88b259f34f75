//! Configuration graph terms.
//!
//! A [`Node`] is a vertex of a configuration graph: an IRI, a blank node, or a
//! literal. The term types come from `oxigraph::model`, so IRIs, blank node
//! labels and language tags are validated on construction.

use std::fmt;

use oxigraph::model::{BlankNode, Literal, NamedNode};

use crate::error::{GraphError, GraphResult};

/// Kind tag of a [`Node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Iri,
    Blank,
    Literal,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Iri => write!(f, "IRI"),
            NodeKind::Blank => write!(f, "blank node"),
            NodeKind::Literal => write!(f, "literal"),
        }
    }
}

/// A configuration graph vertex.
///
/// Equality is structural. Two blank nodes with the same label from different
/// graphs compare equal here; the cache keeps them apart by pairing every node
/// with its graph (see [`crate::cache::NodeIdentity`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Iri(NamedNode),
    Blank(BlankNode),
    Literal(Literal),
}

impl Node {
    /// Create an IRI node, validating the IRI.
    pub fn iri(iri: impl Into<String>) -> GraphResult<Self> {
        let iri = iri.into();
        NamedNode::new(iri.clone())
            .map(Node::Iri)
            .map_err(|e| GraphError::InvalidIri {
                iri,
                message: e.to_string(),
            })
    }

    /// Create a blank node from its label (without the `_:` prefix).
    pub fn blank(label: impl Into<String>) -> GraphResult<Self> {
        let label = label.into();
        BlankNode::new(label.clone())
            .map(Node::Blank)
            .map_err(|e| GraphError::InvalidBlankNode {
                label,
                message: e.to_string(),
            })
    }

    /// Create a plain `xsd:string` literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Node::Literal(Literal::new_simple_literal(value))
    }

    /// Create a literal with an explicit datatype IRI.
    pub fn typed_literal(value: impl Into<String>, datatype: &str) -> GraphResult<Self> {
        let datatype = NamedNode::new(datatype).map_err(|e| GraphError::InvalidIri {
            iri: datatype.to_string(),
            message: e.to_string(),
        })?;
        Ok(Node::Literal(Literal::new_typed_literal(value, datatype)))
    }

    /// Create a language-tagged literal.
    pub fn lang_literal(value: impl Into<String>, language: &str) -> GraphResult<Self> {
        Literal::new_language_tagged_literal(value, language)
            .map(Node::Literal)
            .map_err(|e| GraphError::InvalidLanguageTag {
                tag: language.to_string(),
                message: e.to_string(),
            })
    }

    /// The kind tag of this node.
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Iri(_) => NodeKind::Iri,
            Node::Blank(_) => NodeKind::Blank,
            Node::Literal(_) => NodeKind::Literal,
        }
    }

    /// Whether this node may identify an object (IRI or blank node).
    pub fn is_resource(&self) -> bool {
        !matches!(self, Node::Literal(_))
    }

    /// The IRI string, if this is an IRI node.
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Node::Iri(n) => Some(n.as_str()),
            _ => None,
        }
    }

    /// The blank node label, if this is a blank node.
    pub fn as_blank(&self) -> Option<&str> {
        match self {
            Node::Blank(b) => Some(b.as_str()),
            _ => None,
        }
    }

    /// The lexical form, if this is a literal. Datatype and language are discarded.
    pub fn lexical(&self) -> Option<&str> {
        match self {
            Node::Literal(l) => Some(l.value()),
            _ => None,
        }
    }

    /// The language tag, if this is a language-tagged literal.
    pub fn language(&self) -> Option<&str> {
        match self {
            Node::Literal(l) => l.language(),
            _ => None,
        }
    }

    /// The datatype IRI, if this is a literal.
    pub fn datatype(&self) -> Option<&str> {
        match self {
            Node::Literal(l) => Some(l.datatype().as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Iri(n) => n.fmt(f),
            Node::Blank(b) => b.fmt(f),
            Node::Literal(l) => l.fmt(f),
        }
    }
}

impl From<NamedNode> for Node {
    fn from(n: NamedNode) -> Self {
        Node::Iri(n)
    }
}

impl From<BlankNode> for Node {
    fn from(b: BlankNode) -> Self {
        Node::Blank(b)
    }
}

impl From<Literal> for Node {
    fn from(l: Literal) -> Self {
        Node::Literal(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iri_validation() {
        assert!(Node::iri("https://example.org/a").is_ok());
        assert!(Node::iri("appsetting:Key").is_ok());
        let err = Node::iri("not an iri").unwrap_err();
        assert!(matches!(err, GraphError::InvalidIri { .. }));
    }

    #[test]
    fn kinds_and_accessors() {
        let iri = Node::iri("urn:x").unwrap();
        let blank = Node::blank("b0").unwrap();
        let lit = Node::literal("42");

        assert_eq!(iri.kind(), NodeKind::Iri);
        assert_eq!(blank.kind(), NodeKind::Blank);
        assert_eq!(lit.kind(), NodeKind::Literal);

        assert_eq!(iri.as_iri(), Some("urn:x"));
        assert_eq!(blank.as_blank(), Some("b0"));
        assert_eq!(lit.lexical(), Some("42"));
        assert_eq!(iri.lexical(), None);

        assert!(iri.is_resource());
        assert!(blank.is_resource());
        assert!(!lit.is_resource());
    }

    #[test]
    fn typed_and_tagged_literals() {
        let n = Node::typed_literal("7", "http://www.w3.org/2001/XMLSchema#integer").unwrap();
        assert_eq!(n.lexical(), Some("7"));
        assert_eq!(n.datatype(), Some("http://www.w3.org/2001/XMLSchema#integer"));

        let n = Node::lang_literal("chat", "fr").unwrap();
        assert_eq!(n.language(), Some("fr"));
        assert!(Node::lang_literal("x", "not a tag!").is_err());
    }

    #[test]
    fn display_uses_ntriples_form() {
        assert_eq!(Node::iri("urn:x").unwrap().to_string(), "<urn:x>");
        assert_eq!(Node::blank("b1").unwrap().to_string(), "_:b1");
        assert_eq!(Node::literal("hi").to_string(), "\"hi\"");
    }
}
