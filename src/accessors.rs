//! Typed reads of configuration properties.
//!
//! [`Values`] reads property values of a subject, routing every object through
//! app-setting resolution (see [`crate::settings`]). Scalar accessors use the
//! first matching triple; multi-valued properties are read with
//! [`Values::all`] or [`Values::literals`].
//!
//! Each scalar accessor has an `_any` form taking a list of properties: the
//! first property with a usable value decides the result. For the typed forms
//! a value that does not parse is skipped like an absent one.

use std::sync::Arc;

use crate::graph::Graph;
use crate::node::Node;
use crate::settings::{SettingsProvider, resolve_app_setting};

/// Shared settings handle as stored by the resolver.
pub type SharedSettings = Arc<dyn SettingsProvider + Send + Sync>;

/// Property reader over one graph.
///
/// `Values` holds its own handle on the settings, so a factory can keep one
/// around while it calls back into the resolver.
#[derive(Clone)]
pub struct Values<'g> {
    graph: &'g Graph,
    settings: SharedSettings,
}

impl<'g> Values<'g> {
    pub fn new(graph: &'g Graph, settings: SharedSettings) -> Self {
        Self { graph, settings }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Every value of `property`, app-settings resolved.
    ///
    /// Values referring to undefined app-settings are left out.
    pub fn all(&self, subject: &Node, property: &str) -> Vec<Node> {
        self.graph
            .objects_for(subject, property)
            .filter_map(|n| resolve_app_setting(n, self.settings.as_ref()))
            .collect()
    }

    /// Lexical forms of the literal values of `property`.
    ///
    /// Non-literal values are skipped; app-settings are not consulted.
    pub fn literals(&self, subject: &Node, property: &str) -> Vec<String> {
        self.graph
            .objects_for(subject, property)
            .filter_map(Node::lexical)
            .map(str::to_string)
            .collect()
    }

    /// The first value of `property`, app-settings resolved.
    pub fn node(&self, subject: &Node, property: &str) -> Option<Node> {
        let raw = self.graph.first_object(subject, property)?;
        resolve_app_setting(raw, self.settings.as_ref())
    }

    pub fn node_any(&self, subject: &Node, properties: &[&str]) -> Option<Node> {
        properties.iter().find_map(|p| self.node(subject, p))
    }

    /// The first value of `property` as a string, if it is (or resolves to) a literal.
    pub fn string(&self, subject: &Node, property: &str) -> Option<String> {
        self.node(subject, property)
            .and_then(|n| n.lexical().map(str::to_string))
    }

    pub fn string_any(&self, subject: &Node, properties: &[&str]) -> Option<String> {
        properties.iter().find_map(|p| self.string(subject, p))
    }

    /// The first value of `property` as a string, whatever its kind.
    ///
    /// Blank nodes give their label, literals their lexical form, IRIs either
    /// the app-setting value or the IRI itself.
    pub fn value(&self, subject: &Node, property: &str) -> Option<String> {
        let raw = self.graph.first_object(subject, property)?;
        match raw {
            Node::Blank(b) => Some(b.as_str().to_string()),
            Node::Literal(l) => Some(l.value().to_string()),
            Node::Iri(_) => match resolve_app_setting(raw, self.settings.as_ref())? {
                Node::Literal(l) => Some(l.value().to_string()),
                other => Some(other.as_iri().unwrap_or_default().to_string()),
            },
        }
    }

    pub fn value_any(&self, subject: &Node, properties: &[&str]) -> Option<String> {
        properties.iter().find_map(|p| self.value(subject, p))
    }

    /// Boolean value of `property`, or `default` when absent or unparsable.
    ///
    /// Accepts `true`/`false` in any case, surrounding whitespace ignored.
    pub fn bool(&self, subject: &Node, property: &str, default: bool) -> bool {
        parse_bool(self.node(subject, property).as_ref()).unwrap_or(default)
    }

    pub fn bool_any(&self, subject: &Node, properties: &[&str], default: bool) -> bool {
        properties
            .iter()
            .find_map(|p| parse_bool(self.node(subject, p).as_ref()))
            .unwrap_or(default)
    }

    /// 32-bit integer value of `property`, or `default` when absent or unparsable.
    pub fn int32(&self, subject: &Node, property: &str, default: i32) -> i32 {
        parse_lexical(self.node(subject, property).as_ref()).unwrap_or(default)
    }

    pub fn int32_any(&self, subject: &Node, properties: &[&str], default: i32) -> i32 {
        properties
            .iter()
            .find_map(|p| parse_lexical(self.node(subject, p).as_ref()))
            .unwrap_or(default)
    }

    /// 64-bit integer value of `property`, or `default` when absent or unparsable.
    pub fn int64(&self, subject: &Node, property: &str, default: i64) -> i64 {
        parse_lexical(self.node(subject, property).as_ref()).unwrap_or(default)
    }

    pub fn int64_any(&self, subject: &Node, properties: &[&str], default: i64) -> i64 {
        properties
            .iter()
            .find_map(|p| parse_lexical(self.node(subject, p).as_ref()))
            .unwrap_or(default)
    }
}

impl std::fmt::Debug for Values<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Values").field("graph", &self.graph.id()).finish()
    }
}

fn parse_bool(node: Option<&Node>) -> Option<bool> {
    let text = node?.lexical()?.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_lexical<T: std::str::FromStr>(node: Option<&Node>) -> Option<T> {
    node?.lexical()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use oxigraph::model::NamedNode;

    use super::*;

    const P: &str = "urn:p";
    const Q: &str = "urn:q";

    fn setup() -> (Graph, Node, SharedSettings) {
        let mut g = Graph::new();
        let s = Node::iri("urn:s").unwrap();
        let p = NamedNode::new(P).unwrap();
        g.insert_spo(s.clone(), p.clone(), Node::literal(" 17 "));
        g.insert_spo(s.clone(), p.clone(), Node::iri("appsetting:X").unwrap());
        g.insert_spo(s.clone(), p.clone(), Node::iri("appsetting:Y").unwrap());
        g.insert_spo(s.clone(), p, Node::blank("b0").unwrap());
        let settings: SharedSettings =
            Arc::new(HashMap::from([("X".to_string(), "42".to_string())]));
        (g, s, settings)
    }

    #[test]
    fn all_resolves_and_omits_undefined_settings() {
        let (g, s, settings) = setup();
        let values = Values::new(&g, settings);
        let all = values.all(&s, P);
        assert_eq!(
            all,
            vec![
                Node::literal(" 17 "),
                Node::literal("42"),
                Node::blank("b0").unwrap()
            ]
        );
    }

    #[test]
    fn literals_skip_resources() {
        let (g, s, settings) = setup();
        let values = Values::new(&g, settings);
        assert_eq!(values.literals(&s, P), vec![" 17 ".to_string()]);
    }

    #[test]
    fn scalar_accessors_use_first_value() {
        let (g, s, settings) = setup();
        let values = Values::new(&g, settings);
        assert_eq!(values.string(&s, P).as_deref(), Some(" 17 "));
        assert_eq!(values.int32(&s, P, -1), 17);
        assert_eq!(values.int64(&s, P, -1), 17);
        assert!(values.bool(&s, P, true));
        assert!(!values.bool(&s, P, false));
        assert_eq!(values.string(&s, "urn:none"), None);
        assert_eq!(values.int32(&s, "urn:none", 5), 5);
    }

    #[test]
    fn app_setting_scalars() {
        let mut g = Graph::new();
        let s = Node::blank("cfg").unwrap();
        let pred = |p: &str| NamedNode::new(p).unwrap();
        g.insert_spo(s.clone(), pred("urn:x"), Node::iri("appsetting:X").unwrap());
        g.insert_spo(s.clone(), pred("urn:y"), Node::iri("appsetting:Y").unwrap());
        g.insert_spo(s.clone(), pred("urn:z"), Node::iri("urn:plain").unwrap());
        let settings: SharedSettings =
            Arc::new(HashMap::from([("X".to_string(), "42".to_string())]));
        let values = Values::new(&g, settings);

        assert_eq!(values.string(&s, "urn:x").as_deref(), Some("42"));
        assert_eq!(values.int64(&s, "urn:x", 0), 42);
        assert_eq!(values.string(&s, "urn:y"), None);
        assert_eq!(values.value(&s, "urn:y"), None);
        assert_eq!(
            values.node(&s, "urn:z"),
            Some(Node::iri("urn:plain").unwrap())
        );
        assert_eq!(values.string(&s, "urn:z"), None);
        assert_eq!(values.value(&s, "urn:z").as_deref(), Some("urn:plain"));
    }

    #[test]
    fn value_regardless_of_kind() {
        let mut g = Graph::new();
        let s = Node::iri("urn:s").unwrap();
        g.insert_spo(s.clone(), NamedNode::new(Q).unwrap(), Node::blank("b7").unwrap());
        let values = Values::new(&g, Arc::new(crate::settings::NoSettings));
        assert_eq!(values.value(&s, Q).as_deref(), Some("b7"));
    }

    #[test]
    fn typed_any_forms_skip_unparsable_values() {
        let mut g = Graph::new();
        let s = Node::iri("urn:s").unwrap();
        let pred = |p: &str| NamedNode::new(p).unwrap();
        g.insert_spo(s.clone(), pred("urn:a"), Node::literal("nope"));
        g.insert_spo(s.clone(), pred("urn:b"), Node::literal("7"));
        g.insert_spo(s.clone(), pred("urn:c"), Node::literal("true"));
        g.insert_spo(s.clone(), pred("urn:d"), Node::iri("appsetting:Missing").unwrap());
        let values = Values::new(&g, Arc::new(crate::settings::NoSettings));

        assert_eq!(values.int32_any(&s, &["urn:a", "urn:b"], -1), 7);
        assert_eq!(values.int64_any(&s, &["urn:d", "urn:a", "urn:b"], -1), 7);
        assert!(values.bool_any(&s, &["urn:a", "urn:d", "urn:c"], false));
        assert_eq!(values.int32_any(&s, &["urn:a", "urn:c"], -1), -1);
    }

    #[test]
    fn any_forms_take_first_property_with_a_value() {
        let mut g = Graph::new();
        let s = Node::iri("urn:s").unwrap();
        g.insert_spo(s.clone(), NamedNode::new(Q).unwrap(), Node::literal("TRUE"));
        g.insert_spo(s.clone(), NamedNode::new(P).unwrap(), Node::literal("nope"));
        let values = Values::new(&g, Arc::new(crate::settings::NoSettings));

        assert_eq!(values.string_any(&s, &["urn:none", Q, P]).as_deref(), Some("TRUE"));
        assert!(values.bool_any(&s, &["urn:none", Q], false));
        assert_eq!(values.int32_any(&s, &[P, Q], 9), 9);
        assert_eq!(values.int64_any(&s, &["urn:none"], 3), 3);
        assert_eq!(values.value_any(&s, &[P, Q]).as_deref(), Some("nope"));
    }
}
