//! Representation parser adapters.
//!
//! A fetched payload is parsed into a [`Document`] according to its
//! [`Syntax`]: an RDF graph (RDF/XML, Turtle), a namespace-resolved element
//! tree (plain XML) or a JSON object. Binding a document to the resource
//! under test yields a [`ParsedRepresentation`], which answers
//! [`PropertyLookup::lookup`] identically whatever the source syntax was.
//!
//! # Value model
//!
//! | Payload                      | [`PropertyValue`]      |
//! |------------------------------|------------------------|
//! | IRI / `rdf:resource`         | `Resource(iri)`        |
//! | literal / text / JSON scalar | `Literal(text)`        |
//! | blank node / nested element  | `Node`                 |

pub mod graph;
pub mod markup;
pub mod object;

use oslc_spec::{DomainModule, Format, ResourceType};
use tracing::warn;

use crate::error::{LookupError, ParseError};

/// Concrete syntax of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Syntax {
    /// RDF/XML, parsed as a graph.
    RdfXml,
    /// Turtle, parsed as a graph.
    Turtle,
    /// XML, parsed as an element tree.
    Xml,
    /// JSON, parsed as an object tree.
    Json,
}

impl Syntax {
    /// Syntax implied by a requested format when the response declares none.
    #[must_use]
    pub fn for_format(format: Format) -> Self {
        match format {
            Format::RdfXml | Format::RdfXmlAbbrev => Syntax::RdfXml,
            Format::Xml => Syntax::Xml,
            Format::Json => Syntax::Json,
        }
    }

    /// Selects the adapter for a response content type.
    ///
    /// Media type parameters (`; charset=...`) are ignored. Returns `None`
    /// for content types no adapter handles.
    #[must_use]
    pub fn from_content_type(content_type: Option<&str>, requested: Format) -> Option<Self> {
        let Some(content_type) = content_type else {
            return Some(Self::for_format(requested));
        };
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if essence.is_empty() {
            return Some(Self::for_format(requested));
        }
        match essence.as_str() {
            "application/rdf+xml" => Some(Syntax::RdfXml),
            "text/turtle" | "application/x-turtle" => Some(Syntax::Turtle),
            e if e.ends_with("/xml") || e.ends_with("+xml") => Some(Syntax::Xml),
            e if e.ends_with("/json") || e.ends_with("+json") => Some(Syntax::Json),
            _ => None,
        }
    }

    /// Label used in error messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Syntax::RdfXml => "RDF/XML",
            Syntax::Turtle => "Turtle",
            Syntax::Xml => "XML",
            Syntax::Json => "JSON",
        }
    }
}

/// One value of a property, independent of the payload syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyValue {
    /// Reference to a resource.
    Resource(String),
    /// Literal text.
    Literal(String),
    /// Anonymous nested node.
    Node,
}

/// Ordered multi-valued access to the properties of a bound resource.
pub trait PropertyLookup {
    /// Returns every value of a prefix-qualified property, in document order.
    ///
    /// An absent property yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] if the name cannot be resolved or the values
    /// under it are structurally malformed.
    fn lookup(&self, property: &str) -> Result<Vec<PropertyValue>, LookupError>;
}

/// Handle on a node inside a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeRef {
    /// A graph subject.
    Subject(graph::Subject),
    /// An element index in a markup tree.
    Element(usize),
    /// A JSON pointer into an object tree.
    Pointer(String),
}

/// A property value plus the node it leads to, when it can be traversed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// The value as seen by [`PropertyLookup`].
    pub value: PropertyValue,
    /// Node carrying the value's own properties, if the document describes it.
    pub node: Option<NodeRef>,
}

impl Entry {
    /// Address of the referenced resource, if the value is a reference.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        match &self.value {
            PropertyValue::Resource(iri) => Some(iri),
            _ => None,
        }
    }
}

/// A parsed payload, not yet bound to a resource.
#[derive(Debug)]
pub enum Document {
    /// RDF graph.
    Graph(graph::Graph),
    /// XML element tree.
    Markup(markup::Markup),
    /// JSON object tree.
    Object(object::Object),
}

impl Document {
    /// Parses a payload.
    ///
    /// `base` resolves relative references; `domain` supplies the prefix
    /// table for syntaxes that carry qualified names.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Syntax`] if the payload is malformed.
    pub fn parse(
        bytes: &[u8],
        syntax: Syntax,
        base: &str,
        domain: &'static DomainModule,
    ) -> Result<Self, ParseError> {
        let syntax_error = |message: String| ParseError::Syntax {
            url: base.to_string(),
            syntax: syntax.as_str(),
            message,
        };
        match syntax {
            Syntax::RdfXml | Syntax::Turtle => graph::Graph::parse(bytes, syntax, base)
                .map(Document::Graph)
                .map_err(syntax_error),
            Syntax::Xml => markup::Markup::parse(bytes, base)
                .map(Document::Markup)
                .map_err(syntax_error),
            Syntax::Json => object::Object::parse(bytes, base, domain)
                .map(Document::Object)
                .map_err(syntax_error),
        }
    }

    /// Syntax the payload was parsed as.
    #[must_use]
    pub fn syntax(&self) -> Syntax {
        match self {
            Document::Graph(g) => g.syntax(),
            Document::Markup(_) => Syntax::Xml,
            Document::Object(_) => Syntax::Json,
        }
    }

    /// Finds the node describing `address`.
    ///
    /// Tries, in order: a node of type `type_iri` with that address, any node
    /// with that address, the single node of type `type_iri`. The last match
    /// may carry a different address and is logged as a warning.
    #[must_use]
    pub fn bind(&self, address: &str, type_iri: &str) -> Option<NodeRef> {
        let typed = self.nodes_of_type(type_iri);
        if let Some(node) = typed
            .iter()
            .find(|n| self.address_of(n).as_deref() == Some(address))
        {
            return Some(node.clone());
        }
        if let Some(node) = self.node_with_address(address) {
            return Some(node);
        }
        match typed.as_slice() {
            [only] => {
                warn!(
                    requested = address,
                    bound = self.address_of(only).as_deref().unwrap_or("<blank>"),
                    type_iri,
                    "no node with the requested address; using the only typed node"
                );
                Some(only.clone())
            }
            _ => None,
        }
    }

    /// Nodes declared with type `type_iri`, in document order.
    #[must_use]
    pub fn nodes_of_type(&self, type_iri: &str) -> Vec<NodeRef> {
        match self {
            Document::Graph(g) => g.subjects_of_type(type_iri),
            Document::Markup(m) => m.elements_of_type(type_iri),
            Document::Object(o) => o.nodes_of_type(type_iri),
        }
    }

    /// The address a node is identified by, if it has one.
    #[must_use]
    pub fn address_of(&self, node: &NodeRef) -> Option<String> {
        match self {
            Document::Graph(g) => g.address_of(node),
            Document::Markup(m) => m.address_of(node),
            Document::Object(o) => o.address_of(node),
        }
    }

    fn node_with_address(&self, address: &str) -> Option<NodeRef> {
        match self {
            Document::Graph(g) => g.subject_with_address(address),
            Document::Markup(m) => m.element_with_address(address),
            Document::Object(o) => o.node_with_address(address),
        }
    }

    /// Values of the property `property_iri` on `node`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Malformed`] when a value cannot be read.
    pub fn children(&self, node: &NodeRef, property_iri: &str) -> Result<Vec<Entry>, LookupError> {
        match self {
            Document::Graph(g) => Ok(g.objects(node, property_iri)),
            Document::Markup(m) => m.children(node, property_iri),
            Document::Object(o) => o.children(node, property_iri),
        }
    }

    /// Instance addresses a query response lists, deduplicated in order.
    #[must_use]
    pub fn member_addresses(&self, type_iri: &str) -> Vec<String> {
        let raw = match self {
            Document::Graph(g) => g.member_addresses(type_iri),
            Document::Markup(m) => m.member_addresses(type_iri),
            Document::Object(o) => o.member_addresses(type_iri),
        };
        dedup(raw)
    }
}

/// Removes repeated entries, keeping the first occurrence.
pub(crate) fn dedup(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values.into_iter().filter(|v| seen.insert(v.clone())).collect()
}

/// Resolves a possibly relative reference against `base`.
pub(crate) fn resolve(base: &str, reference: &str) -> String {
    match reqwest::Url::parse(base).and_then(|b| b.join(reference)) {
        Ok(url) => url.to_string(),
        Err(_) => reference.to_string(),
    }
}

/// Expands a prefix-qualified name against a domain's prefix table.
///
/// # Errors
///
/// Returns [`LookupError::InvalidName`] for names without a prefix or local
/// part and [`LookupError::UnknownPrefix`] for undeclared prefixes.
pub fn expand_name(domain: &DomainModule, qualified: &str) -> Result<String, LookupError> {
    match qualified.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => domain
            .expand(qualified)
            .ok_or_else(|| LookupError::UnknownPrefix(qualified.to_string())),
        _ => Err(LookupError::InvalidName(qualified.to_string())),
    }
}

/// A document bound to the node of the resource under test.
#[derive(Debug)]
pub struct ParsedRepresentation {
    document: Document,
    node: NodeRef,
    domain: &'static DomainModule,
    address: String,
}

impl ParsedRepresentation {
    /// Binds `document` to the node describing `address` as a `resource`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::ResourceNotFound`] if no node qualifies.
    pub fn bind(
        document: Document,
        address: &str,
        resource: &ResourceType,
        domain: &'static DomainModule,
    ) -> Result<Self, ParseError> {
        let not_found = || ParseError::ResourceNotFound {
            url: address.to_string(),
            type_name: resource.type_name.to_string(),
        };
        let type_iri = domain.expand(resource.type_name).ok_or_else(not_found)?;
        let node = document.bind(address, &type_iri).ok_or_else(not_found)?;
        Ok(Self {
            document,
            node,
            domain,
            address: address.to_string(),
        })
    }

    /// Address the representation was fetched from.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The underlying document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// The bound node.
    #[must_use]
    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    /// Domain whose prefix table resolves lookups.
    #[must_use]
    pub fn domain(&self) -> &'static DomainModule {
        self.domain
    }
}

impl PropertyLookup for ParsedRepresentation {
    fn lookup(&self, property: &str) -> Result<Vec<PropertyValue>, LookupError> {
        let iri = expand_name(self.domain, property)?;
        Ok(self
            .document
            .children(&self.node, &iri)?
            .into_iter()
            .map(|entry| entry.value)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oslc_spec::{DomainId, Vocabulary};

    fn qm() -> &'static DomainModule {
        match Vocabulary::full().domain(DomainId::QualityManagement) {
            Some(d) => d,
            None => panic!("qm domain missing"),
        }
    }

    const TEST_CASE_RDF: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dcterms="http://purl.org/dc/terms/"
         xmlns:oslc="http://open-services.net/ns/core#"
         xmlns:oslc_qm="http://open-services.net/ns/qm#">
  <oslc_qm:TestCase rdf:about="http://host/tc/1">
    <dcterms:title>Login works</dcterms:title>
    <dcterms:identifier>1</dcterms:identifier>
    <dcterms:creator rdf:resource="http://host/users/a"/>
    <dcterms:creator rdf:resource="http://host/users/b"/>
    <oslc_qm:usesTestScript>
      <oslc_qm:TestScript rdf:about="http://host/ts/9">
        <dcterms:title>Script</dcterms:title>
      </oslc_qm:TestScript>
    </oslc_qm:usesTestScript>
    <oslc_qm:relatedChangeRequest rdf:parseType="Resource">
      <dcterms:title>link</dcterms:title>
    </oslc_qm:relatedChangeRequest>
  </oslc_qm:TestCase>
</rdf:RDF>"#;

    fn bound(syntax: Syntax) -> ParsedRepresentation {
        let document = Document::parse(TEST_CASE_RDF.as_bytes(), syntax, "http://host/tc/1", qm());
        let Ok(document) = document else {
            panic!("parse failed: {document:?}");
        };
        let Some(resource) = qm().resource("TestCase") else {
            panic!("TestCase missing");
        };
        match ParsedRepresentation::bind(document, "http://host/tc/1", resource, qm()) {
            Ok(parsed) => parsed,
            Err(err) => panic!("bind failed: {err}"),
        }
    }

    #[test]
    fn rdf_xml_reads_the_same_through_graph_and_markup() {
        let graph = bound(Syntax::RdfXml);
        let markup = bound(Syntax::Xml);
        for property in [
            "dcterms:title",
            "dcterms:identifier",
            "dcterms:creator",
            "oslc_qm:usesTestScript",
            "oslc_qm:relatedChangeRequest",
            "oslc_qm:testsChangeRequest",
        ] {
            assert_eq!(
                graph.lookup(property),
                markup.lookup(property),
                "mismatch on {property}"
            );
        }
        assert_eq!(
            graph.lookup("dcterms:creator"),
            Ok(vec![
                PropertyValue::Resource("http://host/users/a".to_string()),
                PropertyValue::Resource("http://host/users/b".to_string()),
            ])
        );
        assert_eq!(
            graph.lookup("oslc_qm:relatedChangeRequest"),
            Ok(vec![PropertyValue::Node])
        );
    }

    const STRIPED_RDF: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dcterms="http://purl.org/dc/terms/"
         xmlns:oslc_qm="http://open-services.net/ns/qm#">
  <oslc_qm:TestCase rdf:about="http://host/tc/1" dcterms:identifier="1">
    <dcterms:title rdf:parseType="Literal">Login works</dcterms:title>
    <dcterms:description>
      Signs in with a valid account.
    </dcterms:description>
  </oslc_qm:TestCase>
  <rdf:Description rdf:about="http://host/tc/1">
    <dcterms:subject>auth</dcterms:subject>
    <dcterms:subject>smoke</dcterms:subject>
  </rdf:Description>
</rdf:RDF>"#;

    #[test]
    fn striped_variants_read_the_same_through_graph_and_markup() {
        let Some(resource) = qm().resource("TestCase") else {
            panic!("TestCase missing");
        };
        let read = |syntax| {
            let document =
                Document::parse(STRIPED_RDF.as_bytes(), syntax, "http://host/tc/1", qm());
            let Ok(document) = document else {
                panic!("parse failed: {document:?}");
            };
            match ParsedRepresentation::bind(document, "http://host/tc/1", resource, qm()) {
                Ok(parsed) => parsed,
                Err(err) => panic!("bind failed: {err}"),
            }
        };
        let graph = read(Syntax::RdfXml);
        let markup = read(Syntax::Xml);
        for property in [
            "dcterms:identifier",
            "dcterms:title",
            "dcterms:description",
            "dcterms:subject",
        ] {
            assert_eq!(
                graph.lookup(property),
                markup.lookup(property),
                "mismatch on {property}"
            );
        }
        assert_eq!(
            markup.lookup("dcterms:identifier"),
            Ok(vec![PropertyValue::Literal("1".to_string())])
        );
        assert_eq!(markup.lookup("dcterms:subject").map(|v| v.len()), Ok(2));
    }

    #[test]
    fn lookup_rejects_bad_names() {
        let graph = bound(Syntax::RdfXml);
        assert_eq!(
            graph.lookup("title"),
            Err(LookupError::InvalidName("title".to_string()))
        );
        assert_eq!(
            graph.lookup("nope:title"),
            Err(LookupError::UnknownPrefix("nope:title".to_string()))
        );
    }

    #[test]
    fn content_type_selects_adapter() {
        let cases = [
            (Some("application/rdf+xml; charset=utf-8"), Some(Syntax::RdfXml)),
            (Some("text/turtle"), Some(Syntax::Turtle)),
            (Some("application/xml"), Some(Syntax::Xml)),
            (
                Some("application/x-oslc-cm-change-request+xml"),
                Some(Syntax::Xml),
            ),
            (Some("application/json"), Some(Syntax::Json)),
            (Some("text/html"), None),
            (None, Some(Syntax::Json)),
        ];
        for (content_type, expected) in cases {
            assert_eq!(
                Syntax::from_content_type(content_type, Format::Json),
                expected,
                "{content_type:?}"
            );
        }
    }

    #[test]
    fn binding_falls_back_to_the_single_typed_node() {
        let document = Document::parse(TEST_CASE_RDF.as_bytes(), Syntax::RdfXml, "http://host/x", qm());
        let Ok(document) = document else {
            panic!("parse failed");
        };
        let Some(resource) = qm().resource("TestCase") else {
            panic!("TestCase missing");
        };
        let parsed = ParsedRepresentation::bind(document, "http://elsewhere/tc", resource, qm());
        let Ok(parsed) = parsed else {
            panic!("single typed node not bound");
        };
        assert_eq!(parsed.address(), "http://elsewhere/tc");
        assert_eq!(
            parsed.document().address_of(parsed.node()).as_deref(),
            Some("http://host/tc/1")
        );

        let document = Document::parse(TEST_CASE_RDF.as_bytes(), Syntax::RdfXml, "http://host/x", qm());
        let Ok(document) = document else {
            panic!("parse failed");
        };
        let Some(plan) = qm().resource("TestPlan") else {
            panic!("TestPlan missing");
        };
        let missing = ParsedRepresentation::bind(document, "http://elsewhere/tp", plan, qm());
        assert!(matches!(
            missing,
            Err(ParseError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn relative_references_resolve_against_base() {
        assert_eq!(resolve("http://host/a/b", "c"), "http://host/a/c");
        assert_eq!(resolve("not a url", "c"), "c");
    }
}
