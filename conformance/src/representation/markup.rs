//! Plain XML adapter.
//!
//! The payload is read with `quick-xml`'s namespace-aware reader into an
//! element arena. Element and attribute names are stored fully expanded
//! (`namespace IRI + local name`), so prefix choices in the payload do not
//! matter.
//!
//! RDF/XML read this way yields the same values as the graph adapter for
//! the striped forms providers emit: property attributes on node elements,
//! `rdf:parseType="Literal"` content, and several node elements describing
//! the same subject.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use oslc_spec::model::iris::{RDFS_MEMBER, RDF_TYPE};

use super::{resolve, Entry, NodeRef, PropertyValue};
use crate::error::LookupError;

const RDF_ABOUT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#about";
const RDF_RESOURCE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#resource";
const RDF_PARSE_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#parseType";
const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Attributes that state a property of the subject rather than RDF/XML
/// syntax. Unqualified names are not properties.
fn is_property_attribute(name: &str) -> bool {
    name == RDF_TYPE
        || (name.contains(':') && !name.starts_with(RDF_NS) && !name.starts_with(XML_NS))
}

#[derive(Debug)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<usize>,
    text: String,
}

impl Element {
    fn is_xml_literal(&self) -> bool {
        self.attributes
            .iter()
            .any(|(name, value)| name == RDF_PARSE_TYPE && value == "Literal")
    }
}

/// A namespace-resolved element tree.
#[derive(Debug)]
pub struct Markup {
    elements: Vec<Element>,
    base: String,
    /// Elements carrying each resolved `rdf:about`, in document order.
    by_address: HashMap<String, Vec<usize>>,
}

fn namespace_of(resolved: &ResolveResult<'_>) -> String {
    match resolved {
        ResolveResult::Bound(ns) => String::from_utf8_lossy(ns.as_ref()).into_owned(),
        _ => String::new(),
    }
}

fn open(
    reader: &NsReader<&[u8]>,
    namespace: &str,
    start: &BytesStart<'_>,
) -> Result<Element, String> {
    let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let (resolved, attr_local) = reader.resolve_attribute(attr.key);
        let name = format!(
            "{}{}",
            namespace_of(&resolved),
            String::from_utf8_lossy(attr_local.as_ref())
        );
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        attributes.push((name, value.into_owned()));
    }
    Ok(Element {
        name: format!("{namespace}{local}"),
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

impl Markup {
    /// Parses an XML payload.
    ///
    /// # Errors
    ///
    /// Returns the reader diagnostic as text, or a message for truncated
    /// documents and documents without a root element.
    pub fn parse(bytes: &[u8], base: &str) -> Result<Self, String> {
        let mut reader = NsReader::from_reader(bytes);
        let mut elements: Vec<Element> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();

        loop {
            let (namespace, event) = {
                let (resolved, event) = reader.read_resolved_event().map_err(|e| e.to_string())?;
                (namespace_of(&resolved), event)
            };
            match event {
                Event::Start(start) => {
                    let element = open(&reader, &namespace, &start)?;
                    let xml_literal = element.is_xml_literal();
                    let index = Self::attach(&mut elements, &stack, element);
                    if xml_literal {
                        let inner = reader.read_text(start.name()).map_err(|e| e.to_string())?;
                        elements[index].text = inner.into_owned();
                    } else {
                        stack.push(index);
                    }
                }
                Event::Empty(start) => {
                    let element = open(&reader, &namespace, &start)?;
                    Self::attach(&mut elements, &stack, element);
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(text) => {
                    if let Some(&top) = stack.last() {
                        let text = text.unescape().map_err(|e| e.to_string())?;
                        elements[top].text.push_str(&text);
                    }
                }
                Event::CData(data) => {
                    if let Some(&top) = stack.last() {
                        elements[top]
                            .text
                            .push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err("unexpected end of document".to_string());
        }
        if elements.is_empty() {
            return Err("no root element".to_string());
        }
        let mut markup = Self {
            elements,
            base: base.to_string(),
            by_address: HashMap::new(),
        };
        for index in 0..markup.elements.len() {
            if let Some(address) = markup.about(index) {
                markup.by_address.entry(address).or_default().push(index);
            }
        }
        Ok(markup)
    }

    fn attach(elements: &mut Vec<Element>, stack: &[usize], element: Element) -> usize {
        let index = elements.len();
        elements.push(element);
        if let Some(&parent) = stack.last() {
            elements[parent].children.push(index);
        }
        index
    }

    /// Number of elements in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always false: a parsed tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn attribute(&self, index: usize, name: &str) -> Option<&str> {
        self.elements
            .get(index)?
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn about(&self, index: usize) -> Option<String> {
        self.attribute(index, RDF_ABOUT)
            .map(|about| resolve(&self.base, about))
    }

    /// Every element describing the same subject as `index`, in document
    /// order. Empty for elements without `rdf:about`.
    fn aliases(&self, index: usize) -> &[usize] {
        self.about(index)
            .and_then(|address| self.by_address.get(&address))
            .map_or(&[][..], Vec::as_slice)
    }

    fn declares_type(&self, index: usize, type_iri: &str) -> bool {
        let Some(element) = self.elements.get(index) else {
            return false;
        };
        element.name == type_iri
            || self
                .attribute(index, RDF_TYPE)
                .is_some_and(|t| resolve(&self.base, t) == type_iri)
            || element.children.iter().any(|&child| {
                self.elements[child].name == RDF_TYPE
                    && self.attribute(child, RDF_RESOURCE) == Some(type_iri)
            })
    }

    fn is_typed(&self, index: usize, type_iri: &str) -> bool {
        self.declares_type(index, type_iri)
            || self
                .aliases(index)
                .iter()
                .any(|&alias| alias != index && self.declares_type(alias, type_iri))
    }

    /// Typed node elements, one per subject.
    pub(super) fn elements_of_type(&self, type_iri: &str) -> Vec<NodeRef> {
        (0..self.elements.len())
            .filter(|&i| self.aliases(i).first().map_or(true, |&first| first == i))
            .filter(|&i| self.is_typed(i, type_iri))
            .map(NodeRef::Element)
            .collect()
    }

    pub(super) fn element_with_address(&self, address: &str) -> Option<NodeRef> {
        self.by_address
            .get(address)
            .and_then(|all| all.first())
            .map(|&i| NodeRef::Element(i))
    }

    pub(super) fn address_of(&self, node: &NodeRef) -> Option<String> {
        match node {
            NodeRef::Element(index) => self.about(*index),
            _ => None,
        }
    }

    pub(super) fn children(
        &self,
        node: &NodeRef,
        property_iri: &str,
    ) -> Result<Vec<Entry>, LookupError> {
        let NodeRef::Element(index) = node else {
            return Ok(Vec::new());
        };
        if *index >= self.elements.len() {
            return Ok(Vec::new());
        }
        let own = [*index];
        let aliases = match self.aliases(*index) {
            [] => &own[..],
            all => all,
        };
        let mut entries = Vec::new();
        for &alias in aliases {
            let element = &self.elements[alias];
            for (name, value) in &element.attributes {
                if name != property_iri || !is_property_attribute(name) {
                    continue;
                }
                let value = if name == RDF_TYPE {
                    PropertyValue::Resource(resolve(&self.base, value))
                } else {
                    PropertyValue::Literal(value.clone())
                };
                entries.push(Entry { value, node: None });
            }
            for &child in &element.children {
                if self.elements[child].name == property_iri {
                    entries.push(self.value(child)?);
                }
            }
        }
        Ok(entries)
    }

    /// Reads the value of one property element.
    fn value(&self, index: usize) -> Result<Entry, LookupError> {
        let element = &self.elements[index];
        if let Some(reference) = self.attribute(index, RDF_RESOURCE) {
            if !element.children.is_empty() {
                return Err(LookupError::Malformed {
                    property: element.name.clone(),
                    reason: "rdf:resource on an element with nested elements".to_string(),
                });
            }
            let address = resolve(&self.base, reference);
            return Ok(Entry {
                node: self.element_with_address(&address),
                value: PropertyValue::Resource(address),
            });
        }
        if element.is_xml_literal() {
            return Ok(Entry {
                value: PropertyValue::Literal(element.text.clone()),
                node: None,
            });
        }
        if self.attribute(index, RDF_PARSE_TYPE) == Some("Resource") {
            return Ok(Entry {
                value: PropertyValue::Node,
                node: Some(NodeRef::Element(index)),
            });
        }
        Ok(match element.children.as_slice() {
            [] => Entry {
                value: PropertyValue::Literal(element.text.clone()),
                node: None,
            },
            [only] => match self.about(*only) {
                Some(address) => Entry {
                    value: PropertyValue::Resource(address),
                    node: Some(NodeRef::Element(*only)),
                },
                None => Entry {
                    value: PropertyValue::Node,
                    node: Some(NodeRef::Element(*only)),
                },
            },
            _ => Entry {
                value: PropertyValue::Node,
                node: Some(NodeRef::Element(index)),
            },
        })
    }

    pub(super) fn member_addresses(&self, type_iri: &str) -> Vec<String> {
        let members = (0..self.elements.len())
            .filter(|&i| self.elements[i].name == RDFS_MEMBER)
            .filter_map(|i| self.value(i).ok())
            .filter_map(|entry| match entry.value {
                PropertyValue::Resource(address) => Some(address),
                _ => None,
            });
        let typed = self
            .elements_of_type(type_iri)
            .into_iter()
            .filter_map(|node| self.address_of(&node));
        members.chain(typed).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DISC: &str = "http://open-services.net/xmlns/discovery/1.0/";

    const CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<oslc_disc:ServiceProviderCatalog
    xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
    xmlns:dc="http://purl.org/dc/terms/"
    xmlns:oslc_disc="http://open-services.net/xmlns/discovery/1.0/"
    rdf:about="http://host/catalog">
  <dc:title>Projects &amp; more</dc:title>
  <oslc_disc:entry>
    <oslc_disc:ServiceProvider>
      <dc:title>Alpha</dc:title>
      <oslc_disc:services rdf:resource="/alpha/services.xml"/>
    </oslc_disc:ServiceProvider>
  </oslc_disc:entry>
  <oslc_disc:entry>
    <oslc_disc:ServiceProvider>
      <dc:title>Beta</dc:title>
      <oslc_disc:services rdf:resource="http://host/beta/services.xml"/>
    </oslc_disc:ServiceProvider>
  </oslc_disc:entry>
</oslc_disc:ServiceProviderCatalog>"#;

    fn catalog() -> Markup {
        match Markup::parse(CATALOG.as_bytes(), "http://host/catalog") {
            Ok(m) => m,
            Err(e) => panic!("catalog rejected: {e}"),
        }
    }

    #[test]
    fn walks_striped_entries() {
        let markup = catalog();
        let roots = markup.elements_of_type(&format!("{DISC}ServiceProviderCatalog"));
        assert_eq!(roots, vec![NodeRef::Element(0)]);
        assert_eq!(
            markup.address_of(&roots[0]).as_deref(),
            Some("http://host/catalog")
        );

        let Ok(entries) = markup.children(&roots[0], &format!("{DISC}entry")) else {
            panic!("entries unreadable");
        };
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.value == PropertyValue::Node));

        let services: Vec<String> = entries
            .iter()
            .filter_map(|e| e.node.as_ref())
            .filter_map(|n| markup.children(n, &format!("{DISC}services")).ok())
            .flatten()
            .filter_map(|e| e.address().map(str::to_string))
            .collect();
        assert_eq!(
            services,
            vec![
                "http://host/alpha/services.xml".to_string(),
                "http://host/beta/services.xml".to_string(),
            ]
        );
    }

    #[test]
    fn text_is_unescaped() {
        let markup = catalog();
        let title = markup.children(&NodeRef::Element(0), "http://purl.org/dc/terms/title");
        assert_eq!(
            title.map(|v| v.into_iter().map(|e| e.value).collect::<Vec<_>>()),
            Ok(vec![PropertyValue::Literal("Projects & more".to_string())])
        );
    }

    const SPLIT: &str = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
             xmlns:dcterms="http://purl.org/dc/terms/"
             xmlns:oslc_qm="http://open-services.net/ns/qm#">
      <rdf:Description rdf:about="http://host/tc/1" dcterms:identifier="1" xml:lang="en">
        <dcterms:title rdf:parseType="Literal">Login <b>works</b></dcterms:title>
      </rdf:Description>
      <oslc_qm:TestCase rdf:about="http://host/tc/1">
        <dcterms:description>  padded  </dcterms:description>
        <dcterms:identifier>one</dcterms:identifier>
      </oslc_qm:TestCase>
    </rdf:RDF>"#;

    fn literals(markup: &Markup, node: &NodeRef, property: &str) -> Vec<PropertyValue> {
        match markup.children(node, &format!("http://purl.org/dc/terms/{property}")) {
            Ok(entries) => entries.into_iter().map(|e| e.value).collect(),
            Err(err) => panic!("{property} unreadable: {err}"),
        }
    }

    #[test]
    fn descriptions_of_one_subject_merge() {
        let Ok(markup) = Markup::parse(SPLIT.as_bytes(), "http://host/tc/1") else {
            panic!("xml rejected");
        };
        let typed = markup.elements_of_type("http://open-services.net/ns/qm#TestCase");
        assert_eq!(typed, vec![NodeRef::Element(1)]);
        assert_eq!(
            markup.element_with_address("http://host/tc/1"),
            Some(NodeRef::Element(1))
        );

        let node = &typed[0];
        assert_eq!(
            literals(&markup, node, "identifier"),
            vec![
                PropertyValue::Literal("1".to_string()),
                PropertyValue::Literal("one".to_string()),
            ]
        );
        assert_eq!(
            literals(&markup, node, "title"),
            vec![PropertyValue::Literal("Login <b>works</b>".to_string())]
        );
        assert_eq!(
            literals(&markup, node, "description"),
            vec![PropertyValue::Literal("  padded  ".to_string())]
        );
    }

    #[test]
    fn syntax_attributes_are_not_properties() {
        assert!(is_property_attribute("http://purl.org/dc/terms/identifier"));
        assert!(is_property_attribute(RDF_TYPE));
        assert!(!is_property_attribute(RDF_ABOUT));
        assert!(!is_property_attribute("http://www.w3.org/XML/1998/namespacelang"));
        assert!(!is_property_attribute("id"));
    }

    #[test]
    fn type_attribute_declares_the_type() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
          <rdf:Description rdf:about="http://host/tc/4"
              rdf:type="http://open-services.net/ns/qm#TestCase"/>
        </rdf:RDF>"#;
        let Ok(markup) = Markup::parse(xml.as_bytes(), "http://host/tc/4") else {
            panic!("xml rejected");
        };
        let typed = markup.elements_of_type("http://open-services.net/ns/qm#TestCase");
        assert_eq!(typed, vec![NodeRef::Element(1)]);
        assert_eq!(
            markup.children(&typed[0], RDF_TYPE).map(|v| v.len()),
            Ok(1)
        );
    }

    #[test]
    fn resource_with_children_is_malformed() {
        let xml = r#"<r xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#" xmlns:x="urn:x:">
            <x:p rdf:resource="urn:a"><x:q/></x:p>
        </r>"#;
        let Ok(markup) = Markup::parse(xml.as_bytes(), "urn:base") else {
            panic!("xml rejected");
        };
        assert!(matches!(
            markup.children(&NodeRef::Element(0), "urn:x:p"),
            Err(LookupError::Malformed { .. })
        ));
    }

    #[test]
    fn truncated_document_is_an_error() {
        assert!(Markup::parse(b"<a><b></b>", "urn:base").is_err());
        assert!(Markup::parse(b"", "urn:base").is_err());
    }

    #[test]
    fn members_come_from_references_and_typed_elements() {
        let xml = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                 xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#"
                 xmlns:qm="http://open-services.net/ns/qm#">
          <rdf:Description rdf:about="http://host/q">
            <rdfs:member rdf:resource="http://host/tc/1"/>
            <rdfs:member rdf:resource="http://host/tc/2"/>
          </rdf:Description>
          <qm:TestCase rdf:about="http://host/tc/2"/>
          <qm:TestCase rdf:about="http://host/tc/3"/>
        </rdf:RDF>"#;
        let Ok(markup) = Markup::parse(xml.as_bytes(), "http://host/q") else {
            panic!("xml rejected");
        };
        let members = super::super::dedup(
            markup.member_addresses("http://open-services.net/ns/qm#TestCase"),
        );
        assert_eq!(
            members,
            vec![
                "http://host/tc/1".to_string(),
                "http://host/tc/2".to_string(),
                "http://host/tc/3".to_string(),
            ]
        );
    }
}
