//! JSON adapter.
//!
//! Keys are prefix-qualified names (`"dcterms:title"`), expanded against the
//! payload's own `prefixes` object first and the domain's prefix table
//! second. Nodes are addressed by JSON pointer; every object's pointer,
//! address and types are indexed once at parse time.

use std::collections::HashMap;

use serde_json::{Map, Value};

use oslc_spec::model::iris::{OSLC, OSLC_CM_V1, RDFS_MEMBER, RDF_TYPE};
use oslc_spec::DomainModule;

use super::{resolve, Entry, NodeRef, PropertyValue};
use crate::error::LookupError;

const RDF_ABOUT: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#about";
const RDF_RESOURCE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#resource";

#[derive(Debug)]
struct Indexed {
    pointer: String,
    about: Option<String>,
    types: Vec<String>,
}

/// A parsed JSON payload.
#[derive(Debug)]
pub struct Object {
    root: Value,
    prefixes: Vec<(String, String)>,
    base: String,
    domain: &'static DomainModule,
    /// Every object in document order, parents before children.
    index: Vec<Indexed>,
    /// First indexed object per address.
    by_address: HashMap<String, usize>,
}

fn pointer_push(pointer: &str, token: &str) -> String {
    format!("{pointer}/{}", token.replace('~', "~0").replace('/', "~1"))
}

impl Object {
    /// Parses a JSON payload.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` diagnostic as text.
    pub fn parse(
        bytes: &[u8],
        base: &str,
        domain: &'static DomainModule,
    ) -> Result<Self, String> {
        let root: Value = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
        let prefixes = root
            .get("prefixes")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(k, v)| v.as_str().map(|iri| (k.clone(), iri.to_string())))
                    .collect()
            })
            .unwrap_or_default();
        let mut object = Self {
            root,
            prefixes,
            base: base.to_string(),
            domain,
            index: Vec::new(),
            by_address: HashMap::new(),
        };
        let index: Vec<Indexed> = object
            .nodes()
            .into_iter()
            .map(|(pointer, map)| Indexed {
                about: object.about(map),
                types: object.types(map),
                pointer,
            })
            .collect();
        for (i, node) in index.iter().enumerate() {
            if let Some(about) = &node.about {
                object.by_address.entry(about.clone()).or_insert(i);
            }
        }
        object.index = index;
        Ok(object)
    }

    /// Expands a key or a `prefix:local` value to a full IRI.
    fn expand(&self, name: &str) -> Option<String> {
        if name.starts_with("http://") || name.starts_with("https://") || name.starts_with("urn:") {
            return Some(name.to_string());
        }
        let (prefix, local) = name.split_once(':')?;
        if local.is_empty() {
            return None;
        }
        self.prefixes
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, iri)| iri.as_str())
            .or_else(|| self.domain.namespace(prefix))
            .map(|iri| format!("{iri}{local}"))
    }

    fn entries<'a>(
        &'a self,
        map: &'a Map<String, Value>,
        iri: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Value)> + 'a {
        map.iter()
            .filter(move |(key, _)| self.expand(key).as_deref() == Some(iri))
    }

    fn about(&self, map: &Map<String, Value>) -> Option<String> {
        self.entries(map, RDF_ABOUT)
            .find_map(|(_, v)| v.as_str())
            .map(|about| resolve(&self.base, about))
    }

    fn types(&self, map: &Map<String, Value>) -> Vec<String> {
        let mut types = Vec::new();
        for (_, value) in self.entries(map, RDF_TYPE) {
            let items: Vec<&Value> = match value {
                Value::Array(items) => items.iter().collect(),
                other => vec![other],
            };
            for item in items {
                let name = match item {
                    Value::String(s) => Some(s.as_str()),
                    Value::Object(m) => self.entries(m, RDF_RESOURCE).find_map(|(_, v)| v.as_str()),
                    _ => None,
                };
                if let Some(iri) = name.and_then(|n| self.expand(n)) {
                    types.push(iri);
                }
            }
        }
        types
    }

    /// Every object in the tree with its pointer, parents before children.
    fn nodes(&self) -> Vec<(String, &Map<String, Value>)> {
        let mut out = Vec::new();
        let mut pending: Vec<(String, &Value)> = vec![(String::new(), &self.root)];
        while let Some((pointer, value)) = pending.pop() {
            match value {
                Value::Object(map) => {
                    for (key, child) in map.iter().rev() {
                        pending.push((pointer_push(&pointer, key), child));
                    }
                    out.push((pointer, map));
                }
                Value::Array(items) => {
                    for (i, child) in items.iter().enumerate().rev() {
                        pending.push((pointer_push(&pointer, &i.to_string()), child));
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn map_at<'a>(&'a self, node: &'a NodeRef) -> Option<(&'a str, &'a Map<String, Value>)> {
        match node {
            NodeRef::Pointer(pointer) => self
                .root
                .pointer(pointer)
                .and_then(Value::as_object)
                .map(|map| (pointer.as_str(), map)),
            _ => None,
        }
    }

    pub(super) fn nodes_of_type(&self, type_iri: &str) -> Vec<NodeRef> {
        self.index
            .iter()
            .filter(|node| node.types.iter().any(|t| t == type_iri))
            .map(|node| NodeRef::Pointer(node.pointer.clone()))
            .collect()
    }

    pub(super) fn node_with_address(&self, address: &str) -> Option<NodeRef> {
        self.by_address
            .get(address)
            .and_then(|&i| self.index.get(i))
            .map(|node| NodeRef::Pointer(node.pointer.clone()))
    }

    pub(super) fn address_of(&self, node: &NodeRef) -> Option<String> {
        let NodeRef::Pointer(pointer) = node else {
            return None;
        };
        self.index
            .iter()
            .find(|indexed| &indexed.pointer == pointer)
            .and_then(|indexed| indexed.about.clone())
    }

    pub(super) fn children(
        &self,
        node: &NodeRef,
        property_iri: &str,
    ) -> Result<Vec<Entry>, LookupError> {
        let Some((pointer, map)) = self.map_at(node) else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for (key, value) in self.entries(map, property_iri) {
            let at = pointer_push(pointer, key);
            match value {
                Value::Null => {}
                Value::Array(items) => {
                    for (i, item) in items.iter().enumerate() {
                        if item.is_array() {
                            return Err(LookupError::Malformed {
                                property: key.clone(),
                                reason: "nested array".to_string(),
                            });
                        }
                        if !item.is_null() {
                            out.push(self.single(key, item, pointer_push(&at, &i.to_string()))?);
                        }
                    }
                }
                other => out.push(self.single(key, other, at)?),
            }
        }
        Ok(out)
    }

    fn single(&self, key: &str, value: &Value, pointer: String) -> Result<Entry, LookupError> {
        Ok(match value {
            Value::Object(map) => {
                if let Some((_, reference)) = self.entries(map, RDF_RESOURCE).next() {
                    let Some(reference) = reference.as_str() else {
                        return Err(LookupError::Malformed {
                            property: key.to_string(),
                            reason: "rdf:resource is not a string".to_string(),
                        });
                    };
                    let address = resolve(&self.base, reference);
                    Entry {
                        node: self.node_with_address(&address),
                        value: PropertyValue::Resource(address),
                    }
                } else if let Some(address) = self.about(map) {
                    Entry {
                        value: PropertyValue::Resource(address),
                        node: Some(NodeRef::Pointer(pointer)),
                    }
                } else {
                    Entry {
                        value: PropertyValue::Node,
                        node: Some(NodeRef::Pointer(pointer)),
                    }
                }
            }
            Value::String(s) => Entry {
                value: PropertyValue::Literal(s.clone()),
                node: None,
            },
            other => Entry {
                value: PropertyValue::Literal(other.to_string()),
                node: None,
            },
        })
    }

    pub(super) fn member_addresses(&self, type_iri: &str) -> Vec<String> {
        let containers = [
            format!("{OSLC}results"),
            format!("{OSLC_CM_V1}results"),
            RDFS_MEMBER.to_string(),
        ];
        let mut out = Vec::new();
        if let Value::Object(root) = &self.root {
            for (key, value) in root {
                let Some(iri) = self.expand(key) else {
                    continue;
                };
                if !containers.contains(&iri) {
                    continue;
                }
                let items: Vec<&Value> = match value {
                    Value::Array(items) => items.iter().collect(),
                    other => vec![other],
                };
                for item in items {
                    let address = match item {
                        Value::String(s) => Some(resolve(&self.base, s)),
                        Value::Object(map) => self.about(map).or_else(|| {
                            self.entries(map, RDF_RESOURCE)
                                .find_map(|(_, v)| v.as_str())
                                .map(|r| resolve(&self.base, r))
                        }),
                        _ => None,
                    };
                    out.extend(address);
                }
            }
        }
        out.extend(
            self.nodes_of_type(type_iri)
                .iter()
                .filter_map(|node| self.address_of(node)),
        );
        out
    }
}
