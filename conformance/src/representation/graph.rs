//! RDF graph adapter (RDF/XML and Turtle).
//!
//! Triples are collected from the `sophia` parsers in parse order into a flat
//! table; lookups scan it by `(subject, predicate)`.

use sophia_api::prelude::Iri;
use sophia_api::parser::TripleParser;
use sophia_api::source::TripleSource;
use sophia_api::term::{Term, TermKind};
use sophia_api::triple::Triple;
use sophia_turtle::parser::turtle::TurtleParser;
use sophia_xml::parser::RdfXmlParser;

use oslc_spec::model::iris::{RDFS_MEMBER, RDF_TYPE};

use super::{Entry, NodeRef, PropertyValue, Syntax};

/// A node that can appear in subject position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    /// Named node.
    Iri(String),
    /// Blank node label, scoped to one document.
    Blank(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Object {
    Subject(Subject),
    Literal(String),
}

#[derive(Debug, Clone)]
struct Statement {
    subject: Subject,
    predicate: String,
    object: Object,
}

/// Triples of one payload, in parse order.
#[derive(Debug, Default)]
pub struct Graph {
    statements: Vec<Statement>,
    turtle: bool,
}

fn subject_of<T: Term>(term: T) -> Option<Subject> {
    match term.kind() {
        TermKind::Iri => term.iri().map(|iri| Subject::Iri(iri.as_str().to_string())),
        TermKind::BlankNode => term
            .bnode_id()
            .map(|id| Subject::Blank(id.as_str().to_string())),
        _ => None,
    }
}

fn object_of<T: Term>(term: T) -> Option<Object> {
    match term.kind() {
        TermKind::Literal => term
            .lexical_form()
            .map(|text| Object::Literal(text.to_string())),
        _ => subject_of(term).map(Object::Subject),
    }
}

fn statement<T: Triple>(triple: &T) -> Option<Statement> {
    Some(Statement {
        subject: subject_of(triple.s())?,
        predicate: triple.p().iri()?.as_str().to_string(),
        object: object_of(triple.o())?,
    })
}

fn collect<S: TripleSource>(mut source: S) -> Result<Vec<Statement>, String> {
    let mut statements = Vec::new();
    source
        .for_each_triple(|triple| {
            if let Some(st) = statement(&triple) {
                statements.push(st);
            }
        })
        .map_err(|e| e.to_string())?;
    Ok(statements)
}

impl Graph {
    /// Parses RDF/XML or Turtle.
    ///
    /// # Errors
    ///
    /// Returns the parser diagnostic as text.
    pub fn parse(bytes: &[u8], syntax: Syntax, base: &str) -> Result<Self, String> {
        let base = Iri::new(base.to_string()).ok();
        let statements = match syntax {
            Syntax::Turtle => collect(TurtleParser { base }.parse(bytes))?,
            _ => collect(RdfXmlParser { base }.parse(bytes))?,
        };
        Ok(Graph {
            statements,
            turtle: syntax == Syntax::Turtle,
        })
    }

    /// Syntax the triples were read from.
    #[must_use]
    pub fn syntax(&self) -> Syntax {
        if self.turtle {
            Syntax::Turtle
        } else {
            Syntax::RdfXml
        }
    }

    /// Number of triples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true if the payload held no triples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub(super) fn subjects_of_type(&self, type_iri: &str) -> Vec<NodeRef> {
        let mut seen = Vec::new();
        for st in &self.statements {
            if st.predicate == RDF_TYPE
                && st.object == Object::Subject(Subject::Iri(type_iri.to_string()))
                && !seen.contains(&st.subject)
            {
                seen.push(st.subject.clone());
            }
        }
        seen.into_iter().map(NodeRef::Subject).collect()
    }

    pub(super) fn subject_with_address(&self, address: &str) -> Option<NodeRef> {
        self.statements
            .iter()
            .find(|st| matches!(&st.subject, Subject::Iri(iri) if iri == address))
            .map(|st| NodeRef::Subject(st.subject.clone()))
    }

    pub(super) fn address_of(&self, node: &NodeRef) -> Option<String> {
        match node {
            NodeRef::Subject(Subject::Iri(iri)) => Some(iri.clone()),
            _ => None,
        }
    }

    pub(super) fn objects(&self, node: &NodeRef, predicate: &str) -> Vec<Entry> {
        let NodeRef::Subject(subject) = node else {
            return Vec::new();
        };
        self.statements
            .iter()
            .filter(|st| &st.subject == subject && st.predicate == predicate)
            .map(|st| match &st.object {
                Object::Literal(text) => Entry {
                    value: PropertyValue::Literal(text.clone()),
                    node: None,
                },
                Object::Subject(Subject::Iri(iri)) => Entry {
                    value: PropertyValue::Resource(iri.clone()),
                    node: self.subject_with_address(iri),
                },
                Object::Subject(blank) => Entry {
                    value: PropertyValue::Node,
                    node: Some(NodeRef::Subject(blank.clone())),
                },
            })
            .collect()
    }

    pub(super) fn member_addresses(&self, type_iri: &str) -> Vec<String> {
        let members = self.statements.iter().filter_map(|st| match &st.object {
            Object::Subject(Subject::Iri(iri)) if st.predicate == RDFS_MEMBER => Some(iri.clone()),
            _ => None,
        });
        let typed = self
            .subjects_of_type(type_iri)
            .into_iter()
            .filter_map(|node| self.address_of(&node));
        members.chain(typed).collect()
    }
}
