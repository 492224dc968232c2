//! Turtle 1.1 serializer for OSLC resource shapes.
//!
//! Produces one `oslc:ResourceShape` per resource type, with an
//! `oslc:property` blank node per constraint. Domains are written one after
//! another; each block redeclares its prefixes since CM 1.0 and CM 2.0 bind
//! `oslc_cm` differently.

use crate::model::{iris, DomainModule, PropertyConstraint, ResourceType, Vocabulary};

/// Base IRI of the generated shape resources.
pub const SHAPE_BASE: &str = "urn:oslc-conformance:shape/";

/// Serializes every domain of the vocabulary to a Turtle string.
#[must_use]
pub fn to_turtle(vocabulary: &Vocabulary) -> String {
    let mut out = String::with_capacity(32 * 1024);
    for domain in &vocabulary.domains {
        out.push_str(&domain_to_turtle(domain));
    }
    out
}

/// Serializes a single domain module to a self-contained Turtle document.
#[must_use]
pub fn domain_to_turtle(domain: &DomainModule) -> String {
    let mut out = String::with_capacity(8 * 1024);

    out.push_str(&format!("# {}\n", domain.label));
    for ns in iris::COMMON.iter().chain(domain.namespaces.iter()) {
        out.push_str(&format!("@prefix {}: <{}> .\n", ns.prefix, ns.iri));
    }
    out.push('\n');

    for resource in &domain.resource_types {
        out.push_str(&shape(domain, resource));
    }
    out
}

fn shape(domain: &DomainModule, resource: &ResourceType) -> String {
    let mut out = format!(
        "<{}{}/{}>\n  a oslc:ResourceShape ;\n  dcterms:title {} ;\n  oslc:describes {}",
        SHAPE_BASE,
        domain.version.as_str(),
        resource.name,
        turtle_string(resource.name),
        resource.type_name
    );
    for constraint in resource.constraints {
        out.push_str(" ;\n  oslc:property ");
        out.push_str(&property(constraint));
    }
    out.push_str(" .\n\n");
    out
}

fn property(constraint: &PropertyConstraint) -> String {
    let name = constraint
        .property
        .split_once(':')
        .map_or(constraint.property, |(_, local)| local);
    let occurs = match constraint.occurs() {
        Some(occurs) => format!("oslc:{occurs}"),
        // No standard individual; keep the bound readable.
        None => turtle_string(&constraint.range_label()),
    };
    format!(
        "[\n    a oslc:Property ;\n    oslc:name {} ;\n    oslc:propertyDefinition {} ;\n    oslc:occurs {}\n  ]",
        turtle_string(name),
        constraint.property,
        occurs
    )
}

fn turtle_string(s: &str) -> String {
    let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}
