//! Core vocabulary model types.
//!
//! These types describe the OSLC domain specifications as typed Rust data:
//! namespace prefix tables, resource types with their property cardinality
//! constraints, and the discovery profile used to walk a provider catalog.
//! The top-level entry point is [`Vocabulary::full()`](crate::Vocabulary::full).

#[cfg(feature = "serde")]
use serde::Serialize;

/// Generation of the OSLC specifications a domain module belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum SpecVersion {
    /// OSLC 1.0 (legacy change management).
    V1,
    /// OSLC 2.0 core and domains.
    V2,
}

impl SpecVersion {
    /// Returns the short label used in group names (`"v1"`, `"v2"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SpecVersion::V1 => "v1",
            SpecVersion::V2 => "v2",
        }
    }

    /// Value of the `OSLC-Core-Version` request header, if the version sends one.
    #[must_use]
    pub fn core_version_header(self) -> Option<&'static str> {
        match self {
            SpecVersion::V1 => None,
            SpecVersion::V2 => Some("2.0"),
        }
    }
}

/// Identifier of a domain module in the [`Vocabulary`](crate::Vocabulary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum DomainId {
    /// OSLC Core 2.0: catalogs, providers, query responses.
    Core,
    /// Change Management 2.0.
    ChangeManagement,
    /// Quality Management 2.0.
    QualityManagement,
    /// Requirements Management 2.0.
    RequirementsManagement,
    /// Asset Management 2.0.
    Asset,
    /// Automation 2.0.
    Automation,
    /// Performance Monitoring 2.0.
    PerformanceMonitoring,
    /// Change Management 1.0.
    LegacyChangeManagement,
}

/// Serialization format a test group requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Format {
    /// RDF/XML graph serialization.
    RdfXml,
    /// RDF/XML in abbreviated (typed-node) form; parsed as a graph.
    RdfXmlAbbrev,
    /// Plain XML element tree.
    Xml,
    /// JSON key/value payload.
    Json,
}

impl Format {
    /// Default media type sent in the `Accept` header.
    #[must_use]
    pub fn media_type(self) -> &'static str {
        match self {
            Format::RdfXml | Format::RdfXmlAbbrev => "application/rdf+xml",
            Format::Xml => "application/xml",
            Format::Json => "application/json",
        }
    }

    /// Short label used in group names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Format::RdfXml => "rdf+xml",
            Format::RdfXmlAbbrev => "rdf+xml-abbrev",
            Format::Xml => "xml",
            Format::Json => "json",
        }
    }
}

/// A namespace prefix binding (e.g. `oslc_qm` → `http://open-services.net/ns/qm#`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    /// Prefix used in qualified names.
    pub prefix: &'static str,
    /// Namespace IRI the prefix expands to.
    pub iri: &'static str,
}

/// A cardinality bound on one property of a resource type.
///
/// # Invariants
/// - `min <= max` whenever `max` is bounded.
/// - `max == None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PropertyConstraint {
    /// Prefix-qualified property name (e.g. `"dcterms:title"`).
    pub property: &'static str,
    /// Minimum number of values.
    pub min: u32,
    /// Maximum number of values, or `None` when unbounded.
    pub max: Option<u32>,
}

impl PropertyConstraint {
    /// `1..1`
    #[must_use]
    pub const fn exactly_one(property: &'static str) -> Self {
        Self { property, min: 1, max: Some(1) }
    }

    /// `0..1`
    #[must_use]
    pub const fn zero_or_one(property: &'static str) -> Self {
        Self { property, min: 0, max: Some(1) }
    }

    /// `0..*`
    #[must_use]
    pub const fn zero_or_many(property: &'static str) -> Self {
        Self { property, min: 0, max: None }
    }

    /// `1..*`
    #[must_use]
    pub const fn one_or_many(property: &'static str) -> Self {
        Self { property, min: 1, max: None }
    }

    /// Builds an arbitrary bound, rejecting `min > max`.
    #[must_use]
    pub const fn bounded(property: &'static str, min: u32, max: Option<u32>) -> Option<Self> {
        if let Some(max) = max {
            if min > max {
                return None;
            }
        }
        Some(Self { property, min, max })
    }

    /// Returns true if `count` values satisfy this bound.
    #[must_use]
    pub fn admits(&self, count: usize) -> bool {
        let count = u64::try_from(count).unwrap_or(u64::MAX);
        if count < u64::from(self.min) {
            return false;
        }
        match self.max {
            Some(max) => count <= u64::from(max),
            None => true,
        }
    }

    /// Renders the bound as `min..max` (`*` when unbounded).
    #[must_use]
    pub fn range_label(&self) -> String {
        match self.max {
            Some(max) => format!("{}..{}", self.min, max),
            None => format!("{}..*", self.min),
        }
    }

    /// Returns the OSLC `oslc:occurs` individual matching this bound, if any.
    #[must_use]
    pub fn occurs(&self) -> Option<&'static str> {
        match (self.min, self.max) {
            (1, Some(1)) => Some("Exactly-one"),
            (0, Some(1)) => Some("Zero-or-one"),
            (0, None) => Some("Zero-or-many"),
            (1, None) => Some("One-or-many"),
            _ => None,
        }
    }
}

/// A resource type and the constraints every conforming instance satisfies.
#[derive(Debug, Clone)]
pub struct ResourceType {
    /// Short name, also used for `useThis<Name>` overrides (e.g. `"TestCase"`).
    pub name: &'static str,
    /// Prefix-qualified RDF type (e.g. `"oslc_qm:TestCase"`).
    pub type_name: &'static str,
    /// Domain module that declares this type.
    pub domain: DomainId,
    /// Property constraints, in declaration order.
    pub constraints: &'static [PropertyConstraint],
    /// Media types that replace [`Format::media_type`] for this type.
    pub media_types: &'static [(Format, &'static str)],
}

impl ResourceType {
    /// Media type to request for this type in the given format.
    #[must_use]
    pub fn media_type(&self, format: Format) -> &'static str {
        self.media_types
            .iter()
            .find(|(f, _)| *f == format)
            .map_or_else(|| format.media_type(), |(_, media)| *media)
    }

    /// Looks up the constraint on a property, if declared.
    #[must_use]
    pub fn constraint(&self, property: &str) -> Option<&PropertyConstraint> {
        self.constraints.iter().find(|c| c.property == property)
    }
}

/// Property paths used to walk from a catalog to query and creation endpoints.
///
/// Every step is a prefix-qualified property name resolved against the owning
/// domain's prefix table.
#[derive(Debug, Clone)]
pub struct DiscoveryProfile {
    /// RDF type of the catalog document root.
    pub catalog_type: &'static str,
    /// RDF type of a service provider document root.
    pub provider_type: &'static str,
    /// Path from the catalog node to service provider references.
    pub provider_path: &'static [&'static str],
    /// Path from a provider node to query capability nodes.
    pub query_path: &'static [&'static str],
    /// Property on a query capability holding its URL.
    pub query_base: &'static str,
    /// Path from a provider node to creation factory nodes.
    pub creation_path: &'static [&'static str],
    /// Property on a creation factory holding its URL.
    pub creation_base: &'static str,
    /// Property on a capability declaring its resource type, if the version has one.
    pub resource_type: Option<&'static str>,
}

/// A complete domain module: prefix table, resource types, discovery profile.
#[derive(Debug, Clone)]
pub struct DomainModule {
    /// Domain identifier.
    pub id: DomainId,
    /// Human-readable label.
    pub label: &'static str,
    /// Specification generation.
    pub version: SpecVersion,
    /// Prefixes declared by this domain. They shadow [`iris::COMMON`].
    pub namespaces: &'static [Namespace],
    /// Resource types declared by this domain.
    pub resource_types: Vec<ResourceType>,
    /// How instances of this domain are discovered.
    pub discovery: &'static DiscoveryProfile,
}

impl DomainModule {
    /// Resolves a prefix against this domain's table, then the common table.
    #[must_use]
    pub fn namespace(&self, prefix: &str) -> Option<&'static str> {
        self.namespaces
            .iter()
            .chain(iris::COMMON.iter())
            .find(|ns| ns.prefix == prefix)
            .map(|ns| ns.iri)
    }

    /// Expands `prefix:local` to a full IRI. Returns `None` for unknown prefixes
    /// or names without a prefix.
    #[must_use]
    pub fn expand(&self, qualified: &str) -> Option<String> {
        let (prefix, local) = qualified.split_once(':')?;
        if local.is_empty() {
            return None;
        }
        self.namespace(prefix).map(|iri| format!("{iri}{local}"))
    }

    /// Looks up a resource type by short name.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&ResourceType> {
        self.resource_types.iter().find(|r| r.name == name)
    }
}

/// The complete OSLC vocabulary known to the conformance engine.
#[derive(Debug)]
pub struct Vocabulary {
    /// All domain modules in assembly order.
    pub domains: Vec<DomainModule>,
}

impl Vocabulary {
    /// Looks up a domain module by id.
    #[must_use]
    pub fn domain(&self, id: DomainId) -> Option<&DomainModule> {
        self.domains.iter().find(|d| d.id == id)
    }

    /// Looks up a resource type by domain and short name.
    #[must_use]
    pub fn resource(&self, id: DomainId, name: &str) -> Option<&ResourceType> {
        self.domain(id).and_then(|d| d.resource(name))
    }

    /// Returns the total number of resource types across all domains.
    #[must_use]
    pub fn resource_type_count(&self) -> usize {
        self.domains.iter().map(|d| d.resource_types.len()).sum()
    }

    /// Returns the total number of property constraints across all domains.
    #[must_use]
    pub fn constraint_count(&self) -> usize {
        self.domains
            .iter()
            .flat_map(|d| d.resource_types.iter())
            .map(|r| r.constraints.len())
            .sum()
    }
}

/// Standard IRI constants and the prefix table shared by every domain.
pub mod iris {
    use super::Namespace;

    /// RDF namespace.
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// RDFS namespace.
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    /// XSD namespace.
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
    /// Dublin Core terms.
    pub const DCTERMS: &str = "http://purl.org/dc/terms/";
    /// FOAF.
    pub const FOAF: &str = "http://xmlns.com/foaf/0.1/";

    /// OSLC Core 2.0.
    pub const OSLC: &str = "http://open-services.net/ns/core#";
    /// OSLC Change Management 2.0.
    pub const OSLC_CM: &str = "http://open-services.net/ns/cm#";
    /// OSLC Quality Management 2.0.
    pub const OSLC_QM: &str = "http://open-services.net/ns/qm#";
    /// OSLC Requirements Management 2.0.
    pub const OSLC_RM: &str = "http://open-services.net/ns/rm#";
    /// OSLC Asset Management 2.0.
    pub const OSLC_ASSET: &str = "http://open-services.net/ns/asset#";
    /// OSLC Automation 2.0.
    pub const OSLC_AUTO: &str = "http://open-services.net/ns/auto#";
    /// OSLC Performance Monitoring 2.0.
    pub const OSLC_PM: &str = "http://open-services.net/ns/perfmon#";

    /// OSLC CM 1.0.
    pub const OSLC_CM_V1: &str = "http://open-services.net/xmlns/cm/1.0/";
    /// OSLC discovery 1.0.
    pub const OSLC_DISC_V1: &str = "http://open-services.net/xmlns/discovery/1.0/";

    /// `rdf:type`.
    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    /// `rdfs:member`.
    pub const RDFS_MEMBER: &str = "http://www.w3.org/2000/01/rdf-schema#member";

    /// Prefixes every domain resolves.
    pub const COMMON: &[Namespace] = &[
        Namespace { prefix: "rdf", iri: RDF },
        Namespace { prefix: "rdfs", iri: RDFS },
        Namespace { prefix: "xsd", iri: XSD },
        Namespace { prefix: "dcterms", iri: DCTERMS },
        Namespace { prefix: "foaf", iri: FOAF },
        Namespace { prefix: "oslc", iri: OSLC },
    ];
}
