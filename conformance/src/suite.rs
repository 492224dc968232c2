//! Suite composition.
//!
//! A static rule table maps feature flags to an ordered list of
//! [`TestGroupSpec`]s. Rules are evaluated top-down within a version block;
//! the version-1 block runs before the version-2 block. A rule either emits
//! groups or appends the abbreviated RDF/XML variant of every RDF/XML group
//! emitted so far in its block.

use std::fmt;

use oslc_spec::{DomainId, DomainModule, Format, PropertyConstraint, ResourceType, SpecVersion, Vocabulary};
use tracing::warn;

use crate::config::{FeatureFlags, Flag, ProtocolDomain};

/// What an execution unit of a group does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Fetch an instance and check its properties.
    Resource,
    /// Run a query against a query capability and check the response info.
    Query,
    /// Post to a creation factory, then check the created resource.
    Creation,
}

impl GroupKind {
    fn label_prefix(self) -> &'static str {
        match self {
            GroupKind::Resource => "",
            GroupKind::Query => "query:",
            GroupKind::Creation => "creation:",
        }
    }
}

/// Where the locator finds the addresses a group is run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoveryPath {
    /// The catalog itself.
    Catalog,
    /// The service providers the catalog lists.
    ServiceProviders,
    /// Members of the query capabilities for the group's resource type.
    Instances,
    /// The query capability URLs for the group's resource type.
    QueryCapabilities,
    /// The creation factory URLs for the group's resource type.
    CreationFactories,
}

/// One resource type × format combination to test.
#[derive(Clone)]
pub struct TestGroupSpec {
    /// Specification generation.
    pub version: SpecVersion,
    /// Unit kind.
    pub kind: GroupKind,
    /// Domain owning the resource type; its prefix table resolves lookups.
    pub domain: &'static DomainModule,
    /// Resource type under test.
    pub resource_type: &'static ResourceType,
    /// Requested serialization.
    pub format: Format,
    /// How instances are discovered.
    pub discovery: DiscoveryPath,
    /// Constraints every instance is checked against.
    pub constraints: &'static [PropertyConstraint],
}

impl TestGroupSpec {
    /// Label used in verdicts, e.g. `v2/TestCase/rdf+xml`.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{}/{}{}/{}",
            self.version.as_str(),
            self.kind.label_prefix(),
            self.resource_type.name,
            self.format.as_str()
        )
    }

    fn key(&self) -> (SpecVersion, GroupKind, DomainId, &'static str, Format, DiscoveryPath) {
        (
            self.version,
            self.kind,
            self.domain.id,
            self.resource_type.name,
            self.format,
            self.discovery,
        )
    }
}

impl PartialEq for TestGroupSpec {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key() && self.constraints == other.constraints
    }
}

impl Eq for TestGroupSpec {}

impl fmt::Debug for TestGroupSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestGroupSpec")
            .field("label", &self.label())
            .field("discovery", &self.discovery)
            .field("constraints", &self.constraints.len())
            .finish()
    }
}

/// Condition under which a rule fires.
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// Always true.
    Always,
    /// The selected domain is one of these.
    Domain(&'static [ProtocolDomain]),
    /// The flag is set.
    Flag(Flag),
    /// Every sub-predicate holds.
    All(&'static [Predicate]),
}

impl Predicate {
    /// Evaluates against a flag set.
    #[must_use]
    pub fn holds(&self, flags: &FeatureFlags) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Domain(set) => flags.protocol_domain.is_some_and(|d| set.contains(&d)),
            Predicate::Flag(flag) => flags.get(*flag),
            Predicate::All(all) => all.iter().all(|p| p.holds(flags)),
        }
    }
}

/// What a rule contributes when it fires.
#[derive(Debug, Clone, Copy)]
pub enum Emit {
    /// One group per listed resource type, in order.
    Groups {
        /// Unit kind.
        kind: GroupKind,
        /// Domain declaring the types.
        domain: DomainId,
        /// Resource type short names.
        types: &'static [&'static str],
        /// Requested serialization.
        format: Format,
        /// Discovery path.
        discovery: DiscoveryPath,
    },
    /// The abbreviated RDF/XML variant of every RDF/XML group so far.
    AbbreviatedVariants,
}

/// One row of the composition table.
#[derive(Debug, Clone, Copy)]
pub struct SuiteRule {
    /// Block the rule belongs to.
    pub version: SpecVersion,
    /// Firing condition.
    pub when: Predicate,
    /// Contribution.
    pub emit: Emit,
}

const LEGACY: &[ProtocolDomain] = &[ProtocolDomain::Legacy, ProtocolDomain::Both];
const CURRENT: &[ProtocolDomain] = &[
    ProtocolDomain::Core,
    ProtocolDomain::ChangeManagement,
    ProtocolDomain::QualityManagement,
    ProtocolDomain::RequirementsManagement,
    ProtocolDomain::Asset,
    ProtocolDomain::Automation,
    ProtocolDomain::PerformanceMonitoring,
    ProtocolDomain::Both,
];
const CM: &[ProtocolDomain] = &[ProtocolDomain::ChangeManagement, ProtocolDomain::Both];
const QM: &[ProtocolDomain] = &[ProtocolDomain::QualityManagement];
const RM: &[ProtocolDomain] = &[ProtocolDomain::RequirementsManagement];
const ASSET: &[ProtocolDomain] = &[ProtocolDomain::Asset];
const AUTO: &[ProtocolDomain] = &[ProtocolDomain::Automation];
const PM: &[ProtocolDomain] = &[ProtocolDomain::PerformanceMonitoring];

const QM_TYPES: &[&str] = &[
    "TestPlan",
    "TestCase",
    "TestScript",
    "TestExecutionRecord",
    "TestResult",
];
const RM_TYPES: &[&str] = &["Requirement", "RequirementCollection"];
const AUTO_TYPES: &[&str] = &["AutomationPlan", "AutomationRequest", "AutomationResult"];

const fn rule(version: SpecVersion, when: Predicate, emit: Emit) -> SuiteRule {
    SuiteRule {
        version,
        when,
        emit,
    }
}

const fn groups(
    kind: GroupKind,
    domain: DomainId,
    types: &'static [&'static str],
    format: Format,
    discovery: DiscoveryPath,
) -> Emit {
    Emit::Groups {
        kind,
        domain,
        types,
        format,
        discovery,
    }
}

macro_rules! domain_block {
    ($set:expr, $domain:expr, $types:expr) => {
        [
            rule(
                SpecVersion::V2,
                Predicate::Domain($set),
                groups(GroupKind::Resource, $domain, $types, Format::RdfXml, DiscoveryPath::Instances),
            ),
            rule(
                SpecVersion::V2,
                Predicate::Domain($set),
                groups(GroupKind::Resource, $domain, $types, Format::Xml, DiscoveryPath::Instances),
            ),
            rule(
                SpecVersion::V2,
                Predicate::All(&[Predicate::Domain($set), Predicate::Flag(Flag::Json)]),
                groups(GroupKind::Resource, $domain, $types, Format::Json, DiscoveryPath::Instances),
            ),
        ]
    };
}

const V1_RULES: [SuiteRule; 5] = [
    rule(
        SpecVersion::V1,
        Predicate::Domain(LEGACY),
        groups(
            GroupKind::Resource,
            DomainId::LegacyChangeManagement,
            &["ServiceProviderCatalog"],
            Format::Xml,
            DiscoveryPath::Catalog,
        ),
    ),
    rule(
        SpecVersion::V1,
        Predicate::Domain(LEGACY),
        groups(
            GroupKind::Resource,
            DomainId::LegacyChangeManagement,
            &["ServiceDescriptor"],
            Format::Xml,
            DiscoveryPath::ServiceProviders,
        ),
    ),
    rule(
        SpecVersion::V1,
        Predicate::Domain(LEGACY),
        groups(
            GroupKind::Resource,
            DomainId::LegacyChangeManagement,
            &["ChangeRequest"],
            Format::Xml,
            DiscoveryPath::Instances,
        ),
    ),
    rule(
        SpecVersion::V1,
        Predicate::All(&[Predicate::Domain(LEGACY), Predicate::Flag(Flag::Json)]),
        groups(
            GroupKind::Resource,
            DomainId::LegacyChangeManagement,
            &["ChangeRequest"],
            Format::Json,
            DiscoveryPath::Instances,
        ),
    ),
    rule(
        SpecVersion::V1,
        Predicate::All(&[Predicate::Domain(LEGACY), Predicate::Flag(Flag::CreationFactory)]),
        groups(
            GroupKind::Creation,
            DomainId::LegacyChangeManagement,
            &["ChangeRequest"],
            Format::Xml,
            DiscoveryPath::CreationFactories,
        ),
    ),
];

const V2_CORE_RULES: [SuiteRule; 11] = [
    rule(
        SpecVersion::V2,
        Predicate::Domain(CURRENT),
        groups(GroupKind::Resource, DomainId::Core, &["ServiceProviderCatalog"], Format::RdfXml, DiscoveryPath::Catalog),
    ),
    rule(
        SpecVersion::V2,
        Predicate::Domain(CURRENT),
        groups(GroupKind::Resource, DomainId::Core, &["ServiceProviderCatalog"], Format::Xml, DiscoveryPath::Catalog),
    ),
    rule(
        SpecVersion::V2,
        Predicate::Domain(CURRENT),
        groups(GroupKind::Resource, DomainId::Core, &["ServiceProvider"], Format::RdfXml, DiscoveryPath::ServiceProviders),
    ),
    rule(
        SpecVersion::V2,
        Predicate::Domain(CURRENT),
        groups(GroupKind::Resource, DomainId::Core, &["ServiceProvider"], Format::Xml, DiscoveryPath::ServiceProviders),
    ),
    rule(
        SpecVersion::V2,
        Predicate::All(&[Predicate::Domain(CURRENT), Predicate::Flag(Flag::RdfXmlAbbrev)]),
        Emit::AbbreviatedVariants,
    ),
    rule(
        SpecVersion::V2,
        Predicate::All(&[Predicate::Domain(CURRENT), Predicate::Flag(Flag::CreationFactory)]),
        groups(GroupKind::Creation, DomainId::Core, &["Resource"], Format::RdfXml, DiscoveryPath::CreationFactories),
    ),
    rule(
        SpecVersion::V2,
        Predicate::All(&[Predicate::Domain(CURRENT), Predicate::Flag(Flag::CreationFactory)]),
        groups(GroupKind::Creation, DomainId::Core, &["Resource"], Format::Xml, DiscoveryPath::CreationFactories),
    ),
    rule(
        SpecVersion::V2,
        Predicate::All(&[
            Predicate::Domain(CURRENT),
            Predicate::All(&[Predicate::Flag(Flag::CreationFactory), Predicate::Flag(Flag::Json)]),
        ]),
        groups(GroupKind::Creation, DomainId::Core, &["Resource"], Format::Json, DiscoveryPath::CreationFactories),
    ),
    rule(
        SpecVersion::V2,
        Predicate::All(&[Predicate::Domain(CURRENT), Predicate::Flag(Flag::Query)]),
        groups(GroupKind::Query, DomainId::Core, &["ResponseInfo"], Format::RdfXml, DiscoveryPath::QueryCapabilities),
    ),
    rule(
        SpecVersion::V2,
        Predicate::All(&[Predicate::Domain(CURRENT), Predicate::Flag(Flag::Query)]),
        groups(GroupKind::Query, DomainId::Core, &["ResponseInfo"], Format::Xml, DiscoveryPath::QueryCapabilities),
    ),
    rule(
        SpecVersion::V2,
        Predicate::All(&[
            Predicate::Domain(CURRENT),
            Predicate::All(&[Predicate::Flag(Flag::Query), Predicate::Flag(Flag::Json)]),
        ]),
        groups(GroupKind::Query, DomainId::Core, &["ResponseInfo"], Format::Json, DiscoveryPath::QueryCapabilities),
    ),
];

const V2_CM_RULES: [SuiteRule; 3] = domain_block!(CM, DomainId::ChangeManagement, &["ChangeRequest"]);
const V2_QM_RULES: [SuiteRule; 3] = domain_block!(QM, DomainId::QualityManagement, QM_TYPES);
const V2_RM_RULES: [SuiteRule; 3] = domain_block!(RM, DomainId::RequirementsManagement, RM_TYPES);
const V2_ASSET_RULES: [SuiteRule; 3] = domain_block!(ASSET, DomainId::Asset, &["Asset"]);
const V2_AUTO_RULES: [SuiteRule; 3] = domain_block!(AUTO, DomainId::Automation, AUTO_TYPES);
const V2_PM_RULES: [SuiteRule; 3] =
    domain_block!(PM, DomainId::PerformanceMonitoring, &["PerformanceMonitoringRecord"]);

/// The composition table, in evaluation order.
pub fn rules() -> impl Iterator<Item = &'static SuiteRule> {
    V1_RULES
        .iter()
        .chain(V2_CORE_RULES.iter())
        .chain(V2_CM_RULES.iter())
        .chain(V2_QM_RULES.iter())
        .chain(V2_RM_RULES.iter())
        .chain(V2_ASSET_RULES.iter())
        .chain(V2_AUTO_RULES.iter())
        .chain(V2_PM_RULES.iter())
}

fn resolve_groups(
    version: SpecVersion,
    kind: GroupKind,
    domain: DomainId,
    types: &[&str],
    format: Format,
    discovery: DiscoveryPath,
) -> Vec<TestGroupSpec> {
    let vocabulary = Vocabulary::full();
    let Some(module) = vocabulary.domain(domain) else {
        warn!(?domain, "rule names a domain missing from the vocabulary");
        return Vec::new();
    };
    types
        .iter()
        .filter_map(|name| {
            let resource = module.resource(name);
            if resource.is_none() {
                warn!(?domain, resource = %name, "rule names an unknown resource type");
            }
            resource
        })
        .map(|resource| TestGroupSpec {
            version,
            kind,
            domain: module,
            resource_type: resource,
            format,
            discovery,
            constraints: resource.constraints,
        })
        .collect()
}

/// Runs one version block of the table.
#[must_use]
pub fn compose_version(version: SpecVersion, flags: &FeatureFlags) -> Vec<TestGroupSpec> {
    let Some(domain) = flags.protocol_domain else {
        return Vec::new();
    };
    if !domain.fires(version) {
        return Vec::new();
    }
    let mut out: Vec<TestGroupSpec> = Vec::new();
    for rule in rules().filter(|r| r.version == version) {
        if !rule.when.holds(flags) {
            continue;
        }
        match rule.emit {
            Emit::Groups {
                kind,
                domain,
                types,
                format,
                discovery,
            } => out.extend(resolve_groups(version, kind, domain, types, format, discovery)),
            Emit::AbbreviatedVariants => {
                let variants: Vec<TestGroupSpec> = out
                    .iter()
                    .filter(|g| g.format == Format::RdfXml)
                    .map(|g| TestGroupSpec {
                        format: Format::RdfXmlAbbrev,
                        ..g.clone()
                    })
                    .collect();
                out.extend(variants);
            }
        }
    }
    out
}

/// Composes the full suite: the version-1 block, then the version-2 block.
#[must_use]
pub fn compose(flags: &FeatureFlags) -> Vec<TestGroupSpec> {
    let mut groups = compose_version(SpecVersion::V1, flags);
    groups.extend(compose_version(SpecVersion::V2, flags));
    groups
}
