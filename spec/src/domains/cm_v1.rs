//! OSLC Change Management 1.0.
//!
//! The 1.0 specification predates the RDF model: documents are plain XML
//! (or JSON) with their own media types, the catalog lists providers under
//! `oslc_disc:entry`, and query/creation URLs live in the provider's service
//! description document.

use crate::model::iris::{DCTERMS, OSLC_CM_V1, OSLC_DISC_V1};
use crate::model::{
    DiscoveryProfile, DomainId, DomainModule, Format, Namespace, PropertyConstraint, ResourceType,
    SpecVersion,
};

/// Discovery profile for CM 1.0 service descriptions.
pub static V1_DISCOVERY: DiscoveryProfile = DiscoveryProfile {
    catalog_type: "oslc_disc:ServiceProviderCatalog",
    provider_type: "oslc_cm:ServiceDescriptor",
    provider_path: &["oslc_disc:entry", "oslc_disc:services"],
    query_path: &["oslc_cm:changeRequests", "oslc_cm:simpleQuery"],
    query_base: "oslc_cm:url",
    creation_path: &["oslc_cm:changeRequests", "oslc_cm:factory"],
    creation_base: "oslc_cm:url",
    resource_type: None,
};

const CATALOG: &[PropertyConstraint] = &[
    PropertyConstraint::exactly_one("dc:title"),
    PropertyConstraint::zero_or_one("dc:description"),
    PropertyConstraint::zero_or_many("oslc_disc:entry"),
];

const SERVICE_DESCRIPTOR: &[PropertyConstraint] = &[
    PropertyConstraint::exactly_one("dc:title"),
    PropertyConstraint::zero_or_one("dc:description"),
    PropertyConstraint::zero_or_one("dc:contributor"),
    PropertyConstraint::exactly_one("oslc_cm:changeRequests"),
];

const CHANGE_REQUEST: &[PropertyConstraint] = &[
    PropertyConstraint::exactly_one("dc:title"),
    PropertyConstraint::exactly_one("dc:identifier"),
    PropertyConstraint::zero_or_one("dc:type"),
    PropertyConstraint::zero_or_one("dc:description"),
    PropertyConstraint::zero_or_one("dc:subject"),
    PropertyConstraint::zero_or_one("dc:creator"),
    PropertyConstraint::zero_or_one("dc:modified"),
];

/// Returns the Change Management 1.0 module.
#[must_use]
pub fn module() -> DomainModule {
    DomainModule {
        id: DomainId::LegacyChangeManagement,
        label: "OSLC Change Management 1.0",
        version: SpecVersion::V1,
        namespaces: &[
            Namespace {
                prefix: "dc",
                iri: DCTERMS,
            },
            Namespace {
                prefix: "oslc_cm",
                iri: OSLC_CM_V1,
            },
            Namespace {
                prefix: "oslc_disc",
                iri: OSLC_DISC_V1,
            },
        ],
        resource_types: vec![
            ResourceType {
                name: "ServiceProviderCatalog",
                type_name: "oslc_disc:ServiceProviderCatalog",
                domain: DomainId::LegacyChangeManagement,
                constraints: CATALOG,
                media_types: &[(
                    Format::Xml,
                    "application/x-oslc-disc-service-provider-catalog+xml",
                )],
            },
            ResourceType {
                name: "ServiceDescriptor",
                type_name: "oslc_cm:ServiceDescriptor",
                domain: DomainId::LegacyChangeManagement,
                constraints: SERVICE_DESCRIPTOR,
                media_types: &[(
                    Format::Xml,
                    "application/x-oslc-cm-service-description+xml",
                )],
            },
            ResourceType {
                name: "ChangeRequest",
                type_name: "oslc_cm:ChangeRequest",
                domain: DomainId::LegacyChangeManagement,
                constraints: CHANGE_REQUEST,
                media_types: &[
                    (Format::Xml, "application/x-oslc-cm-change-request+xml"),
                    (Format::Json, "application/x-oslc-cm-change-request+json"),
                ],
            },
        ],
        discovery: &V1_DISCOVERY,
    }
}
