//! OSLC Core 2.0: catalogs, service providers, query responses.
//!
//! These types are not owned by any one domain: every 2.0 suite checks the
//! catalog and provider documents, and query groups bind the
//! `oslc:ResponseInfo` node of a query response.

use super::V2_DISCOVERY;
use crate::model::{DomainId, DomainModule, PropertyConstraint, ResourceType, SpecVersion};

const CATALOG: &[PropertyConstraint] = &[
    PropertyConstraint::zero_or_one("dcterms:title"),
    PropertyConstraint::zero_or_one("dcterms:description"),
    PropertyConstraint::zero_or_one("dcterms:publisher"),
    PropertyConstraint::zero_or_many("oslc:domain"),
    PropertyConstraint::zero_or_many("oslc:serviceProvider"),
    PropertyConstraint::zero_or_many("oslc:serviceProviderCatalog"),
    PropertyConstraint::zero_or_one("oslc:oauthConfiguration"),
];

const PROVIDER: &[PropertyConstraint] = &[
    PropertyConstraint::zero_or_one("dcterms:title"),
    PropertyConstraint::zero_or_one("dcterms:description"),
    PropertyConstraint::zero_or_one("dcterms:publisher"),
    PropertyConstraint::one_or_many("oslc:service"),
    PropertyConstraint::zero_or_many("oslc:details"),
    PropertyConstraint::zero_or_many("oslc:prefixDefinition"),
    PropertyConstraint::zero_or_one("oslc:oauthConfiguration"),
];

const RESPONSE_INFO: &[PropertyConstraint] = &[
    PropertyConstraint::zero_or_one("dcterms:title"),
    PropertyConstraint::zero_or_one("oslc:totalCount"),
    PropertyConstraint::zero_or_one("oslc:nextPage"),
];

// Whatever a creation factory hands back; only the generic bounds apply.
const CREATED: &[PropertyConstraint] = &[
    PropertyConstraint::zero_or_one("dcterms:title"),
    PropertyConstraint::zero_or_one("dcterms:identifier"),
    PropertyConstraint::zero_or_one("dcterms:created"),
    PropertyConstraint::zero_or_one("dcterms:modified"),
    PropertyConstraint::zero_or_many("oslc:serviceProvider"),
    PropertyConstraint::zero_or_one("oslc:instanceShape"),
];

/// Returns the OSLC Core 2.0 module.
#[must_use]
pub fn module() -> DomainModule {
    DomainModule {
        id: DomainId::Core,
        label: "OSLC Core 2.0",
        version: SpecVersion::V2,
        namespaces: &[],
        resource_types: vec![
            resource("ServiceProviderCatalog", "oslc:ServiceProviderCatalog", CATALOG),
            resource("ServiceProvider", "oslc:ServiceProvider", PROVIDER),
            resource("ResponseInfo", "oslc:ResponseInfo", RESPONSE_INFO),
            resource("Resource", "rdfs:Resource", CREATED),
        ],
        discovery: &V2_DISCOVERY,
    }
}

fn resource(
    name: &'static str,
    type_name: &'static str,
    constraints: &'static [PropertyConstraint],
) -> ResourceType {
    ResourceType {
        name,
        type_name,
        domain: DomainId::Core,
        constraints,
        media_types: &[],
    }
}
