//! OSLC Asset Management 2.0.

use super::V2_DISCOVERY;
use crate::model::iris::OSLC_ASSET;
use crate::model::{DomainId, DomainModule, Namespace, PropertyConstraint, ResourceType, SpecVersion};

const ASSET: &[PropertyConstraint] = with_common![
    PropertyConstraint::zero_or_one("oslc_asset:guid"),
    PropertyConstraint::zero_or_one("oslc_asset:version"),
    PropertyConstraint::zero_or_one("oslc_asset:abstract"),
    PropertyConstraint::zero_or_one("oslc_asset:state"),
    PropertyConstraint::zero_or_one("oslc_asset:manufacturer"),
    PropertyConstraint::zero_or_one("oslc_asset:serialNumber"),
    PropertyConstraint::zero_or_many("oslc_asset:artifact"),
    PropertyConstraint::zero_or_many("oslc_asset:relationship"),
    PropertyConstraint::zero_or_many("oslc_asset:categorization"),
];

/// Returns the Asset Management 2.0 module.
#[must_use]
pub fn module() -> DomainModule {
    DomainModule {
        id: DomainId::Asset,
        label: "OSLC Asset Management 2.0",
        version: SpecVersion::V2,
        namespaces: &[Namespace {
            prefix: "oslc_asset",
            iri: OSLC_ASSET,
        }],
        resource_types: vec![ResourceType {
            name: "Asset",
            type_name: "oslc_asset:Asset",
            domain: DomainId::Asset,
            constraints: ASSET,
            media_types: &[],
        }],
        discovery: &V2_DISCOVERY,
    }
}
