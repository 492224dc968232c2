//! OSLC Requirements Management 2.0.

use super::V2_DISCOVERY;
use crate::model::iris::OSLC_RM;
use crate::model::{DomainId, DomainModule, Namespace, PropertyConstraint, ResourceType, SpecVersion};

const REQUIREMENT: &[PropertyConstraint] = with_common![
    PropertyConstraint::zero_or_one("oslc:shortTitle"),
    PropertyConstraint::zero_or_many("oslc_rm:elaboratedBy"),
    PropertyConstraint::zero_or_many("oslc_rm:elaborates"),
    PropertyConstraint::zero_or_many("oslc_rm:specifiedBy"),
    PropertyConstraint::zero_or_many("oslc_rm:specifies"),
    PropertyConstraint::zero_or_many("oslc_rm:affectedBy"),
    PropertyConstraint::zero_or_many("oslc_rm:trackedBy"),
    PropertyConstraint::zero_or_many("oslc_rm:implementedBy"),
    PropertyConstraint::zero_or_many("oslc_rm:validatedBy"),
    PropertyConstraint::zero_or_many("oslc_rm:satisfiedBy"),
    PropertyConstraint::zero_or_many("oslc_rm:satisfies"),
    PropertyConstraint::zero_or_many("oslc_rm:decomposedBy"),
    PropertyConstraint::zero_or_many("oslc_rm:decomposes"),
    PropertyConstraint::zero_or_many("oslc_rm:constrainedBy"),
    PropertyConstraint::zero_or_many("oslc_rm:constrains"),
];

const REQUIREMENT_COLLECTION: &[PropertyConstraint] = with_common![
    PropertyConstraint::zero_or_one("oslc:shortTitle"),
    PropertyConstraint::zero_or_many("oslc_rm:uses"),
    PropertyConstraint::zero_or_many("oslc_rm:elaboratedBy"),
    PropertyConstraint::zero_or_many("oslc_rm:specifiedBy"),
    PropertyConstraint::zero_or_many("oslc_rm:affectedBy"),
    PropertyConstraint::zero_or_many("oslc_rm:trackedBy"),
    PropertyConstraint::zero_or_many("oslc_rm:implementedBy"),
    PropertyConstraint::zero_or_many("oslc_rm:validatedBy"),
];

/// Returns the Requirements Management 2.0 module.
#[must_use]
pub fn module() -> DomainModule {
    DomainModule {
        id: DomainId::RequirementsManagement,
        label: "OSLC Requirements Management 2.0",
        version: SpecVersion::V2,
        namespaces: &[Namespace {
            prefix: "oslc_rm",
            iri: OSLC_RM,
        }],
        resource_types: vec![
            ResourceType {
                name: "Requirement",
                type_name: "oslc_rm:Requirement",
                domain: DomainId::RequirementsManagement,
                constraints: REQUIREMENT,
                media_types: &[],
            },
            ResourceType {
                name: "RequirementCollection",
                type_name: "oslc_rm:RequirementCollection",
                domain: DomainId::RequirementsManagement,
                constraints: REQUIREMENT_COLLECTION,
                media_types: &[],
            },
        ],
        discovery: &V2_DISCOVERY,
    }
}
