//! OSLC Change Management 2.0.

use super::V2_DISCOVERY;
use crate::model::iris::OSLC_CM;
use crate::model::{DomainId, DomainModule, Namespace, PropertyConstraint, ResourceType, SpecVersion};

const CHANGE_REQUEST: &[PropertyConstraint] = with_common![
    PropertyConstraint::zero_or_one("oslc:shortTitle"),
    PropertyConstraint::zero_or_one("oslc_cm:status"),
    PropertyConstraint::zero_or_one("oslc_cm:closed"),
    PropertyConstraint::zero_or_one("oslc_cm:inprogress"),
    PropertyConstraint::zero_or_one("oslc_cm:fixed"),
    PropertyConstraint::zero_or_one("oslc_cm:approved"),
    PropertyConstraint::zero_or_one("oslc_cm:reviewed"),
    PropertyConstraint::zero_or_one("oslc_cm:verified"),
    PropertyConstraint::zero_or_one("oslc_cm:closeDate"),
    PropertyConstraint::zero_or_many("oslc_cm:relatedChangeRequest"),
    PropertyConstraint::zero_or_many("oslc_cm:affectsPlanItem"),
    PropertyConstraint::zero_or_many("oslc_cm:affectedByDefect"),
    PropertyConstraint::zero_or_many("oslc_cm:tracksRequirement"),
    PropertyConstraint::zero_or_many("oslc_cm:implementsRequirement"),
    PropertyConstraint::zero_or_many("oslc_cm:affectsRequirement"),
    PropertyConstraint::zero_or_many("oslc_cm:testedByTestCase"),
    PropertyConstraint::zero_or_many("oslc_cm:affectsTestResult"),
    PropertyConstraint::zero_or_many("oslc_cm:blocksTestExecutionRecord"),
];

/// Returns the Change Management 2.0 module.
#[must_use]
pub fn module() -> DomainModule {
    DomainModule {
        id: DomainId::ChangeManagement,
        label: "OSLC Change Management 2.0",
        version: SpecVersion::V2,
        namespaces: &[Namespace {
            prefix: "oslc_cm",
            iri: OSLC_CM,
        }],
        resource_types: vec![ResourceType {
            name: "ChangeRequest",
            type_name: "oslc_cm:ChangeRequest",
            domain: DomainId::ChangeManagement,
            constraints: CHANGE_REQUEST,
            media_types: &[],
        }],
        discovery: &V2_DISCOVERY,
    }
}
