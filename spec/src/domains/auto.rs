//! OSLC Automation 2.0.
//!
//! Plans describe what can be run, requests ask for a run, results report on
//! one. `oslc_auto:state` and `oslc_auto:verdict` are multi-valued by design
//! of the specification, hence `1..*`.

use super::V2_DISCOVERY;
use crate::model::iris::OSLC_AUTO;
use crate::model::{DomainId, DomainModule, Namespace, PropertyConstraint, ResourceType, SpecVersion};

const AUTOMATION_PLAN: &[PropertyConstraint] = with_common![
    PropertyConstraint::zero_or_many("oslc_auto:parameterDefinition"),
];

const AUTOMATION_REQUEST: &[PropertyConstraint] = with_common![
    PropertyConstraint::one_or_many("oslc_auto:state"),
    PropertyConstraint::zero_or_one("oslc_auto:desiredState"),
    PropertyConstraint::exactly_one("oslc_auto:executesAutomationPlan"),
    PropertyConstraint::zero_or_many("oslc_auto:inputParameter"),
];

const AUTOMATION_RESULT: &[PropertyConstraint] = with_common![
    PropertyConstraint::one_or_many("oslc_auto:state"),
    PropertyConstraint::zero_or_one("oslc_auto:desiredState"),
    PropertyConstraint::one_or_many("oslc_auto:verdict"),
    PropertyConstraint::zero_or_many("oslc_auto:contribution"),
    PropertyConstraint::zero_or_many("oslc_auto:inputParameter"),
    PropertyConstraint::zero_or_many("oslc_auto:outputParameter"),
    PropertyConstraint::zero_or_one("oslc_auto:producedByAutomationRequest"),
    PropertyConstraint::exactly_one("oslc_auto:reportsOnAutomationPlan"),
];

/// Returns the Automation 2.0 module.
#[must_use]
pub fn module() -> DomainModule {
    DomainModule {
        id: DomainId::Automation,
        label: "OSLC Automation 2.0",
        version: SpecVersion::V2,
        namespaces: &[Namespace {
            prefix: "oslc_auto",
            iri: OSLC_AUTO,
        }],
        resource_types: vec![
            resource("AutomationPlan", "oslc_auto:AutomationPlan", AUTOMATION_PLAN),
            resource(
                "AutomationRequest",
                "oslc_auto:AutomationRequest",
                AUTOMATION_REQUEST,
            ),
            resource(
                "AutomationResult",
                "oslc_auto:AutomationResult",
                AUTOMATION_RESULT,
            ),
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
        domain: DomainId::Automation,
        constraints,
        media_types: &[],
    }
}
