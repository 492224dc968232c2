//! OSLC Quality Management 2.0.
//!
//! Five resource types: test plans, test cases, test scripts, execution
//! records, and test results. Link properties that the specification marks
//! as mandatory (`reportsOnTestCase`, `runsTestCase`, ...) are `1..1`.

use super::V2_DISCOVERY;
use crate::model::iris::OSLC_QM;
use crate::model::{DomainId, DomainModule, Namespace, PropertyConstraint, ResourceType, SpecVersion};

const TEST_PLAN: &[PropertyConstraint] = with_common![
    PropertyConstraint::zero_or_many("oslc_qm:relatedChangeRequest"),
    PropertyConstraint::zero_or_many("oslc_qm:validatesRequirementCollection"),
    PropertyConstraint::zero_or_many("oslc_qm:usesTestCase"),
];

const TEST_CASE: &[PropertyConstraint] = with_common![
    PropertyConstraint::zero_or_many("oslc_qm:relatedChangeRequest"),
    PropertyConstraint::zero_or_many("oslc_qm:testsChangeRequest"),
    PropertyConstraint::zero_or_many("oslc_qm:usesTestScript"),
    PropertyConstraint::zero_or_many("oslc_qm:validatesRequirement"),
];

const TEST_SCRIPT: &[PropertyConstraint] = with_common![
    PropertyConstraint::zero_or_many("oslc_qm:executionInstructions"),
    PropertyConstraint::zero_or_many("oslc_qm:relatedChangeRequest"),
    PropertyConstraint::zero_or_many("oslc_qm:validatesRequirement"),
];

const TEST_EXECUTION_RECORD: &[PropertyConstraint] = with_common![
    PropertyConstraint::zero_or_many("oslc_qm:blockedByChangeRequest"),
    PropertyConstraint::zero_or_many("oslc_qm:relatedChangeRequest"),
    PropertyConstraint::exactly_one("oslc_qm:reportsOnTestPlan"),
    PropertyConstraint::zero_or_one("oslc_qm:runsOnTestEnvironment"),
    PropertyConstraint::exactly_one("oslc_qm:runsTestCase"),
];

const TEST_RESULT: &[PropertyConstraint] = with_common![
    PropertyConstraint::zero_or_one("oslc_qm:status"),
    PropertyConstraint::zero_or_many("oslc_qm:affectedByChangeRequest"),
    PropertyConstraint::zero_or_one("oslc_qm:executesTestScript"),
    PropertyConstraint::zero_or_one("oslc_qm:producedByTestExecutionRecord"),
    PropertyConstraint::exactly_one("oslc_qm:reportsOnTestCase"),
    PropertyConstraint::zero_or_one("oslc_qm:reportsOnTestPlan"),
];

/// Returns the Quality Management 2.0 module.
#[must_use]
pub fn module() -> DomainModule {
    DomainModule {
        id: DomainId::QualityManagement,
        label: "OSLC Quality Management 2.0",
        version: SpecVersion::V2,
        namespaces: &[Namespace {
            prefix: "oslc_qm",
            iri: OSLC_QM,
        }],
        resource_types: vec![
            resource("TestPlan", "oslc_qm:TestPlan", TEST_PLAN),
            resource("TestCase", "oslc_qm:TestCase", TEST_CASE),
            resource("TestScript", "oslc_qm:TestScript", TEST_SCRIPT),
            resource(
                "TestExecutionRecord",
                "oslc_qm:TestExecutionRecord",
                TEST_EXECUTION_RECORD,
            ),
            resource("TestResult", "oslc_qm:TestResult", TEST_RESULT),
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
        domain: DomainId::QualityManagement,
        constraints,
        media_types: &[],
    }
}
