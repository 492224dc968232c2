//! OSLC Performance Monitoring 2.0.
//!
//! Monitoring records are thin wrappers around observations, so apart from
//! the subject link nothing is mandatory.

use super::V2_DISCOVERY;
use crate::model::iris::OSLC_PM;
use crate::model::{DomainId, DomainModule, Namespace, PropertyConstraint, ResourceType, SpecVersion};

const RECORD: &[PropertyConstraint] = &[
    PropertyConstraint::zero_or_one("dcterms:title"),
    PropertyConstraint::zero_or_one("dcterms:identifier"),
    PropertyConstraint::zero_or_one("dcterms:created"),
    PropertyConstraint::zero_or_one("dcterms:modified"),
    PropertyConstraint::zero_or_many("oslc:serviceProvider"),
    PropertyConstraint::exactly_one("pm:isPartOf"),
    PropertyConstraint::zero_or_many("pm:observes"),
];

/// Returns the Performance Monitoring 2.0 module.
#[must_use]
pub fn module() -> DomainModule {
    DomainModule {
        id: DomainId::PerformanceMonitoring,
        label: "OSLC Performance Monitoring 2.0",
        version: SpecVersion::V2,
        namespaces: &[Namespace {
            prefix: "pm",
            iri: OSLC_PM,
        }],
        resource_types: vec![ResourceType {
            name: "PerformanceMonitoringRecord",
            type_name: "pm:PerformanceMonitoringRecord",
            domain: DomainId::PerformanceMonitoring,
            constraints: RECORD,
            media_types: &[],
        }],
        discovery: &V2_DISCOVERY,
    }
}
