//! OSLC domain modules.
//!
//! Each sub-module encodes one OSLC domain specification as Rust static data.
//! See [`crate::Vocabulary::full`] for the assembly order.

/// Builds a constraint slice that starts with the bounds OSLC 2.0 places on
/// every domain resource, followed by the domain-specific ones.
macro_rules! with_common {
    ($($extra:expr),* $(,)?) => {
        &[
            $crate::model::PropertyConstraint::exactly_one("dcterms:identifier"),
            $crate::model::PropertyConstraint::exactly_one("dcterms:title"),
            $crate::model::PropertyConstraint::zero_or_one("dcterms:description"),
            $crate::model::PropertyConstraint::zero_or_one("dcterms:created"),
            $crate::model::PropertyConstraint::zero_or_one("dcterms:modified"),
            $crate::model::PropertyConstraint::zero_or_many("dcterms:creator"),
            $crate::model::PropertyConstraint::zero_or_many("dcterms:contributor"),
            $crate::model::PropertyConstraint::zero_or_many("dcterms:subject"),
            $crate::model::PropertyConstraint::zero_or_many("oslc:serviceProvider"),
            $crate::model::PropertyConstraint::zero_or_one("oslc:instanceShape"),
            $($extra),*
        ]
    };
}

pub mod asset;
pub mod auto;
pub mod cm;
pub mod cm_v1;
pub mod core;
pub mod pm;
pub mod qm;
pub mod rm;

use crate::model::DiscoveryProfile;

/// Number of constraints [`with_common!`] prepends.
#[cfg(test)]
pub(crate) const COMMON_CONSTRAINT_COUNT: usize = 10;

/// Discovery profile shared by every OSLC 2.0 domain.
pub static V2_DISCOVERY: DiscoveryProfile = DiscoveryProfile {
    catalog_type: "oslc:ServiceProviderCatalog",
    provider_type: "oslc:ServiceProvider",
    provider_path: &["oslc:serviceProvider"],
    query_path: &["oslc:service", "oslc:queryCapability"],
    query_base: "oslc:queryBase",
    creation_path: &["oslc:service", "oslc:creationFactory"],
    creation_base: "oslc:creation",
    resource_type: Some("oslc:resourceType"),
};
