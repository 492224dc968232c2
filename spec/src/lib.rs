//! OSLC domain vocabulary encoded as typed Rust data.
//!
//! The `oslc-spec` crate provides the resource types of OSLC Core 2.0, the
//! six 2.0 domains (change, quality, requirements, asset, automation,
//! performance monitoring) and legacy Change Management 1.0, each with the
//! property cardinality constraints its specification declares and the
//! namespace prefix table its qualified names resolve against.
//!
//! # Entry Point
//!
//! ```
//! use oslc_spec::{DomainId, Vocabulary};
//!
//! let vocabulary = Vocabulary::full();
//! let test_case = vocabulary
//!     .resource(DomainId::QualityManagement, "TestCase")
//!     .map(|r| r.type_name);
//! assert_eq!(test_case, Some("oslc_qm:TestCase"));
//! ```
//!
//! # Serialization
//!
//! ```
//! let shapes = oslc_spec::serializer::turtle::to_turtle(oslc_spec::Vocabulary::full());
//! assert!(shapes.contains("oslc:ResourceShape"));
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod domains;
pub mod model;
#[cfg(feature = "serializers")]
pub mod serializer;

pub use model::{
    DiscoveryProfile, DomainId, DomainModule, Format, Namespace, PropertyConstraint, ResourceType,
    SpecVersion, Vocabulary,
};

impl Vocabulary {
    /// Returns the complete vocabulary.
    ///
    /// Assembly order: core first, then the 2.0 domains, then CM 1.0.
    #[must_use]
    pub fn full() -> &'static Vocabulary {
        static VOCABULARY: std::sync::OnceLock<Vocabulary> = std::sync::OnceLock::new();
        VOCABULARY.get_or_init(|| Vocabulary {
            domains: vec![
                domains::core::module(),
                domains::cm::module(),
                domains::qm::module(),
                domains::rm::module(),
                domains::asset::module(),
                domains::auto::module(),
                domains::pm::module(),
                domains::cm_v1::module(),
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_count() {
        assert_eq!(Vocabulary::full().domains.len(), 8);
    }

    #[test]
    fn resource_type_count() {
        // 4 core + 1 cm + 5 qm + 2 rm + 1 asset + 3 auto + 1 pm + 3 cm 1.0
        assert_eq!(Vocabulary::full().resource_type_count(), 20);
    }

    #[test]
    fn every_constraint_is_well_formed() {
        for domain in &Vocabulary::full().domains {
            for resource in &domain.resource_types {
                for c in resource.constraints {
                    if let Some(max) = c.max {
                        assert!(c.min <= max, "{}: {} has min > max", resource.name, c.property);
                    }
                    assert!(
                        domain.expand(c.property).is_some(),
                        "{}: prefix of {} does not resolve in {}",
                        resource.name,
                        c.property,
                        domain.label
                    );
                }
                assert!(
                    domain.expand(resource.type_name).is_some(),
                    "type {} does not resolve",
                    resource.type_name
                );
            }
        }
    }

    #[test]
    fn constraint_properties_unique_per_type() {
        for domain in &Vocabulary::full().domains {
            for resource in &domain.resource_types {
                let mut seen = std::collections::HashSet::new();
                for c in resource.constraints {
                    assert!(
                        seen.insert(c.property),
                        "Duplicate constraint {} on {}",
                        c.property,
                        resource.name
                    );
                }
            }
        }
    }

    #[test]
    fn domain_resources_carry_common_bounds() {
        let vocabulary = Vocabulary::full();
        let Some(qm) = vocabulary.domain(DomainId::QualityManagement) else {
            panic!("quality management module missing");
        };
        for resource in &qm.resource_types {
            assert!(resource.constraints.len() > domains::COMMON_CONSTRAINT_COUNT);
            assert_eq!(
                resource.constraint("dcterms:title").map(|c| c.range_label()),
                Some("1..1".to_string())
            );
        }
    }

    #[test]
    fn legacy_prefixes_shadow_common_ones() {
        let vocabulary = Vocabulary::full();
        let legacy = vocabulary.domain(DomainId::LegacyChangeManagement);
        let current = vocabulary.domain(DomainId::ChangeManagement);
        assert_eq!(
            legacy.and_then(|d| d.expand("oslc_cm:ChangeRequest")),
            Some("http://open-services.net/xmlns/cm/1.0/ChangeRequest".to_string())
        );
        assert_eq!(
            current.and_then(|d| d.expand("oslc_cm:ChangeRequest")),
            Some("http://open-services.net/ns/cm#ChangeRequest".to_string())
        );
    }

    #[test]
    fn expand_rejects_malformed_names() {
        let Some(core) = Vocabulary::full().domain(DomainId::Core) else {
            panic!("core module missing");
        };
        assert_eq!(core.expand("title"), None);
        assert_eq!(core.expand("dcterms:"), None);
        assert_eq!(core.expand("nope:title"), None);
    }

    #[test]
    fn legacy_media_types_override_defaults() {
        let Some(cr) = Vocabulary::full().resource(DomainId::LegacyChangeManagement, "ChangeRequest")
        else {
            panic!("legacy change request missing");
        };
        assert_eq!(
            cr.media_type(Format::Json),
            "application/x-oslc-cm-change-request+json"
        );
        assert_eq!(cr.media_type(Format::RdfXml), "application/rdf+xml");
    }
}
