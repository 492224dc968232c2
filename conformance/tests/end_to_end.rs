//! Full pipeline over an in-memory provider: catalog, provider, query base
//! and instances, served in RDF/XML or plain XML per the Accept header.

use std::collections::HashMap;
use std::sync::Mutex;

use oslc_conformance::config::{FeatureFlags, ProtocolDomain};
use oslc_conformance::{
    compose, Config, Engine, FetchError, HttpRequest, HttpResponse, Outcome, TestGroupSpec,
    Transport,
};
use oslc_spec::{Format, PropertyConstraint};

const CATALOG: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dcterms="http://purl.org/dc/terms/"
         xmlns:oslc="http://open-services.net/ns/core#">
  <oslc:ServiceProviderCatalog rdf:about="http://host/catalog">
    <dcterms:title>Quality catalog</dcterms:title>
    <oslc:serviceProvider rdf:resource="http://host/qm/provider"/>
  </oslc:ServiceProviderCatalog>
</rdf:RDF>"#;

const PROVIDER: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dcterms="http://purl.org/dc/terms/"
         xmlns:oslc="http://open-services.net/ns/core#">
  <oslc:ServiceProvider rdf:about="http://host/qm/provider">
    <dcterms:title>Quality</dcterms:title>
    <oslc:service>
      <oslc:Service>
        <oslc:domain rdf:resource="http://open-services.net/ns/qm#"/>
        <oslc:queryCapability>
          <oslc:QueryCapability>
            <dcterms:title>Test cases</dcterms:title>
            <oslc:queryBase rdf:resource="http://host/qm/testcases"/>
            <oslc:resourceType rdf:resource="http://open-services.net/ns/qm#TestCase"/>
          </oslc:QueryCapability>
        </oslc:queryCapability>
      </oslc:Service>
    </oslc:service>
  </oslc:ServiceProvider>
</rdf:RDF>"#;

const QUERY_BASE: &str = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#">
  <rdf:Description rdf:about="http://host/qm/testcases">
    <rdfs:member rdf:resource="http://host/qm/tc/A1"/>
    <rdfs:member rdf:resource="http://host/qm/tc/A2"/>
  </rdf:Description>
</rdf:RDF>"#;

fn test_case(id: &str, plans: usize) -> String {
    let plans: String = (0..plans)
        .map(|i| format!(r#"<oslc_qm:reportsOnTestPlan rdf:resource="http://host/qm/plan/{i}"/>"#))
        .collect();
    format!(
        r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:dcterms="http://purl.org/dc/terms/"
         xmlns:oslc_qm="http://open-services.net/ns/qm#">
  <oslc_qm:TestCase rdf:about="http://host/qm/tc/{id}" dcterms:identifier="{id}">
    <dcterms:title rdf:parseType="Literal">Case {id}</dcterms:title>
    <dcterms:description>
      Checks case {id}.
    </dcterms:description>
    {plans}
  </oslc_qm:TestCase>
  <rdf:Description rdf:about="http://host/qm/tc/{id}">
    <dcterms:subject>regression</dcterms:subject>
  </rdf:Description>
</rdf:RDF>"#
    )
}

struct Provider {
    pages: HashMap<&'static str, String>,
    log: Mutex<Vec<(String, String)>>,
}

impl Provider {
    fn new() -> Self {
        let pages = HashMap::from([
            ("http://host/catalog", CATALOG.to_string()),
            ("http://host/qm/provider", PROVIDER.to_string()),
            ("http://host/qm/testcases", QUERY_BASE.to_string()),
            ("http://host/qm/tc/A1", test_case("A1", 1)),
            ("http://host/qm/tc/A2", test_case("A2", 2)),
        ]);
        Self {
            pages,
            log: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<(String, String)> {
        match self.log.lock() {
            Ok(log) => log.clone(),
            Err(_) => panic!("request log poisoned"),
        }
    }
}

impl Transport for Provider {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        if let Ok(mut log) = self.log.lock() {
            log.push((request.url.clone(), request.accept.clone()));
        }
        let Some(body) = self.pages.get(request.url.as_str()) else {
            return Ok(HttpResponse {
                status: 404,
                ..HttpResponse::default()
            });
        };
        let content_type = if request.accept == "application/xml" {
            "application/xml"
        } else {
            "application/rdf+xml"
        };
        Ok(HttpResponse {
            status: 200,
            content_type: Some(content_type.to_string()),
            location: None,
            body: body.clone().into_bytes(),
        })
    }
}

fn quality_flags() -> FeatureFlags {
    let mut flags = FeatureFlags::all(Some(ProtocolDomain::QualityManagement));
    flags.support_json = false;
    flags.support_creation_factory = false;
    flags.support_query = false;
    flags.support_rdf_xml_abbrev = false;
    flags
}

fn config() -> Config {
    Config {
        flags: quality_flags(),
        base_uri: Some("http://host/catalog".to_string()),
        ..Config::default()
    }
}

fn test_case_group(format: Format) -> TestGroupSpec {
    let label = format!("v2/TestCase/{}", format.as_str());
    match compose(&quality_flags())
        .into_iter()
        .find(|g| g.label() == label)
    {
        Some(g) => g,
        None => panic!("no group {label}"),
    }
}

const PLAN_AT_MOST_ONCE: &[PropertyConstraint] =
    &[PropertyConstraint::zero_or_one("oslc_qm:reportsOnTestPlan")];

/// Properties written as an attribute, an XML literal, padded text and in a
/// second description of the same subject.
const STRIPED_FORMS: &[PropertyConstraint] = &[
    PropertyConstraint::exactly_one("dcterms:identifier"),
    PropertyConstraint::exactly_one("dcterms:title"),
    PropertyConstraint::zero_or_one("dcterms:description"),
    PropertyConstraint::exactly_one("dcterms:subject"),
    PropertyConstraint::zero_or_one("oslc_qm:reportsOnTestPlan"),
];

#[test]
fn discovered_instances_are_checked_against_bounds() {
    let provider = Provider::new();
    let config = config();
    let group = TestGroupSpec {
        constraints: PLAN_AT_MOST_ONCE,
        ..test_case_group(Format::RdfXml)
    };
    let report = Engine::new(&config, &provider).run_groups(&[group]);

    let verdicts: Vec<(&str, Outcome, Option<usize>)> = report
        .verdicts
        .iter()
        .map(|v| (v.address.as_str(), v.outcome, v.observed))
        .collect();
    assert_eq!(
        verdicts,
        vec![
            ("http://host/qm/tc/A1", Outcome::Pass, Some(1)),
            ("http://host/qm/tc/A2", Outcome::Fail, Some(2)),
        ]
    );
    assert!(report.diagnostics.is_empty());
}

#[test]
fn plain_xml_agrees_with_rdf_xml() {
    let provider = Provider::new();
    let config = config();
    let engine = Engine::new(&config, &provider);
    let outcomes = |format| -> Vec<(String, Option<&'static str>, Outcome, Option<usize>)> {
        let group = TestGroupSpec {
            constraints: STRIPED_FORMS,
            ..test_case_group(format)
        };
        engine
            .run_groups(&[group])
            .verdicts
            .into_iter()
            .map(|v| (v.address, v.constraint.map(|c| c.property), v.outcome, v.observed))
            .collect()
    };
    let graph = outcomes(Format::RdfXml);
    assert_eq!(graph, outcomes(Format::Xml));
    assert_eq!(graph.len(), 2 * STRIPED_FORMS.len());
    let passing = |property: &str| {
        graph
            .iter()
            .filter(|(_, p, outcome, _)| *p == Some(property) && *outcome == Outcome::Pass)
            .count()
    };
    for property in ["dcterms:identifier", "dcterms:title", "dcterms:description", "dcterms:subject"] {
        assert_eq!(passing(property), 2, "{property}: {graph:?}");
    }
    assert!(provider
        .requests()
        .iter()
        .any(|(url, accept)| url == "http://host/qm/tc/A1" && accept == "application/xml"));
}

#[test]
fn full_quality_suite() {
    let provider = Provider::new();
    let config = config();
    let report = Engine::new(&config, &provider).run();

    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert_eq!(report.count(Outcome::Error), 0, "{:?}", report.verdicts);
    assert!(report.all_passed(), "{:?}", report.verdicts);

    let tested: Vec<&str> = report.verdicts.iter().map(|v| v.group.as_str()).collect();
    for label in [
        "v2/ServiceProviderCatalog/rdf+xml",
        "v2/ServiceProviderCatalog/xml",
        "v2/ServiceProvider/rdf+xml",
        "v2/ServiceProvider/xml",
        "v2/TestCase/rdf+xml",
        "v2/TestCase/xml",
    ] {
        assert!(tested.contains(&label), "{label} produced no verdicts");
    }
    // Only test cases have a query capability.
    assert_eq!(report.empty_groups.len(), 8);
    assert!(report.empty_groups.contains(&"v2/TestPlan/rdf+xml".to_string()));
}

#[test]
fn run_only_once_checks_the_first_instance() {
    let provider = Provider::new();
    let config = Config {
        run_only_once: true,
        ..config()
    };
    let report = Engine::new(&config, &provider).run_groups(&[test_case_group(Format::RdfXml)]);
    assert!(!report.verdicts.is_empty());
    assert!(report
        .verdicts
        .iter()
        .all(|v| v.address == "http://host/qm/tc/A1"));
}

#[test]
fn unreachable_catalog_is_a_diagnostic() {
    let provider = Provider::new();
    let config = Config {
        base_uri: Some("http://host/missing".to_string()),
        ..config()
    };
    let report = Engine::new(&config, &provider).run_groups(&[test_case_group(Format::RdfXml)]);
    assert!(report.verdicts.is_empty());
    assert_eq!(report.diagnostics.len(), 1);
    assert!(report.diagnostics[0].message.contains("404"));
}
