//! Test instance expander and execution units.
//!
//! Each discovered address becomes one [`ExecutionUnit`]. A unit owns its
//! fetch, parse and assertion; failures never leak into sibling units.

use tracing::debug;

use crate::assertion::{assert_constraints, AssertionContext};
use crate::config::Config;
use crate::error::UnitError;
use crate::fetcher::Fetcher;
use crate::report::{Outcome, Verdict};
use crate::representation::resolve;
use crate::suite::{GroupKind, TestGroupSpec};
use crate::transport::HttpRequest;

/// HTTP status a creation factory must answer with.
pub const CREATED: u16 = 201;

/// One (group, address) assertion pass.
#[derive(Debug, Clone)]
pub struct ExecutionUnit<'g> {
    /// Group the unit belongs to.
    pub group: &'g TestGroupSpec,
    /// Address the unit targets.
    pub address: String,
}

/// One unit per address, in address order.
#[must_use]
pub fn expand(group: &TestGroupSpec, addresses: Vec<String>) -> Vec<ExecutionUnit<'_>> {
    addresses
        .into_iter()
        .map(|address| ExecutionUnit { group, address })
        .collect()
}

impl ExecutionUnit<'_> {
    /// Runs the unit and returns its verdicts in constraint order.
    ///
    /// A fetch or parse failure yields a single `Error` verdict.
    #[must_use]
    pub fn execute(&self, fetcher: Fetcher<'_>, config: &Config) -> Vec<Verdict> {
        let label = self.group.label();
        debug!(group = %label, address = %self.address, "executing unit");
        let result = match self.group.kind {
            GroupKind::Resource => self.check(fetcher, &label, &self.address),
            GroupKind::Query => {
                config
                    .query
                    .apply(&self.address)
                    .map_err(UnitError::from)
                    .and_then(|url| self.check(fetcher, &label, &url))
            }
            GroupKind::Creation => self.create(fetcher, config, &label),
        };
        result.unwrap_or_else(|err| {
            vec![Verdict::error(
                label.as_str(),
                self.address.as_str(),
                None,
                err.to_string(),
            )]
        })
    }

    /// Fetches `url` and checks the group's constraints on it.
    fn check(&self, fetcher: Fetcher<'_>, label: &str, url: &str) -> Result<Vec<Verdict>, UnitError> {
        let parsed = fetcher.fetch(
            url,
            self.group.format,
            self.group.resource_type,
            self.group.domain,
        )?;
        Ok(assert_constraints(
            &parsed,
            self.group.constraints,
            AssertionContext {
                group: label,
                address: url,
            },
        ))
    }

    /// Posts the template, then checks the created resource.
    fn create(
        &self,
        fetcher: Fetcher<'_>,
        config: &Config,
        label: &str,
    ) -> Result<Vec<Verdict>, UnitError> {
        let format = self.group.format;
        let template = config.creation_templates.get(&format).ok_or_else(|| {
            UnitError::Setup(format!("no creation template configured for {}", format.as_str()))
        })?;
        let request = HttpRequest::post(
            self.address.as_str(),
            self.group.resource_type.media_type(format),
            template.clone(),
        )
        .with_core_version(self.group.domain.version.core_version_header());
        let response = fetcher.transport().send(&request)?;

        let location = response.location.filter(|l| !l.trim().is_empty());
        let Some(location) = location.filter(|_| response.status == CREATED) else {
            return Ok(vec![Verdict::unit(
                label,
                self.address.as_str(),
                Outcome::Fail,
                format!(
                    "expected {CREATED} Created with a Location header, got HTTP {}",
                    response.status
                ),
            )]);
        };
        let location = resolve(&self.address, location.trim());

        let mut verdicts = vec![Verdict::unit(
            label,
            self.address.as_str(),
            Outcome::Pass,
            format!("created {location}"),
        )];
        match self.check(fetcher, label, &location) {
            Ok(checked) => verdicts.extend(checked),
            Err(err) => verdicts.push(Verdict::error(label, location.as_str(), None, err.to_string())),
        }
        Ok(verdicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FeatureFlags, ProtocolDomain};
    use crate::error::FetchError;
    use crate::suite::compose;
    use crate::transport::{HttpResponse, Method, Transport};
    use oslc_spec::Format;
    use std::sync::Mutex;

    struct Factory {
        post: HttpResponse,
        get: HttpResponse,
        seen: Mutex<Vec<Method>>,
    }

    impl Transport for Factory {
        fn send(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(request.method);
            }
            Ok(match request.method {
                Method::Post => self.post.clone(),
                Method::Get => self.get.clone(),
            })
        }
    }

    fn creation_group() -> TestGroupSpec {
        match compose(&FeatureFlags::all(Some(ProtocolDomain::Core)))
            .into_iter()
            .find(|g| g.kind == GroupKind::Creation && g.format == Format::Json)
        {
            Some(g) => g,
            None => panic!("no JSON creation group"),
        }
    }

    const CREATED_JSON: &str = r#"{
        "rdf:about": "http://host/new/1",
        "dcterms:title": "made"
    }"#;

    fn config_with_template() -> Config {
        let mut config = Config::default();
        config
            .creation_templates
            .insert(Format::Json, br#"{"dcterms:title":"made"}"#.to_vec());
        config
    }

    #[test]
    fn created_resource_is_checked() {
        let factory = Factory {
            post: HttpResponse {
                status: 201,
                content_type: None,
                location: Some("/new/1".to_string()),
                body: Vec::new(),
            },
            get: HttpResponse {
                status: 200,
                content_type: Some("application/json".to_string()),
                location: None,
                body: CREATED_JSON.as_bytes().to_vec(),
            },
            seen: Mutex::new(Vec::new()),
        };
        let group = creation_group();
        let config = config_with_template();
        let units = expand(&group, vec!["http://host/factory".to_string()]);
        let verdicts = units[0].execute(Fetcher::new(&factory), &config);
        assert_eq!(verdicts[0].outcome, Outcome::Pass);
        assert_eq!(verdicts[0].detail, "created http://host/new/1");
        assert_eq!(verdicts.len(), 1 + group.constraints.len());
        let methods = match factory.seen.lock() {
            Ok(seen) => seen.clone(),
            Err(_) => panic!("poisoned"),
        };
        assert_eq!(methods, vec![Method::Post, Method::Get]);
    }

    #[test]
    fn missing_location_fails_the_unit() {
        let factory = Factory {
            post: HttpResponse {
                status: 200,
                ..HttpResponse::default()
            },
            get: HttpResponse::default(),
            seen: Mutex::new(Vec::new()),
        };
        let group = creation_group();
        let config = config_with_template();
        let units = expand(&group, vec!["http://host/factory".to_string()]);
        let verdicts = units[0].execute(Fetcher::new(&factory), &config);
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].outcome, Outcome::Fail);
        assert_eq!(verdicts[0].constraint, None);
    }

    #[test]
    fn missing_template_is_an_error() {
        let factory = Factory {
            post: HttpResponse::default(),
            get: HttpResponse::default(),
            seen: Mutex::new(Vec::new()),
        };
        let group = creation_group();
        let units = expand(&group, vec!["http://host/factory".to_string()]);
        let verdicts = units[0].execute(Fetcher::new(&factory), &Config::default());
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].outcome, Outcome::Error);
        assert!(factory.seen.lock().map(|s| s.is_empty()).unwrap_or(false));
    }

    #[test]
    fn unusable_query_base_is_an_error_without_a_request() {
        let factory = Factory {
            post: HttpResponse::default(),
            get: HttpResponse::default(),
            seen: Mutex::new(Vec::new()),
        };
        let Some(group) = compose(&FeatureFlags::all(Some(ProtocolDomain::Core)))
            .into_iter()
            .find(|g| g.kind == GroupKind::Query)
        else {
            panic!("no query group");
        };
        let mut config = Config::default();
        config.query.search_terms = Some("login".to_string());
        let units = expand(&group, vec!["qm/testcases".to_string()]);
        let verdicts = units[0].execute(Fetcher::new(&factory), &config);
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].outcome, Outcome::Error);
        assert!(verdicts[0].detail.contains("invalid address"), "{}", verdicts[0].detail);
        assert!(factory.seen.lock().map(|s| s.is_empty()).unwrap_or(false));
    }

    #[test]
    fn units_follow_address_order() {
        let group = creation_group();
        let units = expand(&group, vec!["b".to_string(), "a".to_string()]);
        let order: Vec<&str> = units.iter().map(|u| u.address.as_str()).collect();
        assert_eq!(order, vec!["b", "a"]);
    }
}
