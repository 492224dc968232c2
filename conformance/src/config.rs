//! Run configuration: feature flags, discovery overrides, transport settings.
//!
//! The configuration is a flat key/value property set read once at process
//! start. [`Config::from_properties`] is the canonical constructor;
//! [`Config::load`] reads the same keys from a TOML file. The resulting
//! value is immutable and passed by reference to every component.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use oslc_spec::{Format, SpecVersion};
use reqwest::Url;
use tracing::debug;

use crate::error::{ConfigError, FetchError};

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Prefix of per-resource-type address overrides (`useThisTestCase`, ...).
pub const OVERRIDE_PREFIX: &str = "useThis";

/// Which OSLC domain (and generation) the provider under test implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolDomain {
    /// Change Management 1.0 only.
    Legacy,
    /// OSLC Core 2.0 only: catalog, providers, query, creation.
    Core,
    /// Change Management 2.0.
    ChangeManagement,
    /// Quality Management 2.0.
    QualityManagement,
    /// Requirements Management 2.0.
    RequirementsManagement,
    /// Asset Management 2.0.
    Asset,
    /// Automation 2.0.
    Automation,
    /// Performance Monitoring 2.0.
    PerformanceMonitoring,
    /// Change Management 1.0 and 2.0 together.
    Both,
}

impl ProtocolDomain {
    /// Every accepted value, in declaration order.
    pub const ALL: [ProtocolDomain; 9] = [
        ProtocolDomain::Legacy,
        ProtocolDomain::Core,
        ProtocolDomain::ChangeManagement,
        ProtocolDomain::QualityManagement,
        ProtocolDomain::RequirementsManagement,
        ProtocolDomain::Asset,
        ProtocolDomain::Automation,
        ProtocolDomain::PerformanceMonitoring,
        ProtocolDomain::Both,
    ];

    /// Parses a `testVersions` value. Empty input means "no domain".
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownDomain`] for values outside the closed set.
    pub fn parse(value: &str) -> Result<Option<Self>, ConfigError> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let domain = match normalized.as_str() {
            "" => return Ok(None),
            "oslc1" | "legacy" | "1.0" => ProtocolDomain::Legacy,
            "core" | "oslc2" | "2.0" => ProtocolDomain::Core,
            "cm" | "change-management" => ProtocolDomain::ChangeManagement,
            "qm" | "quality-management" => ProtocolDomain::QualityManagement,
            "rm" | "requirements-management" => ProtocolDomain::RequirementsManagement,
            "asset" => ProtocolDomain::Asset,
            "auto" | "automation" => ProtocolDomain::Automation,
            "pm" | "performance-monitoring" => ProtocolDomain::PerformanceMonitoring,
            "both" => ProtocolDomain::Both,
            _ => return Err(ConfigError::UnknownDomain(value.trim().to_string())),
        };
        Ok(Some(domain))
    }

    /// Canonical `testVersions` spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolDomain::Legacy => "OSLC1",
            ProtocolDomain::Core => "Core",
            ProtocolDomain::ChangeManagement => "CM",
            ProtocolDomain::QualityManagement => "QM",
            ProtocolDomain::RequirementsManagement => "RM",
            ProtocolDomain::Asset => "Asset",
            ProtocolDomain::Automation => "Automation",
            ProtocolDomain::PerformanceMonitoring => "PM",
            ProtocolDomain::Both => "Both",
        }
    }

    /// Returns true if this selection runs the rule block of `version`.
    #[must_use]
    pub fn fires(self, version: SpecVersion) -> bool {
        match version {
            SpecVersion::V1 => matches!(self, ProtocolDomain::Legacy | ProtocolDomain::Both),
            SpecVersion::V2 => self != ProtocolDomain::Legacy,
        }
    }
}

/// A boolean capability the provider under test may or may not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// `supportJSON`
    Json,
    /// `supportCreationFactory`
    CreationFactory,
    /// `supportQuery`
    Query,
    /// `supportRdfXmlAbbrev`
    RdfXmlAbbrev,
}

/// Feature flags that drive suite composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureFlags {
    /// Selected domain; `None` composes an empty suite.
    pub protocol_domain: Option<ProtocolDomain>,
    /// Provider serves JSON representations.
    pub support_json: bool,
    /// Provider exposes creation factories.
    pub support_creation_factory: bool,
    /// Provider exposes query capabilities.
    pub support_query: bool,
    /// Provider serves abbreviated RDF/XML.
    pub support_rdf_xml_abbrev: bool,
}

impl FeatureFlags {
    /// All capabilities on, for the given domain.
    #[must_use]
    pub fn all(protocol_domain: Option<ProtocolDomain>) -> Self {
        Self {
            protocol_domain,
            support_json: true,
            support_creation_factory: true,
            support_query: true,
            support_rdf_xml_abbrev: true,
        }
    }

    /// Returns the state of a single flag.
    #[must_use]
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::Json => self.support_json,
            Flag::CreationFactory => self.support_creation_factory,
            Flag::Query => self.support_query,
            Flag::RdfXmlAbbrev => self.support_rdf_xml_abbrev,
        }
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self::all(None)
    }
}

/// Basic credentials handed to the transport.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Parameters appended to query capability requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    /// Property used in an `oslc.where` equality clause.
    pub equality_property: Option<String>,
    /// Value compared against `equality_property`.
    pub equality_value: Option<String>,
    /// Already-encoded `key=value&...` parameters appended verbatim.
    pub additional: Option<String>,
    /// `oslc.searchTerms` full-text term.
    pub search_terms: Option<String>,
}

impl QueryParameters {
    fn additional(&self) -> Option<&str> {
        self.additional
            .as_deref()
            .map(|raw| raw.trim_start_matches(['?', '&']))
            .filter(|raw| !raw.is_empty())
    }

    /// `oslc.*` name/value pairs, unencoded.
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let (Some(property), Some(value)) = (&self.equality_property, &self.equality_value) {
            pairs.push(("oslc.where", format!("{property}=\"{value}\"")));
            pairs.push(("oslc.select", property.clone()));
        }
        if let Some(terms) = &self.search_terms {
            pairs.push(("oslc.searchTerms", format!("\"{terms}\"")));
        }
        pairs
    }

    /// Adds the configured parameters to `base`, keeping any query it
    /// already carries. `base` is returned untouched when nothing is set.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if parameters are set and `base`
    /// is not an absolute URL.
    pub fn apply(&self, base: &str) -> Result<String, FetchError> {
        let pairs = self.pairs();
        let additional = self.additional();
        if pairs.is_empty() && additional.is_none() {
            return Ok(base.to_string());
        }
        let mut url = Url::parse(base).map_err(|e| FetchError::InvalidUrl {
            url: base.to_string(),
            reason: e.to_string(),
        })?;
        if let Some(additional) = additional {
            let query = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{additional}"),
                _ => additional.to_string(),
            };
            url.set_query(Some(&query));
        }
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url.into())
    }
}

/// Immutable run configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Suite composition flags.
    pub flags: FeatureFlags,
    /// Service provider catalog address.
    pub base_uri: Option<String>,
    /// Per-resource-type instance overrides, keyed by resource type name.
    pub overrides: BTreeMap<String, String>,
    /// Credentials for the transport.
    pub credentials: Option<Credentials>,
    /// Per-request deadline.
    pub timeout: Duration,
    /// Worker pool size for execution units; 1 runs sequentially.
    pub workers: usize,
    /// Test only the first discovered instance of every group.
    pub run_only_once: bool,
    /// Query capability parameters.
    pub query: QueryParameters,
    /// Creation payloads, by request format.
    pub creation_templates: HashMap<Format, Vec<u8>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flags: FeatureFlags::default(),
            base_uri: None,
            overrides: BTreeMap::new(),
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
            workers: 1,
            run_only_once: false,
            query: QueryParameters::default(),
            creation_templates: HashMap::new(),
        }
    }
}

impl Config {
    /// Builds a configuration from a flat property set.
    ///
    /// Booleans default to true unless the value is exactly `"false"`
    /// (ignoring case); `runOnlyOnce` defaults to false. Relative template
    /// paths are resolved against the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown `testVersions` value, bad
    /// numbers, or unreadable template files.
    pub fn from_properties(properties: &BTreeMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            properties
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };
        let flag = |key: &str| get(key).map_or(true, |v| !v.eq_ignore_ascii_case("false"));

        let flags = FeatureFlags {
            protocol_domain: match properties.get("testVersions") {
                Some(value) => ProtocolDomain::parse(value)?,
                None => None,
            },
            support_json: flag("supportJSON"),
            support_creation_factory: flag("supportCreationFactory"),
            support_query: flag("supportQuery"),
            support_rdf_xml_abbrev: flag("supportRdfXmlAbbrev"),
        };

        let mut overrides = BTreeMap::new();
        for (key, value) in properties {
            let Some(resource) = key.strip_prefix(OVERRIDE_PREFIX) else {
                continue;
            };
            let value = value.trim();
            if !resource.is_empty() && !value.is_empty() {
                overrides.insert(resource.to_string(), value.to_string());
            }
        }

        let credentials = match (get("userId"), properties.get("pw")) {
            (Some(user), Some(password)) => Some(Credentials {
                user: user.to_string(),
                password: password.clone(),
            }),
            _ => None,
        };

        let timeout = match get("timeoutMs") {
            Some(value) => Duration::from_millis(parse_number(value, "timeoutMs")?),
            None => DEFAULT_TIMEOUT,
        };

        let workers = match get("workers") {
            Some(value) => usize::try_from(parse_number(value, "workers")?).map_err(|_| {
                ConfigError::InvalidValue {
                    key: "workers".to_string(),
                    reason: "too large".to_string(),
                }
            })?,
            None => 1,
        };
        if workers == 0 {
            return Err(ConfigError::InvalidValue {
                key: "workers".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        let mut creation_templates = HashMap::new();
        for (key, format) in [
            ("createTemplateRdfXmlFile", Format::RdfXml),
            ("createTemplateXmlFile", Format::Xml),
            ("createTemplateJsonFile", Format::Json),
        ] {
            if let Some(path) = get(key) {
                let path = PathBuf::from(path);
                let bytes = std::fs::read(&path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                creation_templates.insert(format, bytes);
            }
        }
        // The abbreviated variant posts the same payload as plain RDF/XML.
        if let Some(bytes) = creation_templates.get(&Format::RdfXml).cloned() {
            creation_templates.insert(Format::RdfXmlAbbrev, bytes);
        }

        for key in properties.keys() {
            if !is_known_key(key) {
                debug!(key = %key, "ignoring unrecognized configuration key");
            }
        }

        Ok(Self {
            flags,
            base_uri: get("baseUri").map(str::to_string),
            overrides,
            credentials,
            timeout,
            workers,
            run_only_once: get("runOnlyOnce").is_some_and(|v| v.eq_ignore_ascii_case("true")),
            query: QueryParameters {
                equality_property: get("queryEqualityProperty").map(str::to_string),
                equality_value: get("queryEqualityValue").map(str::to_string),
                additional: get("queryAdditionalParameters").map(str::to_string),
                search_terms: get("fullTextSearchTerm").map(str::to_string),
            },
            creation_templates,
        })
    }

    /// Reads a TOML file of flat keys into a property set.
    ///
    /// String, boolean, integer and float values are accepted; template
    /// paths are made relative to the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not TOML, or
    /// holds a table or array value.
    pub fn read_properties(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table: toml::Table = toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut properties = BTreeMap::new();
        for (key, value) in table {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Boolean(b) => b.to_string(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                other => {
                    return Err(ConfigError::InvalidValue {
                        key,
                        reason: format!("expected a scalar, got {}", other.type_str()),
                    })
                }
            };
            let text = if key.starts_with("createTemplate") && Path::new(&text).is_relative() {
                base_dir.join(&text).to_string_lossy().into_owned()
            } else {
                text
            };
            properties.insert(key, text);
        }
        Ok(properties)
    }

    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// See [`Config::read_properties`] and [`Config::from_properties`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_properties(&Self::read_properties(path)?)
    }

    /// Returns the override address for a resource type, if configured.
    #[must_use]
    pub fn override_for(&self, resource_name: &str) -> Option<&str> {
        self.overrides.get(resource_name).map(String::as_str)
    }
}

fn parse_number(value: &str, key: &str) -> Result<u64, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidNumber {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn is_known_key(key: &str) -> bool {
    key.starts_with(OVERRIDE_PREFIX)
        || matches!(
            key,
            "testVersions"
                | "supportJSON"
                | "supportCreationFactory"
                | "supportQuery"
                | "supportRdfXmlAbbrev"
                | "baseUri"
                | "userId"
                | "pw"
                | "timeoutMs"
                | "workers"
                | "runOnlyOnce"
                | "queryEqualityProperty"
                | "queryEqualityValue"
                | "queryAdditionalParameters"
                | "fullTextSearchTerm"
                | "createTemplateRdfXmlFile"
                | "createTemplateXmlFile"
                | "createTemplateJsonFile"
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn booleans_default_to_true() {
        let config = Config::from_properties(&props(&[("testVersions", "QM")]));
        let Ok(config) = config else {
            panic!("config rejected: {config:?}");
        };
        assert_eq!(
            config.flags.protocol_domain,
            Some(ProtocolDomain::QualityManagement)
        );
        assert!(config.flags.support_json);
        assert!(config.flags.support_creation_factory);
        assert!(config.flags.support_query);
        assert!(config.flags.support_rdf_xml_abbrev);
        assert!(!config.run_only_once);
    }

    #[test]
    fn only_false_disables_a_flag() {
        let config = Config::from_properties(&props(&[
            ("supportJSON", "FALSE"),
            ("supportQuery", "no"),
            ("supportCreationFactory", ""),
        ]));
        let Ok(config) = config else {
            panic!("config rejected");
        };
        assert!(!config.flags.support_json);
        assert!(config.flags.support_query);
        assert!(config.flags.support_creation_factory);
    }

    #[test]
    fn unknown_domain_is_a_config_error() {
        let err = Config::from_properties(&props(&[("testVersions", "XYZ")]));
        assert!(matches!(err, Err(ConfigError::UnknownDomain(v)) if v == "XYZ"));
    }

    #[test]
    fn empty_domain_composes_nothing() {
        let Ok(config) = Config::from_properties(&props(&[("testVersions", "  ")])) else {
            panic!("config rejected");
        };
        assert_eq!(config.flags.protocol_domain, None);
    }

    #[test]
    fn domain_spellings() {
        for (value, expected) in [
            ("OSLC1", ProtocolDomain::Legacy),
            ("change-management", ProtocolDomain::ChangeManagement),
            ("Quality_Management", ProtocolDomain::QualityManagement),
            ("both", ProtocolDomain::Both),
            ("PM", ProtocolDomain::PerformanceMonitoring),
        ] {
            assert!(matches!(ProtocolDomain::parse(value), Ok(Some(d)) if d == expected));
        }
        for domain in ProtocolDomain::ALL {
            assert!(matches!(ProtocolDomain::parse(domain.as_str()), Ok(Some(d)) if d == domain));
        }
    }

    #[test]
    fn block_gating() {
        assert!(ProtocolDomain::Both.fires(SpecVersion::V1));
        assert!(ProtocolDomain::Both.fires(SpecVersion::V2));
        assert!(ProtocolDomain::Legacy.fires(SpecVersion::V1));
        assert!(!ProtocolDomain::Legacy.fires(SpecVersion::V2));
        assert!(!ProtocolDomain::QualityManagement.fires(SpecVersion::V1));
    }

    #[test]
    fn overrides_ignore_empty_values() {
        let Ok(config) = Config::from_properties(&props(&[
            ("useThisTestCase", "http://host/tc/1"),
            ("useThisTestPlan", " "),
        ])) else {
            panic!("config rejected");
        };
        assert_eq!(config.override_for("TestCase"), Some("http://host/tc/1"));
        assert_eq!(config.override_for("TestPlan"), None);
    }

    #[test]
    fn numbers_are_validated() {
        assert!(matches!(
            Config::from_properties(&props(&[("timeoutMs", "soon")])),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            Config::from_properties(&props(&[("workers", "0")])),
            Err(ConfigError::InvalidValue { .. })
        ));
        let Ok(config) = Config::from_properties(&props(&[("timeoutMs", "1500"), ("workers", "4")]))
        else {
            panic!("config rejected");
        };
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn query_string_encodes_where_clause() {
        let query = QueryParameters {
            equality_property: Some("dcterms:title".to_string()),
            equality_value: Some("a b".to_string()),
            additional: Some("&oslc.pageSize=5".to_string()),
            search_terms: None,
        };
        assert_eq!(
            query.apply("http://host/q").as_deref(),
            Ok("http://host/q?oslc.pageSize=5&oslc.where=dcterms%3Atitle%3D%22a+b%22&oslc.select=dcterms%3Atitle")
        );
        assert_eq!(
            QueryParameters::default().apply("http://host/q?x=1").as_deref(),
            Ok("http://host/q?x=1")
        );
    }

    #[test]
    fn query_values_are_escaped_as_whole_components() {
        let query = QueryParameters {
            equality_property: Some("dcterms:title".to_string()),
            equality_value: Some("R&D #1 = 100%".to_string()),
            additional: None,
            search_terms: Some("caf\u{e9} +x".to_string()),
        };
        let Ok(applied) = query.apply("http://host/q?projectId=7") else {
            panic!("base rejected");
        };
        let Ok(url) = Url::parse(&applied) else {
            panic!("result is not a URL: {applied}");
        };
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("projectId".to_string(), "7".to_string()),
                ("oslc.where".to_string(), "dcterms:title=\"R&D #1 = 100%\"".to_string()),
                ("oslc.select".to_string(), "dcterms:title".to_string()),
                ("oslc.searchTerms".to_string(), "\"caf\u{e9} +x\"".to_string()),
            ]
        );
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn relative_query_base_is_rejected_only_when_parameters_apply() {
        let query = QueryParameters {
            search_terms: Some("login".to_string()),
            ..QueryParameters::default()
        };
        assert!(matches!(
            query.apply("/qm/testcases"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert_eq!(
            QueryParameters::default().apply("/qm/testcases").as_deref(),
            Ok("/qm/testcases")
        );
    }

    #[test]
    fn reads_flat_toml() {
        let dir = std::env::temp_dir().join(format!("oslc-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).ok();
        let template = dir.join("create.xml");
        std::fs::write(&template, b"<rdf:RDF/>").ok();
        let file = dir.join("run.toml");
        std::fs::write(
            &file,
            "testVersions = \"CM\"\nsupportJSON = false\nworkers = 2\ncreateTemplateRdfXmlFile = \"create.xml\"\n",
        )
        .ok();

        let config = Config::load(&file);
        let Ok(config) = config else {
            panic!("config rejected: {config:?}");
        };
        assert_eq!(config.flags.protocol_domain, Some(ProtocolDomain::ChangeManagement));
        assert!(!config.flags.support_json);
        assert_eq!(config.workers, 2);
        assert_eq!(
            config.creation_templates.get(&Format::RdfXmlAbbrev).map(Vec::as_slice),
            Some(&b"<rdf:RDF/>"[..])
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn password_is_redacted() {
        let creds = Credentials {
            user: "alice".to_string(),
            password: "secret".to_string(),
        };
        assert!(!format!("{creds:?}").contains("secret"));
    }
}
