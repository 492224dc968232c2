//! Error taxonomy of the conformance engine.
//!
//! Each error type maps to one containment boundary: configuration errors
//! abort the run, discovery errors abort one group, fetch and parse errors
//! abort one execution unit, lookup errors affect one constraint.

use std::path::PathBuf;

use thiserror::Error;

/// Malformed or contradictory configuration. Surfaces before any suite runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `testVersions` names a domain outside the closed set.
    #[error("unknown testVersions value '{0}'")]
    UnknownDomain(String),
    /// A numeric key holds a non-numeric value.
    #[error("key '{key}' expects a number, got '{value}'")]
    InvalidNumber {
        /// Offending key.
        key: String,
        /// Offending value.
        value: String,
    },
    /// A key holds a value the engine cannot use.
    #[error("key '{key}' is invalid: {reason}")]
    InvalidValue {
        /// Offending key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// A file named by the configuration could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML.
    #[error("cannot parse {}: {source}", path.display())]
    Toml {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },
    /// The HTTP client could not be constructed from the settings.
    #[error("cannot build HTTP client: {0}")]
    HttpClient(String),
}

/// Network retrieval failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection refused, DNS failure, TLS failure, and the like.
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Requested address.
        url: String,
        /// Transport diagnostic.
        message: String,
    },
    /// The per-request deadline elapsed.
    #[error("request to {url} timed out")]
    Timeout {
        /// Requested address.
        url: String,
    },
    /// The server answered with a non-success status.
    #[error("request to {url} returned HTTP {status}")]
    Status {
        /// Requested address.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The address cannot be parsed as an absolute URL.
    #[error("invalid address {url}: {reason}")]
    InvalidUrl {
        /// Offending address.
        url: String,
        /// Parser diagnostic.
        reason: String,
    },
}

/// A payload could not be turned into a bound representation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The payload is malformed for its declared syntax.
    #[error("malformed {syntax} payload from {url}: {message}")]
    Syntax {
        /// Source address.
        url: String,
        /// Syntax the payload was parsed as.
        syntax: &'static str,
        /// Parser diagnostic.
        message: String,
    },
    /// No adapter handles the response content type.
    #[error("unsupported content type '{content_type}' from {url}")]
    UnsupportedContentType {
        /// Source address.
        url: String,
        /// Declared content type.
        content_type: String,
    },
    /// The payload parsed but holds no node for the requested resource.
    #[error("no {type_name} node for {url}")]
    ResourceNotFound {
        /// Source address.
        url: String,
        /// Qualified resource type that was searched for.
        type_name: String,
    },
}

/// A property lookup failed structurally (as opposed to finding zero values).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The name has no `prefix:` part or an empty local part.
    #[error("'{0}' is not a prefix-qualified name")]
    InvalidName(String),
    /// The prefix is not in the domain's table.
    #[error("prefix of '{0}' is not declared")]
    UnknownPrefix(String),
    /// The values under the property cannot be read.
    #[error("malformed value under '{property}': {reason}")]
    Malformed {
        /// Property being looked up.
        property: String,
        /// What was wrong.
        reason: String,
    },
}

/// Catalog, provider, or query capability unreachable or unparsable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    /// No `baseUri` configured and the group needs the catalog.
    #[error("no baseUri configured")]
    MissingBaseUri,
    /// A discovery document could not be retrieved.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// A discovery document could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A discovery document is structurally unusable.
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// A discovery document lacks the node traversal starts from.
    #[error("{0}")]
    Unusable(String),
}

impl From<UnitError> for DiscoveryError {
    fn from(err: UnitError) -> Self {
        match err {
            UnitError::Fetch(e) => DiscoveryError::Fetch(e),
            UnitError::Parse(e) => DiscoveryError::Parse(e),
            UnitError::Setup(message) => DiscoveryError::Unusable(message),
        }
    }
}

/// Failure that terminates a single execution unit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnitError {
    /// Retrieval failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Parsing or binding failed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The unit cannot run with the current configuration.
    #[error("{0}")]
    Setup(String),
}
