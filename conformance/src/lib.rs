//! OSLC provider conformance engine.
//!
//! A run composes test groups from feature flags, discovers instance
//! addresses through the provider's service catalog, fetches each instance
//! in the group's serialization and checks every property against the
//! cardinality bounds declared in [`oslc_spec`].
//!
//! # Pipeline
//!
//! | Stage | Module |
//! |-------|--------|
//! | Suite composition | [`suite`] |
//! | Discovery | [`locator`] |
//! | Unit expansion | [`expander`] |
//! | Fetch and parse | [`fetcher`], [`representation`] |
//! | Cardinality checks | [`assertion`] |
//! | Aggregation | [`runner`], [`report`] |
//!
//! # Entry Point
//!
//! ```no_run
//! use oslc_conformance::{run, Config};
//! use std::path::Path;
//!
//! let config = Config::load(Path::new("oslc.toml")).expect("config");
//! let report = run(&config).expect("http client");
//! assert!(report.all_passed());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod assertion;
pub mod config;
pub mod error;
pub mod expander;
pub mod fetcher;
pub mod locator;
pub mod report;
pub mod representation;
pub mod runner;
pub mod suite;
pub mod transport;

pub use config::{Config, FeatureFlags, ProtocolDomain};
pub use error::{ConfigError, DiscoveryError, FetchError, LookupError, ParseError, UnitError};
pub use report::{ConformanceReport, Diagnostic, Outcome, Verdict};
pub use runner::{run, Engine};
pub use suite::{compose, TestGroupSpec};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
