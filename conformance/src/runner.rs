//! Suite runner: compose, locate, expand, execute, aggregate.

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ConfigError;
use crate::expander::{expand, ExecutionUnit};
use crate::fetcher::Fetcher;
use crate::locator::Locator;
use crate::report::{ConformanceReport, Verdict};
use crate::suite::{compose, TestGroupSpec};
use crate::transport::{ReqwestTransport, Transport};

/// Drives a configured suite against one transport.
pub struct Engine<'a> {
    config: &'a Config,
    transport: &'a dyn Transport,
    pool: Option<ThreadPool>,
}

impl<'a> Engine<'a> {
    /// Creates an engine. With more than one worker, units of a group run on
    /// a dedicated pool of that size.
    #[must_use]
    pub fn new(config: &'a Config, transport: &'a dyn Transport) -> Self {
        let pool = (config.workers > 1)
            .then(|| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(config.workers)
                    .thread_name(|i| format!("oslc-unit-{i}"))
                    .build()
            })
            .and_then(|built| match built {
                Ok(pool) => Some(pool),
                Err(err) => {
                    warn!(error = %err, "cannot start worker pool; running units sequentially");
                    None
                }
            });
        Self {
            config,
            transport,
            pool,
        }
    }

    fn fetcher(&self) -> Fetcher<'a> {
        Fetcher::new(self.transport)
    }

    /// Groups the configured flags select, in execution order.
    #[must_use]
    pub fn plan(&self) -> Vec<TestGroupSpec> {
        compose(&self.config.flags)
    }

    /// Runs the composed suite.
    #[must_use]
    pub fn run(&self) -> ConformanceReport {
        self.run_groups(&self.plan())
    }

    /// Runs `groups` in order.
    ///
    /// A discovery failure is recorded as a diagnostic for its group and the
    /// run moves on; a group with no instances is listed as empty.
    #[must_use]
    pub fn run_groups(&self, groups: &[TestGroupSpec]) -> ConformanceReport {
        let mut report = ConformanceReport::new();
        let locator = Locator::new(self.config, self.fetcher());
        for group in groups {
            let label = group.label();
            info!(group = %label, "running group");
            let mut addresses = match locator.locate(group) {
                Ok(addresses) => addresses,
                Err(err) => {
                    warn!(group = %label, error = %err, "discovery failed");
                    report.diagnose(label, err.to_string());
                    continue;
                }
            };
            if self.config.run_only_once {
                addresses.truncate(1);
            }
            if addresses.is_empty() {
                info!(group = %label, "no instances discovered");
                report.empty_groups.push(label);
                continue;
            }
            report.extend(self.execute(group, addresses));
        }
        report
    }

    /// Executes one unit per address and returns the verdicts in address
    /// order, regardless of worker count.
    #[must_use]
    pub fn execute(&self, group: &TestGroupSpec, addresses: Vec<String>) -> Vec<Verdict> {
        let units = expand(group, addresses);
        let fetcher = self.fetcher();
        let run = |unit: &ExecutionUnit<'_>| unit.execute(fetcher, self.config);
        let per_unit: Vec<Vec<Verdict>> = match &self.pool {
            Some(pool) => pool.install(|| units.par_iter().map(run).collect()),
            None => units.iter().map(run).collect(),
        };
        per_unit.into_iter().flatten().collect()
    }
}

/// Runs the configured suite over HTTP.
///
/// # Errors
///
/// Returns [`ConfigError`] when the HTTP client cannot be built.
pub fn run(config: &Config) -> Result<ConformanceReport, ConfigError> {
    let transport = ReqwestTransport::from_config(config)?;
    Ok(Engine::new(config, &transport).run())
}
