//! `oslc-conformance`: checks an OSLC provider against the built-in
//! cardinality constraints.
//!
//! **Usage:**
//! ```text
//! oslc-conformance run --config oslc.toml [--base-uri <url>] [--test-versions <domain>]
//!                      [--workers <n>] [--json] [--require-instances] [--verbose]
//! oslc-conformance plan --config oslc.toml
//! oslc-conformance shapes [--domain <domain>]
//! ```
//!
//! `run` exits non-zero if any check fails or errors, or if discovery failed
//! for a group.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use oslc_conformance::{Config, ConformanceReport, Engine, Outcome, ProtocolDomain, ReqwestTransport};
use oslc_spec::serializer::turtle;
use oslc_spec::{DomainId, Vocabulary};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Run the OSLC provider conformance suite.
#[derive(Parser)]
#[command(
    name = "oslc-conformance",
    about = "Check an OSLC provider against the OSLC cardinality constraints"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Discover instances and check them.
    Run(RunArgs),
    /// Print the test groups the configuration selects.
    Plan(ConfigArgs),
    /// Print the built-in constraints as OSLC resource shapes (Turtle).
    Shapes {
        /// Restrict to one domain, spelled as for `testVersions`.
        #[arg(long)]
        domain: Option<String>,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// TOML file of flat configuration keys.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Catalog address; overrides `baseUri`.
    #[arg(long)]
    base_uri: Option<String>,

    /// Domain under test; overrides `testVersions`.
    #[arg(long)]
    test_versions: Option<String>,

    /// Worker count; overrides `workers`.
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Print the report as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Treat groups that discovered no instances as failures.
    #[arg(long)]
    require_instances: bool,

    /// Log group progress.
    #[arg(long, short)]
    verbose: bool,
}

impl ConfigArgs {
    fn load(&self) -> Result<Config> {
        let mut properties = match &self.config {
            Some(path) => Config::read_properties(path)
                .with_context(|| format!("Failed to read configuration: {}", path.display()))?,
            None => BTreeMap::new(),
        };
        if let Some(base_uri) = &self.base_uri {
            properties.insert("baseUri".to_string(), base_uri.clone());
        }
        if let Some(domain) = &self.test_versions {
            properties.insert("testVersions".to_string(), domain.clone());
        }
        if let Some(workers) = self.workers {
            properties.insert("workers".to_string(), workers.to_string());
        }
        Config::from_properties(&properties).context("Invalid configuration")
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(&args),
        Command::Plan(args) => {
            init_logging(false);
            plan(&args)
        }
        Command::Shapes { domain } => shapes(domain.as_deref()),
    }
}

fn run(args: &RunArgs) -> Result<()> {
    init_logging(args.verbose);
    let config = args.config.load()?;
    if config.flags.protocol_domain.is_none() {
        bail!("No testVersions configured; nothing to run");
    }
    let transport = ReqwestTransport::from_config(&config).context("Failed to build HTTP client")?;
    tracing::info!(
        base_uri = config.base_uri.as_deref().unwrap_or("<unset>"),
        workers = config.workers,
        "starting conformance run"
    );
    let report = Engine::new(&config, &transport).run();

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
    } else {
        print_report(&report);
    }

    let missing = args.require_instances && !report.empty_groups.is_empty();
    if !report.all_passed() || missing {
        eprintln!(
            "Conformance FAILED: {} check(s) did not pass, {} group(s) not discovered.",
            report.failure_count(),
            report.diagnostics.len() + if missing { report.empty_groups.len() } else { 0 }
        );
        process::exit(1);
    }
    if !args.json {
        println!("Conformance PASSED.");
    }
    Ok(())
}

fn print_report(report: &ConformanceReport) {
    println!("OSLC Conformance Report");
    println!("=======================");
    println!();

    for verdict in &report.verdicts {
        println!(
            "[{}] {} {}: {}",
            verdict.outcome.as_str(),
            verdict.group,
            verdict.address,
            verdict.detail
        );
    }
    for diagnostic in &report.diagnostics {
        println!("[ERROR] {}: discovery failed: {}", diagnostic.group, diagnostic.message);
    }
    for group in &report.empty_groups {
        println!("[SKIP] {group}: no instances discovered");
    }

    println!();
    println!(
        "Summary: {} passed, {} failed, {} errors, {} discovery failures, {} empty groups",
        report.count(Outcome::Pass),
        report.count(Outcome::Fail),
        report.count(Outcome::Error),
        report.diagnostics.len(),
        report.empty_groups.len()
    );
}

fn plan(args: &ConfigArgs) -> Result<()> {
    let config = args.load()?;
    let groups = oslc_conformance::compose(&config.flags);
    if groups.is_empty() {
        println!("No groups selected (testVersions unset?).");
    }
    for group in &groups {
        println!(
            "{:<48} {:>3} constraint(s)  via {:?}",
            group.label(),
            group.constraints.len(),
            group.discovery
        );
    }
    Ok(())
}

/// Vocabulary modules a `testVersions` spelling covers.
fn modules_for(domain: ProtocolDomain) -> &'static [DomainId] {
    match domain {
        ProtocolDomain::Legacy => &[DomainId::LegacyChangeManagement],
        ProtocolDomain::Core => &[DomainId::Core],
        ProtocolDomain::ChangeManagement => &[DomainId::ChangeManagement],
        ProtocolDomain::QualityManagement => &[DomainId::QualityManagement],
        ProtocolDomain::RequirementsManagement => &[DomainId::RequirementsManagement],
        ProtocolDomain::Asset => &[DomainId::Asset],
        ProtocolDomain::Automation => &[DomainId::Automation],
        ProtocolDomain::PerformanceMonitoring => &[DomainId::PerformanceMonitoring],
        ProtocolDomain::Both => &[DomainId::LegacyChangeManagement, DomainId::ChangeManagement],
    }
}

fn shapes(domain: Option<&str>) -> Result<()> {
    let vocabulary = Vocabulary::full();
    let Some(name) = domain else {
        print!("{}", turtle::to_turtle(vocabulary));
        return Ok(());
    };
    let Some(selected) = ProtocolDomain::parse(name).context("Unknown domain")? else {
        bail!("Empty --domain");
    };
    for id in modules_for(selected) {
        let module = vocabulary
            .domain(*id)
            .with_context(|| format!("Domain {id:?} missing from the vocabulary"))?;
        print!("{}", turtle::domain_to_turtle(module));
    }
    Ok(())
}
