//! Conformance report types: verdicts, outcomes, and report aggregation.

use oslc_spec::PropertyConstraint;
use serde::Serialize;

/// Outcome of a single conformance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// The check passed.
    Pass,
    /// The instance violates the check (a normal, expected outcome).
    Fail,
    /// The check could not be evaluated.
    Error,
}

impl Outcome {
    /// Label used in text reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Pass => "PASS",
            Outcome::Fail => "FAIL",
            Outcome::Error => "ERROR",
        }
    }
}

/// A single verdict for one constraint (or one unit) on one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Label of the test group that produced this verdict.
    pub group: String,
    /// Address of the instance under test.
    pub address: String,
    /// Constraint evaluated, or `None` for unit-level verdicts.
    pub constraint: Option<PropertyConstraint>,
    /// Outcome of the check.
    pub outcome: Outcome,
    /// Number of values observed, when a lookup ran.
    pub observed: Option<usize>,
    /// Human-readable detail.
    pub detail: String,
}

impl Verdict {
    /// Creates a passing constraint verdict.
    pub fn pass(
        group: impl Into<String>,
        address: impl Into<String>,
        constraint: PropertyConstraint,
        observed: usize,
    ) -> Self {
        Self {
            group: group.into(),
            address: address.into(),
            detail: format!(
                "{} has {} value(s), within {}",
                constraint.property,
                observed,
                constraint.range_label()
            ),
            constraint: Some(constraint),
            outcome: Outcome::Pass,
            observed: Some(observed),
        }
    }

    /// Creates a failing constraint verdict.
    pub fn fail(
        group: impl Into<String>,
        address: impl Into<String>,
        constraint: PropertyConstraint,
        observed: usize,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            address: address.into(),
            constraint: Some(constraint),
            outcome: Outcome::Fail,
            observed: Some(observed),
            detail: detail.into(),
        }
    }

    /// Creates an error verdict, optionally tied to a constraint.
    pub fn error(
        group: impl Into<String>,
        address: impl Into<String>,
        constraint: Option<PropertyConstraint>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            address: address.into(),
            constraint,
            outcome: Outcome::Error,
            observed: None,
            detail: detail.into(),
        }
    }

    /// Creates a unit-level verdict with no constraint attached.
    pub fn unit(
        group: impl Into<String>,
        address: impl Into<String>,
        outcome: Outcome,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            address: address.into(),
            constraint: None,
            outcome,
            observed: None,
            detail: detail.into(),
        }
    }

    /// Returns true unless the outcome is [`Outcome::Pass`].
    pub fn is_failure(&self) -> bool {
        self.outcome != Outcome::Pass
    }
}

/// A discovery problem that cost a group its instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Label of the affected group.
    pub group: String,
    /// What went wrong.
    pub message: String,
}

/// Aggregated conformance report from all groups.
#[derive(Debug, Default, Serialize)]
pub struct ConformanceReport {
    /// Verdicts in group order, then address order.
    pub verdicts: Vec<Verdict>,
    /// Discovery diagnostics, in group order.
    pub diagnostics: Vec<Diagnostic>,
    /// Groups that discovered no instances.
    pub empty_groups: Vec<String>,
}

impl ConformanceReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a verdict to this report.
    pub fn push(&mut self, verdict: Verdict) {
        self.verdicts.push(verdict);
    }

    /// Appends verdicts in order.
    pub fn extend(&mut self, verdicts: impl IntoIterator<Item = Verdict>) {
        self.verdicts.extend(verdicts);
    }

    /// Records a discovery diagnostic.
    pub fn diagnose(&mut self, group: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            group: group.into(),
            message: message.into(),
        });
    }

    /// Returns the count of verdicts with the given outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.verdicts.iter().filter(|v| v.outcome == outcome).count()
    }

    /// Returns the count of non-passing verdicts.
    pub fn failure_count(&self) -> usize {
        self.verdicts.iter().filter(|v| v.is_failure()).count()
    }

    /// Returns true if every verdict passed and discovery raised no diagnostic.
    pub fn all_passed(&self) -> bool {
        self.failure_count() == 0 && self.diagnostics.is_empty()
    }
}
