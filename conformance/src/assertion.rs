//! Cardinality assertion engine.

use oslc_spec::PropertyConstraint;

use crate::report::Verdict;
use crate::representation::PropertyLookup;

/// Identifies the unit a set of verdicts belongs to.
#[derive(Debug, Clone, Copy)]
pub struct AssertionContext<'a> {
    /// Group label.
    pub group: &'a str,
    /// Address of the instance.
    pub address: &'a str,
}

/// Evaluates every constraint against `lookup`, one verdict each, in order.
///
/// A constraint passes iff `min <= n <= max` where `n` is the number of
/// values found. A failed lookup yields an `Error` verdict for that
/// constraint only.
pub fn assert_constraints(
    lookup: &dyn PropertyLookup,
    constraints: &[PropertyConstraint],
    ctx: AssertionContext<'_>,
) -> Vec<Verdict> {
    constraints
        .iter()
        .map(|constraint| match lookup.lookup(constraint.property) {
            Ok(values) => {
                let observed = values.len();
                if constraint.admits(observed) {
                    Verdict::pass(ctx.group, ctx.address, *constraint, observed)
                } else {
                    Verdict::fail(
                        ctx.group,
                        ctx.address,
                        *constraint,
                        observed,
                        violation(constraint, observed),
                    )
                }
            }
            Err(err) => Verdict::error(ctx.group, ctx.address, Some(*constraint), err.to_string()),
        })
        .collect()
}

fn violation(constraint: &PropertyConstraint, observed: usize) -> String {
    let below_min = u64::try_from(observed).unwrap_or(u64::MAX) < u64::from(constraint.min);
    let bound = if below_min {
        format!("minimum {}", constraint.min)
    } else {
        match constraint.max {
            Some(max) => format!("maximum {max}"),
            None => "no maximum".to_string(),
        }
    };
    format!(
        "{} has {} value(s); violates {} of {}",
        constraint.property,
        observed,
        bound,
        constraint.range_label()
    )
}
