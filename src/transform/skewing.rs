//! Loop skewing.
//!
//! Skewing takes two loops of a perfect nest and two integer factors:
//!
//! ```text
//! for i = 0 to N:                 for i = 0 to N:
//!   for j = 0 to M:       ==>       for j' = f*i to M + f*i:
//!     S(i, j)                         S(i, j' - f*i)
//! ```
//!
//! Suitable factors depend on the program's dependences and are solved by
//! the compiling service ([`with_solved_factors`]). After skewing, the
//! bounds of both loops are no longer statically known.

use super::{comps_list, per_computation, section_pairs, Action, BoundAction, LoopRef, Rendering};
use crate::service::CompilingService;
use crate::tree::node::Bound;
use crate::tree::{IteratorTree, PerRoot};
use crate::utils::errors::{LookupError, SolverError, TreeResult};
use crate::utils::ident::Ident;
use log::debug;

/// Every pair of consecutive iterators in a candidate section.
pub fn candidates(tree: &IteratorTree) -> Result<PerRoot<(Ident, Ident)>, LookupError> {
    section_pairs(tree)
}

pub(crate) fn render(levels: &[usize], factors: &[i64], comps: &[Ident]) -> Rendering {
    let (l1, l2) = (levels[0], levels[1]);
    let (f1, f2) = (factors[0], factors[1]);
    Rendering {
        directives: per_computation(comps, &format!("skew({}, {}, {}, {})", l1, l2, f1, f2), "\n"),
        summary: format!("S(L{},L{},{},{}),comps={}", l1, l2, f1, f2, comps_list(comps)),
        legality: None,
    }
}

pub(crate) fn transform_tree(action: &BoundAction, tree: &mut IteratorTree) -> Result<(), LookupError> {
    for l in action.loops() {
        tree.set_bounds(l, Bound::Unknown, Bound::Unknown)?;
    }
    Ok(())
}

/// Build a skewing action whose factors are solved by `service`.
///
/// Fails with a [`SolverError`] when the service has no solution, which is
/// routine and should make the caller skip the candidate.
pub fn with_solved_factors(
    tree: &IteratorTree,
    outer: impl Into<LoopRef>,
    inner: impl Into<LoopRef>,
    service: &dyn CompilingService,
) -> TreeResult<Action> {
    let loops = [outer.into().resolve(tree)?, inner.into().resolve(tree)?];
    let levels = tree.iterator_levels(&loops)?;
    let comps = tree.loops_computations(&loops)?;

    match service.solve_skewing_factors(&levels, &comps)? {
        Some((f1, f2)) => {
            debug!("skewing factors for L{},L{}: ({}, {})", levels[0], levels[1], f1, f2);
            let [outer, inner] = loops;
            Ok(Action::skewing(outer, inner, f1, f2))
        }
        None => Err(SolverError::no_solution(format!(
            "no skewing factors for loops `{}` and `{}`",
            loops[0], loops[1]
        ))
        .into()),
    }
}
