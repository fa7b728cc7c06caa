//! Loop reversal.

use super::{comps_list, per_computation, BoundAction, Rendering};
use crate::tree::{IteratorTree, PerRoot};
use crate::utils::errors::LookupError;
use crate::utils::ident::Ident;

/// Every iterator, grouped under its root in section order.
pub fn candidates(tree: &IteratorTree) -> Result<PerRoot<Ident>, LookupError> {
    Ok(tree
        .candidate_sections()?
        .into_iter()
        .map(|(root, sections)| (root, sections.into_iter().flatten().collect()))
        .collect())
}

pub(crate) fn render(levels: &[usize], comps: &[Ident]) -> Rendering {
    let level = levels[0];
    Rendering {
        // Statements are followed by a tab so the transcript stays indented
        // inside the generated function body.
        directives: per_computation(comps, &format!("loop_reversal({})", level), "\n\t"),
        summary: format!("R(L{},comps={})", level, comps_list(comps)),
        legality: None,
    }
}

/// The loop now runs from its upper bound down to its lower bound.
pub(crate) fn transform_tree(action: &BoundAction, tree: &mut IteratorTree) -> Result<(), LookupError> {
    let id = &action.loops()[0];
    let node = tree.node(id)?;
    let (lower, upper) = (node.lower_bound, node.upper_bound);
    tree.set_bounds(id, upper, lower)
}
