//! Loop parallelization.
//!
//! Tags one loop level as parallel for every computation it encloses.

use super::{comps_list, per_computation, Rendering};
use crate::tree::{IteratorTree, PerRoot};
use crate::utils::errors::LookupError;
use crate::utils::ident::Ident;

/// Candidate groups for each root.
///
/// The root alone is the first group. Then every node with children, in
/// pre-order, contributes its full child list: siblings are alternatives,
/// so a search picks at most one loop per group.
pub fn candidates(tree: &IteratorTree) -> Result<PerRoot<Vec<Ident>>, LookupError> {
    let mut result = Vec::with_capacity(tree.roots().len());
    for root in tree.roots() {
        let mut groups = vec![vec![root.clone()]];
        child_groups(tree, root, &mut groups)?;
        result.push((root.clone(), groups));
    }
    Ok(result)
}

fn child_groups(tree: &IteratorTree, id: &Ident, groups: &mut Vec<Vec<Ident>>) -> Result<(), LookupError> {
    let node = tree.node(id)?;
    if node.children.is_empty() {
        return Ok(());
    }
    groups.push(node.children.clone());
    for child in &node.children {
        child_groups(tree, child, groups)?;
    }
    Ok(())
}

pub(crate) fn render(levels: &[usize], comps: &[Ident]) -> Rendering {
    let level = levels[0];
    let directives = per_computation(comps, &format!("tag_parallel_level({})", level), "\n");
    let refs: Vec<String> = comps.iter().map(|c| format!("&{}", c)).collect();
    let legality = format!(
        "prepare_schedules_for_legality_checks(true);\n    is_legal &= loop_parallelization_is_legal({}, {{{}}});\n    {}",
        level,
        refs.join(", "),
        directives
    );
    Rendering {
        summary: format!("P(L{},comps={})", level, comps_list(comps)),
        directives,
        legality: Some(legality),
    }
}
