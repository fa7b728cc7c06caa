//! Loop unrolling.

use super::{comps_list, per_computation, Rendering};
use crate::tree::{IteratorTree, PerRoot};
use crate::utils::errors::LookupError;
use crate::utils::ident::Ident;

/// Innermost iterators that own computations.
pub fn candidates(tree: &IteratorTree) -> Result<PerRoot<Ident>, LookupError> {
    let mut result = Vec::with_capacity(tree.roots().len());
    for root in tree.roots() {
        let mut leaves = Vec::new();
        for id in tree.subtree_iterators(root)? {
            let node = tree.node(&id)?;
            if node.is_leaf() && node.has_computations() {
                leaves.push(id);
            }
        }
        result.push((root.clone(), leaves));
    }
    Ok(result)
}

pub(crate) fn render(levels: &[usize], factors: &[i64], comps: &[Ident]) -> Rendering {
    let (level, factor) = (levels[0], factors[0]);
    Rendering {
        directives: per_computation(comps, &format!("unroll({}, {})", level, factor), "\n"),
        summary: format!("U(L{},{},comps={})", level, factor, comps_list(comps)),
        legality: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Action;
    use crate::tree::iterator_tree::tests::make_branching_tree;
    use crate::utils::ident::idents;

    #[test]
    fn test_candidates_are_leaves() {
        let tree = make_branching_tree();
        let candidates = candidates(&tree).unwrap();
        assert_eq!(candidates[0], (Ident::new("i0"), idents(["i1", "i3"])));
        assert_eq!(candidates[1], (Ident::new("j0"), idents(["j0"])));
    }

    #[test]
    fn test_render() {
        let tree = make_branching_tree();
        let bound = Action::unrolling("i1", 4).bind(&tree).unwrap();
        assert_eq!(bound.directives(), "comp00.unroll(1, 4);\ncomp01.unroll(1, 4);\n");
        assert_eq!(bound.summary(), "U(L1,4,comps=[comp00,comp01])");
    }
}
