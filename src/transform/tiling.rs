//! Two-dimensional loop tiling.
//!
//! Tiling (also called blocking) splits two adjacent loops into tile and
//! point loops so each tile's data fits in cache:
//!
//! ```text
//! for i = 0 to N:                 for ii = 0 to N step Ti:
//!   for j = 0 to M:       ==>       for jj = 0 to M step Tj:
//!     S(i, j)                         for i = ii to min(ii + Ti, N):
//!                                       for j = jj to min(jj + Tj, M):
//!                                         S(i, j)
//! ```
//!
//! The new loops are created by the code generator; the tree is left as is.

use super::{comps_list, per_computation, section_pairs, Rendering};
use crate::tree::{IteratorTree, PerRoot};
use crate::utils::errors::LookupError;
use crate::utils::ident::Ident;

/// Every pair of consecutive iterators in a candidate section.
pub fn candidates(tree: &IteratorTree) -> Result<PerRoot<(Ident, Ident)>, LookupError> {
    section_pairs(tree)
}

pub(crate) fn render(levels: &[usize], factors: &[i64], comps: &[Ident]) -> Rendering {
    let (l1, l2) = (levels[0], levels[1]);
    let (t1, t2) = (factors[0], factors[1]);
    Rendering {
        directives: per_computation(comps, &format!("tile({}, {}, {}, {})", l1, l2, t1, t2), "\n"),
        summary: format!("T2(L{},L{},{},{},comps={})", l1, l2, t1, t2, comps_list(comps)),
        legality: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Action;
    use crate::tree::iterator_tree::tests::make_chain_tree;
    use crate::utils::errors::LoopTreeError;

    #[test]
    fn test_render() {
        let tree = make_chain_tree();
        let bound = Action::tiling_2d("i1", "i2", 32, 16).bind(&tree).unwrap();
        assert_eq!(bound.directives(), "comp00.tile(1, 2, 32, 16);\n");
        assert_eq!(bound.summary(), "T2(L1,L2,32,16,comps=[comp00])");
    }

    #[test]
    fn test_zero_tile_size_rejected() {
        let tree = make_chain_tree();
        let err = Action::tiling_2d("i1", "i2", 0, 16).bind(&tree).unwrap_err();
        assert!(matches!(err, LoopTreeError::CannotApply(_)));
    }

    #[test]
    fn test_tree_untouched() {
        let mut tree = make_chain_tree();
        let before = tree.clone();
        let bound = Action::tiling_2d("i0", "i1", 8, 8).bind(&tree).unwrap();
        bound.apply_tree_effect(&mut tree).unwrap();
        assert_eq!(tree, before);
        assert_eq!(candidates(&tree).unwrap()[0].1.len(), 2);
    }
}
