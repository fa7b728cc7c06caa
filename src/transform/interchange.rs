//! Loop interchange.
//!
//! Interchange swaps two loops of a perfect nest:
//!
//! ```text
//! for i = 0 to N:                 for j = 0 to M:
//!   for j = 0 to M:       ==>       for i = 0 to N:
//!     S(i, j)                         S(i, j)
//! ```

use super::{comps_list, per_computation, BoundAction, Rendering};
use crate::tree::{IteratorTree, PerRoot};
use crate::utils::errors::LookupError;
use crate::utils::ident::Ident;

/// Every pair of iterators inside the same candidate section.
pub fn candidates(tree: &IteratorTree) -> Result<PerRoot<(Ident, Ident)>, LookupError> {
    Ok(tree
        .candidate_sections()?
        .into_iter()
        .map(|(root, sections)| {
            let mut pairs = Vec::new();
            for section in sections.iter().filter(|s| s.len() > 1) {
                for (i, a) in section.iter().enumerate() {
                    for b in &section[i + 1..] {
                        pairs.push((a.clone(), b.clone()));
                    }
                }
            }
            (root, pairs)
        })
        .collect())
}

pub(crate) fn render(levels: &[usize], comps: &[Ident]) -> Rendering {
    let (l1, l2) = (levels[0], levels[1]);
    Rendering {
        directives: per_computation(comps, &format!("interchange({}, {})", l1, l2), "\n"),
        summary: format!("I(L{},L{},comps={})", l1, l2, comps_list(comps)),
        legality: None,
    }
}

/// The two loop positions exchange their iteration ranges.
pub(crate) fn transform_tree(action: &BoundAction, tree: &mut IteratorTree) -> Result<(), LookupError> {
    let (a, b) = (&action.loops()[0], &action.loops()[1]);
    let (a_lower, a_upper) = {
        let n = tree.node(a)?;
        (n.lower_bound, n.upper_bound)
    };
    let (b_lower, b_upper) = {
        let n = tree.node(b)?;
        (n.lower_bound, n.upper_bound)
    };
    tree.set_bounds(a, b_lower, b_upper)?;
    tree.set_bounds(b, a_lower, a_upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Action;
    use crate::tree::iterator_tree::tests::make_chain_tree;
    use crate::tree::node::Bound;

    #[test]
    fn test_candidates_all_pairs() {
        let tree = make_chain_tree();
        let pairs = &candidates(&tree).unwrap()[0].1;
        assert_eq!(pairs.len(), 3);
        assert!(pairs.contains(&(Ident::new("i0"), Ident::new("i2"))));
    }

    #[test]
    fn test_render() {
        let tree = make_chain_tree();
        let bound = Action::interchange("i0", "i2").bind(&tree).unwrap();
        assert_eq!(bound.directives(), "comp00.interchange(0, 2);\n");
        assert_eq!(bound.summary(), "I(L0,L2,comps=[comp00])");
    }

    #[test]
    fn test_transform_tree() {
        let mut tree = make_chain_tree();
        let bound = Action::interchange("i0", "i1").bind(&tree).unwrap();
        bound.apply_tree_effect(&mut tree).unwrap();
        assert_eq!(tree.node(&"i0".into()).unwrap().upper_bound, Bound::Known(20));
        assert_eq!(tree.node(&"i1".into()).unwrap().upper_bound, Bound::Known(10));
    }
}
