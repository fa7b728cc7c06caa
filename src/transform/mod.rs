//! Loop-schedule transformations over an [`IteratorTree`].
//!
//! The set of transformation kinds is closed ([`ActionKind`]). An [`Action`]
//! is a kind plus raw parameters; binding it to a tree checks the parameter
//! shape, resolves the loops, derives the affected computations and renders
//! the directive text. The result is an immutable [`BoundAction`] that a
//! [`Schedule`](crate::schedule::Schedule) can record.
//!
//! Each kind lives in its own module with its candidate enumeration,
//! rendering and (where it has one) tree effect.

pub mod interchange;
pub mod parallelization;
pub mod reversal;
pub mod skewing;
pub mod tiling;
pub mod unrolling;

use crate::tree::{IteratorTree, PerRoot};
use crate::utils::errors::{CannotApplyError, LookupError, TreeResult};
use crate::utils::ident::Ident;
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transformation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActionKind {
    Skewing,
    Parallelization,
    Reversal,
    Interchange,
    Tiling2D,
    Unrolling,
}

/// What a parameter position accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamSlot {
    /// A loop
    Loop,
    /// Any integer factor
    Factor,
    /// A factor greater than zero
    PositiveFactor,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        ActionKind::Skewing,
        ActionKind::Parallelization,
        ActionKind::Reversal,
        ActionKind::Interchange,
        ActionKind::Tiling2D,
        ActionKind::Unrolling,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Skewing => "skewing",
            ActionKind::Parallelization => "parallelization",
            ActionKind::Reversal => "reversal",
            ActionKind::Interchange => "interchange",
            ActionKind::Tiling2D => "tiling2d",
            ActionKind::Unrolling => "unrolling",
        }
    }

    /// Expected parameter layout.
    pub fn shape(&self) -> &'static [ParamSlot] {
        use ParamSlot::*;
        match self {
            ActionKind::Skewing => &[Loop, Loop, Factor, Factor],
            ActionKind::Parallelization => &[Loop],
            ActionKind::Reversal => &[Loop],
            ActionKind::Interchange => &[Loop, Loop],
            ActionKind::Tiling2D => &[Loop, Loop, PositiveFactor, PositiveFactor],
            ActionKind::Unrolling => &[Loop, PositiveFactor],
        }
    }

    /// Every syntactically eligible loop tuple of this kind in `tree`.
    pub fn candidates(&self, tree: &IteratorTree) -> Result<Candidates, LookupError> {
        Ok(match self {
            ActionKind::Skewing => Candidates::Pairs(skewing::candidates(tree)?),
            ActionKind::Parallelization => Candidates::Groups(parallelization::candidates(tree)?),
            ActionKind::Reversal => Candidates::Singles(reversal::candidates(tree)?),
            ActionKind::Interchange => Candidates::Pairs(interchange::candidates(tree)?),
            ActionKind::Tiling2D => Candidates::Pairs(tiling::candidates(tree)?),
            ActionKind::Unrolling => Candidates::Singles(unrolling::candidates(tree)?),
        })
    }

    /// Check that `params` fits this kind's shape.
    pub fn validate(&self, params: &[Param]) -> Result<(), CannotApplyError> {
        let shape = self.shape();
        if params.len() != shape.len() {
            return Err(CannotApplyError::new(
                *self,
                format!(
                    "{} takes {} parameters ({}), {} were given",
                    self,
                    shape.len(),
                    describe_shape(shape),
                    params.len()
                ),
            ));
        }
        for (i, (slot, param)) in shape.iter().zip(params).enumerate() {
            match (slot, param) {
                (ParamSlot::Loop, Param::Loop(_)) | (ParamSlot::Factor, Param::Factor(_)) => {}
                (ParamSlot::PositiveFactor, Param::Factor(f)) if *f > 0 => {}
                (ParamSlot::PositiveFactor, Param::Factor(f)) => {
                    return Err(CannotApplyError::new(
                        *self,
                        format!("factor {} at position {} must be positive", f, i),
                    ))
                }
                (slot, param) => {
                    return Err(CannotApplyError::new(
                        *self,
                        format!("parameter {} must be a {}, got `{}`", i, slot_name(*slot), param),
                    ))
                }
            }
        }
        Ok(())
    }
}

fn slot_name(slot: ParamSlot) -> &'static str {
    match slot {
        ParamSlot::Loop => "loop",
        ParamSlot::Factor => "factor",
        ParamSlot::PositiveFactor => "positive factor",
    }
}

fn describe_shape(shape: &[ParamSlot]) -> String {
    shape.iter().map(|s| slot_name(*s)).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown transformation `{}`", s))
    }
}

/// Candidate loop tuples for one kind, grouped by root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidates {
    /// Two-loop parameters
    Pairs(PerRoot<(Ident, Ident)>),
    /// Alternative single loops; at most one per group is meant to be picked
    Groups(PerRoot<Vec<Ident>>),
    /// Single-loop parameters
    Singles(PerRoot<Ident>),
}

impl Candidates {
    /// Total number of candidates over all roots.
    pub fn len(&self) -> usize {
        match self {
            Candidates::Pairs(c) => c.iter().map(|(_, v)| v.len()).sum(),
            Candidates::Groups(c) => c.iter().map(|(_, v)| v.len()).sum(),
            Candidates::Singles(c) => c.iter().map(|(_, v)| v.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Candidates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(ids: &[Ident]) -> String {
            ids.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
        }
        match self {
            Candidates::Pairs(per_root) => {
                for (root, pairs) in per_root {
                    let items: Vec<String> = pairs.iter().map(|(a, b)| format!("({}, {})", a, b)).collect();
                    writeln!(f, "{}: [{}]", root, items.join(", "))?;
                }
            }
            Candidates::Groups(per_root) => {
                for (root, groups) in per_root {
                    let items: Vec<String> = groups.iter().map(|g| format!("[{}]", join(g))).collect();
                    writeln!(f, "{}: [{}]", root, items.join(", "))?;
                }
            }
            Candidates::Singles(per_root) => {
                for (root, singles) in per_root {
                    writeln!(f, "{}: [{}]", root, join(singles))?;
                }
            }
        }
        Ok(())
    }
}

/// A loop named directly, or as the loop at `level` around `computation`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LoopRef {
    Iterator(Ident),
    CompLevel { computation: Ident, level: usize },
}

impl LoopRef {
    pub fn at_level(computation: impl Into<Ident>, level: usize) -> Self {
        LoopRef::CompLevel {
            computation: computation.into(),
            level,
        }
    }

    /// The iterator this reference designates in `tree`.
    pub fn resolve(&self, tree: &IteratorTree) -> Result<Ident, LookupError> {
        match self {
            LoopRef::Iterator(id) => tree.node(id).map(|n| n.id.clone()),
            LoopRef::CompLevel { computation, level } => {
                tree.iterator_at_level(computation, *level).map(|n| n.id.clone())
            }
        }
    }
}

impl fmt::Display for LoopRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopRef::Iterator(id) => write!(f, "{}", id),
            LoopRef::CompLevel { computation, level } => write!(f, "({}, {})", computation, level),
        }
    }
}

impl From<Ident> for LoopRef {
    fn from(id: Ident) -> Self {
        LoopRef::Iterator(id)
    }
}

impl From<&Ident> for LoopRef {
    fn from(id: &Ident) -> Self {
        LoopRef::Iterator(id.clone())
    }
}

impl From<&str> for LoopRef {
    fn from(s: &str) -> Self {
        LoopRef::Iterator(Ident::new(s))
    }
}

impl From<String> for LoopRef {
    fn from(s: String) -> Self {
        LoopRef::Iterator(Ident::new(s))
    }
}

/// One raw action parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Param {
    Loop(LoopRef),
    Factor(i64),
}

impl Param {
    pub fn as_loop(&self) -> Option<&LoopRef> {
        match self {
            Param::Loop(l) => Some(l),
            Param::Factor(_) => None,
        }
    }

    pub fn as_factor(&self) -> Option<i64> {
        match self {
            Param::Factor(f) => Some(*f),
            Param::Loop(_) => None,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Loop(l) => write!(f, "{}", l),
            Param::Factor(v) => write!(f, "{}", v),
        }
    }
}

impl From<LoopRef> for Param {
    fn from(l: LoopRef) -> Self {
        Param::Loop(l)
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::Loop(s.into())
    }
}

impl From<Ident> for Param {
    fn from(id: Ident) -> Self {
        Param::Loop(id.into())
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Factor(v)
    }
}

/// An unbound transformation: a kind and its raw parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    kind: ActionKind,
    params: Vec<Param>,
    comps: Option<Vec<Ident>>,
}

impl Action {
    pub fn new(kind: ActionKind, params: Vec<Param>) -> Self {
        Self {
            kind,
            params,
            comps: None,
        }
    }

    /// Name the affected computations instead of deriving them.
    pub fn with_comps<I, S>(mut self, comps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Ident>,
    {
        self.comps = Some(comps.into_iter().map(Into::into).collect());
        self
    }

    pub fn skewing(outer: impl Into<LoopRef>, inner: impl Into<LoopRef>, f1: i64, f2: i64) -> Self {
        Self::new(
            ActionKind::Skewing,
            vec![Param::Loop(outer.into()), Param::Loop(inner.into()), Param::Factor(f1), Param::Factor(f2)],
        )
    }

    pub fn parallelization(l: impl Into<LoopRef>) -> Self {
        Self::new(ActionKind::Parallelization, vec![Param::Loop(l.into())])
    }

    pub fn reversal(l: impl Into<LoopRef>) -> Self {
        Self::new(ActionKind::Reversal, vec![Param::Loop(l.into())])
    }

    pub fn interchange(a: impl Into<LoopRef>, b: impl Into<LoopRef>) -> Self {
        Self::new(ActionKind::Interchange, vec![Param::Loop(a.into()), Param::Loop(b.into())])
    }

    pub fn tiling_2d(outer: impl Into<LoopRef>, inner: impl Into<LoopRef>, t1: i64, t2: i64) -> Self {
        Self::new(
            ActionKind::Tiling2D,
            vec![Param::Loop(outer.into()), Param::Loop(inner.into()), Param::Factor(t1), Param::Factor(t2)],
        )
    }

    pub fn unrolling(l: impl Into<LoopRef>, factor: i64) -> Self {
        Self::new(ActionKind::Unrolling, vec![Param::Loop(l.into()), Param::Factor(factor)])
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn comps(&self) -> Option<&[Ident]> {
        self.comps.as_deref()
    }

    /// Check the parameter shape and that every loop exists in `tree`.
    pub fn validate(&self, tree: &IteratorTree) -> TreeResult<()> {
        self.resolve(tree).map(|_| ())
    }

    fn resolve(&self, tree: &IteratorTree) -> TreeResult<(Vec<Ident>, Vec<i64>)> {
        self.kind.validate(&self.params)?;
        let loops = self
            .params
            .iter()
            .filter_map(Param::as_loop)
            .map(|l| l.resolve(tree))
            .collect::<Result<Vec<_>, _>>()?;
        let factors: Vec<i64> = self.params.iter().filter_map(Param::as_factor).collect();
        if loops.len() == 2 && loops[0] == loops[1] {
            return Err(CannotApplyError::new(
                self.kind,
                format!("both loops resolve to `{}`", loops[0]),
            )
            .into());
        }
        Ok((loops, factors))
    }

    /// Validate against `tree`, derive the affected computations and render
    /// the directive text.
    pub fn bind(&self, tree: &IteratorTree) -> TreeResult<BoundAction> {
        let (loops, factors) = self.resolve(tree)?;
        let levels = tree.iterator_levels(&loops)?;
        let comps = match &self.comps {
            Some(explicit) => tree.ordered(explicit.iter().cloned())?,
            None => tree.loops_computations(&loops)?,
        };
        if comps.is_empty() {
            return Err(CannotApplyError::new(self.kind, "no computations are affected").into());
        }

        let rendering = match self.kind {
            ActionKind::Skewing => skewing::render(&levels, &factors, &comps),
            ActionKind::Parallelization => parallelization::render(&levels, &comps),
            ActionKind::Reversal => reversal::render(&levels, &comps),
            ActionKind::Interchange => interchange::render(&levels, &comps),
            ActionKind::Tiling2D => tiling::render(&levels, &factors, &comps),
            ActionKind::Unrolling => unrolling::render(&levels, &factors, &comps),
        };
        trace!("bound {}", rendering.summary);

        Ok(BoundAction {
            kind: self.kind,
            params: self.params.clone(),
            loops,
            levels,
            factors,
            comps,
            directives: rendering.directives,
            summary: rendering.summary,
            legality: rendering.legality,
        })
    }
}

/// Text produced for one bound action.
pub(crate) struct Rendering {
    pub directives: String,
    pub summary: String,
    pub legality: Option<String>,
}

/// `[c0,c1]`
pub(crate) fn comps_list(comps: &[Ident]) -> String {
    let names: Vec<String> = comps.iter().map(|c| c.to_string()).collect();
    format!("[{}]", names.join(","))
}

/// One `<comp>.<call><terminator>` statement per computation.
pub(crate) fn per_computation(comps: &[Ident], call: &str, terminator: &str) -> String {
    comps
        .iter()
        .map(|c| format!("{}.{};{}", c, call, terminator))
        .collect()
}

/// A transformation bound to a tree snapshot. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundAction {
    kind: ActionKind,
    params: Vec<Param>,
    loops: Vec<Ident>,
    levels: Vec<usize>,
    factors: Vec<i64>,
    comps: Vec<Ident>,
    directives: String,
    summary: String,
    legality: Option<String>,
}

impl BoundAction {
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Resolved loop iterators, in parameter order.
    pub fn loops(&self) -> &[Ident] {
        &self.loops
    }

    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    pub fn factors(&self) -> &[i64] {
        &self.factors
    }

    /// Affected computations in absolute order.
    pub fn comps(&self) -> &[Ident] {
        &self.comps
    }

    /// Directive text for the code generator.
    pub fn directives(&self) -> &str {
        &self.directives
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Text to splice into a legality-check program. Kinds without special
    /// legality handling contribute their directives.
    pub fn legality_text(&self) -> &str {
        self.legality.as_deref().unwrap_or(&self.directives)
    }

    /// Apply this action's structural effect on `tree`, if it has one.
    pub fn apply_tree_effect(&self, tree: &mut IteratorTree) -> Result<(), LookupError> {
        match self.kind {
            ActionKind::Skewing => skewing::transform_tree(self, tree),
            ActionKind::Reversal => reversal::transform_tree(self, tree),
            ActionKind::Interchange => interchange::transform_tree(self, tree),
            ActionKind::Parallelization | ActionKind::Tiling2D | ActionKind::Unrolling => Ok(()),
        }
    }
}

impl fmt::Display for BoundAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}

/// Consecutive pairs inside every section longer than one iterator.
pub(crate) fn section_pairs(tree: &IteratorTree) -> Result<PerRoot<(Ident, Ident)>, LookupError> {
    Ok(tree
        .candidate_sections()?
        .into_iter()
        .map(|(root, sections)| {
            let pairs = sections
                .iter()
                .filter(|s| s.len() > 1)
                .flat_map(|s| s.windows(2).map(|w| (w[0].clone(), w[1].clone())))
                .collect();
            (root, pairs)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::iterator_tree::tests::{make_branching_tree, make_chain_tree};
    use crate::utils::errors::LoopTreeError;
    use crate::utils::ident::idents;

    #[test]
    fn test_validate_arity() {
        let err = ActionKind::Skewing
            .validate(&["i0".into(), "i1".into()])
            .unwrap_err();
        assert_eq!(err.action, ActionKind::Skewing);
        assert!(err.message.contains("2 were given"));
    }

    #[test]
    fn test_validate_slot_kinds() {
        let err = ActionKind::Unrolling
            .validate(&[Param::Factor(4), "i0".into()])
            .unwrap_err();
        assert!(err.message.contains("must be a loop"));

        let err = ActionKind::Tiling2D
            .validate(&["i0".into(), "i1".into(), Param::Factor(32), Param::Factor(0)])
            .unwrap_err();
        assert!(err.message.contains("must be positive"));

        // Skewing factors may be negative.
        ActionKind::Skewing
            .validate(&["i0".into(), "i1".into(), Param::Factor(-1), Param::Factor(1)])
            .unwrap();
    }

    #[test]
    fn test_bind_derives_comps() {
        let tree = make_branching_tree();
        let bound = Action::parallelization("i0").bind(&tree).unwrap();
        assert_eq!(bound.comps(), idents(["comp00", "comp01", "comp02"]).as_slice());
        assert_eq!(bound.levels(), &[0]);
    }

    #[test]
    fn test_bind_sorts_explicit_comps() {
        let tree = make_branching_tree();
        let bound = Action::reversal("i0")
            .with_comps(["comp02", "comp00"])
            .bind(&tree)
            .unwrap();
        assert_eq!(bound.comps(), idents(["comp00", "comp02"]).as_slice());
    }

    #[test]
    fn test_bind_unknown_loop_is_lookup_error() {
        let tree = make_chain_tree();
        let err = Action::reversal("i9").bind(&tree).unwrap_err();
        assert!(matches!(err, LoopTreeError::Lookup(_)));
    }

    #[test]
    fn test_bind_resolves_comp_level() {
        let tree = make_chain_tree();
        let bound = Action::parallelization(LoopRef::at_level("comp00", 1))
            .bind(&tree)
            .unwrap();
        assert_eq!(bound.loops(), &[Ident::new("i1")]);
        assert_eq!(bound.directives(), "comp00.tag_parallel_level(1);\n");
    }

    #[test]
    fn test_same_loop_twice_rejected() {
        let tree = make_chain_tree();
        let err = Action::interchange("i1", LoopRef::at_level("comp00", 1))
            .bind(&tree)
            .unwrap_err();
        assert!(matches!(err, LoopTreeError::CannotApply(_)));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("Skewing".parse::<ActionKind>().unwrap(), ActionKind::Skewing);
        assert_eq!("tiling2d".parse::<ActionKind>().unwrap(), ActionKind::Tiling2D);
        assert!("fusion".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_candidates_len() {
        let tree = make_chain_tree();
        for kind in ActionKind::ALL {
            let candidates = kind.candidates(&tree).unwrap();
            assert!(!candidates.is_empty(), "{} has no candidates", kind);
        }
    }
}
