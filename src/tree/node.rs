//! A single loop level of the iteration space.

use crate::utils::ident::{Ident, Namespace};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A loop bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bound {
    /// Statically known value
    Known(i64),
    /// Invalidated by a transformation; only the backend can recompute it
    Unknown,
}

impl Bound {
    pub fn value(&self) -> Option<i64> {
        match self {
            Bound::Known(v) => Some(*v),
            Bound::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Bound::Known(_))
    }
}

impl From<i64> for Bound {
    fn from(v: i64) -> Self {
        Bound::Known(v)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Known(v) => write!(f, "{}", v),
            Bound::Unknown => f.write_str("UNK"),
        }
    }
}

/// One iterator (loop level) of the tree.
///
/// Links to the parent and children are identifiers resolved through the
/// owning [`IteratorTree`](super::IteratorTree); a node never owns another
/// node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IteratorNode {
    /// Unique name within the tree
    pub id: Ident,
    /// Depth from the root, cached and maintained by the tree
    pub level: usize,
    pub lower_bound: Bound,
    pub upper_bound: Bound,
    pub parent: Option<Ident>,
    /// Child iterators in declaration order
    pub children: Vec<Ident>,
    /// Computations directly at this level, in absolute order
    pub computations: Vec<Ident>,
}

impl IteratorNode {
    pub fn new(id: impl Into<Ident>, lower_bound: impl Into<Bound>, upper_bound: impl Into<Bound>) -> Self {
        Self {
            id: id.into(),
            level: 0,
            lower_bound: lower_bound.into(),
            upper_bound: upper_bound.into(),
            parent: None,
            children: Vec::new(),
            computations: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn has_computations(&self) -> bool {
        !self.computations.is_empty()
    }

    /// A copy of this node moved into `ns`.
    ///
    /// The id, every child and every computation are tagged with `ns`;
    /// level and bounds are copied. The parent is copied as-is and must be
    /// fixed up by whoever places the clone.
    pub fn rename_clone(&self, ns: &Namespace) -> IteratorNode {
        IteratorNode {
            id: self.id.in_namespace(ns),
            level: self.level,
            lower_bound: self.lower_bound,
            upper_bound: self.upper_bound,
            parent: self.parent.clone(),
            children: self.children.iter().map(|c| c.in_namespace(ns)).collect(),
            computations: self.computations.iter().map(|c| c.in_namespace(ns)).collect(),
        }
    }
}

impl fmt::Display for IteratorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.id, self.lower_bound, self.upper_bound)
    }
}
