//! The iteration-space tree of a program.

pub mod annotations;
pub mod iterator_tree;
pub mod node;

pub use annotations::{ComputationAnnotation, IteratorAnnotation, ProgramAnnotations, RawBound};
pub use iterator_tree::{IteratorTree, PerRoot};
pub use node::{Bound, IteratorNode};
