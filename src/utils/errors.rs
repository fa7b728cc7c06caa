//! Error types for the iterator tree and transformation actions.
//!
//! Errors are grouped by what went wrong: malformed construction input,
//! lookups of names that are not in the tree, parameter lists that do not
//! fit a transformation kind, and answers (or non-answers) from the external
//! compiling service. Only the last group is expected during normal search.

use crate::transform::ActionKind;
use crate::utils::ident::Ident;
use std::fmt;
use thiserror::Error;

/// Top-level error type for the crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoopTreeError {
    /// Malformed annotation record
    #[error("Annotation error: {0}")]
    Annotation(#[from] AnnotationError),

    /// Reference to an iterator or computation absent from the tree
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// Parameters do not fit the transformation kind
    #[error("Cannot apply: {0}")]
    CannotApply(#[from] CannotApplyError),

    /// The compiling service had no answer
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    /// A tree invariant does not hold
    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantError),
}

impl LoopTreeError {
    /// Solver failures are routine during search; everything else is a defect.
    pub fn is_solver_failure(&self) -> bool {
        matches!(self, LoopTreeError::Solver(_))
    }
}

/// Error while building a tree from annotations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct AnnotationError {
    /// The error message
    pub message: String,
    /// The kind of annotation error
    pub kind: AnnotationErrorKind,
}

impl AnnotationError {
    pub fn new(kind: AnnotationErrorKind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }
}

impl fmt::Display for AnnotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationErrorKind {
    /// Parent iterator is not declared
    UnknownParent,
    /// Child listed before its parent under strict ordering
    OutOfOrder,
    /// Parent links form a cycle
    Cycle,
    /// Iterator owns a computation that is not declared
    UnknownComputation,
    /// Computation owned by more than one iterator
    DuplicateOwner,
    /// Computation owned by no iterator
    OrphanComputation,
    /// Bound is neither an integer nor an integer string
    InvalidBound,
    /// Root subtree has no computation to order it by
    EmptyRoot,
    /// Two computations share an absolute order rank
    DuplicateRank,
    /// Parent and child links disagree
    LinkMismatch,
}

/// Reference to a name the tree does not contain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    /// The offending identifier
    pub name: String,
    /// What was being looked up
    pub kind: LookupErrorKind,
}

impl LookupError {
    pub fn iterator(name: &Ident) -> Self {
        Self {
            name: name.to_string(),
            kind: LookupErrorKind::Iterator,
        }
    }

    pub fn computation(name: &Ident) -> Self {
        Self {
            name: name.to_string(),
            kind: LookupErrorKind::Computation,
        }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LookupErrorKind::Iterator => write!(f, "iterator `{}` is not in the tree", self.name),
            LookupErrorKind::Computation => {
                write!(f, "computation `{}` is not in the tree", self.name)
            }
            LookupErrorKind::Root => write!(f, "iterator `{}` has no reachable root", self.name),
            LookupErrorKind::Level => {
                write!(f, "no enclosing iterator at the requested level for `{}`", self.name)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupErrorKind {
    /// Unknown iterator
    Iterator,
    /// Unknown computation
    Computation,
    /// Parent chain does not end in a root
    Root,
    /// Requested level is deeper than the computation's iterator
    Level,
}

/// Parameters do not have the shape a transformation kind requires.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct CannotApplyError {
    /// The transformation kind
    pub action: ActionKind,
    /// The error message
    pub message: String,
}

impl CannotApplyError {
    pub fn new(action: ActionKind, message: impl Into<String>) -> Self {
        Self {
            action,
            message: message.into(),
        }
    }
}

impl fmt::Display for CannotApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.message, self.action)
    }
}

/// The compiling service could not produce an answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct SolverError {
    /// The error message
    pub message: String,
    /// The kind of solver failure
    pub kind: SolverErrorKind,
}

impl SolverError {
    pub fn no_solution(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: SolverErrorKind::NoSolution,
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: SolverErrorKind::Backend,
        }
    }
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverErrorKind {
    /// The service found no solution
    NoSolution,
    /// The service itself failed
    Backend,
}

/// A tree invariant does not hold.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct InvariantError {
    pub message: String,
}

impl InvariantError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type using LoopTreeError.
pub type TreeResult<T> = Result<T, LoopTreeError>;
