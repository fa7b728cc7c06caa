//! Boundary to the external compiling service.
//!
//! The service solves transformation-specific numeric parameters and checks
//! legality. It is an opaque, possibly slow, synchronous oracle; this crate
//! only calls it.

use crate::tree::IteratorTree;
use crate::utils::errors::SolverError;
use crate::utils::ident::Ident;

/// Legality and parameter oracle backed by a compiler.
pub trait CompilingService {
    /// Skewing factors for the loops at `loop_levels` over `comps`, or
    /// `None` when no legal factors exist.
    fn solve_skewing_factors(
        &self,
        loop_levels: &[usize],
        comps: &[Ident],
    ) -> Result<Option<(i64, i64)>, SolverError>;

    /// Whether the schedule described by `legality_program` is legal for
    /// the program whose current tree is `tree`.
    fn is_legal(&self, tree: &IteratorTree, legality_program: &str) -> Result<bool, SolverError>;
}
