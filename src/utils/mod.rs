//! Utility modules shared by the tree and the transformations.
//!
//! - Error types
//! - Namespace-tagged identifiers

pub mod errors;
pub mod ident;

// Re-exports
pub use errors::*;
pub use ident::{idents, Ident, Namespace};
