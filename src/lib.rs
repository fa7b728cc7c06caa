//! # LoopTree - Iterator Trees for Polyhedral Loop Nests
//!
//! A model of a program's loop nests as a forest of iterators, used to drive
//! schedule search over polyhedral transformations:
//! - Tree construction from program annotations (JSON)
//! - Structural queries (candidate sections, subtree computations, levels)
//! - Namespaced subtree cloning and re-insertion
//! - Transformation actions (skewing, parallelization, reversal, interchange,
//!   2D tiling, unrolling) with candidate enumeration and directive rendering
//! - Schedules that record actions on a private copy of the tree
//!
//! ## Architecture
//!
//! ```text
//! Annotations → IteratorTree → Action::bind → BoundAction → Schedule → directives
//!                                                  ↑
//!                                        CompilingService (factors, legality)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use looptree::prelude::*;
//!
//! let tree = looptree::parse_tree(json)?;
//! for (root, sections) in tree.candidate_sections()? {
//!     println!("{}: {:?}", root, sections);
//! }
//!
//! let mut schedule = Schedule::new(tree);
//! schedule.apply(&Action::parallelization("i0"))?;
//! schedule.apply(&Action::reversal(LoopRef::at_level("comp00", 1)))?;
//! println!("{}", schedule.transcript());
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod schedule;
pub mod service;
pub mod transform;
pub mod tree;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::config::{ConstructionOrder, ScheduleConfig, TreeConfig};
    pub use crate::schedule::Schedule;
    pub use crate::service::CompilingService;
    pub use crate::transform::{Action, ActionKind, BoundAction, Candidates, LoopRef, Param};
    pub use crate::tree::{Bound, IteratorNode, IteratorTree, PerRoot, ProgramAnnotations};
    pub use crate::utils::errors::*;
    pub use crate::utils::ident::{Ident, Namespace};
}

use anyhow::{Context, Result};
use std::path::Path;

/// Build a tree from annotation JSON text.
pub fn parse_tree(json: &str) -> Result<tree::IteratorTree> {
    parse_tree_with(json, &config::TreeConfig::default())
}

/// Build a tree from annotation JSON text with explicit construction settings.
pub fn parse_tree_with(json: &str, config: &config::TreeConfig) -> Result<tree::IteratorTree> {
    let annotations = tree::ProgramAnnotations::from_json(json).context("Malformed annotation JSON")?;
    let tree = tree::IteratorTree::from_annotations_with(&annotations, config)?;
    Ok(tree)
}

/// Read an annotation file and build its tree.
pub fn load_tree(path: impl AsRef<Path>, config: &config::TreeConfig) -> Result<tree::IteratorTree> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read annotation file: {:?}", path))?;
    parse_tree_with(&json, config).with_context(|| format!("Invalid annotations in {:?}", path))
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
