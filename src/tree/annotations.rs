//! The annotation record a tree is built from.
//!
//! The record is produced by an external loader. Its JSON form is:
//!
//! ```text
//! {
//!   "computations": { "comp00": { "absolute_order": 1, ... } },
//!   "iterators": {
//!     "i0": { "parent_iterator": null, "lower_bound": 0, "upper_bound": 10,
//!             "child_iterators": ["i1"], "computations_list": [] }
//!   }
//! }
//! ```
//!
//! Fields not listed here are ignored. Entry order is preserved.

use crate::tree::node::Bound;
use crate::utils::errors::{AnnotationError, AnnotationErrorKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Annotation record of one program.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramAnnotations {
    pub computations: IndexMap<String, ComputationAnnotation>,
    pub iterators: IndexMap<String, IteratorAnnotation>,
}

impl ProgramAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the JSON form.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn with_computation(mut self, name: impl Into<String>, absolute_order: i64) -> Self {
        self.computations
            .insert(name.into(), ComputationAnnotation { absolute_order });
        self
    }

    pub fn with_iterator(mut self, name: impl Into<String>, iterator: IteratorAnnotation) -> Self {
        self.iterators.insert(name.into(), iterator);
        self
    }
}

/// Per-computation annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationAnnotation {
    /// Rank in the program's total order
    pub absolute_order: i64,
}

/// Per-iterator annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IteratorAnnotation {
    pub parent_iterator: Option<String>,
    pub lower_bound: RawBound,
    pub upper_bound: RawBound,
    #[serde(default)]
    pub child_iterators: Vec<String>,
    #[serde(default)]
    pub computations_list: Vec<String>,
}

impl IteratorAnnotation {
    pub fn new(parent: Option<&str>, lower_bound: i64, upper_bound: i64) -> Self {
        Self {
            parent_iterator: parent.map(str::to_string),
            lower_bound: RawBound::Int(lower_bound),
            upper_bound: RawBound::Int(upper_bound),
            child_iterators: Vec::new(),
            computations_list: Vec::new(),
        }
    }

    pub fn children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.child_iterators = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn computations<I, S>(mut self, comps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.computations_list = comps.into_iter().map(Into::into).collect();
        self
    }
}

/// A bound as written by the loader: an integer or an integer string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawBound {
    Int(i64),
    Text(String),
}

impl RawBound {
    pub(crate) fn to_bound(&self, iterator: &str) -> Result<Bound, AnnotationError> {
        match self {
            RawBound::Int(v) => Ok(Bound::Known(*v)),
            RawBound::Text(s) if s.trim() == "UNK" => Ok(Bound::Unknown),
            RawBound::Text(s) => s.trim().parse::<i64>().map(Bound::Known).map_err(|_| {
                AnnotationError::new(
                    AnnotationErrorKind::InvalidBound,
                    format!("bound `{}` of iterator `{}` is not an integer", s, iterator),
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json() {
        let text = r#"{
            "computations": { "comp00": { "absolute_order": 1, "number_of_additions": 0 } },
            "iterators": {
                "i0": { "parent_iterator": null, "lower_bound": 0, "upper_bound": "64",
                        "child_iterators": [], "computations_list": ["comp00"] }
            }
        }"#;
        let ann = ProgramAnnotations::from_json(text).unwrap();
        assert_eq!(ann.computations["comp00"].absolute_order, 1);
        let i0 = &ann.iterators["i0"];
        assert_eq!(i0.parent_iterator, None);
        assert_eq!(i0.upper_bound.to_bound("i0").unwrap(), Bound::Known(64));
    }

    #[test]
    fn test_invalid_bound() {
        let err = RawBound::Text("N".into()).to_bound("i3").unwrap_err();
        assert_eq!(err.kind, AnnotationErrorKind::InvalidBound);
        assert!(err.message.contains("i3"));
    }

    #[test]
    fn test_preserves_iterator_order() {
        let ann = ProgramAnnotations::new()
            .with_iterator("i1", IteratorAnnotation::new(Some("i0"), 0, 4))
            .with_iterator("i0", IteratorAnnotation::new(None, 0, 4).children(["i1"]));
        let keys: Vec<_> = ann.iterators.keys().cloned().collect();
        assert_eq!(keys, vec!["i1", "i0"]);
    }
}
