//! Configuration for tree construction and schedule sessions.

/// How iterator entries of an annotation record are processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConstructionOrder {
    /// Order entries by their parent links before building nodes
    #[default]
    Topological,
    /// Require every parent to be listed before its children
    Strict,
}

/// Configuration for building an [`IteratorTree`](crate::tree::IteratorTree).
#[derive(Debug, Clone, Default)]
pub struct TreeConfig {
    /// Processing order of iterator entries
    pub construction_order: ConstructionOrder,
}

impl TreeConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the construction order
    pub fn construction_order(mut self, order: ConstructionOrder) -> Self {
        self.construction_order = order;
        self
    }

    /// Strict preset: reject input that lists a child before its parent
    pub fn strict() -> Self {
        Self {
            construction_order: ConstructionOrder::Strict,
        }
    }
}

/// Configuration for a [`Schedule`](crate::schedule::Schedule) session.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Re-check every tree invariant before committing an action
    pub verify_invariants: bool,

    /// Ask the compiling service for legality in `apply_checked`
    pub check_legality: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            verify_invariants: cfg!(debug_assertions),
            check_legality: true,
        }
    }
}

impl ScheduleConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable/disable invariant verification
    pub fn verify_invariants(mut self, v: bool) -> Self {
        self.verify_invariants = v;
        self
    }

    /// Enable/disable legality checks
    pub fn check_legality(mut self, v: bool) -> Self {
        self.check_legality = v;
        self
    }

    /// Search preset: legality on, invariant checks off
    pub fn search() -> Self {
        Self {
            verify_invariants: false,
            check_legality: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(TreeConfig::default().construction_order, ConstructionOrder::Topological);
        assert!(ScheduleConfig::default().check_legality);
    }

    #[test]
    fn test_builders() {
        let cfg = ScheduleConfig::new().verify_invariants(true).check_legality(false);
        assert!(cfg.verify_invariants);
        assert!(!cfg.check_legality);
        assert_eq!(TreeConfig::strict().construction_order, ConstructionOrder::Strict);
    }
}
