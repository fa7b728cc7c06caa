//! A schedule: a tree snapshot plus the ordered actions applied to it.

use crate::config::ScheduleConfig;
use crate::service::CompilingService;
use crate::transform::{Action, BoundAction};
use crate::tree::IteratorTree;
use crate::utils::errors::TreeResult;
use log::{debug, info};
use std::fmt;

/// An exclusively owned tree and the actions committed on it.
///
/// Every action is tried on a deep copy of the tree; the copy replaces the
/// current tree only when the action is committed. A failed or rejected
/// action leaves the schedule untouched.
#[derive(Debug, Clone)]
pub struct Schedule {
    tree: IteratorTree,
    actions: Vec<BoundAction>,
    transcript: String,
    config: ScheduleConfig,
}

impl Schedule {
    pub fn new(tree: IteratorTree) -> Self {
        Self {
            tree,
            actions: Vec::new(),
            transcript: String::new(),
            config: ScheduleConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScheduleConfig) -> Self {
        self.config = config;
        self
    }

    /// The tree with every committed action's effect applied.
    pub fn tree(&self) -> &IteratorTree {
        &self.tree
    }

    pub fn actions(&self) -> &[BoundAction] {
        &self.actions
    }

    /// Directive text of every committed action, in order.
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Independent copy for trying candidates on another branch.
    pub fn fork(&self) -> Schedule {
        self.clone()
    }

    pub fn into_tree(self) -> IteratorTree {
        self.tree
    }

    /// Bind `action`, apply its effect and record it.
    pub fn apply(&mut self, action: &Action) -> TreeResult<&BoundAction> {
        let (bound, tree) = self.trial(action)?;
        Ok(self.commit(bound, tree))
    }

    /// Like [`Schedule::apply`], but first ask `service` whether the result
    /// is legal. Returns `false`, leaving the schedule unchanged, when it
    /// is not.
    pub fn apply_checked(&mut self, action: &Action, service: &dyn CompilingService) -> TreeResult<bool> {
        let (bound, tree) = self.trial(action)?;
        if self.config.check_legality {
            let program = self.legality_program_for(&bound);
            if !service.is_legal(&self.tree, &program)? {
                debug!("rejected illegal {}", bound);
                return Ok(false);
            }
        }
        self.commit(bound, tree);
        Ok(true)
    }

    /// Legality-check program for committing `candidate` next: directives
    /// of the committed actions followed by the candidate's legality text.
    pub fn legality_program_for(&self, candidate: &BoundAction) -> String {
        let mut program: String = self.actions.iter().map(BoundAction::directives).collect();
        program.push_str(candidate.legality_text());
        program
    }

    fn trial(&self, action: &Action) -> TreeResult<(BoundAction, IteratorTree)> {
        let bound = action.bind(&self.tree)?;
        let mut tree = self.tree.clone();
        bound.apply_tree_effect(&mut tree)?;
        if self.config.verify_invariants {
            tree.check_invariants()?;
        }
        Ok((bound, tree))
    }

    fn commit(&mut self, bound: BoundAction, tree: IteratorTree) -> &BoundAction {
        info!("applied {}", bound);
        self.transcript.push_str(bound.directives());
        self.tree = tree;
        let index = self.actions.len();
        self.actions.push(bound);
        &self.actions[index]
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summaries: Vec<&str> = self.actions.iter().map(BoundAction::summary).collect();
        f.write_str(&summaries.join("|"))
    }
}
