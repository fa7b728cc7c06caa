//! The iterator tree: loop levels, their nesting, and the total order of
//! computations.
//!
//! The tree is an id-keyed arena. Nodes refer to each other by [`Ident`]
//! only, and the tree is the sole owner of every node. After every public
//! operation the following hold:
//!
//! 1. every computation is owned by exactly one node;
//! 2. `computations` is sorted by `absolute_order`;
//! 3. ranks in `absolute_order` are pairwise unique (dense only right after
//!    construction or cloning);
//! 4. every cached `level` equals the length of the node's parent chain.
//!
//! [`IteratorTree::check_invariants`] verifies all of them.

use crate::config::{ConstructionOrder, TreeConfig};
use crate::tree::annotations::ProgramAnnotations;
use crate::tree::node::{Bound, IteratorNode};
use crate::utils::errors::{
    AnnotationError, AnnotationErrorKind, InvariantError, LookupError, LookupErrorKind, TreeResult,
};
use crate::utils::ident::{Ident, Namespace};
use log::{debug, trace};
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

/// Results grouped by root iterator, in root order.
pub type PerRoot<T> = Vec<(Ident, Vec<T>)>;

/// The loop-nest structure of a program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IteratorTree {
    roots: Vec<Ident>,
    nodes: HashMap<Ident, IteratorNode>,
    computations: Vec<Ident>,
    absolute_order: HashMap<Ident, i64>,
}

impl IteratorTree {
    /// Build a tree from an annotation record with the default config.
    pub fn from_annotations(annotations: &ProgramAnnotations) -> Result<Self, AnnotationError> {
        Self::from_annotations_with(annotations, &TreeConfig::default())
    }

    /// Build a tree from an annotation record.
    pub fn from_annotations_with(
        annotations: &ProgramAnnotations,
        config: &TreeConfig,
    ) -> Result<Self, AnnotationError> {
        let mut tree = IteratorTree::default();

        let mut seen_ranks: HashMap<i64, &str> = HashMap::new();
        for (name, comp) in &annotations.computations {
            if let Some(other) = seen_ranks.insert(comp.absolute_order, name) {
                return Err(AnnotationError::new(
                    AnnotationErrorKind::DuplicateRank,
                    format!(
                        "computations `{}` and `{}` share absolute order {}",
                        other, name, comp.absolute_order
                    ),
                ));
            }
            tree.absolute_order.insert(Ident::new(name.as_str()), comp.absolute_order);
        }
        let mut ranked: Vec<(i64, Ident)> = tree
            .absolute_order
            .iter()
            .map(|(c, r)| (*r, c.clone()))
            .collect();
        ranked.sort();
        tree.computations = ranked.into_iter().map(|(_, c)| c).collect();

        check_ownership(annotations)?;

        let order = match config.construction_order {
            ConstructionOrder::Strict => strict_order(annotations)?,
            ConstructionOrder::Topological => topological_order(annotations)?,
        };

        for name in order {
            let Some(entry) = annotations.iterators.get(name) else {
                continue;
            };

            let level = match &entry.parent_iterator {
                None => {
                    tree.roots.push(Ident::new(name));
                    0
                }
                Some(parent) => match tree.nodes.get(&Ident::new(parent.as_str())) {
                    Some(p) => p.level + 1,
                    None => {
                        return Err(AnnotationError::new(
                            AnnotationErrorKind::OutOfOrder,
                            format!("iterator `{}` processed before its parent `{}`", name, parent),
                        ))
                    }
                },
            };

            for child in &entry.child_iterators {
                let linked = annotations
                    .iterators
                    .get(child)
                    .map(|c| c.parent_iterator.as_deref() == Some(name))
                    .unwrap_or(false);
                if !linked {
                    return Err(AnnotationError::new(
                        AnnotationErrorKind::LinkMismatch,
                        format!("iterator `{}` lists child `{}` which does not name it as parent", name, child),
                    ));
                }
            }

            let owned: HashSet<&str> = entry.computations_list.iter().map(String::as_str).collect();
            let computations = tree
                .computations
                .iter()
                .filter(|c| owned.contains(c.base()))
                .cloned()
                .collect();

            let node = IteratorNode {
                id: Ident::new(name),
                level,
                lower_bound: entry.lower_bound.to_bound(name)?,
                upper_bound: entry.upper_bound.to_bound(name)?,
                parent: entry.parent_iterator.as_deref().map(Ident::new),
                children: entry.child_iterators.iter().map(|c| Ident::new(c.as_str())).collect(),
                computations,
            };
            tree.nodes.insert(node.id.clone(), node);
        }

        for (name, entry) in &annotations.iterators {
            if let Some(parent) = &entry.parent_iterator {
                let listed = annotations
                    .iterators
                    .get(parent)
                    .map(|p| p.child_iterators.iter().any(|c| c == name))
                    .unwrap_or(false);
                if !listed {
                    return Err(AnnotationError::new(
                        AnnotationErrorKind::LinkMismatch,
                        format!("iterator `{}` is not listed as a child of `{}`", name, parent),
                    ));
                }
            }
        }

        tree.sort_roots().map_err(|e| {
            AnnotationError::new(
                AnnotationErrorKind::EmptyRoot,
                format!("root `{}` has no computations to order it by", e.name),
            )
        })?;

        debug!(
            "built iterator tree: {} roots, {} iterators, {} computations",
            tree.roots.len(),
            tree.nodes.len(),
            tree.computations.len()
        );
        Ok(tree)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Root iterators ordered by their first computation.
    pub fn roots(&self) -> &[Ident] {
        &self.roots
    }

    /// All computations in absolute order.
    pub fn computations(&self) -> &[Ident] {
        &self.computations
    }

    pub fn nodes(&self) -> impl Iterator<Item = &IteratorNode> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &Ident) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &Ident) -> Option<&IteratorNode> {
        self.nodes.get(id)
    }

    /// Look up an iterator, failing with the offending name.
    pub fn node(&self, id: &Ident) -> Result<&IteratorNode, LookupError> {
        self.nodes.get(id).ok_or_else(|| LookupError::iterator(id))
    }

    pub(crate) fn node_mut(&mut self, id: &Ident) -> Result<&mut IteratorNode, LookupError> {
        self.nodes.get_mut(id).ok_or_else(|| LookupError::iterator(id))
    }

    /// Rank of a computation in the total order.
    pub fn absolute_order(&self, comp: &Ident) -> Result<i64, LookupError> {
        self.absolute_order
            .get(comp)
            .copied()
            .ok_or_else(|| LookupError::computation(comp))
    }

    /// Deduplicate `comps` and sort them by absolute order.
    pub fn ordered<I>(&self, comps: I) -> Result<Vec<Ident>, LookupError>
    where
        I: IntoIterator<Item = Ident>,
    {
        let mut keyed = comps
            .into_iter()
            .map(|c| Ok((self.absolute_order(&c)?, c)))
            .collect::<Result<Vec<_>, LookupError>>()?;
        keyed.sort();
        keyed.dedup_by_key(|(rank, _)| *rank);
        Ok(keyed.into_iter().map(|(_, c)| c).collect())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Maximal perfectly-nested iterator chains, per root.
    ///
    /// Each root is walked breadth-first over section starts. A section
    /// extends from its start through every node that has a single child
    /// and no computations of its own; the node where it stops is included,
    /// and its children start new sections.
    pub fn candidate_sections(&self) -> Result<PerRoot<Vec<Ident>>, LookupError> {
        let mut result = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            let mut to_visit = VecDeque::from([root.clone()]);
            let mut sections = Vec::new();
            while let Some(start) = to_visit.pop_front() {
                let (section, next) = self.section_of(&start)?;
                sections.push(section);
                to_visit.extend(next);
            }
            result.push((root.clone(), sections));
        }
        Ok(result)
    }

    fn section_of(&self, start: &Ident) -> Result<(Vec<Ident>, Vec<Ident>), LookupError> {
        let mut section = vec![start.clone()];
        let mut current = self.node(start)?;
        while current.children.len() == 1 && current.computations.is_empty() {
            let next = &current.children[0];
            section.push(next.clone());
            current = self.node(next)?;
        }
        Ok((section, current.children.clone()))
    }

    /// Every computation in the subtree of `id`, in pre-order.
    pub fn subtree_computations(&self, id: &Ident) -> Result<Vec<Ident>, LookupError> {
        let mut comps = Vec::new();
        for it in self.subtree_iterators(id)? {
            comps.extend(self.node(&it)?.computations.iter().cloned());
        }
        Ok(comps)
    }

    /// Every iterator in the subtree of `id`, in pre-order, `id` first.
    pub fn subtree_iterators(&self, id: &Ident) -> Result<Vec<Ident>, LookupError> {
        let mut out = Vec::new();
        let mut stack = vec![id.clone()];
        while let Some(current) = stack.pop() {
            let node = self.node(&current)?;
            stack.extend(node.children.iter().rev().cloned());
            out.push(current);
        }
        Ok(out)
    }

    /// Union of the subtree computations of `loops`, in absolute order.
    pub fn loops_computations(&self, loops: &[Ident]) -> Result<Vec<Ident>, LookupError> {
        let mut comps = Vec::new();
        for l in loops {
            comps.extend(self.subtree_computations(l)?);
        }
        self.ordered(comps)
    }

    pub fn iterator_levels(&self, iterators: &[Ident]) -> Result<Vec<usize>, LookupError> {
        iterators.iter().map(|it| self.node(it).map(|n| n.level)).collect()
    }

    /// The root whose subtree contains `id`.
    pub fn root_of(&self, id: &Ident) -> Result<&Ident, LookupError> {
        let mut current = self.node(id)?;
        // A parent chain longer than the tree can only be a cycle.
        for _ in 0..=self.nodes.len() {
            match &current.parent {
                None => return Ok(&current.id),
                Some(parent) => current = self.node(parent)?,
            }
        }
        Err(LookupError {
            name: id.to_string(),
            kind: LookupErrorKind::Root,
        })
    }

    /// The iterator that directly owns `comp`.
    pub fn iterator_of_computation(&self, comp: &Ident) -> Result<&IteratorNode, LookupError> {
        self.nodes
            .values()
            .find(|n| n.computations.contains(comp))
            .ok_or_else(|| LookupError::computation(comp))
    }

    /// The iterator at `level` enclosing `comp`.
    pub fn iterator_at_level(&self, comp: &Ident, level: usize) -> Result<&IteratorNode, LookupError> {
        let mut current = self.iterator_of_computation(comp)?;
        let level_error = || LookupError {
            name: comp.to_string(),
            kind: LookupErrorKind::Level,
        };
        if current.level < level {
            return Err(level_error());
        }
        while current.level > level {
            let parent = current.parent.as_ref().ok_or_else(level_error)?;
            current = self.node(parent)?;
        }
        Ok(current)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Deep-copy the subtree rooted at `id` into a new standalone tree.
    ///
    /// Every identifier in the copy is moved into `ns`. Computations are
    /// re-ranked densely from 1, following their order in `self`. The
    /// source tree is not modified.
    pub fn clone_subtree(&self, id: &Ident, ns: &Namespace) -> Result<IteratorTree, LookupError> {
        let mut target = IteratorTree::default();
        self.clone_into(id, ns, None, &mut target)?;

        let new_root = id.in_namespace(ns);
        target.roots.push(new_root.clone());

        let mut keyed = target
            .computations
            .iter()
            .map(|c| {
                let original = c.strip_namespace(ns).ok_or_else(|| LookupError::computation(c))?;
                Ok((self.absolute_order(&original)?, c.clone()))
            })
            .collect::<Result<Vec<_>, LookupError>>()?;
        keyed.sort();
        target.computations = keyed.into_iter().map(|(_, c)| c).collect();
        target.absolute_order = target
            .computations
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i as i64 + 1))
            .collect();

        target.update_subtree_levels(&new_root, 0)?;
        debug!("cloned subtree `{}` into namespace `{}` ({} iterators)", id, ns, target.len());
        Ok(target)
    }

    fn clone_into(
        &self,
        id: &Ident,
        ns: &Namespace,
        parent: Option<Ident>,
        target: &mut IteratorTree,
    ) -> Result<(), LookupError> {
        let node = self.node(id)?;
        let mut clone = node.rename_clone(ns);
        clone.parent = parent;
        let clone_id = clone.id.clone();
        target.computations.extend(clone.computations.iter().cloned());
        target.nodes.insert(clone_id.clone(), clone);
        for child in &node.children {
            self.clone_into(child, ns, Some(clone_id.clone()), target)?;
        }
        Ok(())
    }

    /// Splice `subtree` into this tree.
    ///
    /// The subtree's computations are placed in the total order right after
    /// the last computation under `parent`, shifting everything behind them.
    /// With `is_root_insert` the subtree becomes a new root; otherwise its
    /// root becomes the last child of `parent`.
    ///
    /// Fails without touching the tree when `subtree` does not have exactly
    /// one root, or when any of its identifiers renders like one already
    /// present.
    pub fn insert_subtree(
        &mut self,
        subtree: IteratorTree,
        parent: &Ident,
        is_root_insert: bool,
    ) -> TreeResult<()> {
        self.node(parent)?;
        let subtree_root = match subtree.roots.as_slice() {
            [root] => root.clone(),
            roots => {
                return Err(InvariantError::new(format!(
                    "inserted subtree must have exactly one root, found {}",
                    roots.len()
                ))
                .into())
            }
        };

        // Directives and the outline name identifiers by their rendered form,
        // so two distinct identifiers of the same kind must never render alike.
        check_rendered_clash("iterator", self.nodes.keys(), subtree.nodes.keys())?;
        check_rendered_clash("computation", self.absolute_order.keys(), subtree.absolute_order.keys())?;

        let anchor = self
            .subtree_computations(parent)?
            .iter()
            .map(|c| self.absolute_order(c))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .max()
            .ok_or_else(|| {
                InvariantError::new(format!(
                    "cannot order an insertion after `{}`: its subtree has no computations",
                    parent
                ))
            })?;

        let shift = subtree.computations.len() as i64;
        for rank in self.absolute_order.values_mut() {
            if *rank > anchor {
                *rank += shift;
            }
        }
        for (i, comp) in subtree.computations.iter().enumerate() {
            self.absolute_order.insert(comp.clone(), anchor + i as i64 + 1);
        }
        trace!("opened ranks {}..={} after `{}`", anchor + 1, anchor + shift, parent);

        let IteratorTree {
            nodes, computations, ..
        } = subtree;
        self.nodes.extend(nodes);
        let mut all = std::mem::take(&mut self.computations);
        all.extend(computations);
        self.computations = self.ordered(all)?;

        if is_root_insert {
            self.node_mut(&subtree_root)?.parent = None;
            self.roots.push(subtree_root.clone());
            self.update_subtree_levels(&subtree_root, 0)?;
            self.sort_roots()?;
        } else {
            self.node_mut(&subtree_root)?.parent = Some(parent.clone());
            self.node_mut(parent)?.children.push(subtree_root.clone());
            let level = self.node(parent)?.level;
            self.update_subtree_levels(parent, level)?;
        }

        debug!(
            "inserted subtree `{}` {} `{}`",
            subtree_root,
            if is_root_insert { "as a root after" } else { "under" },
            parent
        );
        Ok(())
    }

    /// Set the level of `id` and recompute the levels of its descendants.
    pub fn update_subtree_levels(&mut self, id: &Ident, level: usize) -> Result<(), LookupError> {
        let mut stack = vec![(id.clone(), level)];
        while let Some((current, level)) = stack.pop() {
            let node = self.node_mut(&current)?;
            node.level = level;
            stack.extend(node.children.iter().map(|c| (c.clone(), level + 1)));
        }
        Ok(())
    }

    pub fn set_bounds(&mut self, id: &Ident, lower: Bound, upper: Bound) -> Result<(), LookupError> {
        let node = self.node_mut(id)?;
        node.lower_bound = lower;
        node.upper_bound = upper;
        Ok(())
    }

    fn first_rank(&self, root: &Ident) -> Result<i64, LookupError> {
        self.subtree_computations(root)?
            .iter()
            .map(|c| self.absolute_order(c))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .min()
            .ok_or_else(|| LookupError::iterator(root))
    }

    fn sort_roots(&mut self) -> Result<(), LookupError> {
        let mut keyed = self
            .roots
            .iter()
            .map(|r| Ok((self.first_rank(r)?, r.clone())))
            .collect::<Result<Vec<_>, LookupError>>()?;
        keyed.sort();
        self.roots = keyed.into_iter().map(|(_, r)| r).collect();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Verification
    // ------------------------------------------------------------------

    /// Check every structural invariant of the tree.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let mut owners: HashMap<&Ident, &Ident> = HashMap::new();
        for node in self.nodes.values() {
            let mut last_rank = None;
            for comp in &node.computations {
                if let Some(other) = owners.insert(comp, &node.id) {
                    return Err(InvariantError::new(format!(
                        "computation `{}` owned by both `{}` and `{}`",
                        comp, other, node.id
                    )));
                }
                let rank = self.absolute_order.get(comp).copied().ok_or_else(|| {
                    InvariantError::new(format!("computation `{}` of `{}` has no rank", comp, node.id))
                })?;
                if last_rank.is_some_and(|last| last >= rank) {
                    return Err(InvariantError::new(format!(
                        "computations of `{}` are not in absolute order",
                        node.id
                    )));
                }
                last_rank = Some(rank);
            }
        }

        if self.computations.len() != self.absolute_order.len() || owners.len() != self.computations.len() {
            return Err(InvariantError::new(format!(
                "{} computations listed, {} ranked, {} owned",
                self.computations.len(),
                self.absolute_order.len(),
                owners.len()
            )));
        }
        let mut last_rank = None;
        for comp in &self.computations {
            if !owners.contains_key(comp) {
                return Err(InvariantError::new(format!("computation `{}` has no owner", comp)));
            }
            let rank = self
                .absolute_order
                .get(comp)
                .copied()
                .ok_or_else(|| InvariantError::new(format!("computation `{}` has no rank", comp)))?;
            if last_rank.is_some_and(|last| last >= rank) {
                return Err(InvariantError::new(format!(
                    "computation `{}` breaks the absolute order",
                    comp
                )));
            }
            last_rank = Some(rank);
        }

        for node in self.nodes.values() {
            match &node.parent {
                None => {
                    if node.level != 0 || !self.roots.contains(&node.id) {
                        return Err(InvariantError::new(format!(
                            "parentless iterator `{}` is not a level-0 root",
                            node.id
                        )));
                    }
                }
                Some(parent) => {
                    let p = self.nodes.get(parent).ok_or_else(|| {
                        InvariantError::new(format!("parent `{}` of `{}` is missing", parent, node.id))
                    })?;
                    if !p.children.contains(&node.id) {
                        return Err(InvariantError::new(format!(
                            "`{}` does not list `{}` as a child",
                            parent, node.id
                        )));
                    }
                    if node.level != p.level + 1 {
                        return Err(InvariantError::new(format!(
                            "iterator `{}` has level {}, expected {}",
                            node.id,
                            node.level,
                            p.level + 1
                        )));
                    }
                }
            }
            for child in &node.children {
                let linked = self
                    .nodes
                    .get(child)
                    .is_some_and(|c| c.parent.as_ref() == Some(&node.id));
                if !linked {
                    return Err(InvariantError::new(format!(
                        "child `{}` of `{}` does not link back",
                        child, node.id
                    )));
                }
            }
        }

        for root in &self.roots {
            if self.nodes.get(root).map_or(true, |r| r.parent.is_some()) {
                return Err(InvariantError::new(format!("root `{}` is missing or has a parent", root)));
            }
        }
        Ok(())
    }

    fn fmt_subtree(&self, f: &mut fmt::Formatter<'_>, id: &Ident) -> fmt::Result {
        let Some(node) = self.nodes.get(id) else {
            return Ok(());
        };
        writeln!(f, "{}-> {}", "   ".repeat(node.level), node)?;
        for comp in &node.computations {
            writeln!(f, "{}- {}", "   ".repeat(node.level + 1), comp)?;
        }
        for child in &node.children {
            self.fmt_subtree(f, child)?;
        }
        Ok(())
    }
}

impl fmt::Display for IteratorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for root in &self.roots {
            self.fmt_subtree(f, root)?;
        }
        Ok(())
    }
}

/// Fails when an incoming identifier renders like an existing one or like
/// another incoming one.
fn check_rendered_clash<'a>(
    what: &str,
    existing: impl Iterator<Item = &'a Ident>,
    incoming: impl Iterator<Item = &'a Ident>,
) -> Result<(), InvariantError> {
    let mut rendered: HashSet<String> = existing.map(Ident::to_string).collect();
    for id in incoming {
        if !rendered.insert(id.to_string()) {
            return Err(InvariantError::new(format!("{} `{}` already exists in the tree", what, id)));
        }
    }
    Ok(())
}

/// Every declared computation is owned by exactly one declared iterator.
fn check_ownership(annotations: &ProgramAnnotations) -> Result<(), AnnotationError> {
    let mut owner: HashMap<&str, &str> = HashMap::new();
    for (name, entry) in &annotations.iterators {
        for comp in &entry.computations_list {
            if !annotations.computations.contains_key(comp) {
                return Err(AnnotationError::new(
                    AnnotationErrorKind::UnknownComputation,
                    format!("iterator `{}` owns undeclared computation `{}`", name, comp),
                ));
            }
            match owner.insert(comp, name) {
                Some(other) if other != name.as_str() => {
                    return Err(AnnotationError::new(
                        AnnotationErrorKind::DuplicateOwner,
                        format!("computation `{}` owned by both `{}` and `{}`", comp, other, name),
                    ));
                }
                _ => {}
            }
        }
    }
    if let Some(orphan) = annotations.computations.keys().find(|c| !owner.contains_key(c.as_str())) {
        return Err(AnnotationError::new(
            AnnotationErrorKind::OrphanComputation,
            format!("computation `{}` is not owned by any iterator", orphan),
        ));
    }
    Ok(())
}

/// Input order, provided every parent precedes its children.
fn strict_order(annotations: &ProgramAnnotations) -> Result<Vec<&str>, AnnotationError> {
    let mut seen = HashSet::new();
    let mut order = Vec::with_capacity(annotations.iterators.len());
    for (name, entry) in &annotations.iterators {
        if let Some(parent) = &entry.parent_iterator {
            if !seen.contains(parent.as_str()) {
                let kind = if annotations.iterators.contains_key(parent) {
                    AnnotationErrorKind::OutOfOrder
                } else {
                    AnnotationErrorKind::UnknownParent
                };
                return Err(AnnotationError::new(
                    kind,
                    format!("iterator `{}` appears before its parent `{}`", name, parent),
                ));
            }
        }
        seen.insert(name.as_str());
        order.push(name.as_str());
    }
    Ok(order)
}

/// Parent-before-child order, otherwise as close to input order as possible.
fn topological_order(annotations: &ProgramAnnotations) -> Result<Vec<&str>, AnnotationError> {
    let mut placed: HashSet<&str> = HashSet::new();
    let mut order = Vec::with_capacity(annotations.iterators.len());
    for start in annotations.iterators.keys() {
        let mut chain: Vec<&str> = Vec::new();
        let mut current = start.as_str();
        while !placed.contains(current) {
            if chain.contains(&current) {
                return Err(AnnotationError::new(
                    AnnotationErrorKind::Cycle,
                    format!("parent links through `{}` form a cycle", current),
                ));
            }
            chain.push(current);
            let parent = annotations
                .iterators
                .get(current)
                .and_then(|e| e.parent_iterator.as_deref());
            match parent {
                None => break,
                Some(p) if annotations.iterators.contains_key(p) => current = p,
                Some(p) => {
                    return Err(AnnotationError::new(
                        AnnotationErrorKind::UnknownParent,
                        format!("iterator `{}` has undeclared parent `{}`", current, p),
                    ))
                }
            }
        }
        for name in chain.into_iter().rev() {
            placed.insert(name);
            order.push(name);
        }
    }
    Ok(order)
}
