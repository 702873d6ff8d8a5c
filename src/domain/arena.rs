//! Arena-backed tree nodes that can be linked from several threads at once.
//!
//! Nodes live in a shared [`TreeArena`] and refer to each other by index, so the
//! cyclic parent <-> child relation never needs owning pointers. A [`TreeNode`] is
//! a cheap handle (arena + index) that gives access to one node's value, its child
//! set and its parent slot.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use generational_arena::{Arena, Index};
use indexmap::IndexSet;
use parking_lot::{Mutex, RwLock};
use tracing::instrument;

use crate::domain::error::{DomainError, TreeResult};

struct Slot<T> {
    value: Arc<T>,
    /// Swapped as a whole under the lock, never read-modify-written outside it.
    parent: Mutex<Option<Index>>,
    /// Insertion ordered, deduplicated by node identity.
    children: RwLock<IndexSet<Index>>,
}

struct Shared<T> {
    nodes: RwLock<Arena<Slot<T>>>,
}

/// Shared storage for every node of one or more trees.
///
/// Cloning the arena clones the handle, not the nodes. Nodes are never removed:
/// they go away together with the last handle to the arena.
pub struct TreeArena<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for TreeArena<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for TreeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TreeArena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeArena").field("nodes", &self.len()).finish()
    }
}

impl<T> TreeArena<T> {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                nodes: RwLock::new(Arena::new()),
            }),
        }
    }

    /// Stores `value` in a new parentless, childless node.
    #[instrument(level = "trace", skip_all)]
    pub fn create(&self, value: T) -> TreeNode<T> {
        let value = Arc::new(value);
        let index = self.shared.nodes.write().insert(Slot {
            value: Arc::clone(&value),
            parent: Mutex::new(None),
            children: RwLock::new(IndexSet::new()),
        });
        TreeNode {
            arena: self.clone(),
            index,
            value,
        }
    }

    pub fn len(&self) -> usize {
        self.shared.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn same_arena(&self, other: &TreeArena<T>) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Nodes without a parent, in creation order.
    pub fn roots(&self) -> Vec<TreeNode<T>> {
        let nodes = self.shared.nodes.read();
        nodes
            .iter()
            .filter(|(_, slot)| slot.parent.lock().is_none())
            .map(|(index, slot)| TreeNode {
                arena: self.clone(),
                index,
                value: Arc::clone(&slot.value),
            })
            .collect()
    }

    fn handle(&self, nodes: &Arena<Slot<T>>, index: Index) -> Option<TreeNode<T>> {
        nodes.get(index).map(|slot| TreeNode {
            arena: self.clone(),
            index,
            value: Arc::clone(&slot.value),
        })
    }
}

/// Outcome of [`TreeNode::claim_parent`].
#[derive(Debug)]
pub enum ParentClaim<T> {
    /// The slot was empty and now points at the requested parent.
    Claimed,
    /// The slot already pointed at the requested parent.
    AlreadyOwned,
    /// The slot points at some other node, which is returned.
    OwnedByOther(TreeNode<T>),
}

/// Handle to a node stored in a [`TreeArena`].
///
/// Two handles are equal when they address the same node of the same arena.
pub struct TreeNode<T> {
    arena: TreeArena<T>,
    index: Index,
    value: Arc<T>,
}

impl<T> Clone for TreeNode<T> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            index: self.index,
            value: Arc::clone(&self.value),
        }
    }
}

impl<T> PartialEq for TreeNode<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.arena.same_arena(&other.arena)
    }
}

impl<T> Eq for TreeNode<T> {}

impl<T> Hash for TreeNode<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.arena.shared) as usize).hash(state);
        self.index.hash(state);
    }
}

impl<T: fmt::Debug> fmt::Debug for TreeNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("id", &self.index)
            .field("value", &self.value)
            .finish()
    }
}

impl<T> TreeNode<T> {
    pub fn create(arena: &TreeArena<T>, value: T) -> Self {
        arena.create(value)
    }

    pub fn arena(&self) -> &TreeArena<T> {
        &self.arena
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    /// Snapshot of the current children. Later inserts are not reflected.
    pub fn children(&self) -> Children<T> {
        let nodes = self.arena.shared.nodes.read();
        let children = match nodes.get(self.index) {
            Some(slot) => slot
                .children
                .read()
                .iter()
                .filter_map(|&index| self.arena.handle(&nodes, index))
                .collect(),
            None => Vec::new(),
        };
        Children { nodes: children }
    }

    /// Inserts `child` unless it is already present. Returns whether it was inserted.
    ///
    /// Only the child set changes; the child's parent slot is left alone.
    #[instrument(level = "trace", skip_all, fields(parent = ?self.index, child = ?child.index))]
    pub fn add_child(&self, child: &TreeNode<T>) -> TreeResult<bool> {
        self.check_same_arena(child, "child node")?;
        let nodes = self.arena.shared.nodes.read();
        let slot = nodes
            .get(self.index)
            .ok_or_else(|| DomainError::invalid_argument("node is not stored in its arena"))?;
        let inserted = slot.children.write().insert(child.index);
        Ok(inserted)
    }

    pub fn parent(&self) -> Option<TreeNode<T>> {
        let nodes = self.arena.shared.nodes.read();
        let slot = nodes.get(self.index)?;
        let parent = (*slot.parent.lock())?;
        self.arena.handle(&nodes, parent)
    }

    /// Replaces the parent slot and returns the previous parent.
    ///
    /// `None` turns the node into a root. The new parent's child set is not touched.
    #[instrument(level = "trace", skip_all, fields(node = ?self.index))]
    pub fn set_parent(&self, parent: Option<&TreeNode<T>>) -> TreeResult<Option<TreeNode<T>>> {
        if let Some(parent) = parent {
            self.check_same_arena(parent, "parent node")?;
        }
        let nodes = self.arena.shared.nodes.read();
        let slot = nodes
            .get(self.index)
            .ok_or_else(|| DomainError::invalid_argument("node is not stored in its arena"))?;
        let previous = std::mem::replace(&mut *slot.parent.lock(), parent.map(|p| p.index));
        Ok(previous.and_then(|index| self.arena.handle(&nodes, index)))
    }

    /// Sets the parent slot to `parent` only if it is empty, atomically.
    #[instrument(level = "trace", skip_all, fields(node = ?self.index, parent = ?parent.index))]
    pub fn claim_parent(&self, parent: &TreeNode<T>) -> TreeResult<ParentClaim<T>> {
        self.check_same_arena(parent, "parent node")?;
        let nodes = self.arena.shared.nodes.read();
        let slot = nodes
            .get(self.index)
            .ok_or_else(|| DomainError::invalid_argument("node is not stored in its arena"))?;
        let mut current = slot.parent.lock();
        match *current {
            None => {
                *current = Some(parent.index);
                Ok(ParentClaim::Claimed)
            }
            Some(index) if index == parent.index => Ok(ParentClaim::AlreadyOwned),
            Some(index) => self
                .arena
                .handle(&nodes, index)
                .map(ParentClaim::OwnedByOther)
                .ok_or_else(|| DomainError::illegal_state("parent slot points outside the arena")),
        }
    }

    pub fn is_root(&self) -> bool {
        let nodes = self.arena.shared.nodes.read();
        nodes
            .get(self.index)
            .map_or(true, |slot| slot.parent.lock().is_none())
    }

    pub fn is_leaf(&self) -> bool {
        let nodes = self.arena.shared.nodes.read();
        nodes
            .get(self.index)
            .map_or(true, |slot| slot.children.read().is_empty())
    }

    /// Whether `self` is `node` or lies on the parent chain above it.
    pub fn is_ancestor_of(&self, node: &TreeNode<T>) -> bool {
        let mut current = Some(node.clone());
        let mut steps = 0;
        let limit = self.arena.len();
        while let Some(n) = current {
            if &n == self {
                return true;
            }
            // a broken chain must not spin forever
            steps += 1;
            if steps > limit {
                return false;
            }
            current = n.parent();
        }
        false
    }

    /// Pre-order walk of this subtree, starting with `self`.
    pub fn descendants(&self) -> PreOrder<T> {
        PreOrder {
            stack: vec![self.clone()],
        }
    }

    /// Post-order walk of this subtree, ending with `self`.
    pub fn post_order(&self) -> PostOrder<T> {
        PostOrder {
            stack: vec![(self.clone(), false)],
        }
    }

    /// Height of the subtree; a lone node has depth 1.
    #[instrument(level = "trace", skip(self))]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.clone(), 1)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            stack.extend(node.children().into_iter().map(|child| (child, level + 1)));
        }
        deepest
    }

    #[instrument(level = "trace", skip(self))]
    pub fn leaves(&self) -> Vec<TreeNode<T>> {
        self.descendants().filter(|node| node.is_leaf()).collect()
    }

    fn check_same_arena(&self, other: &TreeNode<T>, what: &str) -> TreeResult<()> {
        if self.arena.same_arena(&other.arena) {
            Ok(())
        } else {
            Err(DomainError::invalid_argument(format!(
                "{what} belongs to a different arena"
            )))
        }
    }
}

/// Read-only snapshot of a node's children.
pub struct Children<T> {
    nodes: Vec<TreeNode<T>>,
}

impl<T> Children<T> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: &TreeNode<T>) -> bool {
        self.nodes.contains(node)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TreeNode<T>> {
        self.nodes.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for Children<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.nodes.iter()).finish()
    }
}

impl<T> IntoIterator for Children<T> {
    type Item = TreeNode<T>;
    type IntoIter = std::vec::IntoIter<TreeNode<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Children<T> {
    type Item = &'a TreeNode<T>;
    type IntoIter = std::slice::Iter<'a, TreeNode<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

pub struct PreOrder<T> {
    stack: Vec<TreeNode<T>>,
}

impl<T> Iterator for PreOrder<T> {
    type Item = TreeNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        let children: Vec<_> = current.children().into_iter().collect();
        self.stack.extend(children.into_iter().rev());
        Some(current)
    }
}

pub struct PostOrder<T> {
    stack: Vec<(TreeNode<T>, bool)>,
}

impl<T> Iterator for PostOrder<T> {
    type Item = TreeNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current, visited)) = self.stack.pop() {
            if visited {
                return Some(current);
            }
            let children: Vec<_> = current.children().into_iter().collect();
            self.stack.push((current, true));
            for child in children.into_iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}
