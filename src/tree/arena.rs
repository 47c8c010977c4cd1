//! Node Arena
//!
//! Owns every node of one tree in a slot vector. Parent and child links are
//! slot indices; each slot carries a generation so handles to removed nodes
//! never resolve to a node that later reuses the slot. A slot is retired
//! once its generation is exhausted.
//!
//! The arena is not synchronized. The tree wraps it in a single lock.

use super::topic::join;
use chrono::{DateTime, Utc};
use std::sync::Arc;

// =============================================================================
// Node ID
// =============================================================================

/// Generation-checked index of a node within its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// The root always occupies the first slot and is never released
    pub const ROOT: NodeId = NodeId {
        index: 0,
        generation: 0,
    };

    #[inline]
    fn slot(&self) -> usize {
        self.index as usize
    }
}

// =============================================================================
// Node Data
// =============================================================================

/// Data stored for a single node
#[derive(Debug)]
pub(crate) struct NodeData<T> {
    /// Segment label, empty for the root
    pub label: Arc<str>,
    /// Non-owning parent link; the root points at itself
    pub parent: NodeId,
    /// Children in insertion order
    pub children: Vec<NodeId>,
    /// Application payload
    pub payload: Option<T>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl<T> NodeData<T> {
    fn new(label: &str, parent: NodeId) -> Self {
        Self {
            label: Arc::from(label),
            parent,
            children: Vec::new(),
            payload: None,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    data: Option<NodeData<T>>,
}

// =============================================================================
// Arena
// =============================================================================

#[derive(Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Arena<T> {
    /// Create an arena holding only the root
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: NodeId::ROOT.generation,
                data: Some(NodeData::new("", NodeId::ROOT)),
            }],
            free: Vec::new(),
            live: 1,
        }
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData<T>> {
        self.slots
            .get(id.slot())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData<T>> {
        self.slots
            .get_mut(id.slot())
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_mut())
    }

    /// Find the child of `parent` carrying `label`
    pub fn child(&self, parent: NodeId, label: &str) -> Option<NodeId> {
        self.get(parent)?
            .children
            .iter()
            .copied()
            .find(|&child| self.get(child).map_or(false, |node| &*node.label == label))
    }

    /// Full topic of a node, or the empty string for the root
    pub fn topic_of(&self, id: NodeId, separator: char) -> Option<String> {
        let mut labels = Vec::new();
        let mut current = id;
        while current != NodeId::ROOT {
            let node = self.get(current)?;
            labels.push(node.label.clone());
            current = node.parent;
        }
        labels.reverse();
        Some(join(&labels, separator))
    }

    /// Number of edges between the root and a node
    pub fn depth_of(&self, id: NodeId) -> Option<usize> {
        let mut depth = 0;
        let mut current = id;
        while current != NodeId::ROOT {
            current = self.get(current)?.parent;
            depth += 1;
        }
        Some(depth)
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Walk `segments` from `at`, creating every missing node.
    ///
    /// Returns the new leaf, or `None` when the leaf already existed (or
    /// `at` is not live). Newly created nodes are appended to `created` in
    /// creation order.
    pub fn put(&mut self, at: NodeId, segments: &[&str], created: &mut Vec<NodeId>) -> Option<NodeId> {
        let (head, rest) = segments.split_first()?;
        self.get(at)?;

        match self.child(at, head) {
            Some(_) if rest.is_empty() => None,
            Some(existing) => self.put(existing, rest, created),
            None => {
                let node = self.alloc(head, at);
                self.get_mut(at)?.children.push(node);
                created.push(node);
                if rest.is_empty() {
                    Some(node)
                } else {
                    self.put(node, rest, created)
                }
            }
        }
    }

    /// Walk `segments` from `at`, stopping at the first missing segment
    pub fn find(&self, at: NodeId, segments: &[&str]) -> Option<NodeId> {
        let (head, rest) = segments.split_first()?;
        let next = self.child(at, head)?;
        if rest.is_empty() {
            Some(next)
        } else {
            self.find(next, rest)
        }
    }

    /// Walk to the parent of the last segment and detach the child whose
    /// label matches it. Returns the number of nodes released.
    pub fn pop(&mut self, at: NodeId, segments: &[&str]) -> Option<usize> {
        let (head, rest) = segments.split_first()?;
        let target = self.child(at, head)?;
        if !rest.is_empty() {
            return self.pop(target, rest);
        }

        self.get_mut(at)?.children.retain(|&child| child != target);
        Some(self.release(target))
    }

    // =========================================================================
    // Slot management
    // =========================================================================

    fn alloc(&mut self, label: &str, parent: NodeId) -> NodeId {
        let data = NodeData::new(label, parent);
        self.live += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.data = Some(data);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            data: Some(data),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    /// Drop a detached node and its whole subtree.
    ///
    /// A slot whose generation reaches `u32::MAX` is retired instead of
    /// reused, so a generation never wraps back to one a stale id holds.
    fn release(&mut self, id: NodeId) -> usize {
        let mut released = 0;
        let mut pending = vec![id];

        while let Some(current) = pending.pop() {
            let Some(slot) = self
                .slots
                .get_mut(current.slot())
                .filter(|slot| slot.generation == current.generation)
            else {
                continue;
            };
            if let Some(data) = slot.data.take() {
                if slot.generation < u32::MAX {
                    slot.generation += 1;
                    self.free.push(current.index);
                }
                pending.extend(data.children);
                released += 1;
            }
        }

        self.live -= released;
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(arena: &Arena<()>, id: NodeId) -> Vec<String> {
        arena
            .get(id)
            .unwrap()
            .children
            .iter()
            .map(|&c| arena.get(c).unwrap().label.to_string())
            .collect()
    }

    #[test]
    fn test_root_is_own_parent() {
        let arena: Arena<()> = Arena::new();
        let root = arena.get(NodeId::ROOT).unwrap();
        assert_eq!(root.parent, NodeId::ROOT);
        assert_eq!(&*root.label, "");
        assert!(root.children.is_empty());
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_put_creates_missing_prefixes() {
        let mut arena: Arena<()> = Arena::new();
        let mut created = Vec::new();
        let leaf = arena.put(NodeId::ROOT, &["a", "b", "c"], &mut created).unwrap();

        assert_eq!(created.len(), 3);
        assert_eq!(*created.last().unwrap(), leaf);
        assert_eq!(arena.len(), 4);
        assert_eq!(arena.topic_of(leaf, '.').unwrap(), "a.b.c");
        assert_eq!(arena.depth_of(leaf), Some(3));
    }

    #[test]
    fn test_put_existing_leaf_is_noop() {
        let mut arena: Arena<()> = Arena::new();
        let mut created = Vec::new();
        arena.put(NodeId::ROOT, &["a", "b"], &mut created).unwrap();

        created.clear();
        assert!(arena.put(NodeId::ROOT, &["a", "b"], &mut created).is_none());
        assert!(created.is_empty());
        assert_eq!(arena.len(), 3);

        // Existing prefix, new leaf
        let leaf = arena.put(NodeId::ROOT, &["a", "c"], &mut created).unwrap();
        assert_eq!(created, vec![leaf]);
        assert_eq!(labels(&arena, arena.find(NodeId::ROOT, &["a"]).unwrap()), ["b", "c"]);
    }

    #[test]
    fn test_find_short_circuits() {
        let mut arena: Arena<()> = Arena::new();
        let mut created = Vec::new();
        arena.put(NodeId::ROOT, &["a", "b"], &mut created);

        assert!(arena.find(NodeId::ROOT, &["a", "b"]).is_some());
        assert!(arena.find(NodeId::ROOT, &["x", "b"]).is_none());
        assert!(arena.find(NodeId::ROOT, &["a", "b", "c"]).is_none());
        assert!(arena.find(NodeId::ROOT, &[]).is_none());
    }

    #[test]
    fn test_pop_removes_matching_sibling() {
        let mut arena: Arena<()> = Arena::new();
        let mut created = Vec::new();
        arena.put(NodeId::ROOT, &["a", "first"], &mut created);
        arena.put(NodeId::ROOT, &["a", "second"], &mut created);
        arena.put(NodeId::ROOT, &["a", "third"], &mut created);

        assert_eq!(arena.pop(NodeId::ROOT, &["a", "second"]), Some(1));
        let a = arena.find(NodeId::ROOT, &["a"]).unwrap();
        assert_eq!(labels(&arena, a), ["first", "third"]);
        assert!(arena.pop(NodeId::ROOT, &["a", "second"]).is_none());
    }

    #[test]
    fn test_pop_releases_subtree_and_invalidates_ids() {
        let mut arena: Arena<()> = Arena::new();
        let mut created = Vec::new();
        let c = arena.put(NodeId::ROOT, &["a", "b", "c"], &mut created).unwrap();
        arena.put(NodeId::ROOT, &["a", "b", "d"], &mut created);

        assert_eq!(arena.pop(NodeId::ROOT, &["a", "b"]), Some(3));
        assert_eq!(arena.len(), 2);
        assert!(arena.get(c).is_none());

        // Reused slot must not resolve through the old id
        created.clear();
        let fresh = arena.put(NodeId::ROOT, &["z"], &mut created).unwrap();
        assert!(arena.get(fresh).is_some());
        assert!(arena.get(c).is_none());
        assert!(arena.put(c, &["y"], &mut created).is_none());
    }

    #[test]
    fn test_exhausted_slot_is_retired() {
        let mut arena: Arena<()> = Arena::new();
        let mut created = Vec::new();
        arena.put(NodeId::ROOT, &["a"], &mut created).unwrap();
        assert_eq!(arena.pop(NodeId::ROOT, &["a"]), Some(1));

        // Slot 1 is free; push it to its last generation before reuse
        arena.slots[1].generation = u32::MAX;
        let b = arena.put(NodeId::ROOT, &["b"], &mut created).unwrap();
        assert_eq!(b.index, 1);
        assert_eq!(b.generation, u32::MAX);

        assert_eq!(arena.pop(NodeId::ROOT, &["b"]), Some(1));
        assert!(arena.free.is_empty());
        assert!(arena.get(b).is_none());

        let c = arena.put(NodeId::ROOT, &["c"], &mut created).unwrap();
        assert_eq!(c.index, 2);
        assert!(arena.get(b).is_none());
        assert_eq!(arena.len(), 2);
    }
}
