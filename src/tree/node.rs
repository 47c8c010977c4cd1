//! Topic Tree and Node Handles
//!
//! A [`TopicTree`] owns one `parking_lot::RwLock` over the node arena. Every
//! [`TopicNode`] handle reaches that lock through a shared reference to the
//! tree, so any node can start a create, search, or remove and all of them
//! serialize against the same lock.
//!
//! Create and remove hold the write lock for the whole walk plus mutation;
//! search holds the read lock, so searches run in parallel with each other
//! but never alongside a writer. Reads are taken recursively, so a thread
//! already holding the read lock can read again while a writer is queued.

use super::arena::{Arena, NodeId};
use super::events::TreeEvent;
use super::stats::{TreeStats, TreeStatsSnapshot};
use super::topic::{join, Topic};
use crate::config::TreeConfig;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

// =============================================================================
// Shared State
// =============================================================================

struct TreeShared<T> {
    config: TreeConfig,
    /// The single tree-wide lock
    arena: RwLock<Arena<T>>,
    stats: TreeStats,
    event_sender: broadcast::Sender<TreeEvent>,
}

impl<T> TreeShared<T> {
    /// Shared lock for lookups. Recursive so that a payload closure can read
    /// the tree again while a writer is queued.
    fn read(&self) -> RwLockReadGuard<'_, Arena<T>> {
        self.arena.read_recursive()
    }

    fn emit(&self, event: TreeEvent) {
        if self.config.emit_events {
            let _ = self.event_sender.send(event);
        }
    }
}

// =============================================================================
// Topic Tree
// =============================================================================

/// Thread-safe hierarchical namespace keyed by separator-delimited topics
///
/// Cloning a tree is cheap and yields another handle to the same nodes.
pub struct TopicTree<T> {
    shared: Arc<TreeShared<T>>,
}

impl<T> TopicTree<T> {
    /// Create an empty tree with the default configuration
    pub fn new() -> Self {
        Self::build(TreeConfig::default())
    }

    /// Create an empty tree with a validated configuration
    pub fn with_config(config: TreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: TreeConfig) -> Self {
        let (event_sender, _) = broadcast::channel(config.event_capacity);
        Self {
            shared: Arc::new(TreeShared {
                config,
                arena: RwLock::new(Arena::new()),
                stats: TreeStats::default(),
                event_sender,
            }),
        }
    }

    /// Handle to the root node
    pub fn root(&self) -> TopicNode<T> {
        TopicNode {
            shared: self.shared.clone(),
            id: NodeId::ROOT,
            label: Arc::from(""),
        }
    }

    /// Insert `topic` below the root, see [`TopicNode::create`]
    pub fn create(&self, topic: &str) -> Option<TopicNode<T>> {
        self.root().create(topic)
    }

    /// Look up `topic` below the root, see [`TopicNode::search`]
    pub fn search(&self, topic: &str) -> Option<TopicNode<T>> {
        self.root().search(topic)
    }

    /// Remove `topic` below the root, see [`TopicNode::remove`]
    pub fn remove(&self, topic: &str) -> bool {
        self.root().remove(topic)
    }

    /// Insert `topic` below the root, see [`TopicNode::try_create`]
    pub fn try_create(&self, topic: &str) -> Result<TopicNode<T>> {
        self.root().try_create(topic)
    }

    /// Look up `topic` below the root, see [`TopicNode::try_search`]
    pub fn try_search(&self, topic: &str) -> Result<TopicNode<T>> {
        self.root().try_search(topic)
    }

    /// Remove `topic` below the root, see [`TopicNode::try_remove`]
    pub fn try_remove(&self, topic: &str) -> Result<usize> {
        self.root().try_remove(topic)
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.shared.read().len()
    }

    /// Check if the tree holds nothing but the root
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    /// Configuration the tree was built with
    pub fn config(&self) -> &TreeConfig {
        &self.shared.config
    }

    /// Get operation statistics
    pub fn stats(&self) -> TreeStatsSnapshot {
        self.shared.stats.snapshot()
    }

    /// Get an event receiver
    pub fn subscribe(&self) -> broadcast::Receiver<TreeEvent> {
        self.shared.event_sender.subscribe()
    }
}

impl<T> Default for TopicTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TopicTree<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> std::fmt::Debug for TopicTree<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicTree")
            .field("nodes", &self.len())
            .field("separator", &self.shared.config.separator)
            .finish()
    }
}

// =============================================================================
// Topic Node
// =============================================================================

/// Handle to one node of a [`TopicTree`]
///
/// Handles stay valid to hold after the node is removed; they then resolve
/// to nothing: lookups from them fail and accessors return empty values.
pub struct TopicNode<T> {
    shared: Arc<TreeShared<T>>,
    id: NodeId,
    label: Arc<str>,
}

impl<T> TopicNode<T> {
    fn handle(&self, arena: &Arena<T>, id: NodeId) -> Option<TopicNode<T>> {
        let label = arena.get(id)?.label.clone();
        Some(TopicNode {
            shared: self.shared.clone(),
            id,
            label,
        })
    }

    /// Full topic of `path` resolved from this node
    fn topic_below(&self, arena: &Arena<T>, path: &str) -> String {
        let separator = self.shared.config.separator;
        match arena.topic_of(self.id, separator) {
            Some(base) if !base.is_empty() => join(&[base.as_str(), path], separator),
            _ => path.to_string(),
        }
    }

    // =========================================================================
    // Core operations
    // =========================================================================

    /// Insert `topic` below this node, creating missing prefixes.
    ///
    /// Returns the new leaf, or `None` when the leaf already existed or the
    /// topic is malformed.
    pub fn create(&self, topic: &str) -> Option<TopicNode<T>> {
        self.try_create(topic).ok()
    }

    /// Look up `topic` below this node
    pub fn search(&self, topic: &str) -> Option<TopicNode<T>> {
        self.try_search(topic).ok()
    }

    /// Remove `topic` and its whole subtree. Returns `true` iff a node was
    /// removed.
    pub fn remove(&self, topic: &str) -> bool {
        self.try_remove(topic).is_ok()
    }

    /// Insert `topic` below this node, reporting why nothing was created
    pub fn try_create(&self, topic: &str) -> Result<TopicNode<T>> {
        let shared = &self.shared;
        let parsed = Topic::parse(topic, &shared.config)?;

        let mut arena = shared.arena.write();
        if arena.get(self.id).is_none() {
            return Err(Error::StaleNode);
        }

        let mut created = Vec::new();
        let leaf = arena.put(self.id, parsed.segments(), &mut created);

        let Some(leaf) = leaf else {
            shared.stats.record_conflict();
            trace!(topic = %parsed, "topic already exists");
            return Err(Error::TopicExists {
                topic: topic.to_string(),
            });
        };

        shared.stats.record_created(created.len());
        for &id in &created {
            let (Some(full_topic), Some(node)) = (
                arena.topic_of(id, shared.config.separator),
                arena.get(id),
            ) else {
                continue;
            };
            shared.emit(TreeEvent::NodeCreated {
                topic: full_topic,
                created_at: node.created_at,
            });
        }

        debug!(topic = %parsed, created = created.len(), "topic created");
        self.handle(&arena, leaf).ok_or(Error::StaleNode)
    }

    /// Look up `topic` below this node, reporting why nothing was found
    pub fn try_search(&self, topic: &str) -> Result<TopicNode<T>> {
        let shared = &self.shared;
        let parsed = Topic::parse(topic, &shared.config)?;

        let arena = shared.read();
        if arena.get(self.id).is_none() {
            return Err(Error::StaleNode);
        }

        let found = arena.find(self.id, parsed.segments());
        shared.stats.record_search(found.is_some());
        trace!(topic = %parsed, found = found.is_some(), "topic search");

        found
            .and_then(|id| self.handle(&arena, id))
            .ok_or_else(|| Error::TopicNotFound {
                topic: topic.to_string(),
            })
    }

    /// Remove `topic` and its subtree, returning the number of nodes released
    pub fn try_remove(&self, topic: &str) -> Result<usize> {
        let shared = &self.shared;
        let parsed = Topic::parse(topic, &shared.config)?;

        let mut arena = shared.arena.write();
        if arena.get(self.id).is_none() {
            return Err(Error::StaleNode);
        }

        let full_topic = self.topic_below(&arena, parsed.as_str());
        let Some(released) = arena.pop(self.id, parsed.segments()) else {
            trace!(topic = %parsed, "nothing to remove");
            return Err(Error::TopicNotFound {
                topic: topic.to_string(),
            });
        };

        shared.stats.record_removal(released);
        shared.emit(TreeEvent::NodeRemoved {
            topic: full_topic.clone(),
            nodes_removed: released as u64,
        });

        debug!(topic = %full_topic, released, "topic removed");
        Ok(released)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Segment label of this node, empty for the root
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Check if this is the root node
    pub fn is_root(&self) -> bool {
        self.id == NodeId::ROOT
    }

    /// Check if the node is still part of its tree
    pub fn is_alive(&self) -> bool {
        self.shared.read().get(self.id).is_some()
    }

    /// Full topic from the root, rebuilt from parent links
    pub fn topic(&self) -> Option<String> {
        self.shared
            .read()
            .topic_of(self.id, self.shared.config.separator)
    }

    /// Number of edges from the root
    pub fn depth(&self) -> Option<usize> {
        self.shared.read().depth_of(self.id)
    }

    /// Parent node; `None` for the root and for removed nodes
    pub fn parent(&self) -> Option<TopicNode<T>> {
        if self.is_root() {
            return None;
        }
        let arena = self.shared.read();
        let parent = arena.get(self.id)?.parent;
        self.handle(&arena, parent)
    }

    /// Snapshot of the children in insertion order
    pub fn children(&self) -> Vec<TopicNode<T>> {
        let arena = self.shared.read();
        match arena.get(self.id) {
            Some(node) => node
                .children
                .iter()
                .filter_map(|&child| self.handle(&arena, child))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Number of direct children
    pub fn child_count(&self) -> usize {
        self.shared
            .read()
            .get(self.id)
            .map_or(0, |node| node.children.len())
    }

    /// Creation time; `None` once the node is removed
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.shared.read().get(self.id).map(|node| node.created_at)
    }

    /// Tree this node belongs to
    pub fn tree(&self) -> TopicTree<T> {
        TopicTree {
            shared: self.shared.clone(),
        }
    }

    // =========================================================================
    // Payload
    // =========================================================================

    /// Run `f` against the attached payload under the read lock
    ///
    /// `f` may read the tree again (search, topic, children) but must not
    /// create, remove, or set payloads on the same tree: those need the
    /// write lock and would wait on the lock `f` is holding.
    pub fn with_payload<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        let arena = self.shared.read();
        f(arena.get(self.id).and_then(|node| node.payload.as_ref()))
    }

    /// Attach a payload, returning the previous one
    pub fn set_payload(&self, payload: T) -> Result<Option<T>> {
        let mut arena = self.shared.arena.write();
        let node = arena.get_mut(self.id).ok_or(Error::StaleNode)?;
        Ok(node.payload.replace(payload))
    }

    /// Detach and return the payload
    pub fn take_payload(&self) -> Option<T> {
        self.shared
            .arena
            .write()
            .get_mut(self.id)
            .and_then(|node| node.payload.take())
    }
}

impl<T: Clone> TopicNode<T> {
    /// Clone of the attached payload
    pub fn payload(&self) -> Option<T> {
        self.with_payload(|payload| payload.cloned())
    }
}

impl<T> Clone for TopicNode<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
            id: self.id,
            label: self.label.clone(),
        }
    }
}

impl<T> PartialEq for TopicNode<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared) && self.id == other.id
    }
}

impl<T> Eq for TopicNode<T> {}

impl<T> std::fmt::Debug for TopicNode<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopicNode")
            .field("label", &&*self.label)
            .field("id", &self.id)
            .finish()
    }
}
