//! Tree Events
//!
//! Events emitted by the topic tree for external consumers to react to
//! topic lifecycle changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events emitted by the topic tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeEvent {
    /// A node was created, either as a requested leaf or an implicit prefix
    NodeCreated {
        topic: String,
        created_at: DateTime<Utc>,
    },

    /// A node was removed together with its descendants
    NodeRemoved { topic: String, nodes_removed: u64 },
}

impl TreeEvent {
    /// Get the full topic associated with this event
    pub fn topic(&self) -> &str {
        match self {
            TreeEvent::NodeCreated { topic, .. } => topic,
            TreeEvent::NodeRemoved { topic, .. } => topic,
        }
    }

    /// Check if this is a creation event
    pub fn is_creation(&self) -> bool {
        matches!(self, TreeEvent::NodeCreated { .. })
    }

    /// Check if this is a removal event
    pub fn is_removal(&self) -> bool {
        matches!(self, TreeEvent::NodeRemoved { .. })
    }
}
