//! Topic Tree Module
//!
//! Hierarchical namespace of topic nodes guarded by one tree-wide
//! reader/writer lock, with lifecycle events and operation statistics.

mod arena;
pub mod events;
pub mod node;
pub mod stats;
pub mod topic;

pub use events::*;
pub use node::{TopicNode, TopicTree};
pub use stats::*;
pub use topic::Topic;
