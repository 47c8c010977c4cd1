//! Topic Tree
//!
//! A thread-safe hierarchical namespace keyed by dot-separated topic strings
//! such as `vehicle.sensors.speed`. Nodes are created like `mkdir -p`,
//! looked up segment by segment, and removed together with their subtree.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                        TopicTree<T>                        │
//! ├───────────────────────────────────────────────────────────┤
//! │   RwLock<Arena<T>>  (one lock per tree)                   │
//! │   ┌─────────┐                                             │
//! │   │  root   │──┬── vehicle ──┬── speed                    │
//! │   └─────────┘  │             └── rpm                      │
//! │                └── fleet ───── car1                       │
//! ├───────────────────────────────────────────────────────────┤
//! │  TreeStats (atomics)   │  broadcast::Sender<TreeEvent>     │
//! └───────────────────────────────────────────────────────────┘
//!            ▲
//!            │ Arc
//!   TopicNode<T> handles (any node can start create/search/remove)
//! ```
//!
//! # Example
//!
//! ```
//! use topic_tree::TopicTree;
//!
//! let tree: TopicTree<&str> = TopicTree::new();
//! let speed = tree.create("vehicle.speed").unwrap();
//! speed.set_payload("kph").unwrap();
//!
//! assert_eq!(tree.search("vehicle.speed"), Some(speed));
//! assert!(tree.create("vehicle.speed").is_none());
//!
//! assert!(tree.remove("vehicle"));
//! assert!(tree.search("vehicle.speed").is_none());
//! ```
//!
//! # Modules
//!
//! - [`tree`]: the tree, node handles, topic parsing, stats, and events
//! - [`config`]: tree configuration and file loading
//! - [`error`]: error types and handling

pub mod config;
pub mod error;
pub mod tree;

// Re-export commonly used types
pub use config::TreeConfig;
pub use error::{Error, Result};
pub use tree::{Topic, TopicNode, TopicTree, TreeEvent, TreeStatsSnapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
