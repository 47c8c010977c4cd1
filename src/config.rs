//! Tree Configuration
//!
//! Settings for topic parsing and event emission. Loadable from YAML or
//! JSON files; every field has a default so partial files are accepted.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

// =============================================================================
// Constants
// =============================================================================

/// Default topic segment separator
pub const DEFAULT_SEPARATOR: char = '.';

/// Default capacity of the tree event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Largest accepted event channel capacity; the channel allocates it up front
pub const MAX_EVENT_CAPACITY: usize = 1 << 20;

// =============================================================================
// Tree Configuration
// =============================================================================

/// Configuration for a topic tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Character separating topic segments
    pub separator: char,
    /// Maximum number of segments accepted in one topic
    pub max_depth: Option<usize>,
    /// Maximum length of a single segment in bytes
    pub max_segment_len: Option<usize>,
    /// Capacity of the event broadcast channel
    pub event_capacity: usize,
    /// Emit lifecycle events to subscribers
    pub emit_events: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            max_depth: None,
            max_segment_len: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            emit_events: true,
        }
    }
}

impl TreeConfig {
    /// Parse a configuration from YAML text
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: TreeConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: TreeConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, choosing the format by extension
    /// (`.json` is JSON, anything else is YAML)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let config = if is_json {
            Self::from_json_str(&text)?
        } else {
            Self::from_yaml_str(&text)?
        };

        debug!(
            path = %path.display(),
            separator = %config.separator,
            "loaded tree configuration"
        );
        Ok(config)
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_alphanumeric() || self.separator.is_whitespace() {
            return Err(Error::Configuration(format!(
                "separator '{}' must be punctuation",
                self.separator
            )));
        }
        if self.event_capacity == 0 {
            return Err(Error::Configuration(
                "event_capacity must be greater than zero".to_string(),
            ));
        }
        if self.event_capacity > MAX_EVENT_CAPACITY {
            return Err(Error::Configuration(format!(
                "event_capacity {} exceeds maximum {}",
                self.event_capacity, MAX_EVENT_CAPACITY
            )));
        }
        if self.max_depth == Some(0) {
            return Err(Error::Configuration(
                "max_depth must be greater than zero".to_string(),
            ));
        }
        if self.max_segment_len == Some(0) {
            return Err(Error::Configuration(
                "max_segment_len must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
