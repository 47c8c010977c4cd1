//! Topic Parsing
//!
//! Splits a separator-delimited topic string into its segments and enforces
//! the limits configured for the tree.

use crate::config::TreeConfig;
use crate::error::{Error, Result};

/// A validated topic, borrowed from the caller's string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic<'a> {
    raw: &'a str,
    segments: Vec<&'a str>,
}

impl<'a> Topic<'a> {
    /// Parse a topic with the given configuration
    ///
    /// Rejects empty topics, empty segments (leading, trailing, or doubled
    /// separators), and topics exceeding the configured depth or segment
    /// length.
    pub fn parse(raw: &'a str, config: &TreeConfig) -> Result<Self> {
        if raw.is_empty() {
            return Err(invalid(raw, "topic is empty".to_string()));
        }

        let segments: Vec<&str> = raw.split(config.separator).collect();

        if let Some(position) = segments.iter().position(|s| s.is_empty()) {
            return Err(invalid(raw, format!("empty segment at position {}", position)));
        }

        if let Some(max_depth) = config.max_depth {
            if segments.len() > max_depth {
                return Err(invalid(
                    raw,
                    format!("depth {} exceeds maximum {}", segments.len(), max_depth),
                ));
            }
        }

        if let Some(max_len) = config.max_segment_len {
            if let Some(long) = segments.iter().find(|s| s.len() > max_len) {
                return Err(invalid(
                    raw,
                    format!("segment '{}' exceeds {} bytes", long, max_len),
                ));
            }
        }

        Ok(Self { raw, segments })
    }

    /// The topic as given
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    /// Segments in order from the start node
    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    /// Number of segments
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl std::fmt::Display for Topic<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Join labels into a topic string
pub fn join<S: AsRef<str>>(labels: &[S], separator: char) -> String {
    let mut topic = String::new();
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            topic.push(separator);
        }
        topic.push_str(label.as_ref());
    }
    topic
}

fn invalid(raw: &str, reason: String) -> Error {
    Error::InvalidTopic {
        topic: raw.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_segments() {
        let config = TreeConfig::default();
        let topic = Topic::parse("a.b.c", &config).unwrap();
        assert_eq!(topic.segments(), &["a", "b", "c"]);
        assert_eq!(topic.depth(), 3);
        assert_eq!(topic.as_str(), "a.b.c");

        let single = Topic::parse("sensors", &config).unwrap();
        assert_eq!(single.segments(), &["sensors"]);
    }

    #[test]
    fn test_parse_rejects_empty_segments() {
        let config = TreeConfig::default();
        for raw in ["", ".", "a..b", ".a", "a."] {
            assert_matches!(
                Topic::parse(raw, &config),
                Err(Error::InvalidTopic { .. }),
                "{:?} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_parse_custom_separator() {
        let config = TreeConfig {
            separator: '/',
            ..Default::default()
        };
        let topic = Topic::parse("a.b/c", &config).unwrap();
        assert_eq!(topic.segments(), &["a.b", "c"]);
    }

    #[test]
    fn test_parse_limits() {
        let config = TreeConfig {
            max_depth: Some(2),
            max_segment_len: Some(4),
            ..Default::default()
        };
        assert!(Topic::parse("a.b", &config).is_ok());
        assert_matches!(
            Topic::parse("a.b.c", &config),
            Err(Error::InvalidTopic { reason, .. }) if reason.contains("depth")
        );
        assert_matches!(
            Topic::parse("a.toolong", &config),
            Err(Error::InvalidTopic { reason, .. }) if reason.contains("toolong")
        );
    }

    #[test]
    fn test_join() {
        assert_eq!(join(&["a", "b", "c"], '.'), "a.b.c");
        assert_eq!(join::<&str>(&[], '.'), "");
        assert_eq!(join(&["x".to_string()], '/'), "x");
    }
}
