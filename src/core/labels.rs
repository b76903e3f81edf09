//! Ordered label sequences attached to metrics and events
//!
//! A `Labels` value is the optional context for a report (for instance the
//! tile coordinates of the volume being processed) or the arguments that
//! disambiguate one instantiation of a process from another. Labels keep
//! their insertion order so downstream systems can treat them positionally.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    values: Vec<String>,
}

impl Labels {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Append a label, preserving order
    pub fn push(&mut self, label: impl Into<String>) {
        self.values.push(label.into());
    }

    /// Builder-style append
    #[must_use]
    pub fn with(mut self, label: impl Into<String>) -> Self {
        self.values.push(label.into());
        self
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.values.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Clone the labels into a plain tag list
    pub fn to_tags(&self) -> Vec<String> {
        self.values.clone()
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.values.join(", "))
    }
}

impl From<&str> for Labels {
    fn from(label: &str) -> Self {
        Self {
            values: vec![label.to_string()],
        }
    }
}

impl From<String> for Labels {
    fn from(label: String) -> Self {
        Self {
            values: vec![label],
        }
    }
}

impl From<Vec<String>> for Labels {
    fn from(values: Vec<String>) -> Self {
        Self { values }
    }
}

impl From<&[&str]> for Labels {
    fn from(labels: &[&str]) -> Self {
        Self {
            values: labels.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FromIterator<String> for Labels {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_label() {
        let labels = Labels::from("tile 3");
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.to_string(), "tile 3");
    }

    #[test]
    fn test_order_preserved() {
        let labels = Labels::new().with("mfov: 5").with("tile: 3");
        assert_eq!(labels.as_slice(), &["mfov: 5", "tile: 3"]);
        assert_eq!(labels.to_string(), "mfov: 5, tile: 3");
    }

    #[test]
    fn test_from_slice() {
        let labels = Labels::from(["bar", "baz"].as_slice());
        assert_eq!(labels.to_tags(), vec!["bar".to_string(), "baz".to_string()]);
    }

    #[test]
    fn test_empty() {
        let labels = Labels::new();
        assert!(labels.is_empty());
        assert_eq!(labels.to_string(), "");
    }
}
