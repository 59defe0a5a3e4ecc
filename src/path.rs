//! A type-safe representation of a position in the declaration tree.
//!
//! A `PathKey` is the ordered list of subject, action and test descriptions
//! leading to a node. During discovery it grows and shrinks with strict stack
//! discipline; once a leaf is reached a snapshot is stored in the catalog and
//! never changes again.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PathKey(Vec<String>);

impl PathKey {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The subject this path starts at, if any.
    pub fn subject(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Returns the fully qualified name: every segment joined by a single space.
    pub fn name(&self) -> String {
        self.0.join(" ")
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl<S: Into<String>> FromIterator<S> for PathKey {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl From<Vec<String>> for PathKey {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}
