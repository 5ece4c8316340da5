//! Core type definitions for the outline tree

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, globally unique node identifier
///
/// Ids end up as the trailing path segment of the node IRI, so they never
/// contain `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Safe to embed as the last segment of an IRI path
    pub fn is_path_safe(&self) -> bool {
        !self.0.is_empty()
            && !self
                .0
                .chars()
                .any(|c| matches!(c, '/' | '#' | '?') || c.is_whitespace())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Kind of node: exactly one Root per tree, everything else is an Item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Root,
    Item,
}

impl NodeKind {
    /// Local name of the RDF class for this kind (`ts:RootNode` / `ts:Node`)
    pub fn class_name(&self) -> &'static str {
        match self {
            NodeKind::Root => crate::rdf::ROOT_CLASS,
            NodeKind::Item => crate::rdf::NODE_CLASS,
        }
    }

    /// Inverse of [`NodeKind::class_name`]
    pub fn from_class_name(name: &str) -> Option<Self> {
        match name {
            crate::rdf::ROOT_CLASS => Some(NodeKind::Root),
            crate::rdf::NODE_CLASS => Some(NodeKind::Item),
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class_name())
    }
}
