//! Outline node record and its update/flat forms

use super::types::{NodeId, NodeKind};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single loaded record was rejected; the rest of the load continues
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("unknown node type '{0}'")]
    UnknownType(String),

    #[error("index is not a base-10 integer: '{0}'")]
    InvalidIndex(String),

    #[error("created is not an xsd:dateTime: '{0}'")]
    InvalidDate(String),
}

/// A node in the outline tree
///
/// Structural fields (`parent`, `children`, `index`) are maintained by
/// [`NodeStore`](super::NodeStore); callers only ever see shared references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Immutable identifier
    pub id: NodeId,

    pub kind: NodeKind,

    pub title: String,

    /// Set once at creation; absent only for records loaded without a date
    pub created: Option<DateTime<Utc>>,

    /// Markdown body
    pub description: Option<String>,

    /// None for the Root
    pub parent: Option<NodeId>,

    /// Ordered children (display order)
    pub children: Vec<NodeId>,

    /// Position inside the parent's `children`; always equals the real position
    pub index: usize,
}

impl Node {
    /// Create a detached node stamped with the current time
    pub fn new(id: NodeId, kind: NodeKind, title: impl Into<String>) -> Self {
        Node {
            id,
            kind,
            title: title.into(),
            created: Some(Utc::now()),
            description: None,
            parent: None,
            children: Vec::new(),
            index: 0,
        }
    }

    pub fn is_root(&self) -> bool {
        self.kind == NodeKind::Root
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// `created` as an `xsd:dateTime` lexical form (millisecond precision, UTC `Z`)
    pub fn created_lexical(&self) -> Option<String> {
        self.created.map(format_timestamp)
    }
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an `xsd:dateTime` lexical form; values without a timezone are taken as UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RecordError> {
    let trimmed = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| RecordError::InvalidDate(value.to_string()))
}

pub fn parse_index(value: &str) -> Result<usize, RecordError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| RecordError::InvalidIndex(value.to_string()))
}

/// Partial update applied through `NodeStore::update_node`
///
/// Only scalar content fields are reachable here; ids and tree structure are not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeUpdate {
    pub title: Option<String>,
    /// `Some(None)` clears the description
    pub description: Option<Option<String>>,
}

impl NodeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Flat, link-free node record as produced by the load path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatNodeRecord {
    pub id: NodeId,
    pub kind: NodeKind,
    pub title: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub index: Option<usize>,
    pub parent: Option<NodeId>,
}

impl FlatNodeRecord {
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            title: None,
            created: None,
            description: None,
            index: None,
            parent: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }
}

impl From<&Node> for FlatNodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            kind: node.kind,
            title: Some(node.title.clone()),
            created: node.created,
            description: node.description.clone(),
            index: node.parent.as_ref().map(|_| node.index),
            parent: node.parent.clone(),
        }
    }
}
