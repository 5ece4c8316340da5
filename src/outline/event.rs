//! Outline events for the presentation layer
//!
//! Emitted after each successful store mutation when the store was created
//! with [`NodeStore::with_events`](super::NodeStore::with_events).

use super::types::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineEvent {
    RootCreated {
        id: NodeId,
    },
    NodeAdded {
        id: NodeId,
        parent: NodeId,
        index: usize,
    },
    NodeUpdated {
        id: NodeId,
    },
    DescriptionChanged {
        id: NodeId,
    },
    NodeMoved {
        id: NodeId,
        old_parent: NodeId,
        new_parent: NodeId,
        index: usize,
    },
    /// A cascaded delete; `ids` lists descendants first, the deleted node last
    NodesDeleted {
        parent: NodeId,
        ids: Vec<NodeId>,
    },
    TreeRebuilt {
        node_count: usize,
    },
    TreeReset,
}
