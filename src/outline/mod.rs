//! Outline tree
//!
//! A single-rooted, ordered tree of titled nodes. [`NodeStore`] owns the tree
//! and keeps the RDF projection in step with every mutation.

pub mod event;
pub mod id;
pub mod node;
pub mod store;
pub mod types;

pub use event::OutlineEvent;
pub use id::{IdGenerator, IdStrategy};
pub use node::{FlatNodeRecord, Node, NodeUpdate, RecordError};
pub use store::{NodeStore, OutlineError, OutlineResult};
pub use types::{NodeId, NodeKind};
