//! Outliner
//!
//! A hierarchical outliner whose tree is mirrored, mutation by mutation, into
//! an RDF quad set and synchronized with a SPARQL endpoint.
//!
//! # Layout
//!
//! - [`outline`]: the ordered node tree (`NodeStore`) and its records
//! - [`rdf`]: quad model, projection of the tree, Turtle reading/writing
//! - [`sparql`]: load query and SPARQL JSON results parsing
//! - [`sync`]: gateway trait and the load/save session
//! - [`config`]: namespaces, base IRI and id strategy
//!
//! ## Example Usage
//!
//! ```rust
//! use outliner::outline::NodeStore;
//! use outliner::rdf::write_outline;
//!
//! let mut store = NodeStore::new();
//! let root = store.create_root().unwrap().id.clone();
//!
//! let milk = store.add_node(&root, "Buy milk", None).unwrap().id.clone();
//! let eggs = store.add_node(&root, "Buy eggs", None).unwrap().id.clone();
//! assert_eq!(store.get_node(&eggs).unwrap().index, 1);
//!
//! // Nest "Buy eggs" under "Buy milk"
//! store.move_node(&eggs, &milk, None).unwrap();
//! assert_eq!(store.get_node(&eggs).unwrap().parent.as_ref(), Some(&milk));
//!
//! let turtle = write_outline(&store).unwrap();
//! assert!(turtle.contains("dc:title \"Buy eggs\""));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod outline;
pub mod rdf;
pub mod sparql;
pub mod sync;

// Re-export main types for convenience
pub use config::{ConfigError, ConfigResult, OutlineConfig};

pub use outline::{
    FlatNodeRecord, IdGenerator, IdStrategy, Node, NodeId, NodeKind, NodeStore, NodeUpdate,
    OutlineError, OutlineEvent, OutlineResult, RecordError,
};

pub use rdf::{
    parse_outline, serialize_quads, write_outline, NamedNode, Quad, QuadStore, RdfError,
    RdfProjector, SerializeError, Vocabulary,
};

pub use sparql::{load_query, parse_bindings, ParsedBindings, SparqlError, SparqlResult};

pub use sync::{GatewayError, LoadOutcome, OutlineSession, SyncError, SyncGateway, SyncResult};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
