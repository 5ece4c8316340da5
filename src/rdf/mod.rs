//! RDF view of the outline
//!
//! This module provides:
//! - Thin wrappers over oxrdf terms and quads
//! - An indexed in-memory quad store
//! - The `dc:`/`ts:` vocabulary and node IRI scheme
//! - The projector that keeps one quad set per node in sync with the tree
//! - Turtle writing and reading
//!
//! # Example
//!
//! ```rust
//! use outliner::rdf::{Literal, NamedNode, Quad, QuadStore, RdfPredicate};
//!
//! let mut store = QuadStore::new();
//!
//! let subject = NamedNode::new("http://example.org/outline/data/root").unwrap();
//! let predicate = RdfPredicate::new("http://purl.org/dc/terms/title").unwrap();
//! let object = Literal::new_simple_literal("Inbox");
//!
//! store.insert(Quad::new(subject.clone(), predicate, object)).unwrap();
//! assert_eq!(store.quads_for_subject(&subject).len(), 1);
//! ```

mod namespace;
mod projector;
pub mod serialization;
mod store;
mod types;

pub use types::{
    local_name, Literal, NamedNode, Quad, QuadPattern, RdfError, RdfObject, RdfPredicate,
    RdfResult,
};

pub use store::{QuadStore, QuadStoreError, QuadStoreResult};

pub use namespace::{
    Namespace, Vocabulary, DEFAULT_BASE_IRI, DEFAULT_DC_NAMESPACE, DEFAULT_SCHEMA_NAMESPACE,
    NODE_CLASS, RDF_NAMESPACE, ROOT_CLASS, XSD_NAMESPACE,
};

pub use projector::RdfProjector;

pub use serialization::{
    escape_literal, parse_outline, serialize_quads, write_outline, ParseError, ParseResult,
    SerializeError, SerializeResult,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rdf_module_exports() {
        let _store: QuadStore = QuadStore::new();
        let vocab = Vocabulary::default();
        let _projector = RdfProjector::new(vocab);
    }
}
