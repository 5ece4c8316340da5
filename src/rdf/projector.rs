//! Outline tree → RDF projection
//!
//! Each node maps onto a fixed predicate set:
//!
//! | field       | predicate        | object                          |
//! |-------------|------------------|---------------------------------|
//! | kind        | `rdf:type`       | `ts:RootNode` / `ts:Node`       |
//! | title       | `dc:title`       | plain literal                   |
//! | created     | `dc:created`     | `xsd:dateTime` literal          |
//! | description | `ts:description` | plain literal (omitted if None) |
//! | parent      | `ts:parent`      | node IRI (omitted for the Root) |
//! | index       | `ts:index`       | stringified integer literal     |
//!
//! The projector never touches the tree; the store drives it after every
//! mutation so the quads for a node always reflect its current fields.

use super::namespace::Vocabulary;
use super::store::QuadStore;
use super::types::{Literal, NamedNode, Quad, QuadPattern, RdfObject};
use crate::outline::{Node, NodeId};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct RdfProjector {
    vocab: Vocabulary,
    quads: QuadStore,
}

impl RdfProjector {
    pub fn new(vocab: Vocabulary) -> Self {
        Self {
            vocab,
            quads: QuadStore::new(),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Read access for the serializers
    pub fn quads(&self) -> &QuadStore {
        &self.quads
    }

    /// Replace every quad about `node` with its current projection
    pub fn project_node(&mut self, node: &Node) {
        let subject = match self.vocab.node_iri(node.id.as_str()) {
            Ok(subject) => subject,
            Err(e) => {
                warn!(node = %node.id, error = %e, "node id does not form a valid IRI, not projected");
                return;
            }
        };

        self.quads.remove_subject(&subject);
        for quad in self.derive(&subject, node) {
            if let Err(e) = self.quads.insert(quad) {
                debug!(error = %e, "skipping duplicate projected quad");
            }
        }
    }

    /// Remove the node's own quads and every quad pointing at it
    pub fn remove_node(&mut self, id: &NodeId) -> usize {
        match self.vocab.node_iri(id.as_str()) {
            Ok(iri) => self.quads.remove_mentions(&iri),
            Err(_) => 0,
        }
    }

    /// Clear the collection and project every node again
    pub fn rebuild_all<'a>(&mut self, nodes: impl IntoIterator<Item = &'a Node>) {
        self.quads.clear();
        for node in nodes {
            self.project_node(node);
        }
        debug!(quads = self.quads.len(), "rebuilt RDF projection");
    }

    pub fn clear(&mut self) {
        self.quads.clear();
    }

    /// The quads a node should have right now, independent of what is stored
    pub fn expected_quads(&self, node: &Node) -> Vec<Quad> {
        match self.vocab.node_iri(node.id.as_str()) {
            Ok(subject) => self.derive(&subject, node),
            Err(_) => Vec::new(),
        }
    }

    /// The quads currently stored with the node as subject
    pub fn stored_quads(&self, id: &NodeId) -> Vec<Quad> {
        match self.vocab.node_iri(id.as_str()) {
            Ok(subject) => self.quads.query(&QuadPattern::new().with_subject(subject)),
            Err(_) => Vec::new(),
        }
    }

    fn derive(&self, subject: &NamedNode, node: &Node) -> Vec<Quad> {
        let v = &self.vocab;
        let class = if node.is_root() { v.root_class() } else { v.node_class() };

        let mut quads = vec![
            Quad::new(subject.clone(), v.rdf_type().clone(), class.clone()),
            Quad::new(
                subject.clone(),
                v.dc_title().clone(),
                Literal::new_simple_literal(node.title.as_str()),
            ),
        ];

        if let Some(created) = node.created_lexical() {
            quads.push(Quad::new(
                subject.clone(),
                v.dc_created().clone(),
                Literal::new_typed_literal(created, v.xsd_date_time().clone()),
            ));
        }

        if let Some(description) = &node.description {
            quads.push(Quad::new(
                subject.clone(),
                v.ts_description().clone(),
                Literal::new_simple_literal(description.as_str()),
            ));
        }

        if let Some(parent) = &node.parent {
            let object: RdfObject = match v.node_iri(parent.as_str()) {
                Ok(iri) => iri.into(),
                Err(e) => {
                    warn!(node = %node.id, parent = %parent, error = %e, "parent IRI invalid, projecting as literal");
                    Literal::new_simple_literal(parent.as_str()).into()
                }
            };
            quads.push(Quad::new(subject.clone(), v.ts_parent().clone(), object));
            quads.push(Quad::new(
                subject.clone(),
                v.ts_index().clone(),
                Literal::new_simple_literal(node.index.to_string()),
            ));
        }

        quads
    }
}
