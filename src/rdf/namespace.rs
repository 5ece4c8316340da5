//! Namespaces and the fixed predicate vocabulary of the outline graph
//!
//! Two namespaces are configurable (Dublin Core terms as `dc:` and the
//! application schema as `ts:`) together with the dataset base IRI that node
//! ids are appended to. `rdf:` and `xsd:` are fixed.

use super::types::{local_name, NamedNode, RdfPredicate, RdfResult};
use oxrdf::vocab::{rdf, xsd};

pub const RDF_NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";

pub const DEFAULT_DC_NAMESPACE: &str = "http://purl.org/dc/terms/";
pub const DEFAULT_SCHEMA_NAMESPACE: &str = "http://example.org/outline/schema#";
pub const DEFAULT_BASE_IRI: &str = "http://example.org/outline/data/";

/// Class local names in the `ts:` namespace
pub const ROOT_CLASS: &str = "RootNode";
pub const NODE_CLASS: &str = "Node";

/// Namespace (prefix → IRI mapping)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub prefix: String,
    pub iri: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            iri: iri.into(),
        }
    }
}

/// Resolved vocabulary: namespaces plus every predicate and class the
/// projection and the serializers need, built once up front.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    dc: Namespace,
    ts: Namespace,
    base_iri: String,

    rdf_type: RdfPredicate,
    dc_title: RdfPredicate,
    dc_created: RdfPredicate,
    dc_description: RdfPredicate,
    ts_description: RdfPredicate,
    ts_parent: RdfPredicate,
    ts_index: RdfPredicate,

    root_class: NamedNode,
    node_class: NamedNode,
    xsd_date_time: NamedNode,
}

impl Vocabulary {
    /// Build a vocabulary from the two namespace IRIs and the dataset base IRI
    pub fn new(
        dc_namespace: impl Into<String>,
        schema_namespace: impl Into<String>,
        base_iri: impl Into<String>,
    ) -> RdfResult<Self> {
        let dc = Namespace::new("dc", dc_namespace);
        let ts = Namespace::new("ts", schema_namespace);
        let base_iri = base_iri.into();

        // Validates the base IRI itself; node ids are appended later.
        NamedNode::new(&base_iri)?;

        Ok(Self {
            rdf_type: RdfPredicate::from(NamedNode::from(rdf::TYPE.into_owned())),
            dc_title: RdfPredicate::new(&format!("{}title", dc.iri))?,
            dc_created: RdfPredicate::new(&format!("{}created", dc.iri))?,
            dc_description: RdfPredicate::new(&format!("{}description", dc.iri))?,
            ts_description: RdfPredicate::new(&format!("{}description", ts.iri))?,
            ts_parent: RdfPredicate::new(&format!("{}parent", ts.iri))?,
            ts_index: RdfPredicate::new(&format!("{}index", ts.iri))?,
            root_class: NamedNode::new(&format!("{}{}", ts.iri, ROOT_CLASS))?,
            node_class: NamedNode::new(&format!("{}{}", ts.iri, NODE_CLASS))?,
            xsd_date_time: NamedNode::from(xsd::DATE_TIME.into_owned()),
            dc,
            ts,
            base_iri,
        })
    }

    pub fn dc(&self) -> &Namespace {
        &self.dc
    }

    pub fn ts(&self) -> &Namespace {
        &self.ts
    }

    pub fn base_iri(&self) -> &str {
        &self.base_iri
    }

    /// Prefixes declared at the top of a Turtle document
    pub fn prefixes(&self) -> Vec<Namespace> {
        vec![self.dc.clone(), self.ts.clone()]
    }

    /// `{base}{id}`
    pub fn node_iri(&self, id: &str) -> RdfResult<NamedNode> {
        NamedNode::new(&format!("{}{}", self.base_iri, id))
    }

    /// Inverse of [`Vocabulary::node_iri`]: the trailing path segment
    pub fn id_from_iri<'a>(&self, iri: &'a str) -> &'a str {
        local_name(iri)
    }

    pub fn rdf_type(&self) -> &RdfPredicate {
        &self.rdf_type
    }

    pub fn dc_title(&self) -> &RdfPredicate {
        &self.dc_title
    }

    pub fn dc_created(&self) -> &RdfPredicate {
        &self.dc_created
    }

    pub fn dc_description(&self) -> &RdfPredicate {
        &self.dc_description
    }

    pub fn ts_description(&self) -> &RdfPredicate {
        &self.ts_description
    }

    pub fn ts_parent(&self) -> &RdfPredicate {
        &self.ts_parent
    }

    pub fn ts_index(&self) -> &RdfPredicate {
        &self.ts_index
    }

    pub fn root_class(&self) -> &NamedNode {
        &self.root_class
    }

    pub fn node_class(&self) -> &NamedNode {
        &self.node_class
    }

    pub fn xsd_date_time(&self) -> &NamedNode {
        &self.xsd_date_time
    }

    /// Compact an IRI to `prefix:local` using the configured namespaces
    pub fn compact(&self, iri: &str) -> Option<String> {
        [&self.dc, &self.ts]
            .into_iter()
            .find(|ns| iri.starts_with(&ns.iri) && iri.len() > ns.iri.len())
            .map(|ns| format!("{}:{}", ns.prefix, &iri[ns.iri.len()..]))
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        // The built-in IRIs are static and valid.
        Self::new(DEFAULT_DC_NAMESPACE, DEFAULT_SCHEMA_NAMESPACE, DEFAULT_BASE_IRI)
            .expect("default vocabulary IRIs are valid")
    }
}
