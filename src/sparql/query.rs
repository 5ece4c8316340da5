//! Load query construction
//!
//! The query selects `?node ?type` plus the optional columns the load path
//! understands. It is syntax-checked with spargebra before being handed out.

use super::{SparqlError, SparqlResult};
use crate::rdf::{Vocabulary, RDF_NAMESPACE};
use spargebra::Query;

/// Result columns, in SELECT order
pub const LOAD_VARIABLES: [&str; 7] = [
    "node",
    "type",
    "title",
    "created",
    "index",
    "parent",
    "description",
];

#[derive(Debug, Clone)]
pub struct LoadQuery<'a> {
    vocab: &'a Vocabulary,
    schema_only: bool,
}

impl<'a> LoadQuery<'a> {
    pub fn new(vocab: &'a Vocabulary) -> Self {
        Self {
            vocab,
            schema_only: false,
        }
    }

    /// Only return subjects whose type lives in the `ts:` namespace
    pub fn schema_only(mut self, enabled: bool) -> Self {
        self.schema_only = enabled;
        self
    }

    /// Render the query text without validation
    pub fn render(&self) -> String {
        let dc = self.vocab.dc();
        let ts = self.vocab.ts();
        let select: Vec<String> = LOAD_VARIABLES.iter().map(|v| format!("?{}", v)).collect();

        let mut q = String::new();
        q.push_str(&format!("PREFIX rdf: <{}>\n", RDF_NAMESPACE));
        q.push_str(&format!("PREFIX {}: <{}>\n", dc.prefix, dc.iri));
        q.push_str(&format!("PREFIX {}: <{}>\n", ts.prefix, ts.iri));
        q.push_str(&format!("SELECT {}\nWHERE {{\n", select.join(" ")));
        q.push_str("  ?node rdf:type ?type .\n");
        q.push_str("  OPTIONAL { ?node dc:title ?title }\n");
        q.push_str("  OPTIONAL { ?node dc:created ?created }\n");
        q.push_str("  OPTIONAL { ?node ts:index ?index }\n");
        q.push_str("  OPTIONAL { ?node ts:parent ?parent }\n");
        q.push_str("  OPTIONAL { ?node dc:description|ts:description ?description }\n");
        if self.schema_only {
            q.push_str(&format!(
                "  FILTER(STRSTARTS(STR(?type), \"{}\"))\n",
                ts.iri.replace('\\', "\\\\").replace('"', "\\\"")
            ));
        }
        q.push_str("}\n");
        q
    }

    /// Render and syntax-check the query
    pub fn build(&self) -> SparqlResult<String> {
        let text = self.render();
        Query::parse(&text, None).map_err(|e| SparqlError::InvalidQuery(e.to_string()))?;
        Ok(text)
    }
}

/// The default load query: every typed subject, no type filter
pub fn load_query(vocab: &Vocabulary) -> SparqlResult<String> {
    LoadQuery::new(vocab).build()
}
