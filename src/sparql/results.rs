//! SPARQL JSON results → flat node records
//!
//! Accepts the standard `{"head": ..., "results": {"bindings": [...]}}` shape.
//! A payload that is not JSON or has no `results.bindings` is rejected as a
//! whole; a single bad row (missing `node`/`type`, unknown type, non-numeric
//! index, malformed date) is skipped and reported.

use super::{SparqlError, SparqlResult};
use crate::outline::node::{parse_index, parse_timestamp, RecordError};
use crate::outline::{FlatNodeRecord, NodeId, NodeKind};
use crate::rdf::local_name;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// One bound value (`{"type": "uri", "value": "..."}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingValue {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

impl BindingValue {
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: Some("uri".to_string()),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: Some("literal".to_string()),
            value: value.into(),
            datatype: None,
            lang: None,
        }
    }
}

/// Query solution (variable bindings)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuerySolution {
    pub bindings: HashMap<String, BindingValue>,
}

impl QuerySolution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, variable: &str) -> Option<&BindingValue> {
        self.bindings.get(variable)
    }

    pub fn bind(&mut self, variable: impl Into<String>, value: BindingValue) {
        self.bindings.insert(variable.into(), value);
    }

    fn value(&self, variable: &str) -> Option<&str> {
        self.get(variable).map(|b| b.value.as_str())
    }

    /// Convert one row into a flat record
    pub fn to_record(&self) -> Result<FlatNodeRecord, RecordError> {
        let node = self.value("node").ok_or(RecordError::MissingField("node"))?;
        let type_iri = self.value("type").ok_or(RecordError::MissingField("type"))?;
        let kind = NodeKind::from_class_name(local_name(type_iri))
            .ok_or_else(|| RecordError::UnknownType(type_iri.to_string()))?;

        let mut record = FlatNodeRecord::new(NodeId::new(local_name(node)), kind);
        record.title = self.value("title").map(str::to_string);
        record.description = self.value("description").map(str::to_string);
        record.parent = self.value("parent").map(|p| NodeId::new(local_name(p)));
        if let Some(created) = self.value("created") {
            record.created = Some(parse_timestamp(created)?);
        }
        if let Some(index) = self.value("index") {
            record.index = Some(parse_index(index)?);
        }
        Ok(record)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsBody {
    pub bindings: Vec<QuerySolution>,
}

/// SPARQL SELECT results document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub head: ResultsHead,
    pub results: ResultsBody,
}

impl SparqlResults {
    pub fn from_solutions(vars: &[&str], solutions: Vec<QuerySolution>) -> Self {
        Self {
            head: ResultsHead {
                vars: vars.iter().map(|v| v.to_string()).collect(),
            },
            results: ResultsBody { bindings: solutions },
        }
    }

    /// Parse a results document; anything but a JSON object with
    /// `results.bindings` is a malformed response
    pub fn from_json(input: &str) -> SparqlResult<Self> {
        serde_json::from_str(input).map_err(|e| SparqlError::MalformedLoadResponse(e.to_string()))
    }

    pub fn solutions(&self) -> &[QuerySolution] {
        &self.results.bindings
    }

    pub fn to_json(&self) -> SparqlResult<String> {
        serde_json::to_string(self).map_err(|e| SparqlError::MalformedLoadResponse(e.to_string()))
    }

    /// Convert every row, keeping the good ones and reporting the rest
    pub fn to_records(&self) -> ParsedBindings {
        let mut parsed = ParsedBindings::default();
        for (row, solution) in self.solutions().iter().enumerate() {
            match solution.to_record() {
                Ok(record) => parsed.records.push(record),
                Err(e) => {
                    warn!(row, error = %e, "skipping binding row");
                    parsed.skipped.push((row, e));
                }
            }
        }
        debug!(
            records = parsed.records.len(),
            skipped = parsed.skipped.len(),
            "converted SPARQL bindings"
        );
        parsed
    }
}

/// Outcome of converting a bindings document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBindings {
    pub records: Vec<FlatNodeRecord>,
    /// Row number and reason for every rejected row
    pub skipped: Vec<(usize, RecordError)>,
}

/// Parse a SPARQL JSON results payload straight into flat records
pub fn parse_bindings(input: &str) -> SparqlResult<ParsedBindings> {
    Ok(SparqlResults::from_json(input)?.to_records())
}
