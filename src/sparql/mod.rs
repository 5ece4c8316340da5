//! SPARQL side of the load path
//!
//! The outline never talks to an endpoint itself. It hands out a SELECT query
//! string and consumes the JSON result document the gateway brings back.
//!
//! ```rust
//! use outliner::rdf::Vocabulary;
//! use outliner::sparql::{load_query, parse_bindings};
//!
//! let vocab = Vocabulary::default();
//! let query = load_query(&vocab).unwrap();
//! assert!(query.contains("?node rdf:type ?type"));
//!
//! let parsed = parse_bindings(r#"{"results": {"bindings": []}}"#).unwrap();
//! assert!(parsed.records.is_empty());
//! ```

mod query;
mod results;

pub use query::{load_query, LoadQuery, LOAD_VARIABLES};
pub use results::{
    parse_bindings, BindingValue, ParsedBindings, QuerySolution, ResultsBody, ResultsHead,
    SparqlResults,
};

use thiserror::Error;

/// SPARQL errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SparqlError {
    /// Load payload is not JSON or lacks `results.bindings`
    #[error("Malformed load response: {0}")]
    MalformedLoadResponse(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

pub type SparqlResult<T> = Result<T, SparqlError>;
