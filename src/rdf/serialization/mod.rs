//! RDF serialization
//!
//! Turtle is the only wire format: the outline save document, a reader for
//! that document, and a verbatim dump of the projected quads.

pub mod turtle;

use thiserror::Error;

pub use turtle::{escape_literal, parse_outline, serialize_quads, write_outline};

/// Parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Parse error: {0}")]
    Parse(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Serialization errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializeError {
    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Outline has no root node")]
    NoRoot,

    #[error("Invalid IRI: {0}")]
    InvalidIri(#[from] super::RdfError),
}

pub type SerializeResult<T> = Result<T, SerializeError>;
