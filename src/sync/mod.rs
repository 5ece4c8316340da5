//! Endpoint synchronization
//!
//! The outline does no network I/O itself. A [`SyncGateway`] carries the load
//! query out and the bindings back, and takes the Turtle document on save.
//! [`OutlineSession`] sequences those calls around a [`NodeStore`].

mod session;

pub use session::{LoadOutcome, OutlineSession};

use async_trait::async_trait;
use thiserror::Error;

/// Transport-level failure reported by a gateway
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("Endpoint returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Malformed load response: {0}")]
    MalformedLoadResponse(String),

    #[error("A save is already in flight")]
    SaveInFlight,

    #[error("Serialization error: {0}")]
    Serialize(#[from] crate::rdf::SerializeError),

    #[error("Invalid load query: {0}")]
    Query(String),
}

pub type SyncResult<T> = Result<T, SyncError>;

/// Remote SPARQL endpoint as seen by the outline
#[async_trait]
pub trait SyncGateway: Send + Sync {
    /// Run a SELECT and return the raw SPARQL JSON results body
    async fn fetch(&self, query: &str) -> Result<String, GatewayError>;

    /// Replace the remote dataset with a Turtle document
    async fn store(&self, turtle: &str) -> Result<(), GatewayError>;
}

impl From<crate::sparql::SparqlError> for SyncError {
    fn from(e: crate::sparql::SparqlError) -> Self {
        use crate::sparql::SparqlError;
        match e {
            SparqlError::MalformedLoadResponse(msg) => SyncError::MalformedLoadResponse(msg),
            SparqlError::InvalidQuery(msg) => SyncError::Query(msg),
        }
    }
}
