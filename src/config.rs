//! Outline configuration
//!
//! Namespaces, dataset base IRI, id strategy and the (opaque) endpoint the
//! sync gateway talks to. Loadable from YAML or JSON.

use crate::outline::IdStrategy;
use crate::rdf::{
    RdfError, Vocabulary, DEFAULT_BASE_IRI, DEFAULT_DC_NAMESPACE, DEFAULT_SCHEMA_NAMESPACE,
};
use oxiri::Iri;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid IRI for {field}: {reason}")]
    InvalidIri { field: &'static str, reason: String },
}

impl From<RdfError> for ConfigError {
    fn from(e: RdfError) -> Self {
        ConfigError::InvalidIri {
            field: "vocabulary",
            reason: e.to_string(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Namespace bound to `dc:`
    pub dc_namespace: String,
    /// Namespace bound to `ts:`
    pub schema_namespace: String,
    /// Node IRIs are `{base_iri}{id}`
    pub base_iri: String,
    pub id_strategy: IdStrategy,
    /// SPARQL endpoint handed to the gateway; the core never dials it
    pub endpoint: Option<String>,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            dc_namespace: DEFAULT_DC_NAMESPACE.to_string(),
            schema_namespace: DEFAULT_SCHEMA_NAMESPACE.to_string(),
            base_iri: DEFAULT_BASE_IRI.to_string(),
            id_strategy: IdStrategy::default(),
            endpoint: None,
        }
    }
}

impl OutlineConfig {
    pub fn from_yaml_str(input: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(input: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` is parsed as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    /// All three IRIs must be absolute
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, value) in [
            ("dc_namespace", &self.dc_namespace),
            ("schema_namespace", &self.schema_namespace),
            ("base_iri", &self.base_iri),
        ] {
            Iri::parse(value.as_str()).map_err(|e| ConfigError::InvalidIri {
                field,
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    pub fn vocabulary(&self) -> ConfigResult<Vocabulary> {
        self.validate()?;
        Ok(Vocabulary::new(
            self.dc_namespace.clone(),
            self.schema_namespace.clone(),
            self.base_iri.clone(),
        )?)
    }
}
