//! In-memory quad collection backing the outline projection
//!
//! Quads are kept in a primary set plus two secondary indices:
//! - subject IRI -> quads with that subject
//! - object IRI  -> quads pointing at that IRI (named-node objects only)
//!
//! The object index is what makes "remove everything mentioning this node"
//! cheap when a subtree is deleted.

use super::types::{NamedNode, Quad, QuadPattern, RdfObject};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Quad store errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QuadStoreError {
    #[error("Quad not found: {0}")]
    QuadNotFound(String),

    #[error("Duplicate quad: {0}")]
    DuplicateQuad(String),
}

pub type QuadStoreResult<T> = Result<T, QuadStoreError>;

#[derive(Debug, Clone, Default)]
pub struct QuadStore {
    /// All quads (primary storage)
    quads: HashSet<Quad>,

    /// Subject IRI -> quads
    subject_index: HashMap<String, HashSet<Quad>>,

    /// Object IRI -> quads (named-node objects only)
    object_index: HashMap<String, HashSet<Quad>>,
}

impl QuadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a quad, rejecting exact duplicates
    pub fn insert(&mut self, quad: Quad) -> QuadStoreResult<()> {
        if self.quads.contains(&quad) {
            return Err(QuadStoreError::DuplicateQuad(quad.to_string()));
        }

        self.update_indices_insert(&quad);
        self.quads.insert(quad);
        Ok(())
    }

    /// Remove a single quad
    pub fn remove(&mut self, quad: &Quad) -> QuadStoreResult<()> {
        if !self.quads.remove(quad) {
            return Err(QuadStoreError::QuadNotFound(quad.to_string()));
        }
        self.update_indices_remove(quad);
        Ok(())
    }

    /// Remove every quad whose subject is `subject`; returns how many were removed
    pub fn remove_subject(&mut self, subject: &NamedNode) -> usize {
        let removed: Vec<Quad> = self
            .subject_index
            .get(subject.as_str())
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();

        for quad in &removed {
            self.quads.remove(quad);
            self.update_indices_remove(quad);
        }
        removed.len()
    }

    /// Remove every quad where `node` appears as subject or as object
    pub fn remove_mentions(&mut self, node: &NamedNode) -> usize {
        let mut removed = self.remove_subject(node);

        let incoming: Vec<Quad> = self
            .object_index
            .get(node.as_str())
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();

        for quad in &incoming {
            self.quads.remove(quad);
            self.update_indices_remove(quad);
        }
        removed += incoming.len();
        removed
    }

    pub fn contains(&self, quad: &Quad) -> bool {
        self.quads.contains(quad)
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn clear(&mut self) {
        self.quads.clear();
        self.subject_index.clear();
        self.object_index.clear();
    }

    /// Query quads matching a pattern, using the subject index when possible
    pub fn query(&self, pattern: &QuadPattern) -> Vec<Quad> {
        match &pattern.subject {
            Some(subject) => self
                .subject_index
                .get(subject.as_str())
                .into_iter()
                .flatten()
                .filter(|quad| pattern.matches(quad))
                .cloned()
                .collect(),
            None => self
                .quads
                .iter()
                .filter(|quad| pattern.matches(quad))
                .cloned()
                .collect(),
        }
    }

    /// All quads with the given subject
    pub fn quads_for_subject(&self, subject: &NamedNode) -> Vec<Quad> {
        self.subject_index
            .get(subject.as_str())
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// All quads whose object is the given named node
    pub fn quads_pointing_at(&self, object: &NamedNode) -> Vec<Quad> {
        self.object_index
            .get(object.as_str())
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quad> {
        self.quads.iter()
    }

    /// Distinct subjects in the store
    pub fn subjects(&self) -> Vec<NamedNode> {
        self.quads
            .iter()
            .map(|q| q.subject.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect()
    }

    /// Quads sorted by their N-Triples rendering, for stable output
    pub fn sorted(&self) -> Vec<Quad> {
        let mut quads: Vec<Quad> = self.quads.iter().cloned().collect();
        quads.sort_by_cached_key(|q| q.to_string());
        quads
    }

    fn update_indices_insert(&mut self, quad: &Quad) {
        self.subject_index
            .entry(quad.subject.as_str().to_string())
            .or_default()
            .insert(quad.clone());

        if let RdfObject::NamedNode(object) = &quad.object {
            self.object_index
                .entry(object.as_str().to_string())
                .or_default()
                .insert(quad.clone());
        }
    }

    fn update_indices_remove(&mut self, quad: &Quad) {
        let s_key = quad.subject.as_str();
        if let Some(set) = self.subject_index.get_mut(s_key) {
            set.remove(quad);
            if set.is_empty() {
                self.subject_index.remove(s_key);
            }
        }

        if let RdfObject::NamedNode(object) = &quad.object {
            let o_key = object.as_str();
            if let Some(set) = self.object_index.get_mut(o_key) {
                set.remove(quad);
                if set.is_empty() {
                    self.object_index.remove(o_key);
                }
            }
        }
    }
}
