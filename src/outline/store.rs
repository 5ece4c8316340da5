//! In-memory outline tree
//!
//! `NodeStore` owns the canonical node table and the RDF projection. Every
//! mutating call updates the tree, renormalizes sibling indices and re-projects
//! exactly the nodes whose fields changed, so the quad collection never drifts
//! from the tree.
//!
//! Unknown *subject* ids on `update_node`, `update_description`, `move_node`
//! and `delete_node` are silent no-ops reported through the return value.
//! Unknown *target* parents are errors.

use super::event::OutlineEvent;
use super::id::IdGenerator;
use super::node::{FlatNodeRecord, Node, NodeUpdate};
use super::types::{NodeId, NodeKind};
use crate::config::{ConfigResult, OutlineConfig};
use crate::rdf::{QuadStore, RdfProjector, Vocabulary};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Errors that can occur during outline operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OutlineError {
    #[error("Node {0} not found")]
    NotFound(NodeId),

    #[error("Root node already exists: {0}")]
    RootAlreadyExists(NodeId),

    #[error("Outline has no root node")]
    Uninitialized,

    #[error("Moving {node} under {target} would make it its own descendant")]
    CyclicMove { node: NodeId, target: NodeId },

    #[error("The root node cannot be moved or deleted")]
    RootImmutable,

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

pub type OutlineResult<T> = Result<T, OutlineError>;

#[derive(Debug)]
pub struct NodeStore {
    /// Node table, id -> node
    nodes: IndexMap<NodeId, Node>,

    /// Set once the store is Ready
    root: Option<NodeId>,

    /// Derived RDF view, patched in lockstep with `nodes`
    projector: RdfProjector,

    id_generator: IdGenerator,

    event_sender: Option<UnboundedSender<OutlineEvent>>,
}

impl NodeStore {
    /// Empty, uninitialized store with the default vocabulary
    pub fn new() -> Self {
        Self::with_vocabulary(Vocabulary::default(), IdGenerator::default())
    }

    pub fn with_vocabulary(vocab: Vocabulary, id_generator: IdGenerator) -> Self {
        NodeStore {
            nodes: IndexMap::new(),
            root: None,
            projector: RdfProjector::new(vocab),
            id_generator,
            event_sender: None,
        }
    }

    pub fn from_config(config: &OutlineConfig) -> ConfigResult<Self> {
        Ok(Self::with_vocabulary(
            config.vocabulary()?,
            IdGenerator::new(config.id_strategy),
        ))
    }

    /// Enable event delivery; the receiver gets one event per successful mutation
    pub fn with_events(mut self) -> (Self, UnboundedReceiver<OutlineEvent>) {
        let (tx, rx) = unbounded_channel();
        self.event_sender = Some(tx);
        (self, rx)
    }

    pub fn is_ready(&self) -> bool {
        self.root.is_some()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn projector(&self) -> &RdfProjector {
        &self.projector
    }

    pub fn quads(&self) -> &QuadStore {
        self.projector.quads()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        self.projector.vocabulary()
    }

    /// Create the Root of an empty store
    pub fn create_root(&mut self) -> OutlineResult<&Node> {
        if let Some(root) = &self.root {
            return Err(OutlineError::RootAlreadyExists(root.clone()));
        }

        let id = self.fresh_id("");
        let root = Node::new(id.clone(), NodeKind::Root, "");
        self.projector.project_node(&root);
        self.nodes.insert(id.clone(), root);
        self.root = Some(id.clone());

        info!(root = %id, "created outline root");
        self.emit(OutlineEvent::RootCreated { id: id.clone() });
        self.get_node(&id)
    }

    /// Add a new item under `parent_id`, at `index` (clamped) or appended
    pub fn add_node(
        &mut self,
        parent_id: &NodeId,
        title: impl Into<String>,
        index: Option<usize>,
    ) -> OutlineResult<&Node> {
        let title = title.into();
        let len = self
            .nodes
            .get(parent_id)
            .map(|p| p.children.len())
            .ok_or_else(|| OutlineError::NotFound(parent_id.clone()))?;
        let pos = index.map_or(len, |i| i.min(len));

        let id = self.fresh_id(&title);
        let mut node = Node::new(id.clone(), NodeKind::Item, title);
        node.parent = Some(parent_id.clone());
        node.index = pos;
        self.nodes.insert(id.clone(), node);

        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.children.insert(pos, id.clone());
        }
        let shifted = self.renormalize(parent_id);
        self.reproject(&id);
        self.reproject_all(&shifted);

        debug!(node = %id, parent = %parent_id, index = pos, "added node");
        self.emit(OutlineEvent::NodeAdded {
            id: id.clone(),
            parent: parent_id.clone(),
            index: pos,
        });
        self.get_node(&id)
    }

    /// Merge scalar fields into a node; returns false if the node is unknown
    pub fn update_node(&mut self, id: &NodeId, update: NodeUpdate) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            debug!(node = %id, "update on unknown node ignored");
            return false;
        };

        if let Some(title) = update.title {
            node.title = title;
        }
        if let Some(description) = update.description {
            node.description = description;
        }

        self.reproject(id);
        self.emit(OutlineEvent::NodeUpdated { id: id.clone() });
        true
    }

    /// Set a node's description; returns false if the node is unknown
    pub fn update_description(&mut self, id: &NodeId, text: impl Into<String>) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            debug!(node = %id, "description update on unknown node ignored");
            return false;
        };
        node.description = Some(text.into());

        self.reproject(id);
        self.emit(OutlineEvent::DescriptionChanged { id: id.clone() });
        true
    }

    /// Move a node under `new_parent_id` at `new_index` (clamped) or appended.
    ///
    /// For a move within the same parent the index refers to the sibling list
    /// with the node already taken out. Returns `Ok(false)` if `id` is unknown.
    pub fn move_node(
        &mut self,
        id: &NodeId,
        new_parent_id: &NodeId,
        new_index: Option<usize>,
    ) -> OutlineResult<bool> {
        let Some(node) = self.nodes.get(id) else {
            debug!(node = %id, "move of unknown node ignored");
            return Ok(false);
        };
        if node.is_root() {
            return Err(OutlineError::RootImmutable);
        }
        if !self.nodes.contains_key(new_parent_id) {
            return Err(OutlineError::NotFound(new_parent_id.clone()));
        }
        if id == new_parent_id || self.is_ancestor(id, new_parent_id) {
            return Err(OutlineError::CyclicMove {
                node: id.clone(),
                target: new_parent_id.clone(),
            });
        }
        let old_parent_id = node.parent.clone();

        let mut touched = Vec::new();
        if let Some(old_id) = &old_parent_id {
            if let Some(old_parent) = self.nodes.get_mut(old_id) {
                old_parent.children.retain(|c| c != id);
            }
            touched.extend(self.renormalize(old_id));
        }

        let mut pos = 0;
        if let Some(new_parent) = self.nodes.get_mut(new_parent_id) {
            let len = new_parent.children.len();
            pos = new_index.map_or(len, |i| i.min(len));
            new_parent.children.insert(pos, id.clone());
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = Some(new_parent_id.clone());
            node.index = pos;
        }
        touched.extend(self.renormalize(new_parent_id));

        self.reproject(id);
        self.reproject_all(&touched);

        debug!(node = %id, parent = %new_parent_id, index = pos, "moved node");
        if let Some(old_parent) = old_parent_id {
            self.emit(OutlineEvent::NodeMoved {
                id: id.clone(),
                old_parent,
                new_parent: new_parent_id.clone(),
                index: pos,
            });
        }
        Ok(true)
    }

    /// Delete a node and its whole subtree.
    ///
    /// Returns the removed ids (descendants depth-first, the node itself last);
    /// empty if the node is unknown.
    pub fn delete_node(&mut self, id: &NodeId) -> OutlineResult<Vec<NodeId>> {
        let Some(node) = self.nodes.get(id) else {
            debug!(node = %id, "delete of unknown node ignored");
            return Ok(Vec::new());
        };
        if node.is_root() {
            return Err(OutlineError::RootImmutable);
        }
        let parent_id = node.parent.clone();

        let mut removed = Vec::new();
        self.collect_post_order(id, &mut removed);
        for rid in &removed {
            self.nodes.shift_remove(rid);
            self.projector.remove_node(rid);
        }

        if let Some(parent_id) = &parent_id {
            if let Some(parent) = self.nodes.get_mut(parent_id) {
                parent.children.retain(|c| c != id);
            }
            let shifted = self.renormalize(parent_id);
            self.reproject_all(&shifted);
        }

        debug!(node = %id, count = removed.len(), "deleted subtree");
        if let Some(parent) = parent_id {
            self.emit(OutlineEvent::NodesDeleted {
                parent,
                ids: removed.clone(),
            });
        }
        Ok(removed)
    }

    pub fn get_node(&self, id: &NodeId) -> OutlineResult<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| OutlineError::NotFound(id.clone()))
    }

    pub fn get_root(&self) -> OutlineResult<&Node> {
        let root = self.root.as_ref().ok_or(OutlineError::Uninitialized)?;
        self.get_node(root)
    }

    pub fn root_id(&self) -> Option<&NodeId> {
        self.root.as_ref()
    }

    /// All nodes in table order
    pub fn get_all_nodes(&self) -> Vec<&Node> {
        self.nodes.values().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Direct children in display order
    pub fn children(&self, id: &NodeId) -> OutlineResult<Vec<&Node>> {
        let node = self.get_node(id)?;
        Ok(node
            .children
            .iter()
            .filter_map(|c| self.nodes.get(c))
            .collect())
    }

    /// Ancestors from the direct parent up to the Root
    pub fn ancestors(&self, id: &NodeId) -> OutlineResult<Vec<NodeId>> {
        let mut current = self.get_node(id)?.parent.clone();
        let mut out = Vec::new();
        while let Some(parent) = current {
            if out.len() > self.nodes.len() {
                break;
            }
            current = self.nodes.get(&parent).and_then(|p| p.parent.clone());
            out.push(parent);
        }
        Ok(out)
    }

    /// Descendants in pre-order (the node itself excluded)
    pub fn descendants(&self, id: &NodeId) -> OutlineResult<Vec<NodeId>> {
        self.get_node(id)?;
        let mut order = self.pre_order(id);
        order.remove(0);
        Ok(order)
    }

    /// Replace the whole store from flat records.
    ///
    /// The first `Root` record becomes the Root; later duplicates of an id are
    /// ignored; links to missing parents are dropped and anything that ends up
    /// unreachable from the Root is pruned. Without a Root the store is left
    /// empty and uninitialized. Returns whether the store is Ready afterwards.
    pub fn rebuild_from_flat(&mut self, records: impl IntoIterator<Item = FlatNodeRecord>) -> bool {
        self.nodes.clear();
        self.root = None;
        self.projector.clear();

        // Pass 1: register every record by id
        let mut table: IndexMap<NodeId, FlatNodeRecord> = IndexMap::new();
        for record in records {
            let iri_safe = record.id.is_path_safe()
                && self.vocabulary().node_iri(record.id.as_str()).is_ok();
            if !iri_safe {
                warn!(node = %record.id, "skipping record whose id cannot form a node IRI");
                continue;
            }
            if table.contains_key(&record.id) {
                warn!(node = %record.id, "duplicate record ignored");
                continue;
            }
            table.insert(record.id.clone(), record);
        }

        let Some(root_id) = table
            .values()
            .find(|r| r.kind == NodeKind::Root)
            .map(|r| r.id.clone())
        else {
            warn!(records = table.len(), "no root among loaded records, store left uninitialized");
            self.emit(OutlineEvent::TreeReset);
            return false;
        };

        // Pass 2: link children to parents, ordered by stored index
        let mut links: HashMap<NodeId, Vec<(usize, usize, NodeId)>> = HashMap::new();
        for (order, record) in table.values().enumerate() {
            if record.id == root_id {
                continue;
            }
            if record.kind == NodeKind::Root {
                warn!(node = %record.id, "additional root record treated as item");
            }
            match &record.parent {
                Some(parent) if parent != &record.id && table.contains_key(parent) => {
                    links.entry(parent.clone()).or_default().push((
                        record.index.unwrap_or(usize::MAX),
                        order,
                        record.id.clone(),
                    ));
                }
                Some(parent) => {
                    warn!(node = %record.id, parent = %parent, "dropping link to missing parent");
                }
                None => {
                    warn!(node = %record.id, "item without parent");
                }
            }
        }
        for siblings in links.values_mut() {
            siblings.sort_by_key(|(index, order, _)| (*index, *order));
        }

        // Keep only what hangs off the root, in pre-order
        let mut stack = vec![(root_id.clone(), None::<NodeId>, 0usize)];
        while let Some((id, parent, index)) = stack.pop() {
            let Some(record) = table.get(&id) else { continue };
            let children: Vec<NodeId> = links
                .get(&id)
                .map(|s| s.iter().map(|(_, _, c)| c.clone()).collect())
                .unwrap_or_default();

            for (i, child) in children.iter().enumerate().rev() {
                stack.push((child.clone(), Some(id.clone()), i));
            }

            let kind = if id == root_id { NodeKind::Root } else { NodeKind::Item };
            self.nodes.insert(
                id.clone(),
                Node {
                    id: id.clone(),
                    kind,
                    title: record.title.clone().unwrap_or_default(),
                    created: record.created,
                    description: record.description.clone(),
                    parent,
                    children,
                    index,
                },
            );
        }

        let pruned = table.len() - self.nodes.len();
        if pruned > 0 {
            warn!(pruned, "pruned records unreachable from the root");
        }

        self.root = Some(root_id);
        self.projector.rebuild_all(self.nodes.values());

        info!(nodes = self.nodes.len(), quads = self.projector.quads().len(), "rebuilt outline");
        self.emit(OutlineEvent::TreeRebuilt {
            node_count: self.nodes.len(),
        });
        true
    }

    /// Flat records in pre-order from the Root
    pub fn to_flat(&self) -> Vec<FlatNodeRecord> {
        let Some(root) = &self.root else {
            return Vec::new();
        };
        self.pre_order(root)
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(FlatNodeRecord::from)
            .collect()
    }

    /// Node ids in pre-order starting at `start`
    pub fn pre_order(&self, start: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start.clone()];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev().cloned());
                out.push(id);
            }
        }
        out
    }

    /// Drop everything and return to the uninitialized state
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.projector.clear();
        info!("outline reset");
        self.emit(OutlineEvent::TreeReset);
    }

    /// Check every structural and projection invariant
    pub fn validate(&self) -> OutlineResult<()> {
        let violation = |msg: String| Err(OutlineError::InvariantViolation(msg));

        let Some(root_id) = &self.root else {
            if self.nodes.is_empty() && self.projector.quads().is_empty() {
                return Ok(());
            }
            return violation("uninitialized store holds data".to_string());
        };

        let roots: Vec<&Node> = self.nodes.values().filter(|n| n.is_root()).collect();
        if roots.len() != 1 || &roots[0].id != root_id {
            return violation(format!("expected exactly one root, found {}", roots.len()));
        }
        if roots[0].parent.is_some() {
            return violation("root has a parent".to_string());
        }

        for node in self.nodes.values() {
            let mut seen = HashSet::new();
            for (i, child_id) in node.children.iter().enumerate() {
                if !seen.insert(child_id) {
                    return violation(format!("{} lists {} twice", node.id, child_id));
                }
                let Some(child) = self.nodes.get(child_id) else {
                    return violation(format!("{} lists missing child {}", node.id, child_id));
                };
                if child.parent.as_ref() != Some(&node.id) {
                    return violation(format!("{} parent does not match {}", child_id, node.id));
                }
                if child.index != i {
                    return violation(format!("{} has index {} at position {}", child_id, child.index, i));
                }
            }
            if let Some(parent_id) = &node.parent {
                let listed = self
                    .nodes
                    .get(parent_id)
                    .map_or(false, |p| p.children.contains(&node.id));
                if !listed {
                    return violation(format!("{} is not listed by its parent {}", node.id, parent_id));
                }
            } else if !node.is_root() {
                return violation(format!("{} has no parent", node.id));
            }
        }

        let reachable = self.pre_order(root_id).len();
        if reachable != self.nodes.len() {
            return violation(format!(
                "{} nodes stored but {} reachable from root",
                self.nodes.len(),
                reachable
            ));
        }

        let mut expected_total = 0;
        for node in self.nodes.values() {
            let mut expected = self.projector.expected_quads(node);
            let mut stored = self.projector.stored_quads(&node.id);
            expected.sort_by_key(|q| q.to_string());
            stored.sort_by_key(|q| q.to_string());
            if expected != stored {
                return violation(format!("stale projection for {}", node.id));
            }
            expected_total += expected.len();
        }
        if expected_total != self.projector.quads().len() {
            return violation(format!(
                "{} quads stored, {} expected",
                self.projector.quads().len(),
                expected_total
            ));
        }

        Ok(())
    }

    fn fresh_id(&self, title: &str) -> NodeId {
        loop {
            let id = self.id_generator.generate(title);
            if !self.nodes.contains_key(&id) {
                return id;
            }
            debug!(node = %id, "generated id collided, retrying");
        }
    }

    /// True if `ancestor` is on the parent chain of `id`
    fn is_ancestor(&self, ancestor: &NodeId, id: &NodeId) -> bool {
        let mut current = self.nodes.get(id).and_then(|n| n.parent.as_ref());
        let mut steps = 0;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.nodes.get(parent).and_then(|n| n.parent.as_ref());
        }
        false
    }

    /// Left-to-right post-order of the subtree at `id`, without recursion
    fn collect_post_order(&self, id: &NodeId, out: &mut Vec<NodeId>) {
        let mut stack = vec![(id.clone(), false)];
        while let Some((current, expanded)) = stack.pop() {
            if expanded {
                out.push(current);
                continue;
            }
            if let Some(node) = self.nodes.get(&current) {
                stack.push((current.clone(), true));
                stack.extend(node.children.iter().rev().map(|c| (c.clone(), false)));
            }
        }
    }

    /// Rewrite sibling indices to match positions; returns the ids that changed
    fn renormalize(&mut self, parent_id: &NodeId) -> Vec<NodeId> {
        let children = match self.nodes.get(parent_id) {
            Some(parent) => parent.children.clone(),
            None => return Vec::new(),
        };

        let mut changed = Vec::new();
        for (i, child_id) in children.iter().enumerate() {
            if let Some(child) = self.nodes.get_mut(child_id) {
                if child.index != i {
                    child.index = i;
                    changed.push(child_id.clone());
                }
            }
        }
        changed
    }

    fn reproject(&mut self, id: &NodeId) {
        if let Some(node) = self.nodes.get(id) {
            self.projector.project_node(node);
        }
    }

    fn reproject_all(&mut self, ids: &[NodeId]) {
        for id in ids {
            self.reproject(id);
        }
    }

    fn emit(&self, event: OutlineEvent) {
        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(event) {
                debug!(event = ?e.0, "event receiver dropped");
            }
        }
    }
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_store() -> (NodeStore, NodeId) {
        let mut store = NodeStore::new();
        let root = store.create_root().unwrap().id.clone();
        (store, root)
    }

    fn child_ids(store: &NodeStore, id: &NodeId) -> Vec<NodeId> {
        store.get_node(id).unwrap().children.clone()
    }

    #[test]
    fn test_create_root_once() {
        let mut store = NodeStore::new();
        assert!(!store.is_ready());
        assert_eq!(store.get_root(), Err(OutlineError::Uninitialized));

        let root = store.create_root().unwrap().id.clone();
        assert!(store.is_ready());
        assert_eq!(store.get_root().unwrap().id, root);
        assert_eq!(store.create_root(), Err(OutlineError::RootAlreadyExists(root)));
        store.validate().unwrap();
    }

    #[test]
    fn test_add_node_appends_and_inserts() {
        let (mut store, root) = ready_store();
        let a = store.add_node(&root, "a", None).unwrap().id.clone();
        let b = store.add_node(&root, "b", None).unwrap().id.clone();
        let c = store.add_node(&root, "c", Some(0)).unwrap().id.clone();
        let d = store.add_node(&root, "d", Some(99)).unwrap().id.clone();

        assert_eq!(child_ids(&store, &root), vec![c.clone(), a.clone(), b.clone(), d.clone()]);
        assert_eq!(store.get_node(&a).unwrap().index, 1);
        assert_eq!(store.get_node(&d).unwrap().index, 3);
        store.validate().unwrap();
    }

    #[test]
    fn test_add_node_unknown_parent() {
        let (mut store, _root) = ready_store();
        let missing = NodeId::new("missing");
        assert_eq!(
            store.add_node(&missing, "x", None).unwrap_err(),
            OutlineError::NotFound(missing)
        );
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn test_update_node() {
        let (mut store, root) = ready_store();
        let a = store.add_node(&root, "a", None).unwrap().id.clone();

        assert!(store.update_node(&a, NodeUpdate::new().title("renamed").description("body")));
        let node = store.get_node(&a).unwrap();
        assert_eq!(node.title, "renamed");
        assert_eq!(node.description.as_deref(), Some("body"));

        assert!(store.update_node(&a, NodeUpdate::new().clear_description()));
        assert_eq!(store.get_node(&a).unwrap().description, None);

        assert!(!store.update_node(&NodeId::new("nope"), NodeUpdate::new().title("x")));
        store.validate().unwrap();
    }

    #[test]
    fn test_update_description() {
        let (mut store, root) = ready_store();
        let a = store.add_node(&root, "a", None).unwrap().id.clone();
        assert!(store.update_description(&a, "# Heading"));
        assert_eq!(store.get_node(&a).unwrap().description.as_deref(), Some("# Heading"));
        assert!(!store.update_description(&NodeId::new("nope"), "x"));
        store.validate().unwrap();
    }

    #[test]
    fn test_move_between_parents() {
        let (mut store, root) = ready_store();
        let a = store.add_node(&root, "a", None).unwrap().id.clone();
        let b = store.add_node(&root, "b", None).unwrap().id.clone();
        let c = store.add_node(&root, "c", None).unwrap().id.clone();

        assert!(store.move_node(&a, &b, None).unwrap());
        assert_eq!(child_ids(&store, &root), vec![b.clone(), c.clone()]);
        assert_eq!(child_ids(&store, &b), vec![a.clone()]);
        assert_eq!(store.get_node(&a).unwrap().parent.as_ref(), Some(&b));
        assert_eq!(store.get_node(&c).unwrap().index, 1);
        store.validate().unwrap();
    }

    #[test]
    fn test_move_within_parent() {
        let (mut store, root) = ready_store();
        let a = store.add_node(&root, "a", None).unwrap().id.clone();
        let b = store.add_node(&root, "b", None).unwrap().id.clone();
        let c = store.add_node(&root, "c", None).unwrap().id.clone();

        store.move_node(&a, &root, Some(1)).unwrap();
        assert_eq!(child_ids(&store, &root), vec![b.clone(), a.clone(), c.clone()]);
        store.move_node(&c, &root, Some(0)).unwrap();
        assert_eq!(child_ids(&store, &root), vec![c, b, a]);
        store.validate().unwrap();
    }

    #[test]
    fn test_move_rejects_cycles() {
        let (mut store, root) = ready_store();
        let a = store.add_node(&root, "a", None).unwrap().id.clone();
        let b = store.add_node(&a, "b", None).unwrap().id.clone();
        let c = store.add_node(&b, "c", None).unwrap().id.clone();

        assert_eq!(
            store.move_node(&a, &c, None),
            Err(OutlineError::CyclicMove { node: a.clone(), target: c.clone() })
        );
        assert!(matches!(store.move_node(&a, &a, None), Err(OutlineError::CyclicMove { .. })));
        assert_eq!(store.move_node(&root, &a, None), Err(OutlineError::RootImmutable));
        assert_eq!(
            store.move_node(&a, &NodeId::new("gone"), None),
            Err(OutlineError::NotFound(NodeId::new("gone")))
        );
        assert_eq!(store.move_node(&NodeId::new("gone"), &root, None), Ok(false));
        store.validate().unwrap();
    }

    #[test]
    fn test_delete_cascades() {
        let (mut store, root) = ready_store();
        let a = store.add_node(&root, "a", None).unwrap().id.clone();
        let b = store.add_node(&root, "b", None).unwrap().id.clone();
        let a1 = store.add_node(&a, "a1", None).unwrap().id.clone();
        let a2 = store.add_node(&a, "a2", None).unwrap().id.clone();
        let a11 = store.add_node(&a1, "a11", None).unwrap().id.clone();

        let removed = store.delete_node(&a).unwrap();
        assert_eq!(removed, vec![a11, a1, a2, a.clone()]);
        assert_eq!(store.node_count(), 2);
        assert_eq!(child_ids(&store, &root), vec![b.clone()]);
        assert_eq!(store.get_node(&b).unwrap().index, 0);
        assert!(store.projector().stored_quads(&a).is_empty());
        store.validate().unwrap();

        assert_eq!(store.delete_node(&a).unwrap(), Vec::<NodeId>::new());
        assert_eq!(store.delete_node(&root), Err(OutlineError::RootImmutable));
    }

    #[test]
    fn test_tree_helpers() {
        let (mut store, root) = ready_store();
        let a = store.add_node(&root, "a", None).unwrap().id.clone();
        let b = store.add_node(&a, "b", None).unwrap().id.clone();
        let c = store.add_node(&a, "c", None).unwrap().id.clone();

        assert_eq!(store.ancestors(&b).unwrap(), vec![a.clone(), root.clone()]);
        assert_eq!(store.descendants(&root).unwrap(), vec![a.clone(), b.clone(), c.clone()]);
        let titles: Vec<&str> = store.children(&a).unwrap().iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c"]);
    }

    #[test]
    fn test_rebuild_from_flat() {
        let mut store = NodeStore::new();
        let records = vec![
            FlatNodeRecord::new("n2", NodeKind::Item).with_parent("root").with_index(1).with_title("second"),
            FlatNodeRecord::new("root", NodeKind::Root),
            FlatNodeRecord::new("n1", NodeKind::Item).with_parent("root").with_index(0).with_title("first"),
            FlatNodeRecord::new("n3", NodeKind::Item).with_parent("n1").with_index(7),
            FlatNodeRecord::new("orphan", NodeKind::Item).with_parent("ghost"),
        ];

        assert!(store.rebuild_from_flat(records));
        let root = NodeId::new("root");
        assert_eq!(child_ids(&store, &root), vec![NodeId::new("n1"), NodeId::new("n2")]);
        assert_eq!(store.get_node(&NodeId::new("n3")).unwrap().index, 0);
        assert!(!store.contains(&NodeId::new("orphan")));
        assert_eq!(store.node_count(), 4);
        store.validate().unwrap();
    }

    #[test]
    fn test_rebuild_prunes_cycles() {
        let mut store = NodeStore::new();
        let records = vec![
            FlatNodeRecord::new("root", NodeKind::Root),
            FlatNodeRecord::new("x", NodeKind::Item).with_parent("y"),
            FlatNodeRecord::new("y", NodeKind::Item).with_parent("x"),
        ];
        assert!(store.rebuild_from_flat(records));
        assert_eq!(store.node_count(), 1);
        store.validate().unwrap();
    }

    #[test]
    fn test_rebuild_without_root_stays_uninitialized() {
        let mut store = NodeStore::new();
        store.create_root().unwrap();
        let ready = store.rebuild_from_flat(vec![FlatNodeRecord::new("a", NodeKind::Item)]);
        assert!(!ready);
        assert!(!store.is_ready());
        assert_eq!(store.node_count(), 0);
        assert!(store.quads().is_empty());
        store.create_root().unwrap();
    }

    #[test]
    fn test_reset() {
        let (mut store, root) = ready_store();
        store.add_node(&root, "a", None).unwrap();
        store.reset();
        assert!(!store.is_ready());
        assert!(store.quads().is_empty());
        store.validate().unwrap();
    }

    #[test]
    fn test_events() {
        let (mut store, mut rx) = NodeStore::new().with_events();
        let root = store.create_root().unwrap().id.clone();
        let a = store.add_node(&root, "a", None).unwrap().id.clone();
        store.update_node(&a, NodeUpdate::new().title("b"));
        store.delete_node(&a).unwrap();

        assert_eq!(rx.try_recv().unwrap(), OutlineEvent::RootCreated { id: root.clone() });
        assert_eq!(
            rx.try_recv().unwrap(),
            OutlineEvent::NodeAdded { id: a.clone(), parent: root.clone(), index: 0 }
        );
        assert_eq!(rx.try_recv().unwrap(), OutlineEvent::NodeUpdated { id: a.clone() });
        assert_eq!(
            rx.try_recv().unwrap(),
            OutlineEvent::NodesDeleted { parent: root, ids: vec![a] }
        );
        assert!(rx.try_recv().is_err());
    }

    fn chain(depth: usize) -> Vec<FlatNodeRecord> {
        let mut records = vec![FlatNodeRecord::new("root", NodeKind::Root)];
        let mut parent = NodeId::new("root");
        for i in 0..depth {
            let id = NodeId::new(format!("n{}", i));
            records.push(FlatNodeRecord::new(id.clone(), NodeKind::Item).with_parent(parent).with_index(0));
            parent = id;
        }
        records
    }

    #[test]
    fn test_delete_deep_chain_on_small_stack() {
        let mut store = NodeStore::new();
        assert!(store.rebuild_from_flat(chain(10_000)));
        assert_eq!(store.node_count(), 10_001);

        // Subtree collection must not grow the call stack with tree depth
        let store = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(move || {
                let removed = store.delete_node(&NodeId::new("n0")).unwrap();
                assert_eq!(removed.len(), 10_000);
                assert_eq!(removed.first(), Some(&NodeId::new("n9999")));
                assert_eq!(removed.last(), Some(&NodeId::new("n0")));
                store
            })
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(store.node_count(), 1);
        assert!(store.get_root().unwrap().children.is_empty());
        assert_eq!(store.quads().len(), store.projector().stored_quads(&NodeId::new("root")).len());
        store.validate().unwrap();
    }

    #[test]
    fn test_rebuild_skips_ids_that_are_not_iri_safe() {
        let mut store = NodeStore::new();
        let records = vec![
            FlatNodeRecord::new("root", NodeKind::Root),
            FlatNodeRecord::new("ok", NodeKind::Item).with_parent("root").with_index(0),
            FlatNodeRecord::new("bad<id>", NodeKind::Item).with_parent("root").with_index(1),
            FlatNodeRecord::new("pipe|id", NodeKind::Item).with_parent("root").with_index(2),
            FlatNodeRecord::new("under-bad", NodeKind::Item).with_parent("bad<id>"),
        ];

        assert!(store.rebuild_from_flat(records));
        assert_eq!(store.node_count(), 2);
        assert_eq!(child_ids(&store, &NodeId::new("root")), vec![NodeId::new("ok")]);
        store.validate().unwrap();

        // Every remaining node projects, so the store can still be saved
        let turtle = crate::rdf::write_outline(&store).unwrap();
        assert!(turtle.contains("<http://example.org/outline/data/ok> a ts:Node ;"));
    }

    #[test]
    fn test_events_after_receiver_dropped() {
        let (mut store, rx) = NodeStore::new().with_events();
        drop(rx);
        let root = store.create_root().unwrap().id.clone();
        store.add_node(&root, "still works", None).unwrap();
        assert_eq!(store.node_count(), 2);
        store.validate().unwrap();
    }
}
