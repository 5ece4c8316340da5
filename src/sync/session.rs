//! Load/save orchestration around a node store

use super::{SyncError, SyncGateway, SyncResult};
use crate::outline::NodeStore;
use crate::rdf::write_outline;
use crate::sparql::{parse_bindings, LoadQuery};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// What a load left behind in the store
#[derive(Debug)]
pub enum LoadOutcome {
    /// Remote data was applied
    Loaded { nodes: usize, skipped: usize },
    /// Remote held no Root; the store was initialized with a fresh one
    Empty,
    /// Load failed; the store was initialized with a fresh Root
    Failed(SyncError),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Clears the in-flight flag when a save ends, including on cancellation
struct SaveGuard<'a>(&'a AtomicBool);

impl Drop for SaveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct OutlineSession<G> {
    store: NodeStore,
    gateway: G,
    schema_only: bool,
    saving: AtomicBool,
}

impl<G: SyncGateway> OutlineSession<G> {
    pub fn new(store: NodeStore, gateway: G) -> Self {
        Self {
            store,
            gateway,
            schema_only: false,
            saving: AtomicBool::new(false),
        }
    }

    /// Restrict loads to subjects typed in the `ts:` namespace
    pub fn with_schema_filter(mut self, enabled: bool) -> Self {
        self.schema_only = enabled;
        self
    }

    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut NodeStore {
        &mut self.store
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    pub fn into_parts(self) -> (NodeStore, G) {
        (self.store, self.gateway)
    }

    /// Replace the local tree with the remote one
    ///
    /// Never leaves the store uninitialized: if the remote is empty or the
    /// load fails, the store is reset to a Root-only tree.
    pub async fn load(&mut self) -> LoadOutcome {
        match self.try_load().await {
            Ok(outcome @ LoadOutcome::Loaded { .. }) => outcome,
            Ok(_) => {
                info!("remote outline is empty, starting a new tree");
                self.init_empty();
                LoadOutcome::Empty
            }
            Err(e) => {
                warn!(error = %e, "load failed, starting a new tree");
                self.init_empty();
                LoadOutcome::Failed(e)
            }
        }
    }

    async fn try_load(&mut self) -> SyncResult<LoadOutcome> {
        let query = LoadQuery::new(self.store.vocabulary())
            .schema_only(self.schema_only)
            .build()?;
        debug!(query = %query, "fetching outline");

        let body = self.gateway.fetch(&query).await?;
        let parsed = parse_bindings(&body)?;
        let skipped = parsed.skipped.len();

        if self.store.rebuild_from_flat(parsed.records) {
            let nodes = self.store.node_count();
            info!(nodes, skipped, "outline loaded");
            Ok(LoadOutcome::Loaded { nodes, skipped })
        } else {
            Ok(LoadOutcome::Empty)
        }
    }

    fn init_empty(&mut self) {
        self.store.reset();
        if let Err(e) = self.store.create_root() {
            warn!(error = %e, "could not create root after reset");
        }
    }

    /// Send the current tree to the endpoint as a full replacement
    ///
    /// The document is rendered before the first await, so the payload is the
    /// state at call time. A second save while one is pending is rejected.
    /// On failure the local tree is untouched.
    pub async fn save(&self) -> SyncResult<()> {
        if self
            .saving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SyncError::SaveInFlight);
        }
        let _guard = SaveGuard(&self.saving);

        let turtle = write_outline(&self.store)?;
        debug!(bytes = turtle.len(), "saving outline");

        match self.gateway.store(&turtle).await {
            Ok(()) => {
                info!(nodes = self.store.node_count(), "outline saved");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "save failed");
                Err(SyncError::Gateway(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::GatewayError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    const BASE: &str = "http://example.org/outline/data/";
    const TS: &str = "http://example.org/outline/schema#";

    #[derive(Default)]
    struct MockGateway {
        response: Option<Result<String, GatewayError>>,
        fail_store: bool,
        saved: Mutex<Vec<String>>,
        queries: Mutex<Vec<String>>,
        /// (entered, release): store() signals `entered` then waits on `release`
        gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    #[async_trait]
    impl SyncGateway for MockGateway {
        async fn fetch(&self, query: &str) -> Result<String, GatewayError> {
            self.queries.lock().unwrap().push(query.to_string());
            self.response
                .clone()
                .unwrap_or_else(|| Err(GatewayError::Unreachable("no response".into())))
        }

        async fn store(&self, turtle: &str) -> Result<(), GatewayError> {
            if let Some((entered, release)) = &self.gate {
                entered.notify_one();
                release.notified().await;
            }
            if self.fail_store {
                return Err(GatewayError::Status {
                    status: 500,
                    message: "boom".into(),
                });
            }
            self.saved.lock().unwrap().push(turtle.to_string());
            Ok(())
        }
    }

    fn bindings() -> String {
        json!({"results": {"bindings": [
            {
                "node": {"type": "uri", "value": format!("{}root", BASE)},
                "type": {"type": "uri", "value": format!("{}RootNode", TS)}
            },
            {
                "node": {"type": "uri", "value": format!("{}child", BASE)},
                "type": {"type": "uri", "value": format!("{}Node", TS)},
                "title": {"type": "literal", "value": "Child"},
                "index": {"type": "literal", "value": "0"},
                "parent": {"type": "uri", "value": format!("{}root", BASE)}
            }
        ]}})
        .to_string()
    }

    fn session(gateway: MockGateway) -> OutlineSession<MockGateway> {
        OutlineSession::new(NodeStore::new(), gateway)
    }

    #[tokio::test]
    async fn test_load_applies_bindings() {
        let mut session = session(MockGateway {
            response: Some(Ok(bindings())),
            ..Default::default()
        });

        let outcome = session.load().await;
        assert!(matches!(outcome, LoadOutcome::Loaded { nodes: 2, skipped: 0 }));

        let root = session.store().get_root().unwrap();
        assert_eq!(root.id.as_str(), "root");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].as_str(), "child");
        session.store().validate().unwrap();

        let queries = session.gateway().queries.lock().unwrap();
        assert!(queries[0].contains("?node rdf:type ?type"));
    }

    #[tokio::test]
    async fn test_load_failure_falls_back_to_root() {
        let mut session = session(MockGateway {
            response: Some(Err(GatewayError::Unreachable("offline".into()))),
            ..Default::default()
        });

        let outcome = session.load().await;
        assert!(matches!(outcome, LoadOutcome::Failed(SyncError::Gateway(_))));
        assert!(session.store().is_ready());
        assert_eq!(session.store().node_count(), 1);
    }

    #[tokio::test]
    async fn test_load_malformed_body_falls_back() {
        let mut session = session(MockGateway {
            response: Some(Ok("<html>bad gateway</html>".into())),
            ..Default::default()
        });

        let outcome = session.load().await;
        assert!(matches!(
            outcome,
            LoadOutcome::Failed(SyncError::MalformedLoadResponse(_))
        ));
        assert_eq!(session.store().node_count(), 1);
    }

    #[tokio::test]
    async fn test_load_empty_dataset() {
        let mut session = session(MockGateway {
            response: Some(Ok(r#"{"results": {"bindings": []}}"#.into())),
            ..Default::default()
        });

        assert!(matches!(session.load().await, LoadOutcome::Empty));
        assert!(session.store().get_root().is_ok());
    }

    #[tokio::test]
    async fn test_schema_filter_reaches_query() {
        let mut session = session(MockGateway {
            response: Some(Ok(bindings())),
            ..Default::default()
        })
        .with_schema_filter(true);

        session.load().await;
        let queries = session.gateway().queries.lock().unwrap();
        assert!(queries[0].contains("FILTER(STRSTARTS"));
    }

    #[tokio::test]
    async fn test_save_sends_turtle() {
        let mut session = session(MockGateway::default());
        let root = session.store_mut().create_root().unwrap().id.clone();
        session.store_mut().add_node(&root, "Buy milk", None).unwrap();

        session.save().await.unwrap();

        let saved = session.gateway().saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert!(saved[0].contains("dc:title \"Buy milk\""));
        assert!(!session.is_saving());
    }

    #[tokio::test]
    async fn test_save_failure_keeps_local_state() {
        let mut session = session(MockGateway {
            fail_store: true,
            ..Default::default()
        });
        let root = session.store_mut().create_root().unwrap().id.clone();
        session.store_mut().add_node(&root, "Keep me", None).unwrap();

        let result = session.save().await;
        assert!(matches!(result, Err(SyncError::Gateway(GatewayError::Status { status: 500, .. }))));
        assert_eq!(session.store().node_count(), 2);
        assert!(!session.is_saving());
    }

    #[tokio::test]
    async fn test_save_without_root_is_rejected() {
        let session = session(MockGateway::default());
        assert!(matches!(session.save().await, Err(SyncError::Serialize(_))));
        assert!(session.gateway().saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_save_is_rejected() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let mut session = session(MockGateway {
            gate: Some((entered.clone(), release.clone())),
            ..Default::default()
        });
        session.store_mut().create_root().unwrap();

        let session = &session;
        let (first, second) = tokio::join!(session.save(), async {
            entered.notified().await;
            let second = session.save().await;
            release.notify_one();
            second
        });

        assert!(first.is_ok());
        assert!(matches!(second, Err(SyncError::SaveInFlight)));
        assert_eq!(session.gateway().saved.lock().unwrap().len(), 1);
        assert!(!session.is_saving());
    }
}
