//! Testing utilities for CRE workspace
//!
//! In-memory stand-ins for every capability the resolver consumes, plus
//! fixtures and tracing setup.

#![allow(missing_docs)]

use async_trait::async_trait;
use cre_item::{
    AssemblyItem, Container, ContainerId, ContentItem, ItemId, Params, RelationshipId, SiteId,
    TemplateId,
};
use cre_store::{
    edge_props, props, AssemblyCloner, ChangeEvent, ChangeHandler, CloneError, ContentStore,
    EventKind, FilterError, ItemFilter, NavigationIndex, NavigationNode, NotificationBus,
    QueryRequest, Relationship, RelationshipQuery, RelationshipStore, ResourceError,
    ResourceInvoker, Row, RowSet, StoreError, TemplateCatalog,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};

pub type QueryHandler = dyn Fn(&QueryRequest) -> Result<RowSet, StoreError> + Send + Sync;

/// Content store answering through a closure and recording every request
pub struct ScriptedStore {
    handler: Box<QueryHandler>,
    requests: Mutex<Vec<QueryRequest>>,
}

impl ScriptedStore {
    pub fn new(
        handler: impl Fn(&QueryRequest) -> Result<RowSet, StoreError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always returns `rows`
    pub fn returning(rows: RowSet) -> Self {
        Self::new(move |_| Ok(rows.clone()))
    }

    /// Always fails
    pub fn failing(message: &str) -> Self {
        let message = message.to_string();
        Self::new(move |req| Err(StoreError::query_failed(req.text.clone(), message.clone())))
    }

    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl ContentStore for ScriptedStore {
    async fn query(&self, request: QueryRequest) -> Result<RowSet, StoreError> {
        self.requests.lock().push(request.clone());
        (self.handler)(&request)
    }
}

/// Rows projecting content id and revision for each item
pub fn rows_for(items: &[ItemId]) -> RowSet {
    RowSet::new(
        items
            .iter()
            .map(|id| {
                Row::new()
                    .with(props::CONTENT_ID, id.content_id().0)
                    .with(props::REVISION, u64::from(id.revision()))
            })
            .collect(),
    )
}

/// Items `1..=count` at revision 1
pub fn item_ids(count: u64) -> Vec<ItemId> {
    (1..=count).map(|c| ItemId::new(c, 1)).collect()
}

type Predicate = dyn Fn(&ContentItem) -> bool + Send + Sync;

/// Filter recording batch sizes; returns survivors in reverse order
pub struct RecordingFilter {
    allow: Box<Predicate>,
    fail: bool,
    batches: Mutex<Vec<usize>>,
    contexts: Mutex<Vec<BTreeMap<String, String>>>,
}

impl RecordingFilter {
    pub fn allow_all() -> Self {
        Self::allowing(|_| true)
    }

    pub fn allowing(allow: impl Fn(&ContentItem) -> bool + Send + Sync + 'static) -> Self {
        Self {
            allow: Box::new(allow),
            fail: false,
            batches: Mutex::new(Vec::new()),
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::allow_all()
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.batches.lock().len()
    }

    pub fn contexts(&self) -> Vec<BTreeMap<String, String>> {
        self.contexts.lock().clone()
    }
}

#[async_trait]
impl ItemFilter for RecordingFilter {
    async fn filter(
        &self,
        items: Vec<ContentItem>,
        context: &BTreeMap<String, String>,
    ) -> Result<Vec<ContentItem>, FilterError> {
        self.batches.lock().push(items.len());
        self.contexts.lock().push(context.clone());
        if self.fail {
            return Err(FilterError::Failed("filter backend rejected batch".to_string()));
        }
        let mut allowed: Vec<ContentItem> = items.into_iter().filter(|i| (self.allow)(i)).collect();
        allowed.reverse();
        Ok(allowed)
    }
}

/// Relationship store over a mutable edge list
#[derive(Default)]
pub struct InMemoryRelationships {
    edges: Mutex<Vec<Relationship>>,
    queries: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryRelationships {
    pub fn new(edges: Vec<Relationship>) -> Self {
        Self {
            edges: Mutex::new(edges),
            ..Self::default()
        }
    }

    pub fn add(&self, edge: Relationship) {
        self.edges.lock().push(edge);
    }

    pub fn remove(&self, id: RelationshipId) -> Option<Relationship> {
        let mut edges = self.edges.lock();
        let idx = edges.iter().position(|e| e.id == id)?;
        Some(edges.remove(idx))
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelationshipStore for InMemoryRelationships {
    async fn query(&self, query: &RelationshipQuery) -> Result<Vec<Relationship>, StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("relationship store offline".to_string()));
        }
        Ok(self
            .edges
            .lock()
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect())
    }
}

/// Assembly edge placing `dependent` in container `slot` at `rank`
pub fn assembly_edge(
    id: u64,
    owner: ItemId,
    dependent: ItemId,
    slot: u64,
    rank: i32,
) -> Relationship {
    Relationship::new(RelationshipId(id), owner, dependent, "ActiveAssembly")
        .with_property(edge_props::SLOT_ID, slot.to_string())
        .with_property(edge_props::SORT_RANK, rank.to_string())
}

/// Translation edge from `parent` to `child`
pub fn translation_edge(id: u64, parent: ItemId, child: ItemId) -> Relationship {
    Relationship::new(RelationshipId(id), parent, child, "Translation")
}

/// Synchronous in-process bus
#[derive(Default)]
pub struct InProcessBus {
    handlers: Mutex<Vec<(EventKind, Arc<dyn ChangeHandler>)>>,
}

impl InProcessBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn publish(&self, event: ChangeEvent) {
        let handlers: Vec<Arc<dyn ChangeHandler>> = self
            .handlers
            .lock()
            .iter()
            .filter(|(kind, _)| *kind == event.kind)
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in handlers {
            handler.handle(&event).await;
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().len()
    }
}

impl NotificationBus for InProcessBus {
    fn subscribe(&self, kind: EventKind, handler: Arc<dyn ChangeHandler>) {
        self.handlers.lock().push((kind, handler));
    }
}

/// Template catalog over a fixed name map
#[derive(Default)]
pub struct StaticTemplates(HashMap<String, TemplateId>);

impl StaticTemplates {
    pub fn new(entries: &[(&str, u64)]) -> Self {
        Self(
            entries
                .iter()
                .map(|(name, id)| ((*name).to_string(), TemplateId(*id)))
                .collect(),
        )
    }
}

#[async_trait]
impl TemplateCatalog for StaticTemplates {
    async fn find_by_name(&self, name: &str) -> Result<Option<TemplateId>, StoreError> {
        Ok(self.0.get(name).copied())
    }
}

/// Navigation index returning a fixed node
#[derive(Default)]
pub struct StaticNavigation {
    pub node: Option<NavigationNode>,
}

#[async_trait]
impl NavigationIndex for StaticNavigation {
    async fn sibling_node(
        &self,
        _item: ItemId,
        _folder: Option<cre_item::FolderId>,
    ) -> Result<Option<NavigationNode>, StoreError> {
        Ok(self.node)
    }
}

/// Resource invoker over fixed documents, recording calls
#[derive(Default)]
pub struct StaticResources {
    documents: HashMap<String, serde_json::Value>,
    calls: Mutex<Vec<(String, Params)>>,
}

impl StaticResources {
    pub fn new(documents: Vec<(&str, serde_json::Value)>) -> Self {
        Self {
            documents: documents
                .into_iter()
                .map(|(path, doc)| (path.to_string(), doc))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Params)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ResourceInvoker for StaticResources {
    async fn invoke(
        &self,
        path: &str,
        params: &Params,
    ) -> Result<serde_json::Value, ResourceError> {
        self.calls.lock().push((path.to_string(), params.clone()));
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(path.to_string()))
    }
}

/// Cloner that always fails
#[derive(Debug, Default)]
pub struct FailingCloner;

impl AssemblyCloner for FailingCloner {
    fn clone_item(&self, source: &AssemblyItem) -> Result<AssemblyItem, CloneError> {
        Err(CloneError::new(source.id(), "cloning disabled"))
    }
}

/// Item being rendered: content `content` rev 1, site 1, template 10
pub fn source_item(content: u64) -> AssemblyItem {
    AssemblyItem::new(ItemId::new(content, 1))
        .with_site_id(SiteId(1))
        .with_template_id(TemplateId(10))
}

/// Container with id `id` resolved by `finder`
pub fn container(id: u64, name: &str, finder: &str) -> Container {
    Container::new(ContainerId(id), name, finder)
}

/// Install a fmt subscriber honoring `RUST_LOG` (once per process)
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
