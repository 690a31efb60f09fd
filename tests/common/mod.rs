use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::Mutex;

use iroh_routing::{
    Bootstrap, Compose, ContentId, ContentRouting, LimitedValueStore, PeerId, PeerInfo,
    PeerRouting, ProviderStream, Routing, RoutingError, RoutingResult, ValueStore,
};

/// Shared, ordered record of calls made across several test backends.
#[allow(dead_code)]
pub type Journal = Arc<Mutex<Vec<String>>>;

#[allow(dead_code)]
pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

/// In-memory value store with a few magic key prefixes:
///
/// - `/notsupported/...` rejects writes with `NotSupported`,
/// - `/error/<msg>` fails reads and writes with `<msg>`,
/// - `/stall/...` never completes.
#[derive(Clone, Default)]
pub struct DummyValueStore {
    name: String,
    values: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    calls: Arc<AtomicUsize>,
    journal: Option<Journal>,
}

impl DummyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn with_journal(name: &str, journal: Journal) -> Self {
        Self {
            name: name.to_owned(),
            journal: Some(journal),
            ..Self::default()
        }
    }

    /// Number of put/get calls that reached this store.
    #[allow(dead_code)]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn contains(&self, key: &str) -> bool {
        let values = self.values.lock().await;
        values.contains_key(key)
    }

    async fn record(&self, op: &str, key: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(journal) = &self.journal {
            let mut entries = journal.lock().await;
            entries.push(format!("{} {op} {key}", self.name));
        }
    }
}

#[async_trait]
impl Bootstrap for DummyValueStore {}

#[async_trait]
impl ValueStore for DummyValueStore {
    async fn put_value(&self, key: &str, value: Vec<u8>) -> RoutingResult<()> {
        self.record("put", key).await;
        if key.starts_with("/notsupported/") {
            return Err(RoutingError::NotSupported);
        }
        if let Some(msg) = key.strip_prefix("/error/") {
            return Err(RoutingError::other(msg.to_owned()));
        }
        if key.starts_with("/stall/") {
            std::future::pending::<()>().await;
        }
        let mut values = self.values.lock().await;
        values.insert(key.to_owned(), value);
        Ok(())
    }

    async fn get_value(&self, key: &str) -> RoutingResult<Vec<u8>> {
        self.record("get", key).await;
        if let Some(msg) = key.strip_prefix("/error/") {
            return Err(RoutingError::other(msg.to_owned()));
        }
        if key.starts_with("/stall/") {
            std::future::pending::<()>().await;
        }
        let values = self.values.lock().await;
        values.get(key).cloned().ok_or(RoutingError::NotFound)
    }
}

/// Decrements the live stream count when a provider stream is dropped.
struct LiveStream(Arc<AtomicUsize>);

impl Drop for LiveStream {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Map-backed provider directory. A provider named `stall` blocks the stream
/// forever at that position.
#[derive(Clone, Default)]
pub struct DummyProvider {
    providers: HashMap<ContentId, Vec<PeerId>>,
    queries: Arc<AtomicUsize>,
    live: Arc<AtomicUsize>,
}

impl DummyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &ContentId, peers: &[&str]) -> Self {
        self.providers
            .insert(id.clone(), peers.iter().map(|p| PeerId::from(*p)).collect());
        self
    }

    /// Number of `find_providers` calls made.
    #[allow(dead_code)]
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of provider streams that have not been dropped yet.
    #[allow(dead_code)]
    pub fn live_streams(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Bootstrap for DummyProvider {}

#[async_trait]
impl ContentRouting for DummyProvider {
    async fn provide(&self, _id: &ContentId, _announce: bool) -> RoutingResult<()> {
        Err(RoutingError::NotSupported)
    }

    fn find_providers<'a>(&'a self, id: &'a ContentId, count: usize) -> ProviderStream<'a> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        let guard = LiveStream(self.live.clone());

        let peers: Vec<PeerId> = self
            .providers
            .get(id)
            .map(|peers| peers.iter().take(count).cloned().collect())
            .unwrap_or_default();
        stream::iter(peers)
            .then(move |peer| {
                let _alive = &guard;
                async move {
                    if peer.as_str() == "stall" {
                        std::future::pending::<()>().await;
                    }
                    PeerInfo::new(peer)
                }
            })
            .boxed()
    }
}

type ProvideFn = dyn Fn(&ContentId, bool) -> RoutingResult<()> + Send + Sync;

/// Content router whose `provide` runs a callback and which never finds anyone.
#[derive(Clone)]
pub struct CallbackProvider(Arc<ProvideFn>);

impl CallbackProvider {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&ContentId, bool) -> RoutingResult<()> + Send + Sync + 'static,
    {
        Self(Arc::new(callback))
    }
}

#[async_trait]
impl Bootstrap for CallbackProvider {}

#[async_trait]
impl ContentRouting for CallbackProvider {
    async fn provide(&self, id: &ContentId, announce: bool) -> RoutingResult<()> {
        (self.0)(id, announce)
    }

    fn find_providers<'a>(&'a self, _id: &'a ContentId, _count: usize) -> ProviderStream<'a> {
        stream::empty().boxed()
    }
}

/// Set-backed peer directory.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct DummyPeerRouter(HashSet<PeerId>);

#[allow(dead_code)]
impl DummyPeerRouter {
    pub fn new(peers: &[&str]) -> Self {
        Self(peers.iter().map(|p| PeerId::from(*p)).collect())
    }
}

#[async_trait]
impl Bootstrap for DummyPeerRouter {}

#[async_trait]
impl PeerRouting for DummyPeerRouter {
    async fn find_peer(&self, id: &PeerId) -> RoutingResult<PeerInfo> {
        if self.0.contains(id) {
            Ok(PeerInfo::with_addrs(id.clone(), vec![format!("/mem/{id}")]))
        } else {
            Err(RoutingError::NotFound)
        }
    }
}

/// Router offering every capability that counts how often it was bootstrapped.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct BootstrapCounter {
    count: Arc<AtomicUsize>,
    fail_with: Option<&'static str>,
}

#[allow(dead_code)]
impl BootstrapCounter {
    pub fn failing(msg: &'static str) -> Self {
        Self {
            fail_with: Some(msg),
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Bootstrap for BootstrapCounter {
    async fn bootstrap(&self) -> RoutingResult<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        match self.fail_with {
            Some(msg) => Err(RoutingError::other(msg)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ValueStore for BootstrapCounter {
    async fn put_value(&self, _key: &str, _value: Vec<u8>) -> RoutingResult<()> {
        Err(RoutingError::NotSupported)
    }

    async fn get_value(&self, _key: &str) -> RoutingResult<Vec<u8>> {
        Err(RoutingError::NotFound)
    }
}

#[async_trait]
impl ContentRouting for BootstrapCounter {
    async fn provide(&self, _id: &ContentId, _announce: bool) -> RoutingResult<()> {
        Err(RoutingError::NotSupported)
    }

    fn find_providers<'a>(&'a self, _id: &'a ContentId, _count: usize) -> ProviderStream<'a> {
        stream::empty().boxed()
    }
}

#[async_trait]
impl PeerRouting for BootstrapCounter {
    async fn find_peer(&self, _id: &PeerId) -> RoutingResult<PeerInfo> {
        Err(RoutingError::NotFound)
    }
}

/// Router offering every capability whose calls never complete.
#[allow(dead_code)]
#[derive(Clone, Copy, Default)]
pub struct Stalling;

#[async_trait]
impl Bootstrap for Stalling {}

#[async_trait]
impl ValueStore for Stalling {
    async fn put_value(&self, _key: &str, _value: Vec<u8>) -> RoutingResult<()> {
        std::future::pending().await
    }

    async fn get_value(&self, _key: &str) -> RoutingResult<Vec<u8>> {
        std::future::pending().await
    }
}

#[async_trait]
impl ContentRouting for Stalling {
    async fn provide(&self, _id: &ContentId, _announce: bool) -> RoutingResult<()> {
        std::future::pending().await
    }

    fn find_providers<'a>(&'a self, _id: &'a ContentId, _count: usize) -> ProviderStream<'a> {
        stream::pending().boxed()
    }
}

#[async_trait]
impl PeerRouting for Stalling {
    async fn find_peer(&self, _id: &PeerId) -> RoutingResult<PeerInfo> {
        std::future::pending().await
    }
}

/// Erase a router into a composite member.
#[allow(dead_code)]
pub fn member<R: Routing + 'static>(router: R) -> Arc<dyn Routing> {
    Arc::new(router)
}

/// A member whose only capability is `store` limited to `namespaces`.
#[allow(dead_code)]
pub fn limited_member(store: &DummyValueStore, namespaces: &[&str]) -> Arc<dyn Routing> {
    let limited = LimitedValueStore::new(Arc::new(store.clone()), namespaces.iter().copied());
    member(Compose::new().with_value_store(Arc::new(limited)))
}

/// A member whose only capability is `store`.
#[allow(dead_code)]
pub fn store_member(store: &DummyValueStore) -> Arc<dyn Routing> {
    member(Compose::new().with_value_store(Arc::new(store.clone())))
}

/// A member whose only capability is `provider`.
#[allow(dead_code)]
pub fn provider_member(provider: &DummyProvider) -> Arc<dyn Routing> {
    member(Compose::new().with_content_routing(Arc::new(provider.clone())))
}

pub fn content_id(data: &str) -> ContentId {
    ContentId::for_content(data.as_bytes())
}

/// Collect the ids of every record a provider stream yields.
pub async fn collect_ids(stream: ProviderStream<'_>) -> Vec<String> {
    stream
        .map(|info| info.id.as_str().to_owned())
        .collect()
        .await
}
