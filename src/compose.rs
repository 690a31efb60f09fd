//! Capability-splitting composite.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{join_all, BoxFuture};
use futures::stream::{self, StreamExt};

use crate::core::{
    Bootstrap, ContentId, ContentRouting, PeerId, PeerInfo, PeerRouting, ProviderStream,
    RoutingError, RoutingResult, ValueStore,
};
use crate::fanout::fold_bootstrap;

/// Groups up to three independent capability handles behind one router.
///
/// Each call goes to exactly one handle: value store calls to the value
/// store, provider calls to the content router, peer lookups to the peer
/// router. A missing handle behaves like [`crate::Null`] for that capability.
///
/// ```
/// use std::sync::Arc;
///
/// use iroh_routing::{Compose, LimitedValueStore, Null};
///
/// let router = Compose::new()
///     .with_value_store(Arc::new(LimitedValueStore::new(Arc::new(Null), ["pk"])))
///     .with_peer_routing(Arc::new(Null));
/// assert!(router.content_routing.is_none());
/// ```
#[derive(Clone, Default)]
pub struct Compose {
    pub value_store: Option<Arc<dyn ValueStore>>,
    pub content_routing: Option<Arc<dyn ContentRouting>>,
    pub peer_routing: Option<Arc<dyn PeerRouting>>,
}

impl Compose {
    /// A composite offering no capability at all.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value_store(mut self, store: Arc<dyn ValueStore>) -> Self {
        self.value_store = Some(store);
        self
    }

    pub fn with_content_routing(mut self, router: Arc<dyn ContentRouting>) -> Self {
        self.content_routing = Some(router);
        self
    }

    pub fn with_peer_routing(mut self, router: Arc<dyn PeerRouting>) -> Self {
        self.peer_routing = Some(router);
        self
    }
}

/// Address of the object behind a handle, ignoring the vtable.
fn handle_addr<T: ?Sized>(handle: &Arc<T>) -> usize {
    Arc::as_ptr(handle).cast::<()>() as usize
}

#[async_trait]
impl Bootstrap for Compose {
    /// Bootstrap every present handle once, even when the same router fills
    /// several capabilities.
    async fn bootstrap(&self) -> RoutingResult<()> {
        let mut seen: Vec<usize> = Vec::with_capacity(3);
        let mut pending: Vec<BoxFuture<'_, RoutingResult<()>>> = Vec::with_capacity(3);

        if let Some(store) = &self.value_store {
            seen.push(handle_addr(store));
            pending.push(store.bootstrap());
        }
        if let Some(router) = &self.content_routing {
            let addr = handle_addr(router);
            if !seen.contains(&addr) {
                seen.push(addr);
                pending.push(router.bootstrap());
            }
        }
        if let Some(router) = &self.peer_routing {
            if !seen.contains(&handle_addr(router)) {
                pending.push(router.bootstrap());
            }
        }

        fold_bootstrap(join_all(pending).await)
    }
}

#[async_trait]
impl ValueStore for Compose {
    async fn put_value(&self, key: &str, value: Vec<u8>) -> RoutingResult<()> {
        match &self.value_store {
            Some(store) => store.put_value(key, value).await,
            None => Err(RoutingError::NotSupported),
        }
    }

    async fn get_value(&self, key: &str) -> RoutingResult<Vec<u8>> {
        match &self.value_store {
            Some(store) => store.get_value(key).await,
            None => Err(RoutingError::NotFound),
        }
    }
}

#[async_trait]
impl ContentRouting for Compose {
    async fn provide(&self, id: &ContentId, announce: bool) -> RoutingResult<()> {
        match &self.content_routing {
            Some(router) => router.provide(id, announce).await,
            None => Err(RoutingError::NotSupported),
        }
    }

    fn find_providers<'a>(&'a self, id: &'a ContentId, count: usize) -> ProviderStream<'a> {
        match &self.content_routing {
            Some(router) => router.find_providers(id, count),
            None => stream::empty().boxed(),
        }
    }
}

#[async_trait]
impl PeerRouting for Compose {
    async fn find_peer(&self, id: &PeerId) -> RoutingResult<PeerInfo> {
        match &self.peer_routing {
            Some(router) => router.find_peer(id).await,
            None => Err(RoutingError::NotFound),
        }
    }
}
