//! Concurrent fan-out combinator.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use futures::stream::StreamExt;
use tracing::trace;

use crate::core::{
    Bootstrap, ContentId, ContentRouting, PeerId, PeerInfo, PeerRouting, ProviderStream, Routing,
    RoutingResult, ValueStore,
};
use crate::fanout::{first_success, fold_bootstrap, fold_writes, ProviderFanIn};

/// Dispatches every call to all members at once.
///
/// - Writes wait for every member. Any success makes the write succeed; if
///   every member reports `NotSupported` so does the write; otherwise the
///   genuine failures are returned, aggregated when there are several.
/// - Reads return the first success and drop the calls still in flight.
///   Members that report `NotFound` or `NotSupported` count as absent.
/// - Provider searches are merged as they arrive, deduplicated by peer.
///
/// Member calls are polled concurrently on the caller's task, so dropping the
/// returned future or stream cancels every outstanding member call.
#[derive(Clone, Default)]
pub struct Parallel {
    members: Vec<Arc<dyn Routing>>,
}

impl Parallel {
    pub fn new(members: Vec<Arc<dyn Routing>>) -> Self {
        Self { members }
    }

    /// Append a member; it takes part in every subsequent call.
    pub fn push(&mut self, member: Arc<dyn Routing>) {
        self.members.push(member);
    }

    pub fn members(&self) -> &[Arc<dyn Routing>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FromIterator<Arc<dyn Routing>> for Parallel {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Routing>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Extend<Arc<dyn Routing>> for Parallel {
    fn extend<I: IntoIterator<Item = Arc<dyn Routing>>>(&mut self, iter: I) {
        self.members.extend(iter);
    }
}

#[async_trait]
impl Bootstrap for Parallel {
    async fn bootstrap(&self) -> RoutingResult<()> {
        let results = join_all(self.members.iter().map(|member| member.bootstrap())).await;
        fold_bootstrap(results)
    }
}

#[async_trait]
impl ValueStore for Parallel {
    async fn put_value(&self, key: &str, value: Vec<u8>) -> RoutingResult<()> {
        trace!(key, members = self.members.len(), "parallel put");
        let results = join_all(
            self.members
                .iter()
                .map(|member| member.put_value(key, value.clone())),
        )
        .await;
        fold_writes(results)
    }

    async fn get_value(&self, key: &str) -> RoutingResult<Vec<u8>> {
        first_success(&self.members, |member| member.get_value(key)).await
    }
}

#[async_trait]
impl ContentRouting for Parallel {
    async fn provide(&self, id: &ContentId, announce: bool) -> RoutingResult<()> {
        let results = join_all(
            self.members
                .iter()
                .map(|member| member.provide(id, announce)),
        )
        .await;
        fold_writes(results)
    }

    fn find_providers<'a>(&'a self, id: &'a ContentId, count: usize) -> ProviderStream<'a> {
        ProviderFanIn::new(&self.members, id, count).boxed()
    }
}

#[async_trait]
impl PeerRouting for Parallel {
    async fn find_peer(&self, id: &PeerId) -> RoutingResult<PeerInfo> {
        first_success(&self.members, |member| member.find_peer(id)).await
    }
}
