//! Ordered, replicating combinator.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::StreamExt;

use crate::core::{
    Bootstrap, ContentId, ContentRouting, PeerId, PeerInfo, PeerRouting, ProviderStream, Routing,
    RoutingResult, ValueStore,
};
use crate::fanout::{first_in_order, fold_bootstrap, fold_writes, ProviderFanIn};

/// Consults members one after another, in list order.
///
/// Reads return the first member that answers, so earlier members shadow
/// later ones. Writes are replayed on every member in order; a failing member
/// never stops the later ones, and the outcome is folded like a
/// [`crate::Parallel`] write. Provider searches are merged concurrently, as
/// in [`crate::Parallel`].
#[derive(Clone, Default)]
pub struct Serial {
    members: Vec<Arc<dyn Routing>>,
}

impl Serial {
    pub fn new(members: Vec<Arc<dyn Routing>>) -> Self {
        Self { members }
    }

    /// Append a member with the lowest priority.
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

impl FromIterator<Arc<dyn Routing>> for Serial {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Routing>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Extend<Arc<dyn Routing>> for Serial {
    fn extend<I: IntoIterator<Item = Arc<dyn Routing>>>(&mut self, iter: I) {
        self.members.extend(iter);
    }
}

#[async_trait]
impl Bootstrap for Serial {
    async fn bootstrap(&self) -> RoutingResult<()> {
        let mut results = Vec::with_capacity(self.members.len());
        for member in &self.members {
            results.push(member.bootstrap().await);
        }
        fold_bootstrap(results)
    }
}

#[async_trait]
impl ValueStore for Serial {
    async fn put_value(&self, key: &str, value: Vec<u8>) -> RoutingResult<()> {
        let mut results = Vec::with_capacity(self.members.len());
        for member in &self.members {
            results.push(member.put_value(key, value.clone()).await);
        }
        fold_writes(results)
    }

    async fn get_value(&self, key: &str) -> RoutingResult<Vec<u8>> {
        first_in_order(&self.members, |member| member.get_value(key)).await
    }
}

#[async_trait]
impl ContentRouting for Serial {
    async fn provide(&self, id: &ContentId, announce: bool) -> RoutingResult<()> {
        let mut results = Vec::with_capacity(self.members.len());
        for member in &self.members {
            results.push(member.provide(id, announce).await);
        }
        fold_writes(results)
    }

    fn find_providers<'a>(&'a self, id: &'a ContentId, count: usize) -> ProviderStream<'a> {
        ProviderFanIn::new(&self.members, id, count).boxed()
    }
}

#[async_trait]
impl PeerRouting for Serial {
    async fn find_peer(&self, id: &PeerId) -> RoutingResult<PeerInfo> {
        first_in_order(&self.members, |member| member.find_peer(id)).await
    }
}
