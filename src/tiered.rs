//! Ordered cache-tier combinator.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::StreamExt;
use tracing::trace;

use crate::core::{
    Bootstrap, ContentId, ContentRouting, PeerId, PeerInfo, PeerRouting, ProviderStream, Routing,
    RoutingResult, ValueStore,
};
use crate::fanout::{first_in_order, fold_bootstrap, fold_writes, ProviderFanIn};

/// Treats members as cache tiers, nearest first.
///
/// Reads behave as in [`crate::Serial`]. A write goes to the tiers in order
/// and stops at the first tier that accepts it; later tiers are not touched.
/// If no tier accepts, the failures are folded like a [`crate::Parallel`]
/// write.
#[derive(Clone, Default)]
pub struct Tiered {
    members: Vec<Arc<dyn Routing>>,
}

impl Tiered {
    pub fn new(members: Vec<Arc<dyn Routing>>) -> Self {
        Self { members }
    }

    /// Append a tier behind the existing ones.
    pub fn push(&mut self, tier: Arc<dyn Routing>) {
        self.members.push(tier);
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

impl FromIterator<Arc<dyn Routing>> for Tiered {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Routing>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Extend<Arc<dyn Routing>> for Tiered {
    fn extend<I: IntoIterator<Item = Arc<dyn Routing>>>(&mut self, iter: I) {
        self.members.extend(iter);
    }
}

#[async_trait]
impl Bootstrap for Tiered {
    async fn bootstrap(&self) -> RoutingResult<()> {
        let mut results = Vec::with_capacity(self.members.len());
        for tier in &self.members {
            results.push(tier.bootstrap().await);
        }
        fold_bootstrap(results)
    }
}

#[async_trait]
impl ValueStore for Tiered {
    async fn put_value(&self, key: &str, value: Vec<u8>) -> RoutingResult<()> {
        let mut failures = Vec::new();
        for (idx, tier) in self.members.iter().enumerate() {
            match tier.put_value(key, value.clone()).await {
                Ok(()) => {
                    trace!(key, tier = idx, "write absorbed");
                    return Ok(());
                }
                Err(err) => failures.push(Err(err)),
            }
        }
        fold_writes(failures)
    }

    async fn get_value(&self, key: &str) -> RoutingResult<Vec<u8>> {
        first_in_order(&self.members, |tier| tier.get_value(key)).await
    }
}

#[async_trait]
impl ContentRouting for Tiered {
    async fn provide(&self, id: &ContentId, announce: bool) -> RoutingResult<()> {
        let mut failures = Vec::new();
        for tier in &self.members {
            match tier.provide(id, announce).await {
                Ok(()) => return Ok(()),
                Err(err) => failures.push(Err(err)),
            }
        }
        fold_writes(failures)
    }

    fn find_providers<'a>(&'a self, id: &'a ContentId, count: usize) -> ProviderStream<'a> {
        ProviderFanIn::new(&self.members, id, count).boxed()
    }
}

#[async_trait]
impl PeerRouting for Tiered {
    async fn find_peer(&self, id: &PeerId) -> RoutingResult<PeerInfo> {
        first_in_order(&self.members, |tier| tier.find_peer(id)).await
    }
}
