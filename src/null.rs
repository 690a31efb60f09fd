//! The terminal router.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use crate::core::{
    Bootstrap, ContentId, ContentRouting, PeerId, PeerInfo, PeerRouting, ProviderStream,
    RoutingError, RoutingResult, ValueStore,
};

/// A router that does nothing.
///
/// Writes report [`RoutingError::NotSupported`], lookups report
/// [`RoutingError::NotFound`] and provider searches end immediately. Useful
/// to switch a capability off, or as a harmless member of a composite.
#[derive(Clone, Copy, Debug, Default)]
pub struct Null;

#[async_trait]
impl Bootstrap for Null {}

#[async_trait]
impl ValueStore for Null {
    async fn put_value(&self, _key: &str, _value: Vec<u8>) -> RoutingResult<()> {
        Err(RoutingError::NotSupported)
    }

    async fn get_value(&self, _key: &str) -> RoutingResult<Vec<u8>> {
        Err(RoutingError::NotFound)
    }
}

#[async_trait]
impl ContentRouting for Null {
    async fn provide(&self, _id: &ContentId, _announce: bool) -> RoutingResult<()> {
        Err(RoutingError::NotSupported)
    }

    fn find_providers<'a>(&'a self, _id: &'a ContentId, _count: usize) -> ProviderStream<'a> {
        stream::empty().boxed()
    }
}

#[async_trait]
impl PeerRouting for Null {
    async fn find_peer(&self, _id: &PeerId) -> RoutingResult<PeerInfo> {
        Err(RoutingError::NotFound)
    }
}
