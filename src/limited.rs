//! Namespace-restricted value store.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use crate::core::{namespace, Bootstrap, RoutingError, RoutingResult, ValueStore};

/// Restricts a value store to keys in an allow-list of namespaces.
///
/// Keys outside the allow-list never reach the wrapped store: writes report
/// [`RoutingError::NotSupported`], reads report [`RoutingError::NotFound`].
#[derive(Clone)]
pub struct LimitedValueStore {
    store: Arc<dyn ValueStore>,
    namespaces: Vec<String>,
}

impl LimitedValueStore {
    pub fn new<I, S>(store: Arc<dyn ValueStore>, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            store,
            namespaces: namespaces.into_iter().map(Into::into).collect(),
        }
    }

    /// The allowed namespaces.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Whether `key` lies in one of the allowed namespaces.
    pub fn key_supported(&self, key: &str) -> bool {
        match namespace(key) {
            Some(ns) => self.namespaces.iter().any(|allowed| allowed == ns),
            None => false,
        }
    }
}

#[async_trait]
impl Bootstrap for LimitedValueStore {
    async fn bootstrap(&self) -> RoutingResult<()> {
        self.store.bootstrap().await
    }
}

#[async_trait]
impl ValueStore for LimitedValueStore {
    async fn put_value(&self, key: &str, value: Vec<u8>) -> RoutingResult<()> {
        if !self.key_supported(key) {
            trace!(key, "rejecting write outside allowed namespaces");
            return Err(RoutingError::NotSupported);
        }
        self.store.put_value(key, value).await
    }

    async fn get_value(&self, key: &str) -> RoutingResult<Vec<u8>> {
        if !self.key_supported(key) {
            return Err(RoutingError::NotFound);
        }
        self.store.get_value(key).await
    }
}
