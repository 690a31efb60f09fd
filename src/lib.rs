//! # Iroh routing
//!
//! Composable routing for content-addressed peer-to-peer networks.
//!
//! A routing backend offers up to three independent capabilities:
//!
//! - [`ValueStore`]: put and get records under `/<namespace>/<rest>` keys,
//! - [`ContentRouting`]: announce and find providers of a [`ContentId`],
//! - [`PeerRouting`]: find addressing information for a [`PeerId`].
//!
//! Deployments usually combine several heterogeneous backends (a DHT, a local
//! cache, a gossip provider index). This crate builds such pipelines out of a
//! handful of combinators that all speak the same capability traits, so they
//! nest freely:
//!
//! - [`null`]: [`Null`], the router that has nothing and accepts nothing.
//! - [`limited`]: [`LimitedValueStore`], an allow-list of key namespaces.
//! - [`compose`]: [`Compose`], one handle per capability.
//! - [`parallel`]: [`Parallel`], concurrent fan-out with merged results.
//! - [`serial`]: [`Serial`], ordered reads and replicated writes.
//! - [`tiered`]: [`Tiered`], ordered reads and first-tier-wins writes.
//!
//! Failures are always one of [`RoutingError::NotFound`],
//! [`RoutingError::NotSupported`] or [`RoutingError::Other`]; see [`fanout`]
//! for how combinators fold member outcomes.
//!
//! ## Getting started
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use iroh_routing::{Compose, LimitedValueStore, Null, Parallel, Routing, Tiered, ValueStore};
//!
//! # async fn launch(
//! #     dht: Arc<dyn Routing>,
//! #     cache: Arc<dyn ValueStore>,
//! # ) -> iroh_routing::RoutingResult<()> {
//! let cache_tier: Arc<dyn Routing> =
//!     Arc::new(Compose::new().with_value_store(Arc::new(LimitedValueStore::new(cache, ["pk"]))));
//! let values: Arc<dyn Routing> = Arc::new(Tiered::new(vec![cache_tier, dht.clone()]));
//! let fallback: Arc<dyn Routing> = Arc::new(Null);
//! let router = Parallel::new(vec![values, dht, fallback]);
//!
//! router.put_value("/pk/some-peer", b"key bytes".to_vec()).await?;
//! let _ = router.get_value("/pk/some-peer").await?;
//! # Ok(())
//! # }
//! ```

pub mod compose;
pub mod core;
pub mod fanout;
pub mod limited;
pub mod null;
pub mod parallel;
pub mod serial;
pub mod tiered;

pub use crate::compose::Compose;
pub use crate::core::{
    AggregateError, Bootstrap, ContentId, ContentRouting, PeerId, PeerInfo, PeerRouting,
    ProviderStream, Routing, RoutingError, RoutingResult, ValueStore,
};
pub use crate::fanout::ProviderFanIn;
pub use crate::limited::LimitedValueStore;
pub use crate::null::Null;
pub use crate::parallel::Parallel;
pub use crate::serial::Serial;
pub use crate::tiered::Tiered;
