//! Core routing types: identifiers, the error taxonomy and capability traits.
//!
//! This module contains the vocabulary every combinator speaks:
//!
//! - **Identifiers**: [`ContentId`], [`PeerId`], [`PeerInfo`]
//! - **Keys**: [`namespace`] for `/<namespace>/<rest>` value store keys
//! - **Errors**: [`RoutingError`], [`AggregateError`], [`RoutingResult`]
//! - **Capabilities**: [`ValueStore`], [`ContentRouting`], [`PeerRouting`],
//!   [`Bootstrap`] and the umbrella [`Routing`] trait

use std::fmt;

use async_trait::async_trait;
use futures::stream::BoxStream;
use iroh_blake3::Hasher;
use thiserror::Error;

// ============================================================================
// Identifiers
// ============================================================================

/// Compute a 32-byte BLAKE3 digest of the input data.
fn blake3_digest(data: &[u8]) -> [u8; 32] {
    let mut hasher = Hasher::new();
    hasher.update(data);
    let digest = hasher.finalize();

    let mut out = [0u8; 32];
    out.copy_from_slice(digest.as_bytes());
    out
}

/// An opaque content-addressing identifier.
///
/// Combinators never look inside a content id; they only compare and hash it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(Vec<u8>);

impl ContentId {
    /// Wrap raw identifier bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Derive the content id of `data` as its BLAKE3 digest.
    ///
    /// ```
    /// use iroh_routing::ContentId;
    ///
    /// let id = ContentId::for_content(b"hello world");
    /// assert_eq!(id, ContentId::for_content(b"hello world"));
    /// assert_ne!(id, ContentId::for_content(b"goodbye world"));
    /// ```
    pub fn for_content(data: &[u8]) -> Self {
        Self(blake3_digest(data).to_vec())
    }

    /// The raw identifier bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// An opaque token identifying a network participant.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A peer together with whatever addressing information is known for it.
///
/// Returned by [`PeerRouting::find_peer`] and yielded as a provider record
/// by [`ContentRouting::find_providers`]. Provider records are deduplicated
/// by [`PeerInfo::id`] only.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PeerInfo {
    /// The peer's identifier.
    pub id: PeerId,
    /// Known dialable addresses, possibly empty.
    #[serde(default)]
    pub addrs: Vec<String>,
}

impl PeerInfo {
    /// A record with no addressing information.
    pub fn new(id: impl Into<PeerId>) -> Self {
        Self {
            id: id.into(),
            addrs: Vec::new(),
        }
    }

    pub fn with_addrs(id: impl Into<PeerId>, addrs: Vec<String>) -> Self {
        Self {
            id: id.into(),
            addrs,
        }
    }
}

// ============================================================================
// Keys
// ============================================================================

/// Extract the namespace of a value store key of the form `/<namespace>/<rest>`.
///
/// Returns `None` when the key has no leading `/`, an empty first segment, or
/// no `/` terminating the namespace.
///
/// ```
/// use iroh_routing::core::namespace;
///
/// assert_eq!(namespace("/pk/abc"), Some("pk"));
/// assert_eq!(namespace("/pk"), None);
/// assert_eq!(namespace("//abc"), None);
/// assert_eq!(namespace("pk/abc"), None);
/// ```
pub fn namespace(key: &str) -> Option<&str> {
    let rest = key.strip_prefix('/')?;
    let (ns, _) = rest.split_once('/')?;
    if ns.is_empty() {
        None
    } else {
        Some(ns)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// The three outcomes a routing call can fail with.
///
/// Combinators fold member failures into one of these and never invent new
/// kinds: callers cannot tell a combinator from a plain backend by error shape.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// No reachable member holds the requested data.
    #[error("routing: not found")]
    NotFound,
    /// No reachable member implements or permits the operation.
    #[error("routing: operation or key not supported")]
    NotSupported,
    /// A genuine backend failure. Several failures are carried as an
    /// [`AggregateError`].
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result alias used by all capability traits.
pub type RoutingResult<T> = Result<T, RoutingError>;

impl RoutingError {
    /// Build an [`RoutingError::Other`] from a plain message.
    pub fn other(msg: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Other(anyhow::Error::msg(msg))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported)
    }

    /// The individual causes behind this error, flattening aggregates.
    ///
    /// A non-aggregate error yields itself.
    pub fn causes(&self) -> Vec<&RoutingError> {
        match self {
            Self::Other(err) => match err.downcast_ref::<AggregateError>() {
                Some(aggregate) => aggregate.errors.iter().flat_map(|e| e.causes()).collect(),
                None => vec![self],
            },
            _ => vec![self],
        }
    }

    /// Whether any underlying cause mentions `needle` anywhere in its error chain.
    pub fn contains(&self, needle: &str) -> bool {
        self.causes().into_iter().any(|cause| match cause {
            Self::Other(err) => format!("{err:#}").contains(needle),
            kind => kind.to_string().contains(needle),
        })
    }
}

/// Several member failures reported together.
#[derive(Debug)]
pub struct AggregateError {
    errors: Vec<RoutingError>,
}

impl AggregateError {
    pub(crate) fn new(errors: Vec<RoutingError>) -> Self {
        Self { errors }
    }

    /// The member errors, in the order they were collected.
    pub fn errors(&self) -> &[RoutingError] {
        &self.errors
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} routers failed: ", self.errors.len())?;
        for (idx, err) in self.errors.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            match err {
                RoutingError::Other(inner) => write!(f, "{inner:#}")?,
                kind => write!(f, "{kind}")?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

// ============================================================================
// Capability Traits
// ============================================================================

/// A lazily produced, finite sequence of provider records.
///
/// Dropping the stream cancels whatever lookup is feeding it.
pub type ProviderStream<'a> = BoxStream<'a, PeerInfo>;

/// Bring a router into a working state.
///
/// Supertrait of every capability so any capability handle can be
/// bootstrapped. Routers with nothing to do rely on the default.
#[async_trait]
pub trait Bootstrap: Send + Sync {
    async fn bootstrap(&self) -> RoutingResult<()> {
        Ok(())
    }
}

/// Key/value record storage.
#[async_trait]
pub trait ValueStore: Bootstrap {
    /// Store `value` under `key`.
    async fn put_value(&self, key: &str, value: Vec<u8>) -> RoutingResult<()>;

    /// Retrieve the value stored under `key`.
    async fn get_value(&self, key: &str) -> RoutingResult<Vec<u8>>;
}

/// Directory mapping content ids to the peers that hold the content.
#[async_trait]
pub trait ContentRouting: Bootstrap {
    /// Announce that this node can provide `id`. With `announce` unset the
    /// record is only kept locally.
    async fn provide(&self, id: &ContentId, announce: bool) -> RoutingResult<()>;

    /// Stream up to `count` providers of `id`.
    ///
    /// `count == 0` yields an empty stream.
    fn find_providers<'a>(&'a self, id: &'a ContentId, count: usize) -> ProviderStream<'a>;
}

/// Directory mapping peer ids to addressing information.
#[async_trait]
pub trait PeerRouting: Bootstrap {
    async fn find_peer(&self, id: &PeerId) -> RoutingResult<PeerInfo>;
}

/// A router offering all three capabilities.
///
/// Implemented automatically; composites hold their members as
/// `Arc<dyn Routing>`. Routers that only offer some capabilities are wrapped
/// in a [`crate::Compose`].
pub trait Routing: ValueStore + ContentRouting + PeerRouting {}

impl<T: ValueStore + ContentRouting + PeerRouting + ?Sized> Routing for T {}
