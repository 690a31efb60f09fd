//! Merge policies shared by the multi-member combinators.
//!
//! - [`fold_writes`]: a success anywhere wins, `NotSupported` everywhere stays
//!   `NotSupported`, anything else surfaces (aggregated when several).
//! - [`fold_reads`]: `NotFound` and `NotSupported` both collapse to
//!   `NotFound`, anything else surfaces.
//! - [`ProviderFanIn`]: concurrent, deduplicating merge of member provider
//!   streams, bounded by the requested count.

use std::collections::HashSet;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::stream::{FusedStream, FuturesUnordered, SelectAll, Stream, StreamExt};
use tracing::{debug, trace};

use crate::core::{
    AggregateError, ContentId, PeerId, PeerInfo, ProviderStream, Routing, RoutingError,
    RoutingResult,
};

/// Collapse several member errors into one, keeping every cause.
fn surface(mut errors: Vec<RoutingError>) -> RoutingError {
    if errors.len() == 1 {
        errors.remove(0)
    } else {
        RoutingError::Other(anyhow::Error::new(AggregateError::new(errors)))
    }
}

/// Fold the outcome of a write issued to several members.
pub(crate) fn fold_writes<I>(results: I) -> RoutingResult<()>
where
    I: IntoIterator<Item = RoutingResult<()>>,
{
    let mut failures = Vec::new();
    let mut succeeded = false;
    for result in results {
        match result {
            Ok(()) => succeeded = true,
            Err(RoutingError::NotSupported) => {}
            Err(err) => failures.push(err),
        }
    }

    if succeeded {
        if !failures.is_empty() {
            debug!(discarded = failures.len(), "write accepted; ignoring member failures");
        }
        return Ok(());
    }
    if failures.is_empty() {
        return Err(RoutingError::NotSupported);
    }
    for err in &failures {
        debug!("write failed on member: {err:#}");
    }
    Err(surface(failures))
}

/// Fold the errors of a read that no member answered.
pub(crate) fn fold_reads<I>(errors: I) -> RoutingError
where
    I: IntoIterator<Item = RoutingError>,
{
    let failures: Vec<RoutingError> = errors
        .into_iter()
        .filter(|err| !matches!(err, RoutingError::NotFound | RoutingError::NotSupported))
        .collect();
    if failures.is_empty() {
        return RoutingError::NotFound;
    }
    for err in &failures {
        debug!("read failed on member: {err:#}");
    }
    surface(failures)
}

/// Fold bootstrap results: like a write, except that nothing to bootstrap is fine.
pub(crate) fn fold_bootstrap(results: Vec<RoutingResult<()>>) -> RoutingResult<()> {
    if results.is_empty() {
        return Ok(());
    }
    fold_writes(results)
}

/// Issue a read to every member concurrently and return the first success.
///
/// Returning drops the remaining member calls. Without a success the member
/// errors go through [`fold_reads`].
pub(crate) async fn first_success<'a, T, F>(
    members: &'a [Arc<dyn Routing>],
    call: F,
) -> RoutingResult<T>
where
    F: FnMut(&'a Arc<dyn Routing>) -> BoxFuture<'a, RoutingResult<T>>,
{
    let mut pending: FuturesUnordered<_> = members.iter().map(call).collect();
    let mut errors = Vec::with_capacity(members.len());
    while let Some(result) = pending.next().await {
        match result {
            Ok(value) => return Ok(value),
            Err(err) => errors.push(err),
        }
    }
    Err(fold_reads(errors))
}

/// Issue a read to members one at a time, in order, stopping at the first success.
pub(crate) async fn first_in_order<'a, T, F>(
    members: &'a [Arc<dyn Routing>],
    mut call: F,
) -> RoutingResult<T>
where
    F: FnMut(&'a Arc<dyn Routing>) -> BoxFuture<'a, RoutingResult<T>>,
{
    let mut errors = Vec::with_capacity(members.len());
    for member in members {
        match call(member).await {
            Ok(value) => return Ok(value),
            Err(err) => errors.push(err),
        }
    }
    Err(fold_reads(errors))
}

/// Merged provider stream over several members.
///
/// All member streams are polled concurrently; records are yielded in arrival
/// order, each peer at most once. Once `count` distinct peers have been
/// yielded, or every member is exhausted, the member streams are dropped,
/// cancelling whatever lookups they still had in flight.
pub struct ProviderFanIn<'a> {
    members: Option<SelectAll<ProviderStream<'a>>>,
    seen: HashSet<PeerId>,
    remaining: usize,
}

impl<'a> ProviderFanIn<'a> {
    /// Start `find_providers(id, count)` on every member.
    ///
    /// With `count == 0` no member is queried.
    pub fn new(members: &'a [Arc<dyn Routing>], id: &'a ContentId, count: usize) -> Self {
        if count == 0 || members.is_empty() {
            return Self::finished();
        }
        let streams = members.iter().map(|member| member.find_providers(id, count));
        Self {
            members: Some(futures::stream::select_all(streams)),
            seen: HashSet::new(),
            remaining: count,
        }
    }

    fn finished() -> Self {
        Self {
            members: None,
            seen: HashSet::new(),
            remaining: 0,
        }
    }
}

impl Stream for ProviderFanIn<'_> {
    type Item = PeerInfo;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<PeerInfo>> {
        let this = self.get_mut();
        loop {
            let next = match this.members.as_mut() {
                Some(members) => members.poll_next_unpin(cx),
                None => return Poll::Ready(None),
            };
            match next {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) => {
                    trace!(seen = this.seen.len(), "all provider lookups exhausted");
                    this.members = None;
                    return Poll::Ready(None);
                }
                Poll::Ready(Some(info)) => {
                    if !this.seen.insert(info.id.clone()) {
                        continue;
                    }
                    this.remaining -= 1;
                    if this.remaining == 0 {
                        trace!(count = this.seen.len(), "provider count reached");
                        this.members = None;
                    }
                    return Poll::Ready(Some(info));
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.members {
            Some(_) => (0, Some(self.remaining)),
            None => (0, Some(0)),
        }
    }
}

impl FusedStream for ProviderFanIn<'_> {
    /// Member lookups are torn down once the stream has finished.
    fn is_terminated(&self) -> bool {
        self.members.is_none()
    }
}
