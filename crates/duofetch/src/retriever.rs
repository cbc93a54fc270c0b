// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The dual-source retrieval orchestrator.

use anyspawn::Spawner;
use duofetch_call::{CallManager, CoalescedCall};
use duofetch_model::{FetchError, Mode, Response, Source, Tag};
use futures::{Stream, channel::mpsc, stream};

use crate::race;

/// Orchestrates retrieval from a local (cached) source and a remote
/// (network) source.
///
/// A retriever owns a [`CallManager`] that coalesces concurrent remote
/// fetches sharing a [`Tag`], and a [`Spawner`] used to run the two legs of
/// the concurrent policy. The payload type is fixed per retriever; use one
/// retriever per logical response type.
///
/// Callers that want a single call exempt from coalescing pass
/// [`Tag::unique()`]; there is no implicit default tag.
///
/// Every asynchronous failure of the supplied fetch function is captured
/// into a [`Response`] failure envelope. The one failure path that is not
/// normalized is a panic inside the fetch function, which propagates to the
/// polling task like any other panic.
#[derive(Debug)]
pub struct Retriever<T> {
    calls: CallManager<T>,
    spawner: Spawner,
}

enum Stage {
    Primary,
    Secondary,
    Done,
}

impl<T> Retriever<T> {
    /// Creates a retriever spawning its concurrent-policy legs on `spawner`.
    #[must_use]
    pub fn new(spawner: Spawner) -> Self {
        Self {
            calls: CallManager::new(),
            spawner,
        }
    }

    /// Returns the coalescing call manager backing the remote policies.
    #[must_use]
    pub fn call_manager(&self) -> &CallManager<T> {
        &self.calls
    }
}

impl<T> Retriever<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Retrieves from the local source only.
    ///
    /// Invokes `fetch` once with [`Mode::ForceLocal`], directly (never
    /// through the coalescer), and resolves to exactly one [`Response::Local`]
    /// envelope: a success carrying the cached value, or a captured failure
    /// (typically a cache miss). Local failures carry no transport status.
    pub async fn retrieve_local<F, Fut>(&self, tag: &Tag, fetch: F) -> Response<T>
    where
        F: FnOnce(Mode) -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        local_envelope(tag, fetch(Mode::ForceLocal)).await
    }

    /// Retrieves from the remote source only.
    ///
    /// Invokes `fetch` with [`Mode::ForceRemote`] through the coalescer
    /// under `tag`: while an execution for `tag` is in flight, this call
    /// attaches to it instead of fetching again, and `fetch` is dropped
    /// unused. Resolves to exactly one [`Response::Remote`] envelope.
    pub async fn retrieve_remote<F, Fut>(&self, tag: &Tag, fetch: F) -> Response<T>
    where
        F: FnOnce(Mode) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        self.remote_call(tag, fetch).await
    }

    /// Retrieves from the local source, falling back to the remote source.
    ///
    /// The stream yields the local envelope first. On local success it ends
    /// there; on local failure the remote envelope follows. Always 1 or 2
    /// envelopes, in that fixed order. The remote leg is coalesced by `tag`
    /// and is not invoked at all when the local leg succeeds.
    pub fn retrieve_local_fallback_remote<F, Fut>(&self, tag: &Tag, fetch: F) -> impl Stream<Item = Response<T>> + '_
    where
        F: Fn(Mode) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        self.fallback(tag, fetch, Source::Local)
    }

    /// Retrieves from the remote source, falling back to the local source.
    ///
    /// Symmetric to [`retrieve_local_fallback_remote`]: the remote envelope
    /// first, then the local envelope only if the remote leg failed.
    ///
    /// [`retrieve_local_fallback_remote`]: Self::retrieve_local_fallback_remote
    pub fn retrieve_remote_fallback_local<F, Fut>(&self, tag: &Tag, fetch: F) -> impl Stream<Item = Response<T>> + '_
    where
        F: Fn(Mode) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        self.fallback(tag, fetch, Source::Remote)
    }

    /// Retrieves from both sources concurrently.
    ///
    /// Both legs start when this method is called: the local leg directly,
    /// the remote leg through the coalescer under `tag`. Their completions
    /// are merged onto one stream in completion order, with one exception:
    /// a remote *success* arriving before the local result has been
    /// delivered suppresses the local result entirely and ends the stream.
    /// A remote failure never suppresses the local result, and the remote
    /// result itself is never suppressed.
    ///
    /// Suppression filters delivery only; the local leg keeps running
    /// detached on the spawner and any side effects it has still happen.
    pub fn retrieve_local_and_remote<F, Fut>(&self, tag: &Tag, fetch: F) -> impl Stream<Item = Response<T>>
    where
        F: Fn(Mode) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded();

        let local_tag = tag.clone();
        let local_fetch = fetch.clone();
        let local_tx = tx.clone();
        // Detached on purpose; suppression filters delivery, it does not
        // cancel work.
        let _ = self.spawner.spawn(async move {
            let response = local_envelope(&local_tag, local_fetch(Mode::ForceLocal)).await;
            let _ = local_tx.unbounded_send(response);
        });

        let remote = self.remote_call(tag, fetch);
        let _ = self.spawner.spawn(async move {
            let _ = tx.unbounded_send(remote.await);
        });

        race::merge(tag.clone(), rx)
    }

    fn remote_call<F, Fut>(&self, tag: &Tag, fetch: F) -> CoalescedCall<T>
    where
        F: FnOnce(Mode) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        self.calls.call(tag, move || fetch(Mode::ForceRemote))
    }

    fn fallback<F, Fut>(&self, tag: &Tag, fetch: F, primary: Source) -> impl Stream<Item = Response<T>> + '_
    where
        F: Fn(Mode) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let secondary = match primary {
            Source::Local => Source::Remote,
            Source::Remote => Source::Local,
        };

        stream::unfold((Stage::Primary, tag.clone(), fetch), move |(stage, tag, fetch)| async move {
            match stage {
                Stage::Primary => {
                    let response = self.leg(primary, &tag, &fetch).await;
                    if response.is_failure() {
                        tracing::debug!(tag = %tag, primary = %primary, "primary source failed, engaging fallback");
                        Some((response, (Stage::Secondary, tag, fetch)))
                    } else {
                        Some((response, (Stage::Done, tag, fetch)))
                    }
                }
                Stage::Secondary => {
                    let response = self.leg(secondary, &tag, &fetch).await;
                    Some((response, (Stage::Done, tag, fetch)))
                }
                Stage::Done => None,
            }
        })
    }

    async fn leg<F, Fut>(&self, source: Source, tag: &Tag, fetch: &F) -> Response<T>
    where
        F: Fn(Mode) -> Fut + Clone + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        match source {
            Source::Local => local_envelope(tag, fetch(Mode::ForceLocal)).await,
            Source::Remote => self.remote_call(tag, fetch.clone()).await,
        }
    }
}

/// Wraps one local fetch into its envelope, capturing any failure.
async fn local_envelope<T, Fut>(tag: &Tag, fetch: Fut) -> Response<T>
where
    Fut: Future<Output = Result<T, FetchError>>,
{
    match fetch.await {
        Ok(value) => Response::local_success(value),
        Err(error) => {
            tracing::debug!(tag = %tag, error = %error, "local fetch failed");
            Response::local_failure(error)
        }
    }
}
