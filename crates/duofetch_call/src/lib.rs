// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Coalesces duplicate in-flight remote fetches into a single execution.
//!
//! This crate provides [`CallManager`], a keyed registry of in-flight remote
//! operations. When multiple callers request the same work (identified by a
//! [`Tag`]) while an execution is active, only one execution runs; every
//! caller receives a clone of the same [`Response`] envelope.
//!
//! # Generations
//!
//! Each tag lives through *generations*: a generation starts the first time
//! a tag is requested while no execution is registered for it, and ends when
//! the execution reaches its terminal value. The registry entry is retired
//! at that terminal event, so the next call with the same tag starts a fresh
//! execution. There is no retry inside the manager; a failed generation is
//! simply retired, and the next call is the retry vehicle.
//!
//! # Failure capture
//!
//! The manager never propagates a raw error. A failed operation is converted
//! into a [`Response::Remote`] failure envelope carrying the [`FetchError`]
//! (including its transport status code when present), and that envelope is
//! what every attached caller observes.
//!
//! # Example
//!
//! ```
//! use duofetch_call::CallManager;
//! use duofetch_model::{FetchError, Tag};
//!
//! # async fn example() {
//! let manager: CallManager<String> = CallManager::new();
//! let tag = Tag::new("user:123");
//!
//! // Concurrent calls with the same tag share a single execution.
//! let response = manager
//!     .call(&tag, || async { Ok::<_, FetchError>("expensive".to_string()) })
//!     .await;
//! assert_eq!(response.value(), Some(&"expensive".to_string()));
//! # }
//! ```
//!
//! # Cancellation
//!
//! Dropping some of the coalesced callers leaves the remaining callers
//! driving the same shared execution. Dropping *all* of them abandons the
//! generation; the next call with that tag starts a fresh execution. There
//! is no explicit cancellation API.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use duofetch_model::{FetchError, Response, Tag};
use futures_util::{
    FutureExt,
    future::{BoxFuture, Shared, WeakShared},
};
use parking_lot::Mutex;

/// Handle to the shared result of one coalesced generation.
///
/// Cloning the handle attaches another caller to the same execution; the
/// terminal envelope is computed once and replayed identically to every
/// clone, including clones awaited after completion.
pub type CoalescedCall<T> = Shared<BoxFuture<'static, Response<T>>>;

type Registry<T> = Arc<Mutex<HashMap<Tag, Entry<T>>>>;

/// One registered generation. The handle is weak so that a generation
/// abandoned by all of its callers does not pin the registry entry alive.
struct Entry<T> {
    generation: u64,
    handle: WeakShared<BoxFuture<'static, Response<T>>>,
}

/// Keyed registry of in-flight remote operations.
///
/// Guarantees at most one active execution per [`Tag`] at any time, shares
/// the eventual [`Response`] with every caller that supplies the same tag
/// while the execution is active, and retires the entry at the terminal
/// event so the next call re-executes.
///
/// The payload type is fixed per manager, so one tag can never be bound to
/// two different result types. Callers are still expected to keep a tag
/// paired with a single logical operation: a second caller reusing an
/// in-flight tag joins the existing execution and its own operation closure
/// is dropped unused.
pub struct CallManager<T> {
    entries: Registry<T>,
    next_generation: AtomicU64,
}

impl<T> std::fmt::Debug for CallManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallManager").field("in_flight", &self.entries.lock().len()).finish()
    }
}

impl<T> Default for CallManager<T> {
    fn default() -> Self {
        Self {
            entries: Arc::default(),
            next_generation: AtomicU64::new(0),
        }
    }
}

impl<T> CallManager<T> {
    /// Creates an empty manager.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of registered generations.
    ///
    /// Completed generations retire themselves, so this reflects calls that
    /// are still in flight (plus any abandoned by all of their callers and
    /// not yet replaced).
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.entries.lock().len()
    }
}

impl<T> CallManager<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Executes `operation` under `tag`, coalescing concurrent duplicates.
    ///
    /// If no execution is registered for `tag`, a new generation starts and
    /// `operation` is invoked (lazily, when the returned handle is first
    /// polled) exactly once for that generation. If an execution is already
    /// registered, `operation` is dropped unused and the returned handle
    /// attaches to the existing execution.
    ///
    /// The result is always a [`Response::Remote`] envelope: a success
    /// carrying the operation's value, or a captured failure carrying the
    /// [`FetchError`]. The generation is retired from the registry before
    /// the terminal envelope is delivered, so a subsequent call with the
    /// same tag is guaranteed to re-execute.
    pub fn call<F, Fut>(&self, tag: &Tag, operation: F) -> CoalescedCall<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let mut entries = self.entries.lock();

        if let Some(entry) = entries.get(tag) {
            if let Some(call) = entry.handle.upgrade() {
                tracing::trace!(tag = %tag, "joining in-flight call");
                return call;
            }
            // Every caller of the previous generation dropped before it
            // completed; fall through and replace it with a fresh one.
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(&self.entries);
        let key = tag.clone();
        tracing::debug!(tag = %tag, generation, "starting call generation");

        let call: CoalescedCall<T> = async move {
            let response = match operation().await {
                Ok(value) => Response::remote_success(value),
                Err(error) => {
                    tracing::debug!(tag = %key, error = %error, "capturing fetch error into failure envelope");
                    Response::remote_failure(error)
                }
            };

            // Retire this generation before the terminal value is delivered,
            // so the next call with the same tag re-executes. The generation
            // check keeps a slow completion from evicting a successor that
            // replaced an abandoned entry.
            let mut entries = registry.lock();
            if entries.get(&key).is_some_and(|entry| entry.generation == generation) {
                entries.remove(&key);
            }
            drop(entries);

            response
        }
        .boxed()
        .shared();

        if let Some(handle) = call.downgrade() {
            entries.insert(tag.clone(), Entry { generation, handle });
        }
        call
    }
}
