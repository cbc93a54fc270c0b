// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Dual-source retrieval policies over a local cache and a remote source.
//!
//! This crate sits between an application and two asynchronous data sources,
//! a local (cached) one and a remote (network) one, and provides two
//! guarantees:
//!
//! - concurrent requests that share a [`Tag`] are coalesced into a single
//!   underlying remote operation, and
//! - five retrieval policies compose the two sources with well-defined
//!   ordering, fallback, and race-suppression semantics.
//!
//! The caller supplies a *fetch source*: an async function taking a [`Mode`]
//! and producing a value or a [`FetchError`]. The source decides how to honor
//! [`Mode::ForceLocal`] (cache only) and [`Mode::ForceRemote`] (bypass the
//! cache); the [`Retriever`] only composes the two calls and wraps every
//! result in a [`Response`] envelope. No policy ever surfaces a raw error.
//!
//! # Policies
//!
//! | Policy | Envelopes |
//! |---|---|
//! | [`Retriever::retrieve_local`] | exactly one, local |
//! | [`Retriever::retrieve_remote`] | exactly one, remote, coalesced by tag |
//! | [`Retriever::retrieve_local_fallback_remote`] | local; then remote only if local failed |
//! | [`Retriever::retrieve_remote_fallback_local`] | remote; then local only if remote failed |
//! | [`Retriever::retrieve_local_and_remote`] | both concurrently; a remote success that wins the race suppresses the local result |
//!
//! # Example
//!
//! ```
//! use anyspawn::Spawner;
//! use duofetch::{FetchError, Mode, Retriever, Tag};
//! use futures::StreamExt;
//!
//! # async fn example() {
//! let retriever: Retriever<String> = Retriever::new(Spawner::new_tokio());
//! let tag = Tag::new("user:123");
//!
//! let fetch = |mode: Mode| async move {
//!     match mode {
//!         Mode::ForceLocal => Err(FetchError::from_message("not cached")),
//!         Mode::ForceRemote => Ok("fresh".to_string()),
//!     }
//! };
//!
//! // Local misses, so the stream yields the local failure and then the
//! // remote success, in that order.
//! let responses: Vec<_> = retriever.retrieve_local_fallback_remote(&tag, fetch).collect().await;
//! assert_eq!(responses.len(), 2);
//! assert!(responses[0].is_failure());
//! assert_eq!(responses[1].value(), Some(&"fresh".to_string()));
//! # }
//! ```

mod race;
pub mod retriever;

#[doc(inline)]
pub use duofetch_call::{CallManager, CoalescedCall};
#[doc(inline)]
pub use duofetch_model::{FetchError, Mode, Outcome, Response, Source, Tag};
#[doc(inline)]
pub use retriever::Retriever;

#[cfg(any(feature = "test-util", test))]
#[doc(inline)]
pub use duofetch_model::testing::StubFetch;
