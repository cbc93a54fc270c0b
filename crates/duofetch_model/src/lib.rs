// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Vocabulary types for coalesced dual-source retrieval.
//!
//! This crate defines the data model shared by the `duofetch` family: the
//! [`Response`] envelope that tags every fetch result with its [`Source`] and
//! [`Outcome`], the [`FetchError`] type crossing the fetch boundary, the
//! [`Mode`] tokens instructing an external source whether to answer from its
//! cache or fetch fresh, and the [`Tag`] identity used to coalesce duplicate
//! in-flight calls.
//!
//! # The fetch contract
//!
//! A fetch source is any async function of the shape
//! `Fn(Mode) -> Future<Output = Result<T, FetchError>>`. The source must
//! honor the two modes deterministically:
//!
//! - [`Mode::ForceLocal`]: answer only from the local cache, failing when the
//!   value is absent.
//! - [`Mode::ForceRemote`]: bypass the cache and fetch fresh, optionally
//!   repopulating the cache as a side effect.
//!
//! Sources backed by an HTTP cache are additionally expected to keep failed
//! remote responses out of that cache (for example with a response
//! interceptor), so a later `ForceLocal` call never replays a stale error.
//! That policy belongs to the transport; nothing in this family enforces it.
//!
//! # Example
//!
//! ```
//! use duofetch_model::{FetchError, Response};
//!
//! let ok: Response<String> = Response::remote_success("fresh".to_string());
//! assert!(ok.is_success());
//! assert_eq!(ok.value(), Some(&"fresh".to_string()));
//!
//! let err: Response<String> = Response::remote_failure(FetchError::with_status(503, "unavailable"));
//! assert_eq!(err.status(), Some(503));
//! ```

mod error;
mod mode;
mod response;
mod tag;

#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use error::FetchError;
#[doc(inline)]
pub use mode::Mode;
#[doc(inline)]
pub use response::{Outcome, Response, Source};
#[doc(inline)]
pub use tag::Tag;
