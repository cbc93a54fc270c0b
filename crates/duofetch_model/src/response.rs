// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The response envelope.

use std::sync::Arc;

use ohno::ErrorExt;

use crate::FetchError;

/// The side of the dual-source split a response came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    /// The local (cached) source.
    Local,
    /// The remote (network) source.
    Remote,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// The outcome of one fetch: a payload or a captured failure.
///
/// Failures hold their [`FetchError`] behind an `Arc` so one failed execution
/// can be replayed cheaply to every caller coalesced onto it.
#[derive(Clone, Debug)]
pub enum Outcome<T> {
    /// The fetch produced a value.
    Success(T),
    /// The fetch failed; the error is captured, never propagated raw.
    Failure(Arc<FetchError>),
}

impl<T> Outcome<T> {
    /// Returns `true` for [`Outcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the payload of a successful outcome.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Returns the captured error of a failed outcome.
    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }
}

/// Failures compare by transport status and main message (backtraces and
/// enrichment excluded), which keeps envelopes comparable by value in
/// assertions.
impl<T: PartialEq> PartialEq for Outcome<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Success(a), Self::Success(b)) => a == b,
            (Self::Failure(a), Self::Failure(b)) => {
                Arc::ptr_eq(a, b) || (a.status() == b.status() && a.message() == b.message())
            }
            _ => false,
        }
    }
}

/// An immutable fetch result tagged with its source and outcome.
///
/// Every retrieval policy delivers its results as a sequence of envelopes;
/// no raw error ever crosses the policy boundary. An envelope is a plain
/// value: construct it, pass it around, take the payload out. Local failures
/// never carry a transport status code.
///
/// # Example
///
/// ```
/// use duofetch_model::{FetchError, Response, Source};
///
/// let cached = Response::local_success(7);
/// assert_eq!(cached.source(), Source::Local);
/// assert_eq!(cached.into_value(), Some(7));
///
/// let failed: Response<i32> = Response::remote_failure(FetchError::with_status(502, "bad gateway"));
/// assert!(failed.is_failure());
/// assert_eq!(failed.status(), Some(502));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Response<T> {
    /// A result from the local (cached) source.
    Local(Outcome<T>),
    /// A result from the remote (network) source.
    Remote(Outcome<T>),
}

impl<T> Response<T> {
    /// Creates a successful local envelope.
    pub fn local_success(value: T) -> Self {
        Self::Local(Outcome::Success(value))
    }

    /// Creates a failed local envelope.
    pub fn local_failure(error: impl Into<Arc<FetchError>>) -> Self {
        Self::Local(Outcome::Failure(error.into()))
    }

    /// Creates a successful remote envelope.
    pub fn remote_success(value: T) -> Self {
        Self::Remote(Outcome::Success(value))
    }

    /// Creates a failed remote envelope.
    pub fn remote_failure(error: impl Into<Arc<FetchError>>) -> Self {
        Self::Remote(Outcome::Failure(error.into()))
    }

    /// Returns which source produced this envelope.
    #[must_use]
    pub fn source(&self) -> Source {
        match self {
            Self::Local(_) => Source::Local,
            Self::Remote(_) => Source::Remote,
        }
    }

    /// Returns the outcome carried by this envelope.
    #[must_use]
    pub fn outcome(&self) -> &Outcome<T> {
        match self {
            Self::Local(outcome) | Self::Remote(outcome) => outcome,
        }
    }

    /// Returns `true` when the envelope carries a payload.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome().is_success()
    }

    /// Returns `true` when the envelope carries a captured failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Returns the payload of a successful envelope.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.outcome().value()
    }

    /// Consumes the envelope, returning the payload of a successful one.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Local(Outcome::Success(value)) | Self::Remote(Outcome::Success(value)) => Some(value),
            Self::Local(Outcome::Failure(_)) | Self::Remote(Outcome::Failure(_)) => None,
        }
    }

    /// Returns the captured error of a failed envelope.
    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        self.outcome().error()
    }

    /// Returns the transport status code of a failed envelope, when present.
    ///
    /// Only remote failures originating from a transport-level status carry
    /// one; local failures always return `None`.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.error().and_then(FetchError::status)
    }
}
