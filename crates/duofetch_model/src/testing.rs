// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Scripted fetch source for testing.
//!
//! This module provides [`StubFetch`], a configurable fetch source that
//! answers each [`Mode`] with a scripted reply and records every invocation
//! for later verification.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{FetchError, Mode};

#[derive(Clone, Debug)]
enum Reply<T> {
    Value(T),
    Error { status: Option<u16>, message: String },
}

/// A configurable scripted fetch source for testing.
///
/// Script one reply per mode, hand [`StubFetch::fetcher`] to the code under
/// test, then assert on the recorded [`calls`](StubFetch::calls). Modes
/// without a scripted reply fail, which makes unexpected invocations visible.
///
/// # Examples
///
/// ```
/// use duofetch_model::{Mode, testing::StubFetch};
///
/// # async fn example() {
/// let stub = StubFetch::new();
/// stub.succeed(Mode::ForceLocal, 42);
/// stub.fail_with_status(Mode::ForceRemote, 500, "server error");
///
/// assert_eq!(stub.fetch(Mode::ForceLocal).await.unwrap(), 42);
/// assert!(stub.fetch(Mode::ForceRemote).await.is_err());
/// assert_eq!(stub.calls(), vec![Mode::ForceLocal, Mode::ForceRemote]);
/// # }
/// ```
pub struct StubFetch<T> {
    replies: Arc<Mutex<HashMap<Mode, Reply<T>>>>,
    calls: Arc<Mutex<Vec<Mode>>>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for StubFetch<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubFetch")
            .field("replies", &self.replies)
            .field("calls", &self.calls)
            .finish()
    }
}

impl<T> Clone for StubFetch<T> {
    fn clone(&self) -> Self {
        Self {
            replies: Arc::clone(&self.replies),
            calls: Arc::clone(&self.calls),
        }
    }
}

impl<T> Default for StubFetch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StubFetch<T> {
    /// Creates a stub with no scripted replies; every fetch fails until a
    /// reply is scripted.
    #[must_use]
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Scripts `mode` to fail without a transport status.
    pub fn fail(&self, mode: Mode, message: impl Into<String>) {
        self.replies.lock().insert(
            mode,
            Reply::Error {
                status: None,
                message: message.into(),
            },
        );
    }

    /// Scripts `mode` to fail with a transport status code.
    pub fn fail_with_status(&self, mode: Mode, status: u16, message: impl Into<String>) {
        self.replies.lock().insert(
            mode,
            Reply::Error {
                status: Some(status),
                message: message.into(),
            },
        );
    }

    /// Returns every mode fetched so far, in invocation order.
    #[must_use]
    pub fn calls(&self) -> Vec<Mode> {
        self.calls.lock().clone()
    }

    /// Returns how many times `mode` was fetched.
    #[must_use]
    pub fn call_count(&self, mode: Mode) -> usize {
        self.calls.lock().iter().filter(|m| **m == mode).count()
    }
}

impl<T: Clone> StubFetch<T> {
    /// Scripts `mode` to succeed with `value`. The value is cloned into
    /// every reply.
    pub fn succeed(&self, mode: Mode, value: T) {
        self.replies.lock().insert(mode, Reply::Value(value));
    }

    /// Performs one scripted fetch, recording the invocation.
    pub fn fetch(&self, mode: Mode) -> std::future::Ready<Result<T, FetchError>> {
        self.calls.lock().push(mode);
        let result = match self.replies.lock().get(&mode) {
            Some(Reply::Value(value)) => Ok(value.clone()),
            Some(Reply::Error {
                status: Some(status),
                message,
            }) => Err(FetchError::with_status(*status, message.clone())),
            Some(Reply::Error { status: None, message }) => Err(FetchError::from_message(message.clone())),
            None => Err(FetchError::from_message(format!("no reply scripted for {mode}"))),
        };
        std::future::ready(result)
    }
}

impl<T: Clone + Send + Sync + 'static> StubFetch<T> {
    /// Returns a cloneable fetch closure backed by this stub, suitable for
    /// handing to retrieval policies.
    pub fn fetcher(&self) -> impl Fn(Mode) -> std::future::Ready<Result<T, FetchError>> + Clone + Send + Sync + 'static {
        let stub = self.clone();
        move |mode| stub.fetch(mode)
    }
}
