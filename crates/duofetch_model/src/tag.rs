// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Coalescing identities.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

static NEXT_UNIQUE: AtomicU64 = AtomicU64::new(0);

/// Identity under which concurrent remote calls are coalesced.
///
/// Calls issued with the same tag while one is in flight share a single
/// execution and observe the same result. Tags are cheap to clone and
/// compare; pick one tag per logical remote operation and reuse it across
/// the calls that should be deduplicated.
///
/// # Example
///
/// ```
/// use duofetch_model::Tag;
///
/// let a = Tag::new("user:123");
/// let b = Tag::new("user:123");
/// assert_eq!(a, b);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tag(Arc<str>);

impl Tag {
    /// Creates a tag from a non-empty string.
    ///
    /// # Panics
    ///
    /// Panics if `value` is empty.
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        assert!(!value.is_empty(), "tag must be non-empty");
        Self(value.into())
    }

    /// Creates a fresh process-unique tag.
    ///
    /// Since no other call can share the returned identity, this is the
    /// explicit way to opt out of coalescing for a single call. Unique tags
    /// use the reserved `uncoalesced-` prefix; avoid that prefix for regular
    /// tags.
    ///
    /// # Example
    ///
    /// ```
    /// use duofetch_model::Tag;
    ///
    /// assert_ne!(Tag::unique(), Tag::unique());
    /// ```
    #[must_use]
    pub fn unique() -> Self {
        let n = NEXT_UNIQUE.fetch_add(1, Ordering::Relaxed);
        Self(format!("uncoalesced-{n}").into())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
