// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mode tokens for instructing an external fetch source.

/// Instruction passed to a fetch source selecting where it may answer from.
///
/// The retrieval core treats modes as opaque: it only ever passes one of the
/// two constants through to the caller-supplied fetch function and relies on
/// the source honoring them deterministically.
///
/// # Example
///
/// ```
/// use duofetch_model::Mode;
///
/// assert_ne!(Mode::ForceLocal, Mode::ForceRemote);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Answer only from the local cache, failing when the value is absent.
    ForceLocal,
    /// Bypass any cache and fetch fresh. The source may still repopulate its
    /// cache as a side effect, making the value available to later
    /// [`ForceLocal`](Self::ForceLocal) calls.
    ForceRemote,
}

impl Mode {
    /// Returns the `Cache-Control` request header value implementing this
    /// mode over an HTTP cache.
    ///
    /// Provided for transports that realize the two modes via standard HTTP
    /// cache semantics; sources with their own storage are free to interpret
    /// the mode however they like.
    ///
    /// # Example
    ///
    /// ```
    /// use duofetch_model::Mode;
    ///
    /// assert_eq!(Mode::ForceRemote.cache_control(), "no-cache");
    /// ```
    #[must_use]
    pub fn cache_control(self) -> &'static str {
        match self {
            // max-stale is i32::MAX seconds, i.e. accept arbitrarily old entries.
            Self::ForceLocal => "only-if-cached, max-stale=2147483647",
            Self::ForceRemote => "no-cache",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ForceLocal => write!(f, "force-local"),
            Self::ForceRemote => write!(f, "force-remote"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_control_values() {
        assert_eq!(Mode::ForceLocal.cache_control(), "only-if-cached, max-stale=2147483647");
        assert_eq!(Mode::ForceRemote.cache_control(), "no-cache");
    }

    #[test]
    fn display_names() {
        assert_eq!(Mode::ForceLocal.to_string(), "force-local");
        assert_eq!(Mode::ForceRemote.to_string(), "force-remote");
    }
}
