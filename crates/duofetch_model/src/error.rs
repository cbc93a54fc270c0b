// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error type for the fetch boundary.

/// An error produced by an external fetch source.
///
/// This is an opaque error that can wrap any underlying failure from a fetch
/// source. Remote failures that originate from a transport-level status code
/// carry that code; local failures and non-transport remote failures do not.
/// Use [`std::error::Error::source()`] to access the underlying cause.
///
/// # Example
///
/// ```
/// use duofetch_model::FetchError;
///
/// let miss = FetchError::from_message("not found in cache");
/// assert_eq!(miss.status(), None);
///
/// let http = FetchError::with_status(404, "resource does not exist");
/// assert_eq!(http.status(), Some(404));
/// ```
#[ohno::error]
pub struct FetchError {
    status: Option<u16>,
}

impl FetchError {
    /// Creates an error from any type that can be converted to an error,
    /// without a transport status code.
    pub fn from_message(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(None, cause)
    }

    /// Creates an error carrying the transport status code that produced it.
    pub fn with_status(status: u16, cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(Some(status), cause)
    }

    /// Returns the transport status code, when the failure natively carried one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}
