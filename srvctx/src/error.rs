//! Error types for server context queries.

use std::io;

use crate::endpoint::Endpoint;

/// Alias for `Result<T, srvctx::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by server context queries.
///
/// A response that is not valid JSON is never an error: it is returned as a
/// plain string value.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The serial endpoint could not be opened or configured.
    #[error("cannot open {endpoint}: {source}")]
    Connection {
        /// The endpoint that was being opened.
        endpoint: Endpoint,
        /// The underlying OS error.
        source: io::Error,
    },

    /// Writing the request or reading the response failed.
    #[error("{op}: {source}")]
    Io {
        /// The exchange step that failed.
        op: &'static str,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The requested key does not exist in the context.
    ///
    /// Only [`MemoryContext`](crate::MemoryContext) returns this. Over the
    /// serial port the host's answer for an unknown key is passed through
    /// like any other response.
    #[error("no such key in the context: {0:?}")]
    NoSuchKey(String),
}

impl Error {
    /// Returns `true` if the endpoint could not be opened at all.
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}
