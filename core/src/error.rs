//! Crate-wide error taxonomy.
//!
//! One enum covers every failure mode raised by the parser, resolver, cache,
//! and fetch client. Errors are never recovered internally except for the
//! fetch client's single transparent re-authentication retry; everything
//! else propagates unchanged to the caller.

use std::fmt;
use std::io;

/// Unified error type returned by every fallible operation in this crate.
#[derive(Debug)]
pub enum Error {
    /// The resolver could not find a name, or the remote responded 404.
    NotFound(String),
    /// A cache miss occurred while the cache is in offline mode.
    NotCached(String),
    /// A transport-level failure: connect, read, or TLS.
    Network(reqwest::Error),
    /// A non-2xx HTTP response survived the single re-auth retry.
    Http { status: u16, body: String },
    /// The response body was not valid JSON, or failed to parse structurally.
    Parse(serde_json::Error),
    /// A path failed the path grammar, or an absolute path left the root prefix.
    InvalidPath(String),
    /// An array index was at or beyond the array's length.
    IndexOutOfRange { index: usize, len: usize },
    /// A mid-path segment targeted a Simple value or an unindexed Array.
    NavigateIntoScalar(String),
    /// Cache persistence I/O failure (`save`/`load`).
    Io(io::Error),
    /// An `RwLock` guarding shared cache or transport state was poisoned by
    /// a prior panic while a writer held it.
    Lock(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound(what) => write!(f, "not found: {what}"),
            Error::NotCached(path) => write!(f, "not cached (offline): {path}"),
            Error::Network(err) => write!(f, "network error: {err}"),
            Error::Http { status, body } => write!(f, "http error {status}: {body}"),
            Error::Parse(err) => write!(f, "parse error: {err}"),
            Error::InvalidPath(path) => write!(f, "invalid path: {path}"),
            Error::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range (length {len})")
            }
            Error::NavigateIntoScalar(path) => {
                write!(f, "cannot navigate into non-object at: {path}")
            }
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::Lock(reason) => write!(f, "lock poisoned: {reason}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Network(err) => Some(err),
            Error::Parse(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_index_out_of_range() {
        let err = Error::IndexOutOfRange { index: 3, len: 2 };
        assert_eq!(err.to_string(), "index 3 out of range (length 2)");
    }

    #[test]
    fn displays_http_with_status_and_body() {
        let err = Error::Http { status: 404, body: "nope".into() };
        assert_eq!(err.to_string(), "http error 404: nope");
    }

    #[test]
    fn displays_lock_poisoned() {
        let err = Error::Lock("a writer panicked".to_string());
        assert_eq!(err.to_string(), "lock poisoned: a writer panicked");
    }
}
