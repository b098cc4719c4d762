//! In-memory [`redfish_vfs_core::FetchClient`] driven by an explicit
//! expectation queue, for black-box testing of the resolver, filesystem
//! API, and stepped operations without a live HTTP endpoint.

pub mod expect;

#[doc(inline)]
pub use expect::Expect;
pub use expect::ExpectedRequest;

use expect::{FetchResponse, PostResponse};
use redfish_vfs_core::error::{Error as CoreError, Result as CoreResult};
use redfish_vfs_core::FetchClient;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

/// What went wrong driving the mock itself (as opposed to a canned
/// response surfaced through `CoreError`).
#[derive(Debug)]
pub enum Error {
    MutexLock,
    NothingExpected,
    UnexpectedFetch { path: String, expected: ExpectedRequest },
    UnexpectedPost { path: String, body: serde_json::Value, expected: ExpectedRequest },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MutexLock => write!(f, "mock transport mutex poisoned"),
            Error::NothingExpected => write!(f, "no expectation queued but a request arrived"),
            Error::UnexpectedFetch { path, expected } => {
                write!(f, "unexpected fetch {path}, expected {expected}")
            }
            Error::UnexpectedPost { path, body, expected } => {
                write!(f, "unexpected post {path} {body}, expected {expected}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// An in-memory transport that replays a queue of expected
/// fetch/post calls, failing loudly on mismatch or exhaustion.
pub struct MockTransport {
    expect: Mutex<VecDeque<Expect>>,
}

impl MockTransport {
    pub fn new(expectations: impl IntoIterator<Item = Expect>) -> Self {
        Self { expect: Mutex::new(expectations.into_iter().collect()) }
    }

    /// Queue another expectation after construction.
    pub fn expect(&self, expectation: Expect) {
        self.expect.lock().expect("mock transport mutex poisoned").push_back(expectation);
    }

    /// Whether every queued expectation has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.expect.lock().expect("mock transport mutex poisoned").is_empty()
    }
}

/// Mock-harness failures (mismatched request, exhausted queue) surface
/// through the same `CoreError` surface consumers already handle, tagged
/// with a 500 status and the descriptive mock `Error` as the body text.
fn mock_error(err: Error) -> CoreError {
    CoreError::Http { status: 500, body: err.to_string() }
}

impl FetchClient for MockTransport {
    fn fetch(&self, path: &str) -> CoreResult<Vec<u8>> {
        let mut queue = self.expect.lock().map_err(|_| mock_error(Error::MutexLock))?;
        let next = queue.pop_front().ok_or_else(|| mock_error(Error::NothingExpected))?;
        match &next.request {
            ExpectedRequest::Fetch { path: expected_path } if expected_path == path => {
                match next.fetch_response.expect("fetch expectation missing a fetch_response") {
                    FetchResponse::Ok(bytes) => Ok(bytes),
                    FetchResponse::NotFound => Err(CoreError::NotFound(path.to_string())),
                    FetchResponse::Http { status, body } => Err(CoreError::Http { status, body }),
                }
            }
            _ => Err(mock_error(Error::UnexpectedFetch { path: path.to_string(), expected: next.request })),
        }
    }

    fn post(&self, path: &str, body: serde_json::Value) -> CoreResult<(Vec<u8>, u16)> {
        let mut queue = self.expect.lock().map_err(|_| mock_error(Error::MutexLock))?;
        let next = queue.pop_front().ok_or_else(|| mock_error(Error::NothingExpected))?;
        match &next.request {
            ExpectedRequest::Post { path: expected_path, body: expected_body }
                if expected_path == path && expected_body == &body =>
            {
                let PostResponse { body, status } =
                    next.post_response.expect("post expectation missing a post_response");
                Ok((body, status))
            }
            _ => Err(mock_error(Error::UnexpectedPost { path: path.to_string(), body, expected: next.request })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use redfish_vfs_core::Fs;

    #[test]
    fn replays_queued_fetch_in_order() {
        let transport = MockTransport::new([Expect::fetch(
            "/redfish/v1",
            br#"{"@odata.id":"/redfish/v1"}"#.to_vec(),
        )]);
        let fs = Fs::new(transport);
        let resource = fs.get("/redfish/v1").unwrap();
        assert_eq!(resource.path, "/redfish/v1");
    }

    #[test]
    fn mismatched_request_surfaces_as_error() {
        let transport = MockTransport::new([Expect::fetch("/redfish/v1", b"{}".to_vec())]);
        let fs = Fs::new(transport);
        assert!(fs.get("/redfish/v1/Systems").is_err());
    }

    #[test]
    fn exhausted_queue_errors_on_next_request() {
        let transport = MockTransport::new(std::iter::empty());
        let fs = Fs::new(transport);
        assert!(fs.get("/redfish/v1").is_err());
    }

    #[test]
    fn post_matches_path_and_body() {
        let transport = MockTransport::new([Expect::post(
            "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset",
            serde_json::json!({"ResetType": "On"}),
            b"{}".to_vec(),
            204,
        )]);
        let fs = Fs::new(transport);
        let (_, status) = fs
            .post("/redfish/v1/Systems/1/Actions/ComputerSystem.Reset", serde_json::json!({"ResetType": "On"}))
            .unwrap();
        assert_eq!(status, 204);
    }
}
