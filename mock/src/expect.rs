//! Expectations for the fetch-client mock.

use std::fmt;

/// One request the mock transport expects to see next, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedRequest {
    Fetch { path: String },
    Post { path: String, body: serde_json::Value },
}

impl fmt::Display for ExpectedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedRequest::Fetch { path } => write!(f, "fetch {path}"),
            ExpectedRequest::Post { path, body } => write!(f, "post {path} {body}"),
        }
    }
}

/// A canned response for one expected fetch.
#[derive(Debug, Clone)]
pub enum FetchResponse {
    Ok(Vec<u8>),
    NotFound,
    Http { status: u16, body: String },
}

/// A canned response for one expected post: raw bytes plus status code.
#[derive(Debug, Clone)]
pub struct PostResponse {
    pub body: Vec<u8>,
    pub status: u16,
}

/// A single queued expectation: the request that must arrive next, and
/// the canned response to hand back when it does.
#[derive(Debug, Clone)]
pub struct Expect {
    pub request: ExpectedRequest,
    pub fetch_response: Option<FetchResponse>,
    pub post_response: Option<PostResponse>,
}

impl Expect {
    /// Expect a `fetch(path)` call, responding with `bytes`.
    pub fn fetch(path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            request: ExpectedRequest::Fetch { path: path.into() },
            fetch_response: Some(FetchResponse::Ok(bytes.into())),
            post_response: None,
        }
    }

    /// Expect a `fetch(path)` call that should fail with a 404.
    pub fn fetch_not_found(path: impl Into<String>) -> Self {
        Self {
            request: ExpectedRequest::Fetch { path: path.into() },
            fetch_response: Some(FetchResponse::NotFound),
            post_response: None,
        }
    }

    /// Expect a `fetch(path)` call that should fail with a non-2xx status.
    pub fn fetch_http_error(path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            request: ExpectedRequest::Fetch { path: path.into() },
            fetch_response: Some(FetchResponse::Http { status, body: body.into() }),
            post_response: None,
        }
    }

    /// Expect a `post(path, body)` call, responding with `response_body`
    /// and `status`.
    pub fn post(
        path: impl Into<String>,
        body: serde_json::Value,
        response_body: impl Into<Vec<u8>>,
        status: u16,
    ) -> Self {
        Self {
            request: ExpectedRequest::Post { path: path.into(), body },
            fetch_response: None,
            post_response: Some(PostResponse { body: response_body.into(), status }),
        }
    }
}
