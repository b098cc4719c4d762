//! Fetch client: authenticated HTTP GET/POST against the remote endpoint.
//!
//! Session-based authentication: login POSTs credentials to
//! `${endpoint}/redfish/v1/SessionService/Sessions`, extracts the session
//! token from the `X-Auth-Token` response header, and replays it on every
//! subsequent request. A single transparent re-login-and-retry happens on a
//! 401 response; persistent 401 surfaces as `Error::Http`.
//!
//! Built on `reqwest::blocking`, matching §5's "each filesystem call is a
//! blocking call" scheduling model: no request here ever yields to an
//! async runtime.

use crate::error::{Error, Result};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Serialize;
use std::sync::RwLock;

/// Anything that can fetch and post raw bytes for a canonical path.
/// Implemented by `ReqwestFetchClient` in production and by
/// `redfish-vfs-mock`'s expectation-queue transport in tests.
pub trait FetchClient {
    /// GET the document at `path`, returning its raw body bytes.
    fn fetch(&self, path: &str) -> Result<Vec<u8>>;

    /// POST a JSON body to `path`; returns the raw response body and status
    /// code even for non-2xx responses.
    fn post(&self, path: &str, body: serde_json::Value) -> Result<(Vec<u8>, u16)>;
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    #[serde(rename = "UserName")]
    user_name: &'a str,
    #[serde(rename = "Password")]
    password: &'a str,
}

/// Builder for `ReqwestFetchClient`, mirroring the shape of a production
/// HTTP client's params builder: endpoint, credentials, and optional
/// per-request tuning that a consumer may want without this crate parsing
/// any configuration format itself.
pub struct ClientParams {
    endpoint: String,
    user: String,
    password: String,
    insecure: bool,
    timeout: Option<std::time::Duration>,
}

impl ClientParams {
    pub fn new(endpoint: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self { endpoint: endpoint.into(), user: user.into(), password: password.into(), insecure: false, timeout: None }
    }

    #[must_use]
    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<ReqwestFetchClient> {
        ReqwestFetchClient::new(self.endpoint, self.user, self.password, self.insecure, self.timeout)
    }
}

/// Production fetch client: `reqwest::blocking` plus Redfish session auth.
pub struct ReqwestFetchClient {
    endpoint: String,
    user: String,
    password: String,
    http: Client,
    token: RwLock<String>,
}

const SESSION_PATH: &str = "/redfish/v1/SessionService/Sessions";

impl ReqwestFetchClient {
    /// Log in and construct a client holding the resulting session token.
    pub fn new(
        endpoint: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        insecure: bool,
        timeout: Option<std::time::Duration>,
    ) -> Result<Self> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let user = user.into();
        let password = password.into();

        let mut builder = Client::builder().danger_accept_invalid_certs(insecure);
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder.build()?;

        let this = Self { endpoint, user, password, http, token: RwLock::new(String::new()) };
        let token = this.login()?;
        *this.token.write().map_err(|e| Error::Lock(e.to_string()))? = token;
        Ok(this)
    }

    /// POST credentials, extract the `X-Auth-Token` header. A missing
    /// token header alongside a `Location` header is treated as a
    /// header-less session: the sentinel empty token forces re-login on
    /// the next request that needs auth.
    fn login(&self) -> Result<String> {
        let url = format!("{}{SESSION_PATH}", self.endpoint);
        let body = LoginRequest { user_name: &self.user, password: &self.password };
        let resp = self.http.post(&url).json(&body).send()?;
        let status = resp.status();
        if status != StatusCode::OK && status != StatusCode::CREATED {
            let body = resp.text().unwrap_or_default();
            return Err(Error::Http { status: status.as_u16(), body });
        }
        let token = resp
            .headers()
            .get("X-Auth-Token")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
            .unwrap_or_default();
        Ok(token)
    }

    fn auth_token(&self) -> Result<String> {
        Ok(self.token.read().map_err(|e| Error::Lock(e.to_string()))?.clone())
    }

    fn relogin(&self) -> Result<()> {
        let token = self.login()?;
        *self.token.write().map_err(|e| Error::Lock(e.to_string()))? = token;
        Ok(())
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }

    fn send_get(&self, path: &str) -> Result<Response> {
        let token = self.auth_token()?;
        let mut req = self.http.get(self.url_for(path)).header("Accept", "application/json");
        if !token.is_empty() {
            req = req.header("X-Auth-Token", token);
        }
        Ok(req.send()?)
    }

    fn send_post(&self, path: &str, body: &serde_json::Value) -> Result<Response> {
        let token = self.auth_token()?;
        let mut req = self.http.post(self.url_for(path)).header("Accept", "application/json").json(body);
        if !token.is_empty() {
            req = req.header("X-Auth-Token", token);
        }
        Ok(req.send()?)
    }
}

impl FetchClient for ReqwestFetchClient {
    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        let mut resp = self.send_get(path)?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            log::warn!("401 fetching {path}, re-authenticating once");
            self.relogin()?;
            resp = self.send_get(path)?;
        }
        let status = resp.status();
        let bytes = resp.bytes()?.to_vec();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(Error::Http { status: status.as_u16(), body: String::from_utf8_lossy(&bytes).into_owned() });
        }
        Ok(bytes)
    }

    fn post(&self, path: &str, body: serde_json::Value) -> Result<(Vec<u8>, u16)> {
        let mut resp = self.send_post(path, &body)?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            log::warn!("401 posting {path}, re-authenticating once");
            self.relogin()?;
            resp = self.send_post(path, &body)?;
        }
        let status = resp.status().as_u16();
        let bytes = resp.bytes()?.to_vec();
        Ok((bytes, status))
    }
}
