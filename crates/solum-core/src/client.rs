//! HTTP transport for the Solum API.
//!
//! Managers never talk to `reqwest` directly: they build a [`Request`] and
//! hand it to an [`HttpClient`]. The production implementation is
//! [`ReqwestClient`], which asks its [`Authenticator`] for a token and an
//! endpoint before every request.

use crate::error::{Result, SolumError};
use serde::Deserialize;
use std::fmt;
use std::sync::OnceLock;
use tracing::debug;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const YAML_CONTENT_TYPE: &str = "x-application/yaml";

/// Service type of the Solum API in the Keystone service catalog.
pub const SERVICE_TYPE: &str = "application_deployment";

// ---------------------------------------------------------------------------
// Request / Response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// An endpoint-relative request, e.g. `GET /v1/plans?name=web`.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, content_type: &str, body: Vec<u8>) -> Self {
        self.headers
            .push(("Content-Type".to_string(), content_type.to_string()));
        self.body = Some(body);
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into [`SolumError::Api`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(SolumError::Api {
            status: self.status,
            message: error_message(&self.body, self.status),
        })
    }
}

/// Extract the server-provided message from an error body.
///
/// Solum's API layer reports `{"faultstring": ...}`; other OpenStack
/// services use `{"error": {"message": ...}}` or a top-level `message`.
fn error_message(body: &[u8], status: u16) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        let candidates = [
            value.get("faultstring"),
            value.get("error").and_then(|e| e.get("message")),
            value.get("message"),
        ];
        for c in candidates.into_iter().flatten() {
            if let Some(s) = c.as_str() {
                return s.to_string();
            }
        }
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if !text.is_empty() {
        return text;
    }
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("unknown error")
        .to_string()
}

/// The capability every manager calls through.
pub trait HttpClient {
    fn send(&self, request: Request) -> Result<Response>;
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub endpoint: String,
}

/// Supplies a token and the Solum endpoint; invoked before every request.
pub trait Authenticator {
    fn credentials(&self, http: &reqwest::blocking::Client) -> Result<Credentials>;
}

/// A pre-issued token used against a known endpoint.
#[derive(Debug, Clone)]
pub struct TokenAuth {
    credentials: Credentials,
}

impl TokenAuth {
    pub fn new(token: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            credentials: Credentials {
                token: token.into(),
                endpoint: endpoint.into(),
            },
        }
    }
}

impl Authenticator for TokenAuth {
    fn credentials(&self, _http: &reqwest::blocking::Client) -> Result<Credentials> {
        Ok(self.credentials.clone())
    }
}

/// Keystone v2 password authentication.
///
/// The token is requested once and reused for the lifetime of the
/// authenticator. When no explicit endpoint is configured, the public URL
/// of the `application_deployment` catalog entry is used.
pub struct KeystoneAuth {
    auth_url: String,
    username: String,
    password: String,
    tenant_name: Option<String>,
    endpoint: Option<String>,
    cached: OnceLock<Credentials>,
}

#[derive(Deserialize)]
struct KeystoneReply {
    access: KeystoneAccess,
}

#[derive(Deserialize)]
struct KeystoneAccess {
    token: KeystoneToken,
    #[serde(default, rename = "serviceCatalog")]
    service_catalog: Vec<CatalogEntry>,
}

#[derive(Deserialize)]
struct KeystoneToken {
    id: String,
}

#[derive(Deserialize)]
struct CatalogEntry {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    endpoints: Vec<CatalogEndpoint>,
}

#[derive(Deserialize)]
struct CatalogEndpoint {
    #[serde(rename = "publicURL")]
    public_url: String,
}

impl std::fmt::Debug for KeystoneAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeystoneAuth")
            .field("auth_url", &self.auth_url)
            .field("username", &self.username)
            .field("password", &"********")
            .field("tenant_name", &self.tenant_name)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl KeystoneAuth {
    pub fn new(
        auth_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        tenant_name: Option<String>,
        endpoint: Option<String>,
    ) -> Self {
        Self {
            auth_url: auth_url.into(),
            username: username.into(),
            password: password.into(),
            tenant_name,
            endpoint,
            cached: OnceLock::new(),
        }
    }

    fn authenticate(&self, http: &reqwest::blocking::Client) -> Result<Credentials> {
        let url = format!("{}/tokens", self.auth_url.trim_end_matches('/'));
        let mut auth = serde_json::json!({
            "passwordCredentials": {
                "username": self.username,
                "password": self.password,
            }
        });
        if let Some(ref tenant) = self.tenant_name {
            auth["tenantName"] = serde_json::Value::String(tenant.clone());
        }
        debug!(url = %url, user = %self.username, "authenticating with keystone");

        let resp = http
            .post(&url)
            .json(&serde_json::json!({ "auth": auth }))
            .send()?;
        let status = resp.status().as_u16();
        let body = resp.bytes()?.to_vec();
        let resp = Response::new(status, body).error_for_status()?;

        let reply: KeystoneReply =
            serde_json::from_slice(&resp.body).map_err(|e| SolumError::ResponseParse {
                resource: "identity",
                reason: e.to_string(),
            })?;

        let endpoint = match self.endpoint {
            Some(ref e) => e.clone(),
            None => reply
                .access
                .service_catalog
                .iter()
                .find(|s| s.service_type == SERVICE_TYPE)
                .and_then(|s| s.endpoints.first())
                .map(|e| e.public_url.clone())
                .ok_or_else(|| {
                    SolumError::Config(format!(
                        "no '{SERVICE_TYPE}' endpoint in the service catalog; set SOLUM_URL"
                    ))
                })?,
        };

        Ok(Credentials {
            token: reply.access.token.id,
            endpoint,
        })
    }
}

impl Authenticator for KeystoneAuth {
    fn credentials(&self, http: &reqwest::blocking::Client) -> Result<Credentials> {
        if let Some(c) = self.cached.get() {
            return Ok(c.clone());
        }
        let fresh = self.authenticate(http)?;
        let _ = self.cached.set(fresh.clone());
        Ok(fresh)
    }
}

// ---------------------------------------------------------------------------
// ReqwestClient
// ---------------------------------------------------------------------------

pub struct ReqwestClient {
    http: reqwest::blocking::Client,
    auth: Box<dyn Authenticator>,
}

impl ReqwestClient {
    pub fn new(auth: Box<dyn Authenticator>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("solum-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, auth })
    }
}

impl HttpClient for ReqwestClient {
    fn send(&self, request: Request) -> Result<Response> {
        let creds = self.auth.credentials(&self.http)?;
        let url = format!("{}{}", creds.endpoint.trim_end_matches('/'), request.path);
        debug!(method = %request.method, url = %url, query = ?request.query, "sending request");

        let mut builder = self
            .http
            .request(request.method.into(), &url)
            .header("X-Auth-Token", &creds.token)
            .header(reqwest::header::ACCEPT, JSON_CONTENT_TYPE);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            if request
                .headers
                .iter()
                .all(|(k, _)| !k.eq_ignore_ascii_case("content-type"))
            {
                builder = builder.header(reqwest::header::CONTENT_TYPE, JSON_CONTENT_TYPE);
            }
            builder = builder.body(body);
        }

        let resp = builder.send()?;
        let status = resp.status().as_u16();
        let body = resp.bytes()?.to_vec();
        debug!(status, bytes = body.len(), "received response");
        Ok(Response::new(status, body))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn keystone_debug_hides_password() {
        let auth = KeystoneAuth::new(
            "http://keystone:5000/v2.0",
            "demo",
            "hunter2",
            Some("demo".to_string()),
            None,
        );
        let shown = format!("{auth:?}");
        assert!(shown.contains("demo"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn error_message_prefers_faultstring() {
        let body = br#"{"faultstring": "Plan abc could not be found.", "debuginfo": null}"#;
        assert_eq!(error_message(body, 404), "Plan abc could not be found.");
    }

    #[test]
    fn error_message_nested_openstack_error() {
        let body = br#"{"error": {"message": "The request you have made requires authentication."}}"#;
        assert_eq!(
            error_message(body, 401),
            "The request you have made requires authentication."
        );
    }

    #[test]
    fn error_message_falls_back_to_text_then_reason() {
        assert_eq!(error_message(b"gateway exploded", 502), "gateway exploded");
        assert_eq!(error_message(b"", 503), "Service Unavailable");
    }

    #[test]
    fn error_for_status_keeps_success() {
        let resp = Response::new(204, Vec::new());
        assert!(resp.error_for_status().is_ok());
        let err = Response::new(409, b"{\"faultstring\": \"busy\"}".to_vec())
            .error_for_status()
            .unwrap_err();
        assert!(matches!(err, SolumError::Api { status: 409, ref message } if message == "busy"));
    }

    #[test]
    fn reqwest_client_attaches_token_and_query() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/v1/plans")
            .match_header("x-auth-token", "tok-1")
            .match_query(Matcher::UrlEncoded("name".into(), "web".into()))
            .with_status(200)
            .with_body("[]")
            .create();

        let client = ReqwestClient::new(Box::new(TokenAuth::new("tok-1", server.url()))).unwrap();
        let req = Request::new(Method::Get, "/v1/plans")
            .with_query(vec![("name".to_string(), "web".to_string())]);
        let resp = client.send(req).unwrap();

        mock.assert();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, b"[]");
    }

    #[test]
    fn reqwest_client_defaults_json_content_type() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/assemblies")
            .match_header("content-type", "application/json")
            .match_body(r#"{"name":"a"}"#)
            .with_status(201)
            .with_body(r#"{"uuid":"u"}"#)
            .create();

        let client = ReqwestClient::new(Box::new(TokenAuth::new("t", server.url()))).unwrap();
        let mut req = Request::new(Method::Post, "/v1/assemblies");
        req.body = Some(br#"{"name":"a"}"#.to_vec());
        client.send(req).unwrap();
        mock.assert();
    }

    #[test]
    fn keystone_auth_uses_catalog_endpoint_once() {
        let mut server = mockito::Server::new();
        let catalog = serde_json::json!({
            "access": {
                "token": {"id": "ks-token"},
                "serviceCatalog": [
                    {"type": "identity", "endpoints": [{"publicURL": "http://nowhere"}]},
                    {"type": "application_deployment",
                     "endpoints": [{"publicURL": format!("{}/solum", server.url())}]}
                ]
            }
        });
        let tokens = server
            .mock("POST", "/tokens")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "auth": {
                    "tenantName": "demo",
                    "passwordCredentials": {"username": "alice", "password": "s3cret"}
                }
            })))
            .with_status(200)
            .with_body(catalog.to_string())
            .expect(1)
            .create();
        let plans = server
            .mock("GET", "/solum/v1/plans")
            .match_header("x-auth-token", "ks-token")
            .with_status(200)
            .with_body("[]")
            .expect(2)
            .create();

        let auth = KeystoneAuth::new(server.url(), "alice", "s3cret", Some("demo".into()), None);
        let client = ReqwestClient::new(Box::new(auth)).unwrap();
        client.send(Request::new(Method::Get, "/v1/plans")).unwrap();
        client.send(Request::new(Method::Get, "/v1/plans")).unwrap();

        tokens.assert();
        plans.assert();
    }

    #[test]
    fn keystone_auth_without_catalog_entry_is_config_error() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/tokens")
            .with_status(200)
            .with_body(r#"{"access": {"token": {"id": "t"}, "serviceCatalog": []}}"#)
            .create();

        let auth = KeystoneAuth::new(server.url(), "alice", "pw", None, None);
        let http = reqwest::blocking::Client::new();
        let err = auth.credentials(&http).unwrap_err();
        assert!(matches!(err, SolumError::Config(_)));
    }

    #[test]
    fn keystone_auth_rejection_is_api_error() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/tokens")
            .with_status(401)
            .with_body(r#"{"error": {"message": "Invalid user / password", "code": 401}}"#)
            .create();

        let auth = KeystoneAuth::new(server.url(), "alice", "bad", None, Some("http://x".into()));
        let http = reqwest::blocking::Client::new();
        let err = auth.credentials(&http).unwrap_err();
        assert!(matches!(err, SolumError::Api { status: 401, .. }));
    }
}
