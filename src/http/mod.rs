//! HTTP transport for the TestFlow API.
//!
//! One configured `reqwest::Client` plus an ordered middleware chain. Every
//! call returns either the unwrapped JSON payload or a normalized `ApiError`;
//! callers never see raw `reqwest` responses.
//!
//! ```text
//!   send() ──► on_request (chain order) ──► dispatch ──► normalize ──► on_response (chain order) ──► decode
//! ```

pub mod error;
pub mod middleware;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::session::Session;

pub use error::{normalize_error, ApiError, ApiErrorKind};
pub use middleware::{BearerAuth, Middleware, RequestLogging, SessionExpiry};

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Overrides the client-wide timeout for this call only
    pub timeout: Option<Duration>,
    /// Query string parameters, in order
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a query parameter only when `value` is present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }
}

/// An outgoing request as seen by middleware.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, e.g. `/api/projects`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    fn with_options(mut self, options: RequestOptions) -> Self {
        self.query = options.query;
        self.timeout = options.timeout;
        self
    }
}

/// A successful (2xx) response with its body parsed as JSON.
///
/// An empty body is `Value::Null`; a body that is not JSON is kept as a string.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

/// Shared HTTP client with its middleware chain.
#[derive(Clone)]
pub struct Transport {
    client: Client,
    base_url: Url,
    session: Session,
    chain: Arc<Vec<Arc<dyn Middleware>>>,
    long_running_timeout: Duration,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url.as_str())
            .field(
                "middleware",
                &self.chain.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field("authenticated", &self.session.is_authenticated())
            .finish()
    }
}

/// Builder for a `Transport` with a custom middleware chain.
pub struct TransportBuilder {
    config: ClientConfig,
    session: Session,
    chain: Vec<Arc<dyn Middleware>>,
}

impl TransportBuilder {
    /// Append a middleware; it runs after those already registered.
    pub fn with_middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.chain.push(Arc::new(middleware));
        self
    }

    /// Append logging, bearer injection and session-expiry handling.
    pub fn with_default_middleware(self) -> Self {
        let session = self.session.clone();
        self.with_middleware(RequestLogging)
            .with_middleware(BearerAuth::new(session.clone()))
            .with_middleware(SessionExpiry::new(session))
    }

    /// # Errors
    ///
    /// Returns a `Config` error if the base URL does not parse or the HTTP
    /// client cannot be built.
    pub fn build(self) -> Result<Transport, ApiError> {
        let mut raw = self.config.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).map_err(|e| {
            warn!(base_url = %self.config.base_url, error = %e, "Invalid API base URL");
            ApiError::config()
        })?;

        let client = Client::builder()
            .timeout(self.config.timeout)
            .user_agent(format!("testflow-client/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                warn!(error = %e, "Failed to create HTTP client");
                ApiError::config()
            })?;

        info!(
            base_url = %base_url,
            timeout_ms = self.config.timeout.as_millis() as u64,
            middleware = self.chain.len(),
            "Created TestFlow transport"
        );

        Ok(Transport {
            client,
            base_url,
            session: self.session,
            chain: Arc::new(self.chain),
            long_running_timeout: self.config.ai_timeout,
        })
    }
}

impl Transport {
    /// Create a transport with the default middleware chain.
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self, ApiError> {
        Self::builder(config, session).with_default_middleware().build()
    }

    /// Start a transport with an empty middleware chain.
    pub fn builder(config: &ClientConfig, session: Session) -> TransportBuilder {
        TransportBuilder {
            config: config.clone(),
            session,
            chain: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Options for calls that run generative AI processing synchronously.
    pub fn long_running(&self) -> RequestOptions {
        RequestOptions::new().timeout(self.long_running_timeout)
    }

    /// Send a request and decode the unwrapped payload.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let mut request = ApiRequest::new(method, path).with_options(options);
        request.body = body;

        let mut rejected = None;
        for middleware in self.chain.iter() {
            if let Err(err) = middleware.on_request(&mut request).await {
                debug!(middleware = middleware.name(), "Request rejected before dispatch");
                rejected = Some(err);
                break;
            }
        }

        let mut outcome = match rejected {
            Some(err) => Err(err),
            None => self.dispatch(&request).await,
        };

        for middleware in self.chain.iter() {
            outcome = middleware.on_response(&request, outcome).await;
        }

        let response = outcome?;
        serde_json::from_value(response.body).map_err(|e| {
            warn!(path = %request.path, error = %e, "Response body did not match expected shape");
            ApiError::decode(response.status)
        })
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self
            .base_url
            .join(request.path.trim_start_matches('/'))
            .map_err(|e| {
                warn!(path = %request.path, error = %e, "Failed to construct URL");
                ApiError::config()
            })?;

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let http_request = builder.build().map_err(|e| {
            warn!(path = %request.path, error = %e, "Failed to build request");
            ApiError::config()
        })?;

        let response = self.client.execute(http_request).await.map_err(|e| {
            if e.is_builder() {
                warn!(path = %request.path, error = %e, "Request could not be dispatched");
                ApiError::config()
            } else {
                debug!(
                    path = %request.path,
                    timeout = e.is_timeout(),
                    connect = e.is_connect(),
                    error = %e,
                    "No response received"
                );
                ApiError::network()
            }
        })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| {
            debug!(path = %request.path, error = %e, "Failed to read response body");
            ApiError::network()
        })?;
        let body = parse_body(&bytes);

        if (200..300).contains(&status) {
            Ok(ApiResponse { status, body })
        } else {
            Err(normalize_error(status, &request.path, &body))
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::GET, path, None, RequestOptions::default())
            .await
    }

    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(Method::GET, path, None, options).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.post_with(path, body, RequestOptions::default()).await
    }

    pub async fn post_with<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let body = to_body(body)?;
        self.send(Method::POST, path, Some(body), options).await
    }

    /// POST without a body (action endpoints such as cancel or reset).
    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(Method::POST, path, None, options).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = to_body(body)?;
        self.send(Method::PUT, path, Some(body), RequestOptions::default())
            .await
    }

    /// PUT whose parameters travel in the query string.
    pub async fn put_query<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.send(Method::PUT, path, None, options).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::DELETE, path, None, RequestOptions::default())
            .await
    }

    /// DELETE with a JSON body (batch deletes).
    pub async fn delete_with_body<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = to_body(body)?;
        self.send(Method::DELETE, path, Some(body), RequestOptions::default())
            .await
    }
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| {
        warn!(error = %e, "Failed to serialize request body");
        ApiError::config()
    })
}

fn parse_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// Percent-encode a value for use as a single path segment.
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_backend, unreachable_base_url, VALID_TOKEN};
    use serde_json::json;

    fn transport_for(base_url: &str, session: Session) -> Transport {
        Transport::new(&ClientConfig::new(base_url), session).unwrap()
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(b""), Value::Null);
        assert_eq!(parse_body(br#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_body(b"plain"), json!("plain"));
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("abc-123"), "abc-123");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let err = Transport::new(&ClientConfig::new("not a url"), Session::new()).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Config);
        assert_eq!(err.message, error::MSG_CONFIG);
    }

    #[test]
    fn test_base_url_path_prefix_is_kept() {
        let transport =
            Transport::new(&ClientConfig::new("http://gateway.local/testflow"), Session::new())
                .unwrap();
        let expected = Url::parse("http://gateway.local/testflow/").unwrap();
        assert_eq!(transport.base_url(), &expected);
        assert_eq!(
            transport.base_url().join("api/projects").unwrap().as_str(),
            "http://gateway.local/testflow/api/projects"
        );
    }

    #[tokio::test]
    async fn test_bearer_header_is_attached_only_with_credential() {
        let backend = spawn_backend().await;
        let session = Session::new();
        let transport = transport_for(&backend.base_url, session.clone());

        let anonymous: Value = transport.get("/api/echo/headers").await.unwrap();
        assert_eq!(anonymous["authorization"], Value::Null);

        session.set_credential("abc");
        let authed: Value = transport.get("/api/echo/headers").await.unwrap();
        assert_eq!(authed["authorization"], "Bearer abc");
    }

    #[tokio::test]
    async fn test_payload_is_unwrapped() {
        let backend = spawn_backend().await;
        let transport = transport_for(&backend.base_url, Session::with_credential(VALID_TOKEN));

        #[derive(serde::Deserialize)]
        struct Me {
            username: String,
        }
        let me: Me = transport.get("/api/auth/me").await.unwrap();
        assert_eq!(me.username, "alice");
    }

    #[tokio::test]
    async fn test_query_parameters_are_sent() {
        let backend = spawn_backend().await;
        let transport = transport_for(&backend.base_url, Session::new());

        let echoed: Value = transport
            .get_with(
                "/api/echo/query",
                RequestOptions::new().query("active_only", true).query("limit", 5),
            )
            .await
            .unwrap();
        assert_eq!(echoed["active_only"], "true");
        assert_eq!(echoed["limit"], "5");
    }

    #[tokio::test]
    async fn test_login_401_does_not_clear_session() {
        let backend = spawn_backend().await;
        let session = Session::with_credential("previous");
        let transport = transport_for(&backend.base_url, session.clone());

        let err = transport
            .post::<Value, _>(
                "/api/auth/login",
                &json!({"username": "alice", "password": "nope"}),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InvalidCredentials);
        assert_eq!(err.message, "Incorrect username or password");
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_401_elsewhere_clears_session() {
        let backend = spawn_backend().await;
        let session = Session::with_credential("stale-token");
        let transport = transport_for(&backend.base_url, session.clone());

        let err = transport.get::<Value>("/api/auth/me").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::SessionExpired);
        assert_eq!(err.message, error::MSG_SESSION_EXPIRED);
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_status_codes_are_normalized() {
        let backend = spawn_backend().await;
        let transport = transport_for(&backend.base_url, Session::new());

        let err = transport.get::<Value>("/api/fail/422").await.unwrap_err();
        assert_eq!(err.message, "parameter error: field required, too long");

        let err = transport.get::<Value>("/api/fail/403").await.unwrap_err();
        assert_eq!(err.message, error::MSG_PERMISSION);

        let err = transport.get::<Value>("/api/fail/404").await.unwrap_err();
        assert_eq!(err.message, "project 7 does not exist");

        let err = transport.get::<Value>("/api/fail/500").await.unwrap_err();
        assert_eq!(err.message, error::MSG_SERVER);

        let err = transport.get::<Value>("/api/fail/418").await.unwrap_err();
        assert_eq!(err.message, "request failed (418)");
    }

    #[tokio::test]
    async fn test_network_failure_message_is_fixed() {
        let base_url = unreachable_base_url().await;
        let transport = transport_for(&base_url, Session::new());

        for path in ["/api/projects", "/api/agents/tasks/x/status"] {
            let err = transport.get::<Value>(path).await.unwrap_err();
            assert_eq!(err.kind, ApiErrorKind::Network);
            assert_eq!(err.message, error::MSG_NETWORK);
            assert_eq!(err.status_code, None);
        }
    }

    #[tokio::test]
    async fn test_per_call_timeout_overrides_default() {
        let backend = spawn_backend().await;
        let transport = transport_for(&backend.base_url, Session::new());

        let err = transport
            .get_with::<Value>(
                "/api/slow",
                RequestOptions::new().timeout(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Network);

        let ok: Value = transport.get("/api/slow").await.unwrap();
        assert_eq!(ok["slow"], true);
    }

    #[tokio::test]
    async fn test_wrong_shape_is_decode_error() {
        let backend = spawn_backend().await;
        let transport = transport_for(&backend.base_url, Session::with_credential(VALID_TOKEN));

        let err = transport.get::<Vec<u32>>("/api/auth/me").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Decode);
        assert_eq!(err.status_code, Some(200));
    }

    #[tokio::test]
    async fn test_unencodable_credential_never_dispatches() {
        let backend = spawn_backend().await;
        let transport =
            transport_for(&backend.base_url, Session::with_credential("line\nbreak"));

        let err = transport.get::<Value>("/api/echo/headers").await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Config);
        assert_eq!(err.message, error::MSG_CONFIG);
        assert_eq!(backend.state.request_count("/api/echo/headers"), 0);
    }

    struct Tagging;

    #[async_trait::async_trait]
    impl Middleware for Tagging {
        fn name(&self) -> &'static str {
            "tagging"
        }

        async fn on_request(&self, request: &mut ApiRequest) -> Result<(), ApiError> {
            request
                .query
                .push(("tag".to_string(), "from-middleware".to_string()));
            Ok(())
        }

        async fn on_response(
            &self,
            _request: &ApiRequest,
            outcome: Result<ApiResponse, ApiError>,
        ) -> Result<ApiResponse, ApiError> {
            outcome.map(|mut response| {
                response.body["seen_by"] = json!("tagging");
                response
            })
        }
    }

    #[tokio::test]
    async fn test_custom_middleware_transforms_both_directions() {
        let backend = spawn_backend().await;
        let transport = Transport::builder(&ClientConfig::new(&backend.base_url), Session::new())
            .with_default_middleware()
            .with_middleware(Tagging)
            .build()
            .unwrap();

        let echoed: Value = transport.get("/api/echo/query").await.unwrap();
        assert_eq!(echoed["tag"], "from-middleware");
        assert_eq!(echoed["seen_by"], "tagging");
    }
}
