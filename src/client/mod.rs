//! Client layer: resolves credentials, issues one HTTP call per operation, and maps the
//! outcome to a JSON document or a [`MessagingError`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::Level;
use url::Url;

use crate::auth::{AuthProvider, BoxError, BoxFuture, SecretString, TokenData};
use crate::domain::{Domain, ListMessages, SendMessage, User, ValidationError};
use crate::transport;

const HTTP_OK: u16 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HttpMethod {
    Get,
    Post,
}

#[derive(Debug, Clone)]
struct HttpRequest {
    method: HttpMethod,
    url: Url,
    bearer: SecretString,
    json_body: Option<String>,
}

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

#[derive(Debug)]
enum TransportFailure {
    /// The request never completed on the wire (DNS, connect, reset, timeout, body read).
    Network(BoxError),
    /// The request could not be built locally.
    Local(BoxError),
}

trait HttpTransport: Send + Sync {
    fn send<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    fn classify(err: reqwest::Error) -> TransportFailure {
        if err.is_builder() {
            TransportFailure::Local(Box::new(err))
        } else {
            TransportFailure::Network(Box::new(err))
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>> {
        Box::pin(async move {
            let builder = match request.method {
                HttpMethod::Get => self.client.get(request.url),
                HttpMethod::Post => self.client.post(request.url),
            };
            let mut builder = builder.bearer_auth(request.bearer.expose());
            if let Some(body) = request.json_body {
                builder = builder.header(CONTENT_TYPE, "application/json").body(body);
            }

            let response = builder.send().await.map_err(Self::classify)?;
            let status = response.status().as_u16();
            let body = response.text().await.map_err(Self::classify)?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`MessagingClient`].
///
/// No variant is retried by the client; each failure is logged once and returned.
pub enum MessagingError {
    /// A caller-supplied value was rejected before any network call.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ValidationError),

    /// The server answered with a status other than 200.
    #[error("request failed with HTTP {status}: {body}")]
    RemoteRequestFailed { status: u16, body: String },

    /// Transport failure (DNS, connection reset, timeout, truncated body).
    #[error("network error: {0}")]
    Network(#[source] BoxError),

    /// The auth provider could not supply a fresh token.
    #[error("could not obtain a fresh access token: {0}")]
    Auth(#[source] BoxError),

    /// Any other local fault: unusable `api_url`, unbuildable request, undecodable body.
    #[error("unexpected error: {0}")]
    Unexpected(#[source] BoxError),
}

impl MessagingError {
    /// HTTP status of a [`MessagingError::RemoteRequestFailed`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Clone)]
/// Builder for [`MessagingClient`].
///
/// Use this to customize the timeout, user-agent, log verbosity, or the domain/user new
/// messages are sent as.
pub struct MessagingClientBuilder {
    auth: Arc<dyn AuthProvider>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    log_level: Level,
    domain: Domain,
    user: User,
}

impl MessagingClientBuilder {
    /// Create a builder that sends as the token's own domain and user (`~`), logging at INFO.
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            auth,
            timeout: None,
            user_agent: None,
            log_level: Level::INFO,
            domain: Domain::current(),
            user: User::current(),
        }
    }

    /// Set an HTTP client timeout applied to the entire request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Most verbose level this client emits. Failures are always logged at ERROR.
    pub fn log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Domain used to address [`MessagingClient::send_message`].
    pub fn domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    /// User used to address [`MessagingClient::send_message`].
    pub fn user(mut self, user: User) -> Self {
        self.user = user;
        self
    }

    /// Build a [`MessagingClient`].
    pub fn build(self) -> Result<MessagingClient, MessagingError> {
        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(0);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|err| MessagingError::Unexpected(Box::new(err)))?;

        Ok(MessagingClient::with_transport(
            self.auth,
            Arc::new(ReqwestTransport { client }),
            self.log_level,
            self.domain,
            self.user,
        ))
    }
}

#[derive(Clone)]
/// Client for the `messages` and `messagesessions` resources.
///
/// Every call asks the [`AuthProvider`] for a fresh token and uses the `api_url` that comes
/// with it. Connections are not pooled: each call opens and releases its own.
pub struct MessagingClient {
    auth: Arc<dyn AuthProvider>,
    http: Arc<dyn HttpTransport>,
    base_url: Option<String>,
    log_level: Level,
    domain: Domain,
    user: User,
}

impl MessagingClient {
    /// Create a client with default settings.
    ///
    /// For more customization, use [`MessagingClient::builder`].
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_transport(
            auth,
            Arc::new(ReqwestTransport { client }),
            Level::INFO,
            Domain::current(),
            User::current(),
        )
    }

    /// Start building a client with custom settings.
    pub fn builder(auth: Arc<dyn AuthProvider>) -> MessagingClientBuilder {
        MessagingClientBuilder::new(auth)
    }

    fn with_transport(
        auth: Arc<dyn AuthProvider>,
        http: Arc<dyn HttpTransport>,
        log_level: Level,
        domain: Domain,
        user: User,
    ) -> Self {
        let base_url = auth.current_token_data().map(|token| token.api_url);
        let client = Self {
            auth,
            http,
            base_url,
            log_level,
            domain,
            user,
        };
        if client.enabled(Level::DEBUG) {
            tracing::debug!(base_url = ?client.base_url, "messaging client initialized");
        }
        client
    }

    /// `api_url` cached by the auth provider when the client was built, if there was one.
    ///
    /// Informational only: each call resolves the URL again from a fresh token.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Send a message, starting a new session or appending to
    /// [`crate::SendOptions::session_id`].
    ///
    /// Returns the server's JSON document unchanged.
    ///
    /// Errors:
    /// - [`MessagingError::Auth`] when no fresh token can be obtained,
    /// - [`MessagingError::RemoteRequestFailed`] for any status other than 200,
    /// - [`MessagingError::Network`] for transport failures,
    /// - [`MessagingError::Unexpected`] for local faults such as an unusable `api_url`.
    pub async fn send_message(&self, request: SendMessage) -> Result<Value, MessagingError> {
        let token = self.fresh_token().await?;
        let segments = transport::send_message_segments(&self.domain, &self.user, &request);
        let url = self.resolve_url(&token, segments, &[])?;
        let body = transport::encode_send_message_json(&request).map_err(|err| {
            tracing::error!(error = %err, "failed to encode message payload");
            MessagingError::Unexpected(Box::new(err))
        })?;

        if self.enabled(Level::DEBUG) {
            tracing::debug!(
                url = %url,
                session_id = ?request.options().session_id.as_ref().map(|it| it.as_str()),
                destinations = request.destination().len(),
                payload = %body,
                "sending message"
            );
        }

        let result = self
            .execute("send message", HttpMethod::Post, url, token, Some(body))
            .await?;
        if self.enabled(Level::INFO) {
            tracing::info!(response = %result, "message sent");
        }
        Ok(result)
    }

    /// List the sessions of a domain or user, or the messages of one session.
    ///
    /// Returns the server's JSON document unchanged. Errors are the same as for
    /// [`MessagingClient::send_message`].
    pub async fn get_messages(&self, request: ListMessages) -> Result<Value, MessagingError> {
        let token = self.fresh_token().await?;
        let segments = transport::get_messages_segments(&request);
        let query = transport::encode_get_messages_query(&request);
        let url = self.resolve_url(&token, segments, &query)?;

        if self.enabled(Level::DEBUG) {
            tracing::debug!(url = %url, params = ?query, "retrieving messages");
        }

        let safe_url = transport::sanitize_url(&url);
        let result = self
            .execute("retrieve messages", HttpMethod::Get, url, token, None)
            .await?;
        if self.enabled(Level::INFO) {
            tracing::info!(url = %safe_url, "messages retrieved");
        }
        Ok(result)
    }

    fn enabled(&self, level: Level) -> bool {
        level <= self.log_level
    }

    async fn fresh_token(&self) -> Result<TokenData, MessagingError> {
        self.auth.ensure_fresh().await.map_err(|err| {
            tracing::error!(error = %err, "failed to refresh access token");
            MessagingError::Auth(err)
        })
    }

    fn resolve_url<'a, I>(
        &self,
        token: &TokenData,
        segments: I,
        query: &[(String, String)],
    ) -> Result<Url, MessagingError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        transport::endpoint_url(&token.api_url, segments, query).map_err(|err| {
            tracing::error!(api_url = %token.api_url, error = %err, "unusable api_url");
            MessagingError::Unexpected(Box::new(err))
        })
    }

    async fn execute(
        &self,
        operation: &'static str,
        method: HttpMethod,
        url: Url,
        token: TokenData,
        json_body: Option<String>,
    ) -> Result<Value, MessagingError> {
        let safe_url = transport::sanitize_url(&url);
        let response = self
            .http
            .send(HttpRequest {
                method,
                url,
                bearer: token.access_token,
                json_body,
            })
            .await
            .map_err(|failure| match failure {
                TransportFailure::Network(err) => {
                    tracing::error!(
                        url = %safe_url,
                        error = %err,
                        "network error: failed to {operation}"
                    );
                    MessagingError::Network(err)
                }
                TransportFailure::Local(err) => {
                    tracing::error!(
                        url = %safe_url,
                        error = %err,
                        "unexpected error: failed to {operation}"
                    );
                    MessagingError::Unexpected(err)
                }
            })?;

        if response.status != HTTP_OK {
            tracing::error!(
                url = %safe_url,
                status = response.status,
                body = %response.body,
                "failed to {operation}"
            );
            return Err(MessagingError::RemoteRequestFailed {
                status: response.status,
                body: response.body,
            });
        }

        transport::decode_json_document(&response.body).map_err(|err| {
            tracing::error!(
                url = %safe_url,
                error = %err,
                "failed to {operation}: invalid JSON response"
            );
            MessagingError::Unexpected(Box::new(err))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as StdError;
    use std::io;
    use std::num::NonZeroU32;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::{FromNumber, MessageText, MessageType, SendOptions, SessionId};

    use super::*;

    #[derive(Debug)]
    enum FakeOutcome {
        Respond { status: u16, body: String },
        ConnectionReset,
    }

    #[derive(Debug, Clone)]
    struct FakeTransport {
        state: Arc<Mutex<FakeTransportState>>,
    }

    #[derive(Debug)]
    struct FakeTransportState {
        requests: Vec<HttpRequest>,
        outcome: FakeOutcome,
    }

    impl FakeTransport {
        fn new(status: u16, body: impl Into<String>) -> Self {
            Self::with_outcome(FakeOutcome::Respond {
                status,
                body: body.into(),
            })
        }

        fn with_outcome(outcome: FakeOutcome) -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeTransportState {
                    requests: Vec::new(),
                    outcome,
                })),
            }
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.state.lock().unwrap().requests.clone()
        }

        fn last_request(&self) -> HttpRequest {
            self.requests().pop().expect("no request was sent")
        }
    }

    impl HttpTransport for FakeTransport {
        fn send<'a>(
            &'a self,
            request: HttpRequest,
        ) -> BoxFuture<'a, Result<HttpResponse, TransportFailure>> {
            Box::pin(async move {
                let response = {
                    let mut state = self.state.lock().unwrap();
                    state.requests.push(request);
                    match &state.outcome {
                        FakeOutcome::Respond { status, body } => Some((*status, body.clone())),
                        FakeOutcome::ConnectionReset => None,
                    }
                };
                match response {
                    Some((status, body)) => Ok(HttpResponse { status, body }),
                    None => Err(TransportFailure::Network(Box::new(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        "connection reset by peer",
                    )))),
                }
            })
        }
    }

    #[derive(Debug)]
    struct FakeAuth {
        cached: Option<TokenData>,
        fresh: Option<TokenData>,
        refreshes: AtomicUsize,
    }

    impl FakeAuth {
        fn new(api_url: &str) -> Arc<Self> {
            let token = TokenData::new("token-1", api_url);
            Arc::new(Self {
                cached: Some(token.clone()),
                fresh: Some(token),
                refreshes: AtomicUsize::new(0),
            })
        }

        fn refreshes(&self) -> usize {
            self.refreshes.load(Ordering::SeqCst)
        }
    }

    impl AuthProvider for FakeAuth {
        fn current_token_data(&self) -> Option<TokenData> {
            self.cached.clone()
        }

        fn ensure_fresh(&self) -> BoxFuture<'_, Result<TokenData, BoxError>> {
            Box::pin(async move {
                self.refreshes.fetch_add(1, Ordering::SeqCst);
                self.fresh
                    .clone()
                    .ok_or_else(|| BoxError::from("refresh token revoked"))
            })
        }
    }

    fn make_client(auth: Arc<FakeAuth>, transport: FakeTransport) -> MessagingClient {
        MessagingClient::with_transport(
            auth,
            Arc::new(transport),
            Level::DEBUG,
            Domain::current(),
            User::current(),
        )
    }

    fn sms(destination: &str) -> SendMessage {
        SendMessage::new(
            MessageType::sms(),
            MessageText::new("hello").unwrap(),
            destination,
            FromNumber::new("15550001111").unwrap(),
        )
        .unwrap()
    }

    async fn send_in_session(
        client: &MessagingClient,
        raw_session_id: String,
    ) -> Result<Value, MessagingError> {
        let session = SessionId::new(raw_session_id)?;
        let request = sms("15551234567").with_options(SendOptions::default().in_session(session));
        client.send_message(request).await
    }

    #[tokio::test]
    async fn send_message_posts_to_new_session_path_with_bearer() {
        let transport = FakeTransport::new(200, r#"{"id":"m1"}"#);
        let auth = FakeAuth::new("https://api.example.com");
        let client = make_client(auth.clone(), transport.clone());

        let response = client.send_message(sms("15551234567")).await.unwrap();
        assert_eq!(response["id"], "m1");
        assert_eq!(auth.refreshes(), 1);

        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(
            request.url.as_str(),
            "https://api.example.com/ns-api/v2/domains/~/users/~/messages"
        );
        assert_eq!(request.bearer.expose(), "token-1");
        assert_eq!(
            request.json_body.as_deref(),
            Some(
                r#"{"type":"sms","message":"hello","destination":["15551234567"],"from-number":"15550001111"}"#
            )
        );
    }

    #[tokio::test]
    async fn send_message_with_session_targets_session_messages() {
        let transport = FakeTransport::new(200, "{}");
        let client = make_client(FakeAuth::new("https://api.example.com"), transport.clone());
        let session = "a".repeat(32);

        let request = sms("15551234567")
            .with_options(SendOptions::default().in_session(SessionId::new(&*session).unwrap()));
        client.send_message(request).await.unwrap();

        assert_eq!(
            transport.last_request().url.path(),
            format!("/ns-api/v2/domains/~/users/~/messagesessions/{session}/messages")
        );
    }

    #[tokio::test]
    async fn send_message_with_bad_session_id_makes_no_calls() {
        let transport = FakeTransport::new(200, "{}");
        let auth = FakeAuth::new("https://api.example.com");
        let client = make_client(auth.clone(), transport.clone());

        for raw in [String::new(), "a".repeat(31), format!("{}-x", "a".repeat(32))] {
            let result = send_in_session(&client, raw).await;
            assert!(matches!(result, Err(MessagingError::InvalidArgument(_))));
        }

        assert!(transport.requests().is_empty());
        assert_eq!(auth.refreshes(), 0);
    }

    #[tokio::test]
    async fn builder_domain_and_user_address_sends() {
        let transport = FakeTransport::new(200, "{}");
        let client = MessagingClient::with_transport(
            FakeAuth::new("https://api.example.com"),
            Arc::new(transport.clone()),
            Level::INFO,
            Domain::new("acme").unwrap(),
            User::new("1001").unwrap(),
        );

        client.send_message(sms("15551234567")).await.unwrap();
        assert_eq!(
            transport.last_request().url.path(),
            "/ns-api/v2/domains/acme/users/1001/messages"
        );
    }

    #[tokio::test]
    async fn non_200_status_maps_to_remote_request_failed() {
        let transport = FakeTransport::new(403, "forbidden");
        let client = make_client(FakeAuth::new("https://api.example.com"), transport);

        let err = client.send_message(sms("1")).await.unwrap_err();
        match err {
            MessagingError::RemoteRequestFailed { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = client.get_messages(ListMessages::new()).await.unwrap_err();
        assert_eq!(err.status(), Some(403));
        assert!(matches!(
            err,
            MessagingError::RemoteRequestFailed { ref body, .. } if body == "forbidden"
        ));
    }

    #[tokio::test]
    async fn success_requires_exactly_200() {
        let transport = FakeTransport::new(202, r#"{"queued":true}"#);
        let client = make_client(FakeAuth::new("https://api.example.com"), transport);

        let err = client.send_message(sms("1")).await.unwrap_err();
        assert_eq!(err.status(), Some(202));
    }

    #[tokio::test]
    async fn connection_reset_maps_to_network_error() {
        let transport = FakeTransport::with_outcome(FakeOutcome::ConnectionReset);
        let client = make_client(FakeAuth::new("https://api.example.com"), transport);

        for err in [
            client.send_message(sms("1")).await.unwrap_err(),
            client.get_messages(ListMessages::new()).await.unwrap_err(),
        ] {
            assert!(matches!(err, MessagingError::Network(_)), "{err:?}");
            let cause = err
                .source()
                .and_then(|source| source.downcast_ref::<io::Error>())
                .expect("original cause is preserved");
            assert_eq!(cause.kind(), io::ErrorKind::ConnectionReset);
        }
    }

    #[tokio::test]
    async fn invalid_json_on_success_maps_to_unexpected() {
        let transport = FakeTransport::new(200, "<html>");
        let client = make_client(FakeAuth::new("https://api.example.com"), transport);

        let err = client.get_messages(ListMessages::new()).await.unwrap_err();
        assert!(matches!(err, MessagingError::Unexpected(_)));
    }

    #[tokio::test]
    async fn unusable_api_url_maps_to_unexpected_without_calls() {
        let transport = FakeTransport::new(200, "{}");
        let client = make_client(FakeAuth::new("not a url"), transport.clone());

        let err = client.send_message(sms("1")).await.unwrap_err();
        assert!(matches!(err, MessagingError::Unexpected(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn refresh_failure_maps_to_auth_error() {
        let transport = FakeTransport::new(200, "{}");
        let auth = Arc::new(FakeAuth {
            cached: None,
            fresh: None,
            refreshes: AtomicUsize::new(0),
        });
        let client = make_client(auth.clone(), transport.clone());

        let err = client.get_messages(ListMessages::new()).await.unwrap_err();
        assert!(matches!(err, MessagingError::Auth(_)));
        assert_eq!(auth.refreshes(), 1);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn every_call_uses_the_fresh_api_url() {
        let transport = FakeTransport::new(200, "[]");
        let auth = Arc::new(FakeAuth {
            cached: None,
            fresh: Some(TokenData::new("token-2", "https://fresh.example.com")),
            refreshes: AtomicUsize::new(0),
        });
        let client = make_client(auth.clone(), transport.clone());
        assert_eq!(client.base_url(), None);

        client.get_messages(ListMessages::new()).await.unwrap();
        client.get_messages(ListMessages::new()).await.unwrap();

        assert_eq!(auth.refreshes(), 2);
        for request in transport.requests() {
            assert_eq!(request.url.host_str(), Some("fresh.example.com"));
            assert_eq!(request.bearer.expose(), "token-2");
        }
    }

    #[tokio::test]
    async fn get_messages_routes_and_limit() {
        let transport = FakeTransport::new(200, "[]");
        let client = make_client(FakeAuth::new("https://api.example.com"), transport.clone());
        assert_eq!(client.base_url(), Some("https://api.example.com"));

        client.get_messages(ListMessages::new()).await.unwrap();
        let request = transport.last_request();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url.path(), "/ns-api/v2/domains/~/messagesessions");
        assert_eq!(request.url.query(), None);
        assert!(request.json_body.is_none());

        let list = ListMessages::new()
            .with_user(User::new("bob").unwrap())
            .with_limit(NonZeroU32::new(5).unwrap());
        client.get_messages(list).await.unwrap();
        let request = transport.last_request();
        assert_eq!(request.url.path(), "/ns-api/v2/domains/~/users/bob/messagesessions");
        assert_eq!(request.url.query(), Some("limit=5"));
    }

    #[test]
    fn builder_builds_with_overrides() {
        let client = MessagingClient::builder(FakeAuth::new("https://api.example.com"))
            .timeout(Duration::from_secs(5))
            .user_agent("messaging-tests")
            .log_level(Level::WARN)
            .domain(Domain::new("acme").unwrap())
            .user(User::new("1001").unwrap())
            .build()
            .unwrap();
        assert_eq!(client.domain.as_str(), "acme");
        assert_eq!(client.user.as_str(), "1001");
        assert!(client.enabled(Level::ERROR));
        assert!(!client.enabled(Level::INFO));
    }
}
