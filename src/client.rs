// API client with a transparent access-token refresh interceptor.
//
// Every request carries the stored access token. On a 401 for a request
// that has not been retried yet, the client exchanges its refresh token
// for a new access token and replays the original request exactly once.
// If the refresh itself fails, all stored credentials are cleared and
// the caller gets a session-expired error (the redirect-to-login analog).

use std::sync::{Arc, Mutex};

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::auth::models::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Refresh failed; stored credentials were cleared
    #[error("session expired, please log in again")]
    SessionExpired,

    /// The server answered with a non-success status
    #[error("request failed with status {0}")]
    Status(StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Default, Clone)]
struct Credentials {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// HTTP client for the coaching API with single-shot retry on expiry
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<Mutex<Credentials>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            credentials: Arc::new(Mutex::new(Credentials::default())),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn access_token(&self) -> Option<String> {
        self.credentials.lock().unwrap().access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.credentials.lock().unwrap().refresh_token.clone()
    }

    /// Seed tokens directly (e.g. restored from storage)
    pub fn set_tokens(&self, access_token: Option<String>, refresh_token: Option<String>) {
        let mut creds = self.credentials.lock().unwrap();
        creds.access_token = access_token;
        creds.refresh_token = refresh_token;
    }

    pub fn clear_tokens(&self) {
        *self.credentials.lock().unwrap() = Credentials::default();
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.lock().unwrap().access_token.is_some()
    }

    /// Log in and store the returned token pair
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        let login: LoginResponse = response.json().await?;
        self.set_tokens(
            Some(login.access_token.clone()),
            Some(login.refresh_token.clone()),
        );
        Ok(login)
    }

    /// Log out server-side and drop local credentials
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Some(refresh_token) = self.refresh_token() {
            self.http
                .post(self.url("/api/auth/logout"))
                .json(&RefreshRequest { refresh_token })
                .send()
                .await?;
        }
        self.clear_tokens();
        Ok(())
    }

    async fn refresh_access_token(&self) -> Result<(), ClientError> {
        let refresh_token = self.refresh_token().ok_or(ClientError::SessionExpired)?;

        let response = self
            .http
            .post(self.url("/api/auth/refresh"))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        if !response.status().is_success() {
            self.clear_tokens();
            return Err(ClientError::SessionExpired);
        }

        let refreshed: RefreshResponse = response.json().await?;
        let mut creds = self.credentials.lock().unwrap();
        creds.access_token = Some(refreshed.access_token);
        Ok(())
    }

    async fn send_once(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(token) = self.access_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Send a request, refreshing and replaying at most once on a 401
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ClientError> {
        let response = self.send_once(&method, path, body.as_ref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        // Without a refresh token the original failure stands
        if self.refresh_token().is_none() {
            return Ok(response);
        }

        debug!("Access token rejected for {} {}, refreshing", method, path);
        self.refresh_access_token().await?;

        // The single replay; a second 401 is returned as-is
        self.send_once(&method, path, body.as_ref()).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path, None).await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(response.json().await?)
    }

    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<T, ClientError> {
        let response = self.request(Method::POST, path, Some(body)).await?;
        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    // axum talks http 1.x while reqwest 0.11 talks http 0.2, so the mock
    // server's status codes get their own alias
    use axum::{
        extract::State,
        http::{header, HeaderMap, StatusCode as ServerStatus},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const STALE: &str = "stale-access-token";
    const FRESH: &str = "fresh-access-token";
    const REFRESH: &str = "refresh-token-1";

    #[derive(Default)]
    struct MockState {
        protected_calls: AtomicUsize,
        refresh_calls: AtomicUsize,
        // When set, even a fresh token is rejected
        always_unauthorized: std::sync::atomic::AtomicBool,
    }

    async fn protected(
        State(state): State<Arc<MockState>>,
        headers: HeaderMap,
    ) -> (ServerStatus, Json<Value>) {
        state.protected_calls.fetch_add(1, Ordering::SeqCst);

        let authorized = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == format!("Bearer {}", FRESH))
            .unwrap_or(false);

        if authorized && !state.always_unauthorized.load(Ordering::SeqCst) {
            (ServerStatus::OK, Json(json!({ "ok": true })))
        } else {
            (ServerStatus::UNAUTHORIZED, Json(json!({ "error": "Invalid token" })))
        }
    }

    async fn refresh(
        State(state): State<Arc<MockState>>,
        Json(body): Json<Value>,
    ) -> (ServerStatus, Json<Value>) {
        state.refresh_calls.fetch_add(1, Ordering::SeqCst);

        if body["refreshToken"] == REFRESH {
            (
                ServerStatus::OK,
                Json(json!({ "accessToken": FRESH, "refreshToken": REFRESH })),
            )
        } else {
            (
                ServerStatus::FORBIDDEN,
                Json(json!({ "error": "Refresh token is not recognized" })),
            )
        }
    }

    async fn login(State(_): State<Arc<MockState>>) -> Json<Value> {
        Json(json!({
            "id": 1,
            "name": "Alice",
            "email": "alice@example.com",
            "role": "Student",
            "accessToken": STALE,
            "refreshToken": REFRESH,
        }))
    }

    async fn spawn_mock() -> (String, Arc<MockState>) {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/protected", get(protected))
            .route("/api/auth/login", post(login))
            .route("/api/auth/refresh", post(refresh))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), state)
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_and_request_replayed_once() {
        let (base_url, state) = spawn_mock().await;
        let client = ApiClient::new(base_url);

        // Login hands back a token the server will reject
        client.login("alice@example.com", "pw123").await.unwrap();

        let body: Value = client.get_json("/protected").await.unwrap();
        assert_eq!(body["ok"], true);

        // One failed attempt, one refresh, one replay
        assert_eq!(state.protected_calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_refresh_token_propagates_original_failure() {
        let (base_url, state) = spawn_mock().await;
        let client = ApiClient::new(base_url);
        client.set_tokens(Some(STALE.to_string()), None);

        let err = client.get_json::<Value>("/protected").await.unwrap_err();
        assert!(matches!(err, ClientError::Status(StatusCode::UNAUTHORIZED)));

        // No refresh attempted, no replay
        assert_eq!(state.protected_calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refresh_failure_clears_credentials() {
        let (base_url, state) = spawn_mock().await;
        let client = ApiClient::new(base_url);
        client.set_tokens(Some(STALE.to_string()), Some("unknown-token".to_string()));

        let err = client.get_json::<Value>("/protected").await.unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired));
        assert!(!client.has_credentials());
        assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_at_most_one_retry_per_request() {
        let (base_url, state) = spawn_mock().await;
        state.always_unauthorized.store(true, Ordering::SeqCst);

        let client = ApiClient::new(base_url);
        client.set_tokens(Some(STALE.to_string()), Some(REFRESH.to_string()));

        let err = client.get_json::<Value>("/protected").await.unwrap_err();
        assert!(matches!(err, ClientError::Status(StatusCode::UNAUTHORIZED)));

        // Original attempt plus exactly one replay, no loop
        assert_eq!(state.protected_calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.refresh_calls.load(Ordering::SeqCst), 1);
    }
}
