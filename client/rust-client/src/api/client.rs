use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::response::{decode_json, ensure_success};
use crate::error::{ApiError, ApiResult};
use crate::models::{AuthResponse, RefreshRequest};
use crate::session::{Credentials, SessionStore};

pub const USER_ID_HEADER: &str = "X-User-Id";

const REFRESH_PATH: &str = "/auth/refresh";

/// A request that can be replayed after a token refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<serde_json::Value>,
    retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_json<B: Serialize>(
        method: Method,
        path: impl Into<String>,
        body: &B,
    ) -> ApiResult<Self> {
        let mut request = Self::new(method, path);
        request.body = Some(serde_json::to_value(body)?);
        Ok(request)
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Disables the refresh cycle for this request. Used for the auth
    /// endpoints, where a 401 means bad credentials rather than an expired token.
    pub fn without_refresh(mut self) -> Self {
        self.retried = true;
        self
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}

/// HTTP client for the MatGwiazda REST API.
///
/// Credentials are read from the injected [`SessionStore`] on every request.
/// A 401 triggers at most one refresh-and-replay cycle per request.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    store: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        store: Arc<dyn SessionStore>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_http_client(http, base_url, store))
    }

    pub fn with_http_client(http: Client, base_url: &str, store: Arc<dyn SessionStore>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        self.store.clone()
    }

    /// Sends the request, recovering from a single 401 with a token refresh.
    ///
    /// Non-401 responses, a 401 without a stored refresh token, and the
    /// replayed response are returned as-is. Transport errors are returned
    /// immediately.
    pub async fn execute(&self, request: ApiRequest) -> ApiResult<Response> {
        let response = self.dispatch(&request).await?;
        if response.status() != StatusCode::UNAUTHORIZED || request.retried {
            return Ok(response);
        }

        let mut request = request;
        request.retried = true;

        let Some(refresh_token) = self.store.get().refresh_token else {
            tracing::debug!(path = %request.path, "401 received and no refresh token stored");
            return Ok(response);
        };

        tracing::debug!(path = %request.path, "401 received, attempting token refresh");
        match self.refresh_with(&refresh_token).await {
            Ok(_) => self.dispatch(&request).await,
            Err(err) => {
                tracing::warn!(error = %err, "Token refresh failed, clearing stored credentials");
                if let Err(clear_err) = self.store.clear() {
                    tracing::error!(error = %clear_err, "Failed to clear stored credentials");
                }
                Err(ApiError::RefreshFailed(Box::new(err)))
            }
        }
    }

    /// Exchanges the stored refresh token for a new access token.
    ///
    /// Leaves the store untouched on failure; callers decide whether to log out.
    pub async fn refresh_session(&self) -> ApiResult<AuthResponse> {
        let refresh_token = self
            .store
            .get()
            .refresh_token
            .ok_or_else(|| ApiError::Validation("No refresh token".to_string()))?;
        self.refresh_with(&refresh_token).await
    }

    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let path = request.path.clone();
        let response = ensure_success(self.execute(request).await?).await?;
        decode_json(&path, response).await
    }

    pub async fn send_empty(&self, request: ApiRequest) -> ApiResult<()> {
        ensure_success(self.execute(request).await?).await?;
        Ok(())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send_json(ApiRequest::get(path)).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send_json(ApiRequest::with_json(Method::POST, path, body)?)
            .await
    }

    pub async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send_json(ApiRequest::with_json(Method::PUT, path, body)?)
            .await
    }

    pub async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.send_json(ApiRequest::with_json(Method::PATCH, path, body)?)
            .await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        self.send_empty(ApiRequest::delete(path)).await
    }

    async fn refresh_with(&self, refresh_token: &str) -> ApiResult<AuthResponse> {
        let request = ApiRequest::with_json(
            Method::POST,
            REFRESH_PATH,
            &RefreshRequest {
                refresh_token: refresh_token.to_string(),
            },
        )?
        .without_refresh();

        let response = ensure_success(self.dispatch(&request).await?).await?;
        let auth: AuthResponse = decode_json(REFRESH_PATH, response).await?;

        let current = self.store.get();
        self.store.set(Credentials {
            access_token: Some(auth.access_token.clone()),
            refresh_token: auth
                .refresh_token
                .clone()
                .or_else(|| Some(refresh_token.to_string())),
            user_id: current.user_id,
        })?;

        tracing::info!(
            rotated = auth.refresh_token.is_some(),
            "Access token refreshed"
        );
        Ok(auth)
    }

    async fn dispatch(&self, request: &ApiRequest) -> ApiResult<Response> {
        let credentials = self.store.get();
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = credentials.access_token.as_deref() {
            builder = builder.bearer_auth(token);
        }
        if let Some(user_id) = credentials.user_id.as_deref() {
            if !request.has_header(USER_ID_HEADER) {
                builder = builder.header(USER_ID_HEADER, user_id);
            }
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            has_token = credentials.access_token.is_some(),
            user_id = ?credentials.user_id,
            retried = request.retried,
            "api.request"
        );

        let response = builder.send().await?;
        tracing::debug!(
            path = %request.path,
            status = response.status().as_u16(),
            "api.response"
        );
        Ok(response)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}
