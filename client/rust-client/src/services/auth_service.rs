use reqwest::Method;
use std::sync::{Arc, RwLock};
use validator::Validate;

use crate::api::{ApiClient, ApiRequest};
use crate::error::{ApiError, ApiResult};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, SubmitOutcome, User};
use crate::play::ProgressSink;
use crate::session::{Credentials, SessionStore};

/// Session layer: owns the credentials lifecycle and the cached current user.
pub struct AuthService {
    api: ApiClient,
    store: Arc<dyn SessionStore>,
    user: RwLock<Option<User>>,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        let store = api.store();
        Self {
            api,
            store,
            user: RwLock::new(None),
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.user
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.get().access_token.is_some()
    }

    pub fn set_user(&self, user: Option<User>) {
        *self
            .user
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = user;
    }

    /// Loads the current user for a stored session, if any.
    ///
    /// An unrecoverable auth failure clears the session and yields `Ok(None)`.
    pub async fn restore(&self) -> ApiResult<Option<User>> {
        if !self.is_authenticated() {
            return Ok(None);
        }
        match self.fetch_current_user().await {
            Ok(user) => Ok(Some(user)),
            Err(err) if self.handle_failure(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Logs in and stores the issued tokens.
    ///
    /// Returns the current user when the server included it or `/users/me`
    /// answered; a failing profile fetch does not undo the login.
    pub async fn login(&self, request: LoginRequest) -> ApiResult<Option<User>> {
        request.validate()?;
        let auth: AuthResponse = self
            .api
            .send_json(ApiRequest::with_json(Method::POST, "/auth/login", &request)?.without_refresh())
            .await?;
        tracing::info!(email = %request.email, "User logged in");
        self.establish(auth).await
    }

    pub async fn register(&self, request: RegisterRequest) -> ApiResult<Option<User>> {
        request.validate()?;
        let auth: AuthResponse = self
            .api
            .send_json(
                ApiRequest::with_json(Method::POST, "/auth/register", &request)?.without_refresh(),
            )
            .await?;
        tracing::info!(email = %request.email, "User registered");
        self.establish(auth).await
    }

    /// Explicit refresh; on failure the session is dropped.
    pub async fn refresh(&self) -> ApiResult<AuthResponse> {
        match self.api.refresh_session().await {
            Ok(auth) => Ok(auth),
            Err(err) => {
                if !matches!(err, ApiError::Validation(_)) {
                    self.logout()?;
                }
                Err(err)
            }
        }
    }

    pub fn logout(&self) -> ApiResult<()> {
        self.store.clear()?;
        self.set_user(None);
        tracing::info!("Session cleared");
        Ok(())
    }

    pub async fn fetch_current_user(&self) -> ApiResult<User> {
        let user: User = self.api.get_json("/users/me").await?;
        self.remember_user_id(&user.id)?;
        self.set_user(Some(user.clone()));
        Ok(user)
    }

    /// Applies a submission result to the cached user.
    pub fn apply_progress(&self, outcome: &SubmitOutcome) {
        let mut guard = self
            .user
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(user) = guard.as_mut() {
            user.apply_progress(outcome);
        }
    }

    /// Drops the session when the error means the user has to log in again.
    /// Returns whether that happened.
    pub fn handle_failure(&self, err: &ApiError) -> bool {
        if !err.requires_login() {
            return false;
        }
        tracing::warn!(error = %err, "Authentication lost, login required");
        if let Err(clear_err) = self.store.clear() {
            tracing::error!(error = %clear_err, "Failed to clear stored credentials");
        }
        self.set_user(None);
        true
    }

    async fn establish(&self, auth: AuthResponse) -> ApiResult<Option<User>> {
        self.store.set(Credentials {
            access_token: Some(auth.access_token),
            refresh_token: auth.refresh_token,
            user_id: auth.user.as_ref().map(|u| u.id.clone()),
        })?;

        if let Some(user) = auth.user {
            self.set_user(Some(user.clone()));
            return Ok(Some(user));
        }

        match self.fetch_current_user().await {
            Ok(user) => Ok(Some(user)),
            Err(err) => {
                tracing::warn!(error = %err, "Logged in but current user could not be loaded");
                Ok(None)
            }
        }
    }

    fn remember_user_id(&self, user_id: &str) -> ApiResult<()> {
        let mut credentials = self.store.get();
        if credentials.access_token.is_none()
            || credentials.user_id.as_deref() == Some(user_id)
        {
            return Ok(());
        }
        credentials.user_id = Some(user_id.to_string());
        self.store.set(credentials)
    }
}

impl ProgressSink for AuthService {
    fn apply_progress(&self, outcome: &SubmitOutcome) {
        AuthService::apply_progress(self, outcome);
    }

    fn current_level(&self) -> Option<u16> {
        self.current_user().map(|u| u.current_level)
    }
}
