use serde::{Deserialize, Serialize};
use validator::Validate;

use super::user::User;

/// Request to login
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request to register a new user
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(
        min = 6,
        max = 255,
        message = "Password must be between 6 and 255 characters"
    ))]
    pub password: String,

    #[validate(length(
        min = 2,
        max = 100,
        message = "User name must be between 2 and 100 characters"
    ))]
    pub user_name: String,
}

/// Request to refresh access token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response after login, registration or refresh
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Absent when the server does not rotate refresh tokens.
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}
