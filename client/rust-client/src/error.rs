use reqwest::StatusCode;
use validator::ValidationErrors;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by the API client, the session layer and the play controller.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Caught locally before any network call.
    #[error("{0}")]
    Validation(String),

    /// 401 that the refresh cycle could not recover.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The refresh endpoint failed; stored credentials were cleared.
    #[error("Session refresh failed: {0}")]
    RefreshFailed(#[source] Box<ApiError>),

    #[error("Request failed with status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// True when the user has to log in again.
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. } | ApiError::RefreshFailed(_))
    }

    /// Network failures and 5xx responses can be retried by the user.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(_) => true,
            ApiError::Status { status, .. } => status.is_server_error(),
            _ => false,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(err) => err.status(),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .collect();
        messages.sort();
        ApiError::Validation(messages.join("; "))
    }
}
