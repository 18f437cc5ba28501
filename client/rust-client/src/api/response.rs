use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Option<Vec<String>>,
}

/// Turns a non-success response into `ApiError`, keeping the server's message.
pub async fn ensure_success(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    if status == StatusCode::UNAUTHORIZED {
        Err(ApiError::Unauthorized { message })
    } else {
        Err(ApiError::Status { status, message })
    }
}

/// Extracts a human readable message from an error body.
///
/// Validation failures arrive as `{"errors": [..]}`, everything else as
/// `{"message": ".."}`; plain text bodies are used when short.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(errors) = parsed.errors.filter(|errors| !errors.is_empty()) {
            return errors.join("\n");
        }
        if let Some(message) = parsed
            .message
            .or(parsed.error)
            .filter(|m| !m.trim().is_empty())
        {
            return message;
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() <= 200 && !trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

pub async fn decode_json<T: DeserializeOwned>(path: &str, response: Response) -> ApiResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(format!("{}: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_errors_list() {
        let body = r#"{"message":"Bad Request","errors":["email: must be valid","password: too short"]}"#;
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, body),
            "email: must be valid\npassword: too short"
        );
    }

    #[test]
    fn test_error_message_from_message_field() {
        let body = r#"{"message":"Invalid credentials"}"#;
        assert_eq!(
            error_message(StatusCode::UNAUTHORIZED, body),
            "Invalid credentials"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_reason() {
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "Internal Server Error"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, "{}"), "Not Found");
    }
}
