use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::progress::SubmitOutcome;
use super::{default_level, default_true, id_string};

/// User roles as understood by the client.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UserRole {
    #[default]
    Student,
    Admin,
    /// Unknown role text, kept verbatim.
    Other(String),
}

impl UserRole {
    /// Parses the role text sent by the backend. `user` is the legacy name
    /// for a student.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("admin") {
            UserRole::Admin
        } else if trimmed.eq_ignore_ascii_case("student") || trimmed.eq_ignore_ascii_case("user") {
            UserRole::Student
        } else {
            UserRole::Other(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            UserRole::Student => "STUDENT",
            UserRole::Admin => "ADMIN",
            UserRole::Other(raw) => raw,
        }
    }
}

/// User profile returned by `/users/me` and `/admin/users`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "id_string::deserialize")]
    pub id: String,
    pub email: String,
    #[serde(default, alias = "name")]
    pub user_name: Option<String>,
    /// Role text exactly as the server sent it.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default = "default_level")]
    pub current_level: u16,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub stars: u32,
    #[serde(default = "default_true", alias = "isActive")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn role_kind(&self) -> UserRole {
        self.role.as_deref().map(UserRole::parse).unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.role_kind() == UserRole::Admin
    }

    pub fn role_text(&self) -> &str {
        self.role.as_deref().unwrap_or(UserRole::Student.as_str())
    }

    pub fn display_name(&self) -> &str {
        self.user_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }

    /// Folds a submission result into the cached profile so points, level
    /// and stars change without waiting for a `/users/me` round trip.
    pub fn apply_progress(&mut self, outcome: &SubmitOutcome) {
        if let Some(points) = outcome.user_points {
            self.points = points;
        } else if outcome.points_awarded > 0 {
            self.points = self.points.saturating_add(outcome.points_awarded as u32);
        }
        if let Some(level) = outcome.new_level {
            self.current_level = level;
        }
        self.stars = self.stars.saturating_add(outcome.stars_awarded);
    }
}

/// Request to update the current user's profile
#[derive(Debug, Clone, Default, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(
        min = 2,
        max = 100,
        message = "User name must be between 2 and 100 characters"
    ))]
    pub user_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: Option<String>,
}

impl UpdateProfile {
    pub fn is_empty(&self) -> bool {
        self.user_name.is_none() && self.password.is_none()
    }
}

/// Partial update sent by the admin view
#[derive(Debug, Clone, Serialize)]
pub struct AdminUserPatch {
    pub active: bool,
}
