use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::id_string;

/// Learning level metadata managed from the admin view
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningLevel {
    pub level: u16,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "id_string::option::deserialize")]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "id_string::option::deserialize")]
    pub modified_by: Option<String>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateLearningLevel {
    #[validate(range(min = 1, max = 8, message = "Level must be between 1 and 8"))]
    pub level: u16,

    #[validate(length(min = 1, max = 128, message = "Title must be between 1 and 128 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UpdateLearningLevel {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 128, message = "Title must be between 1 and 128 characters"))]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
