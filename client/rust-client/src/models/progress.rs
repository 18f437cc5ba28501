use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id_string;

/// Body of `POST /progress/submit`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSubmitRequest {
    pub progress_id: String,
    pub selected_option_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_taken_ms: Option<u64>,
}

/// Result of an answer submission.
///
/// The server has sent the correctness flag as both `correct` and
/// `isCorrect`; either is accepted, a response with neither is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    #[serde(default, deserialize_with = "id_string::option::deserialize")]
    pub progress_id: Option<String>,
    #[serde(alias = "isCorrect")]
    pub correct: bool,
    #[serde(default)]
    pub points_awarded: i32,
    /// Total points after this submission.
    #[serde(default)]
    pub user_points: Option<u32>,
    #[serde(default)]
    pub stars_awarded: u32,
    #[serde(default)]
    pub leveled_up: bool,
    #[serde(default)]
    pub new_level: Option<u16>,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Attempt history entry from `GET /progress/all`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(deserialize_with = "id_string::deserialize")]
    pub id: String,
    #[serde(default, deserialize_with = "id_string::option::deserialize")]
    pub task_id: Option<String>,
    #[serde(default)]
    pub attempt_number: u32,
    #[serde(default)]
    pub selected_option_index: Option<usize>,
    #[serde(alias = "isCorrect")]
    pub correct: bool,
    #[serde(default)]
    pub points_awarded: i32,
    #[serde(default)]
    pub time_taken_ms: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
