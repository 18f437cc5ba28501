use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{default_level, default_true, id_string};

/// A generated quiz task. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "id_string::deserialize")]
    pub id: String,
    #[serde(default = "default_level")]
    pub level: u16,
    #[serde(alias = "question")]
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    /// Only present when the backend exposes the answer (admin views, after submit).
    #[serde(default)]
    pub correct_option_index: Option<usize>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default, deserialize_with = "id_string::option::deserialize")]
    pub created_by_id: Option<String>,
    #[serde(default = "default_true", alias = "isActive")]
    pub active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_single_choice(&self) -> bool {
        !self.options.is_empty()
    }
}

/// Response of `POST /tasks/generate`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWithProgress {
    pub task: Task,
    #[serde(deserialize_with = "id_string::deserialize")]
    pub progress_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTaskRequest {
    pub level: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_id: Option<String>,
}

/// Body of `PATCH /tasks/{id}`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskActivePatch {
    pub is_active: bool,
}

/// Filters for `GET /tasks`
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub level: Option<u16>,
    pub active: Option<bool>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl TaskQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(level) = self.level {
            pairs.push(("level".to_string(), level.to_string()));
        }
        if let Some(active) = self.active {
            pairs.push(("isActive".to_string(), active.to_string()));
        }
        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = self.size {
            pairs.push(("size".to_string(), size.to_string()));
        }
        pairs
    }
}

/// One page of the task catalogue.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawTaskPage")]
pub struct TaskPage {
    pub items: Vec<Task>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpringPage {
    content: Vec<Task>,
    #[serde(default)]
    total_elements: Option<u64>,
    #[serde(default)]
    number: u32,
    #[serde(default)]
    size: Option<u32>,
}

// The list endpoint answers with a Spring page; older builds return a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTaskPage {
    Paged(SpringPage),
    List(Vec<Task>),
}

impl From<RawTaskPage> for TaskPage {
    fn from(raw: RawTaskPage) -> Self {
        match raw {
            RawTaskPage::Paged(page) => {
                let len = page.content.len();
                TaskPage {
                    total: page.total_elements.unwrap_or(len as u64),
                    page: page.number,
                    size: page.size.unwrap_or(len as u32),
                    items: page.content,
                }
            }
            RawTaskPage::List(items) => TaskPage {
                total: items.len() as u64,
                page: 0,
                size: items.len() as u32,
                items,
            },
        }
    }
}
