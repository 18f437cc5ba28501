use async_trait::async_trait;
use reqwest::Method;

use crate::api::{path_segment, ApiClient, ApiRequest, USER_ID_HEADER};
use crate::error::ApiResult;
use crate::models::{
    GenerateTaskRequest, ProgressRecord, ProgressSubmitRequest, SubmitOutcome, Task,
    TaskActivePatch, TaskPage, TaskQuery, TaskWithProgress,
};
use crate::play::PlayApi;

/// Task catalogue and progress endpoints.
#[derive(Debug, Clone)]
pub struct PlayService {
    api: ApiClient,
}

impl PlayService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_tasks(&self, query: &TaskQuery) -> ApiResult<TaskPage> {
        self.api
            .send_json(ApiRequest::get("/tasks").query(query.to_pairs()))
            .await
    }

    pub async fn get_task(&self, task_id: &str) -> ApiResult<Task> {
        self.api
            .get_json(&format!("/tasks/{}", path_segment(task_id)))
            .await
    }

    pub async fn generate_task(
        &self,
        level: u16,
        created_by_id: Option<String>,
    ) -> ApiResult<TaskWithProgress> {
        let request = GenerateTaskRequest {
            level: level.max(1),
            created_by_id,
        };
        self.api.post_json("/tasks/generate", &request).await
    }

    /// Activates or deactivates a task in the catalogue.
    pub async fn set_task_active(&self, task_id: &str, active: bool) -> ApiResult<Task> {
        let task: Task = self
            .api
            .patch_json(
                &format!("/tasks/{}", path_segment(task_id)),
                &TaskActivePatch { is_active: active },
            )
            .await?;
        tracing::info!(task_id = %task.id, active = task.active, "Task activity updated");
        Ok(task)
    }

    /// Submits an answer on behalf of `user_id`, sent explicitly so the
    /// attempt is attributed even before the stored session knows the id.
    pub async fn submit_progress(
        &self,
        user_id: &str,
        request: &ProgressSubmitRequest,
    ) -> ApiResult<SubmitOutcome> {
        self.api
            .send_json(
                ApiRequest::with_json(Method::POST, "/progress/submit", request)?
                    .header(USER_ID_HEADER, user_id),
            )
            .await
    }

    pub async fn list_progress(&self) -> ApiResult<Vec<ProgressRecord>> {
        self.api.get_json("/progress/all").await
    }
}

#[async_trait]
impl PlayApi for PlayService {
    async fn generate_task(&self, level: u16, user_id: &str) -> ApiResult<TaskWithProgress> {
        PlayService::generate_task(self, level, Some(user_id.to_string())).await
    }

    async fn submit_progress(
        &self,
        user_id: &str,
        request: &ProgressSubmitRequest,
    ) -> ApiResult<SubmitOutcome> {
        PlayService::submit_progress(self, user_id, request).await
    }

    async fn fetch_task(&self, task_id: &str) -> ApiResult<Task> {
        self.get_task(task_id).await
    }
}
