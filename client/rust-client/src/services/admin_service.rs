use reqwest::{Method, StatusCode};
use validator::Validate;

use crate::api::{path_segment, ApiClient, ApiRequest};
use crate::error::{ApiError, ApiResult};
use crate::models::{AdminUserPatch, CreateLearningLevel, LearningLevel, UpdateLearningLevel, User};

const LEVELS_PATH: &str = "/admin/learning-levels";

/// Administrator endpoints: user management and learning-level metadata.
#[derive(Debug, Clone)]
pub struct AdminService {
    api: ApiClient,
}

impl AdminService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Local check before calling admin endpoints; the server enforces it again.
    pub fn ensure_admin(user: Option<&User>) -> ApiResult<()> {
        match user {
            Some(user) if user.is_admin() => Ok(()),
            Some(_) => Err(ApiError::Validation(
                "Administrator role required".to_string(),
            )),
            None => Err(ApiError::Validation("Login required".to_string())),
        }
    }

    pub async fn list_users(&self) -> ApiResult<Vec<User>> {
        self.api.get_json("/admin/users").await
    }

    /// Activates or deactivates a user.
    ///
    /// Older backends have no admin route for this and accept the same patch
    /// on `/users/{id}`; that route is tried when the admin one answers 404/405.
    pub async fn update_user_active(&self, user_id: &str, active: bool) -> ApiResult<()> {
        let patch = AdminUserPatch { active };
        let segment = path_segment(user_id);

        let primary = self
            .api
            .send_empty(ApiRequest::with_json(
                Method::PATCH,
                format!("/admin/users/{}", segment),
                &patch,
            )?)
            .await;

        let missing_route = primary.as_ref().err().and_then(ApiError::status).filter(|s| {
            *s == StatusCode::NOT_FOUND || *s == StatusCode::METHOD_NOT_ALLOWED
        });

        match missing_route {
            Some(status) => {
                tracing::warn!(
                    user_id,
                    status = status.as_u16(),
                    "Admin user route unavailable, falling back to /users/{{id}}"
                );
                self.api
                    .send_empty(ApiRequest::with_json(
                        Method::PATCH,
                        format!("/users/{}", segment),
                        &patch,
                    )?)
                    .await?;
            }
            None => primary?,
        }

        tracing::info!(user_id, active, "User activity updated");
        Ok(())
    }

    /// Learning levels ordered by level number.
    pub async fn list_levels(&self) -> ApiResult<Vec<LearningLevel>> {
        let mut levels: Vec<LearningLevel> = self.api.get_json(LEVELS_PATH).await?;
        levels.sort_by_key(|l| l.level);
        Ok(levels)
    }

    pub async fn get_level(&self, level: u16) -> ApiResult<LearningLevel> {
        self.api
            .get_json(&format!("{}/{}", LEVELS_PATH, level))
            .await
    }

    pub async fn create_level(&self, request: &CreateLearningLevel) -> ApiResult<LearningLevel> {
        request.validate()?;
        let created: LearningLevel = self.api.post_json(LEVELS_PATH, request).await?;
        tracing::info!(level = created.level, "Learning level created");
        Ok(created)
    }

    pub async fn update_level(
        &self,
        level: u16,
        request: &UpdateLearningLevel,
    ) -> ApiResult<LearningLevel> {
        request.validate()?;
        let updated: LearningLevel = self
            .api
            .put_json(&format!("{}/{}", LEVELS_PATH, level), request)
            .await?;
        tracing::info!(level, "Learning level updated");
        Ok(updated)
    }

    pub async fn delete_level(&self, level: u16) -> ApiResult<()> {
        self.api
            .delete(&format!("{}/{}", LEVELS_PATH, level))
            .await?;
        tracing::info!(level, "Learning level deleted");
        Ok(())
    }
}
