use validator::Validate;

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::models::{UpdateProfile, User};

#[derive(Debug, Clone)]
pub struct ProfileService {
    api: ApiClient,
}

impl ProfileService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn update_me(&self, update: &UpdateProfile) -> ApiResult<User> {
        if update.is_empty() {
            return Err(ApiError::Validation("Nothing to update".to_string()));
        }
        update.validate()?;
        let user: User = self.api.patch_json("/users/me", update).await?;
        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    pub async fn delete_me(&self) -> ApiResult<()> {
        self.api.delete("/users/me").await?;
        tracing::info!("Account deleted");
        Ok(())
    }
}
