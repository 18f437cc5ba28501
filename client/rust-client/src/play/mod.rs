//! Play session: the task / answer / feedback / advance loop.
//!
//! The controller only sees the [`PlayApi`] and [`ProgressSink`] traits, so the
//! HTTP layer and the session layer can be swapped for fakes in tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::models::{ProgressSubmitRequest, SubmitOutcome, Task, TaskWithProgress, User};

pub mod controller;
pub mod hint;

pub use controller::{PlayController, PlayPhase};

/// Play endpoints used by the controller.
#[async_trait]
pub trait PlayApi: Send + Sync {
    async fn generate_task(&self, level: u16, user_id: &str) -> ApiResult<TaskWithProgress>;

    async fn submit_progress(
        &self,
        user_id: &str,
        request: &ProgressSubmitRequest,
    ) -> ApiResult<SubmitOutcome>;

    async fn fetch_task(&self, task_id: &str) -> ApiResult<Task>;
}

/// Receives submission results so the cached user reflects them immediately.
pub trait ProgressSink: Send + Sync {
    fn apply_progress(&self, outcome: &SubmitOutcome);

    /// Level the next task should be generated for.
    fn current_level(&self) -> Option<u16> {
        None
    }
}

/// The subset of the user the controller needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub user_id: String,
    pub level: u16,
}

impl From<&User> for PlayerIdentity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            level: user.current_level.max(1),
        }
    }
}

/// Shared flag telling in-flight calls whether their view is still mounted.
#[derive(Debug, Clone)]
pub struct MountHandle(Arc<AtomicBool>);

impl MountHandle {
    pub(crate) fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn unmount(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
