use std::sync::Arc;
use std::time::Instant;

use super::hint::probable_correct_index;
use super::{MountHandle, PlayApi, PlayerIdentity, ProgressSink};
use crate::error::{ApiError, ApiResult};
use crate::models::{ProgressSubmitRequest, SubmitOutcome, Task, TaskWithProgress};

/// Where the play loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayPhase {
    /// No task loaded yet.
    Idle,
    /// Task shown, no option chosen.
    AwaitingTask,
    /// Option chosen, not yet submitted.
    Answering,
    /// Feedback for the last submission is visible.
    Submitted,
}

/// Drives one play view.
///
/// All transitions go through `&mut self`, so a controller is used from a
/// single task. Network work goes through [`PlayApi`]; results are pushed to
/// the [`ProgressSink`].
pub struct PlayController {
    api: Arc<dyn PlayApi>,
    sink: Arc<dyn ProgressSink>,
    user: Option<PlayerIdentity>,
    mount: MountHandle,
    initial_loaded: bool,

    current_task: Option<Task>,
    progress_id: Option<String>,
    feedback_visible: bool,
    last_result: Option<SubmitOutcome>,
    selected_option: Option<usize>,
    revealed_explanation: Option<String>,
    display_correct_index: Option<usize>,
    level_up_notice: bool,
    loading: bool,
    error: Option<String>,

    // Kept out of `current_task` until the answer is submitted.
    withheld_explanation: Option<String>,
    shown_at: Option<Instant>,
}

impl PlayController {
    pub fn new(
        api: Arc<dyn PlayApi>,
        sink: Arc<dyn ProgressSink>,
        user: Option<PlayerIdentity>,
    ) -> Self {
        Self {
            api,
            sink,
            user,
            mount: MountHandle::new(),
            initial_loaded: false,
            current_task: None,
            progress_id: None,
            feedback_visible: false,
            last_result: None,
            selected_option: None,
            revealed_explanation: None,
            display_correct_index: None,
            level_up_notice: false,
            loading: false,
            error: None,
            withheld_explanation: None,
            shown_at: None,
        }
    }

    pub fn set_user(&mut self, user: Option<PlayerIdentity>) {
        self.user = user;
    }

    pub fn user(&self) -> Option<&PlayerIdentity> {
        self.user.as_ref()
    }

    pub fn mount_handle(&self) -> MountHandle {
        self.mount.clone()
    }

    pub fn phase(&self) -> PlayPhase {
        if self.feedback_visible {
            PlayPhase::Submitted
        } else if self.current_task.is_none() {
            PlayPhase::Idle
        } else if self.selected_option.is_some() {
            PlayPhase::Answering
        } else {
            PlayPhase::AwaitingTask
        }
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current_task.as_ref()
    }

    pub fn progress_id(&self) -> Option<&str> {
        self.progress_id.as_deref()
    }

    pub fn feedback_visible(&self) -> bool {
        self.feedback_visible
    }

    pub fn last_result(&self) -> Option<&SubmitOutcome> {
        self.last_result.as_ref()
    }

    pub fn selected_option(&self) -> Option<usize> {
        self.selected_option
    }

    pub fn revealed_explanation(&self) -> Option<&str> {
        self.revealed_explanation.as_deref()
    }

    pub fn display_correct_index(&self) -> Option<usize> {
        self.display_correct_index
    }

    pub fn level_up_notice(&self) -> bool {
        self.level_up_notice
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Loads the first task once a user is known. Returns whether a task was
    /// requested; only the first successful generation counts.
    pub async fn mount(&mut self) -> ApiResult<bool> {
        if self.initial_loaded
            || self.loading
            || self.feedback_visible
            || self.current_task.is_some()
        {
            return Ok(false);
        }
        let Some(level) = self.user.as_ref().map(|u| u.level) else {
            return Ok(false);
        };

        let loaded = self.load_task(level).await?;
        if loaded {
            self.initial_loaded = true;
        }
        Ok(loaded)
    }

    pub fn select_option(&mut self, index: usize) -> ApiResult<()> {
        if self.feedback_visible {
            return Err(self.reject("Answer already submitted"));
        }
        let Some(task) = self.current_task.as_ref() else {
            return Err(self.reject("No task loaded"));
        };
        if index >= task.options.len() {
            let message = format!(
                "Option {} is out of range (task has {} options)",
                index + 1,
                task.options.len()
            );
            return Err(self.reject(&message));
        }
        self.selected_option = Some(index);
        self.error = None;
        Ok(())
    }

    /// Submits the selected option. Guard failures never reach the server.
    pub async fn submit(&mut self) -> ApiResult<SubmitOutcome> {
        if self.loading {
            return Err(self.reject("A request is already in progress"));
        }
        if self.feedback_visible {
            return Err(self.reject("Answer already submitted"));
        }
        let Some(user_id) = self.user.as_ref().map(|u| u.user_id.clone()) else {
            return Err(self.reject("Login required"));
        };
        let Some(task) = self.current_task.as_ref() else {
            return Err(self.reject("No task loaded"));
        };
        if !task.is_single_choice() {
            return Err(self.reject("Only single-choice tasks are supported"));
        }
        let task_id = task.id.clone();
        let Some(selected) = self.selected_option else {
            return Err(self.reject("Select an option first"));
        };
        let Some(progress_id) = self.progress_id.clone() else {
            return Err(self.reject("Task has no progress id"));
        };

        let request = ProgressSubmitRequest {
            progress_id,
            selected_option_index: selected,
            time_taken_ms: self.elapsed_ms(),
        };

        self.loading = true;
        self.error = None;
        let result = self.api.submit_progress(&user_id, &request).await;
        if !self.mount.is_mounted() {
            return result;
        }

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                self.loading = false;
                self.error = Some(err.to_string());
                return Err(err);
            }
        };

        tracing::info!(
            task_id = %task_id,
            correct = outcome.correct,
            points_awarded = outcome.points_awarded,
            leveled_up = outcome.leveled_up,
            "Answer submitted"
        );

        self.feedback_visible = true;
        self.revealed_explanation = outcome
            .explanation
            .clone()
            .or_else(|| self.withheld_explanation.take());
        self.level_up_notice = outcome.leveled_up;
        if let (Some(user), Some(level)) = (self.user.as_mut(), outcome.new_level) {
            user.level = level.max(1);
        }
        self.sink.apply_progress(&outcome);
        self.last_result = Some(outcome.clone());

        match self.api.fetch_task(&task_id).await {
            Ok(full) if self.mount.is_mounted() => {
                if full.correct_option_index.is_some() {
                    self.display_correct_index = full.correct_option_index;
                }
                if self.revealed_explanation.is_none() {
                    self.revealed_explanation = full.explanation;
                }
            }
            Ok(_) => return Ok(outcome),
            Err(err) => {
                tracing::debug!(task_id = %task_id, error = %err, "Task detail fetch after submit failed");
            }
        }

        self.loading = false;
        Ok(outcome)
    }

    /// Moves past the feedback to a fresh task. A no-op while feedback is
    /// not visible.
    pub async fn advance(&mut self) -> ApiResult<bool> {
        if !self.feedback_visible || self.loading {
            return Ok(false);
        }
        let Some(user_level) = self.user.as_ref().map(|u| u.level) else {
            return Err(self.reject("Login required"));
        };
        let level = self.sink.current_level().unwrap_or(user_level).max(1);

        let previous_result = self.last_result.take();
        self.feedback_visible = false;
        self.level_up_notice = false;

        match self.load_task(level).await {
            Ok(loaded) => Ok(loaded),
            Err(err) => {
                // Keep the feedback on screen so the user can try again.
                self.feedback_visible = true;
                self.last_result = previous_result;
                Err(err)
            }
        }
    }

    pub fn dismiss_level_up(&mut self) {
        self.level_up_notice = false;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    async fn load_task(&mut self, level: u16) -> ApiResult<bool> {
        let Some(user_id) = self.user.as_ref().map(|u| u.user_id.clone()) else {
            return Ok(false);
        };

        self.loading = true;
        self.error = None;
        let result = self.api.generate_task(level, &user_id).await;
        if !self.mount.is_mounted() {
            return result.map(|_| false);
        }
        self.loading = false;

        match result {
            Ok(generated) => {
                tracing::debug!(
                    task_id = %generated.task.id,
                    progress_id = %generated.progress_id,
                    level,
                    "Task generated"
                );
                self.install(generated);
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(level, error = %err, "Task generation failed");
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    fn install(&mut self, generated: TaskWithProgress) {
        let TaskWithProgress {
            mut task,
            progress_id,
        } = generated;

        self.withheld_explanation = task.explanation.take();
        self.display_correct_index = task
            .correct_option_index
            .or_else(|| probable_correct_index(&task.prompt, &task.options));
        self.current_task = Some(task);
        self.progress_id = Some(progress_id);
        self.selected_option = None;
        self.last_result = None;
        self.feedback_visible = false;
        self.revealed_explanation = None;
        self.shown_at = Some(Instant::now());
    }

    fn elapsed_ms(&self) -> Option<u64> {
        self.shown_at
            .map(|at| u64::try_from(at.elapsed().as_millis()).unwrap_or(u64::MAX))
    }

    fn reject(&mut self, message: &str) -> ApiError {
        self.error = Some(message.to_string());
        ApiError::Validation(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn task(id: &str, prompt: &str, options: &[&str]) -> Task {
        Task {
            id: id.to_string(),
            level: 1,
            prompt: prompt.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_option_index: None,
            explanation: Some("3 + 4 = 7".to_string()),
            created_by_id: None,
            active: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn outcome(correct: bool) -> SubmitOutcome {
        SubmitOutcome {
            progress_id: Some("p1".into()),
            correct,
            points_awarded: if correct { 1 } else { 0 },
            user_points: None,
            stars_awarded: 0,
            leveled_up: false,
            new_level: None,
            explanation: None,
        }
    }

    #[derive(Default)]
    struct FakeApi {
        tasks: Mutex<VecDeque<ApiResult<TaskWithProgress>>>,
        outcomes: Mutex<VecDeque<ApiResult<SubmitOutcome>>>,
        detail: Mutex<Option<Task>>,
        generate_calls: AtomicUsize,
        submit_calls: AtomicUsize,
        levels: Mutex<Vec<u16>>,
        submitted: Mutex<Vec<ProgressSubmitRequest>>,
        /// Unmounted while the next generate call is in flight.
        unmount_on_generate: Mutex<Option<MountHandle>>,
    }

    impl FakeApi {
        fn push_task(&self, t: Task, progress_id: &str) {
            self.tasks.lock().unwrap().push_back(Ok(TaskWithProgress {
                task: t,
                progress_id: progress_id.to_string(),
            }));
        }

        fn push_task_error(&self) {
            self.tasks.lock().unwrap().push_back(Err(ApiError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: "generator down".into(),
            }));
        }

        fn push_outcome(&self, o: SubmitOutcome) {
            self.outcomes.lock().unwrap().push_back(Ok(o));
        }
    }

    #[async_trait]
    impl PlayApi for FakeApi {
        async fn generate_task(&self, level: u16, _user_id: &str) -> ApiResult<TaskWithProgress> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            self.levels.lock().unwrap().push(level);
            if let Some(handle) = self.unmount_on_generate.lock().unwrap().take() {
                handle.unmount();
            }
            self.tasks
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Decode("no task queued".into())))
        }

        async fn submit_progress(
            &self,
            _user_id: &str,
            request: &ProgressSubmitRequest,
        ) -> ApiResult<SubmitOutcome> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            self.submitted.lock().unwrap().push(request.clone());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Decode("no outcome queued".into())))
        }

        async fn fetch_task(&self, task_id: &str) -> ApiResult<Task> {
            self.detail.lock().unwrap().clone().ok_or(ApiError::Status {
                status: StatusCode::NOT_FOUND,
                message: format!("task {} not found", task_id),
            })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        applied: Mutex<Vec<SubmitOutcome>>,
        level: Mutex<Option<u16>>,
    }

    impl ProgressSink for RecordingSink {
        fn apply_progress(&self, outcome: &SubmitOutcome) {
            if let Some(level) = outcome.new_level {
                *self.level.lock().unwrap() = Some(level);
            }
            self.applied.lock().unwrap().push(outcome.clone());
        }

        fn current_level(&self) -> Option<u16> {
            *self.level.lock().unwrap()
        }
    }

    fn player() -> Option<PlayerIdentity> {
        Some(PlayerIdentity {
            user_id: "u1".into(),
            level: 2,
        })
    }

    fn setup() -> (Arc<FakeApi>, Arc<RecordingSink>, PlayController) {
        let api = Arc::new(FakeApi::default());
        let sink = Arc::new(RecordingSink::default());
        let controller = PlayController::new(api.clone(), sink.clone(), player());
        (api, sink, controller)
    }

    #[tokio::test]
    async fn test_mount_generates_for_user_level_once() {
        let (api, _sink, mut controller) = setup();
        api.push_task(task("1", "Ile to 3 + 4?", &["5", "7"]), "p1");

        assert!(controller.mount().await.unwrap());
        assert!(!controller.mount().await.unwrap());

        assert_eq!(api.generate_calls.load(Ordering::SeqCst), 1);
        assert_eq!(*api.levels.lock().unwrap(), vec![2]);
        assert_eq!(controller.progress_id(), Some("p1"));
        assert_eq!(controller.phase(), PlayPhase::AwaitingTask);
    }

    #[tokio::test]
    async fn test_mount_without_user_is_noop() {
        let api = Arc::new(FakeApi::default());
        let sink = Arc::new(RecordingSink::default());
        let mut controller = PlayController::new(api.clone(), sink, None);

        assert!(!controller.mount().await.unwrap());
        assert_eq!(api.generate_calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.phase(), PlayPhase::Idle);
    }

    #[tokio::test]
    async fn test_explanation_hidden_until_submitted() {
        let (api, _sink, mut controller) = setup();
        api.push_task(task("1", "Ile to 3 + 4?", &["5", "7"]), "p1");
        api.push_outcome(outcome(true));
        controller.mount().await.unwrap();

        assert!(controller.current_task().unwrap().explanation.is_none());
        assert!(controller.revealed_explanation().is_none());

        controller.select_option(1).unwrap();
        controller.submit().await.unwrap();
        assert_eq!(controller.revealed_explanation(), Some("3 + 4 = 7"));
    }

    #[tokio::test]
    async fn test_submit_without_selection_never_contacts_server() {
        let (api, _sink, mut controller) = setup();
        api.push_task(task("1", "Ile to 3 + 4?", &["5", "7"]), "p1");
        controller.mount().await.unwrap();

        let err = controller.submit().await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(controller.error(), Some("Select an option first"));
        assert_eq!(api.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_task_without_options_is_rejected() {
        let (api, _sink, mut controller) = setup();
        api.push_task(task("1", "Opisz dodawanie", &[]), "p1");
        controller.mount().await.unwrap();

        assert!(controller.select_option(0).is_err());
        let err = controller.submit().await.unwrap_err();
        assert!(err.to_string().contains("single-choice"));
        assert_eq!(api.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_select_out_of_range_rejected() {
        let (api, _sink, mut controller) = setup();
        api.push_task(task("1", "Ile to 3 + 4?", &["5", "7"]), "p1");
        controller.mount().await.unwrap();

        assert!(controller.select_option(2).is_err());
        assert_eq!(controller.selected_option(), None);
        controller.select_option(0).unwrap();
        assert_eq!(controller.phase(), PlayPhase::Answering);
        assert!(controller.error().is_none());
    }

    #[tokio::test]
    async fn test_submit_sends_selection_and_notifies_sink() {
        let (api, sink, mut controller) = setup();
        api.push_task(task("1", "Ile to 3 + 4?", &["5", "7"]), "p1");
        api.push_outcome(SubmitOutcome {
            leveled_up: true,
            new_level: Some(3),
            ..outcome(true)
        });
        controller.mount().await.unwrap();
        controller.select_option(1).unwrap();

        let result = controller.submit().await.unwrap();
        assert!(result.correct);

        let submitted = api.submitted.lock().unwrap().clone();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].progress_id, "p1");
        assert_eq!(submitted[0].selected_option_index, 1);
        assert!(submitted[0].time_taken_ms.is_some());

        assert_eq!(sink.applied.lock().unwrap().len(), 1);
        assert!(controller.feedback_visible());
        assert!(controller.level_up_notice());
        assert_eq!(controller.phase(), PlayPhase::Submitted);
        assert!(controller.select_option(0).is_err());
    }

    #[tokio::test]
    async fn test_feedback_blocks_mount_until_advance() {
        let (api, _sink, mut controller) = setup();
        api.push_task(task("1", "Ile to 3 + 4?", &["5", "7"]), "p1");
        api.push_outcome(outcome(false));
        controller.mount().await.unwrap();
        controller.select_option(0).unwrap();
        controller.submit().await.unwrap();

        assert!(!controller.mount().await.unwrap());
        assert_eq!(api.generate_calls.load(Ordering::SeqCst), 1);

        api.push_task(task("2", "Ile to 1 + 1?", &["2", "3"]), "p2");
        assert!(controller.advance().await.unwrap());
        assert!(!controller.feedback_visible());
        assert!(controller.last_result().is_none());
        assert_eq!(controller.progress_id(), Some("p2"));
        assert_eq!(api.generate_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_advance_without_feedback_is_noop() {
        let (api, _sink, mut controller) = setup();
        api.push_task(task("1", "Ile to 3 + 4?", &["5", "7"]), "p1");
        controller.mount().await.unwrap();

        assert!(!controller.advance().await.unwrap());
        assert_eq!(api.generate_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_advance_uses_updated_level() {
        let (api, _sink, mut controller) = setup();
        api.push_task(task("1", "Ile to 3 + 4?", &["5", "7"]), "p1");
        api.push_outcome(SubmitOutcome {
            leveled_up: true,
            new_level: Some(3),
            ..outcome(true)
        });
        api.push_task(task("2", "Ile to 10 + 5?", &["15"]), "p2");

        controller.mount().await.unwrap();
        controller.select_option(1).unwrap();
        controller.submit().await.unwrap();
        controller.advance().await.unwrap();

        assert_eq!(*api.levels.lock().unwrap(), vec![2, 3]);
        assert!(!controller.level_up_notice());
    }

    #[tokio::test]
    async fn test_failed_advance_keeps_feedback_for_retry() {
        let (api, _sink, mut controller) = setup();
        api.push_task(task("1", "Ile to 3 + 4?", &["5", "7"]), "p1");
        api.push_outcome(outcome(true));
        controller.mount().await.unwrap();
        controller.select_option(1).unwrap();
        controller.submit().await.unwrap();

        api.push_task_error();
        assert!(controller.advance().await.is_err());
        assert!(controller.feedback_visible());
        assert!(controller.last_result().is_some());
        assert_eq!(controller.progress_id(), Some("p1"));
        assert!(controller.error().is_some());

        api.push_task(task("2", "Ile to 1 + 1?", &["2"]), "p2");
        assert!(controller.advance().await.unwrap());
        assert!(controller.error().is_none());
    }

    #[tokio::test]
    async fn test_failed_submit_can_be_retried() {
        let (api, _sink, mut controller) = setup();
        api.push_task(task("1", "Ile to 3 + 4?", &["5", "7"]), "p1");
        api.outcomes.lock().unwrap().push_back(Err(ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            message: "down".into(),
        }));
        api.push_outcome(outcome(true));
        controller.mount().await.unwrap();
        controller.select_option(1).unwrap();

        assert!(controller.submit().await.is_err());
        assert!(!controller.feedback_visible());
        assert_eq!(controller.progress_id(), Some("p1"));
        assert!(!controller.is_loading());

        assert!(controller.submit().await.unwrap().correct);
        assert_eq!(api.submit_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dismiss_level_up_only_clears_notice() {
        let (api, _sink, mut controller) = setup();
        api.push_task(task("1", "Ile to 3 + 4?", &["5", "7"]), "p1");
        api.push_outcome(SubmitOutcome {
            leveled_up: true,
            ..outcome(true)
        });
        controller.mount().await.unwrap();
        controller.select_option(1).unwrap();
        controller.submit().await.unwrap();

        controller.dismiss_level_up();
        assert!(!controller.level_up_notice());
        assert!(controller.feedback_visible());
        assert!(controller.last_result().is_some());
    }

    #[tokio::test]
    async fn test_server_detail_overrides_display_hint() {
        let (api, _sink, mut controller) = setup();
        api.push_task(task("1", "Ile to 3 + 4?", &["5", "7"]), "p1");
        api.push_outcome(outcome(false));
        let mut detail = task("1", "Ile to 3 + 4?", &["5", "7"]);
        detail.correct_option_index = Some(0);
        *api.detail.lock().unwrap() = Some(detail);

        controller.mount().await.unwrap();
        assert_eq!(controller.display_correct_index(), Some(1));

        controller.select_option(1).unwrap();
        controller.submit().await.unwrap();
        assert_eq!(controller.display_correct_index(), Some(0));
    }

    #[tokio::test]
    async fn test_unmounted_completion_is_ignored() {
        let (api, sink, mut controller) = setup();
        api.push_task(task("1", "Ile to 3 + 4?", &["5", "7"]), "p1");
        api.push_outcome(outcome(true));
        controller.mount().await.unwrap();
        controller.select_option(1).unwrap();

        controller.mount_handle().unmount();
        let result = controller.submit().await.unwrap();

        assert!(result.correct);
        assert!(!controller.feedback_visible());
        assert!(sink.applied.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unmount_during_mount_skips_install() {
        let (api, sink, mut controller) = setup();
        api.push_task(task("1", "Ile to 3 + 4?", &["5", "7"]), "p1");
        *api.unmount_on_generate.lock().unwrap() = Some(controller.mount_handle());

        assert!(!controller.mount().await.unwrap());

        assert_eq!(api.generate_calls.load(Ordering::SeqCst), 1);
        assert!(controller.current_task().is_none());
        assert!(controller.progress_id().is_none());
        assert_eq!(controller.phase(), PlayPhase::Idle);
        assert!(sink.applied.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unmount_during_advance_skips_install() {
        let (api, _sink, mut controller) = setup();
        api.push_task(task("1", "Ile to 3 + 4?", &["5", "7"]), "p1");
        api.push_outcome(outcome(true));
        controller.mount().await.unwrap();
        controller.select_option(1).unwrap();
        controller.submit().await.unwrap();

        api.push_task(task("2", "Ile to 1 + 1?", &["2"]), "p2");
        *api.unmount_on_generate.lock().unwrap() = Some(controller.mount_handle());
        assert!(!controller.advance().await.unwrap());

        assert_eq!(api.generate_calls.load(Ordering::SeqCst), 2);
        assert_eq!(controller.current_task().map(|t| t.id.as_str()), Some("1"));
        assert_eq!(controller.progress_id(), Some("p1"));
        assert_eq!(controller.selected_option(), Some(1));
    }
}
