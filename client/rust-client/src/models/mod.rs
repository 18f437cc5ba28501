pub mod auth;
pub mod learning_level;
pub mod progress;
pub mod task;
pub mod user;

pub use auth::{AuthResponse, LoginRequest, RefreshRequest, RegisterRequest};
pub use learning_level::{CreateLearningLevel, LearningLevel, UpdateLearningLevel};
pub use progress::{ProgressRecord, ProgressSubmitRequest, SubmitOutcome};
pub use task::{
    GenerateTaskRequest, Task, TaskActivePatch, TaskPage, TaskQuery, TaskWithProgress,
};
pub use user::{AdminUserPatch, UpdateProfile, User, UserRole};

pub(crate) fn default_level() -> u16 {
    1
}

pub(crate) fn default_true() -> bool {
    true
}

// The backend issues UUIDs, older endpoints and mocks use plain integers.
// Both are kept as strings.
pub(crate) mod id_string {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    impl From<RawId> for String {
        fn from(raw: RawId) -> Self {
            match raw {
                RawId::Text(value) => value,
                RawId::Number(value) => value.to_string(),
            }
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawId::deserialize(deserializer).map(String::from)
    }

    pub mod option {
        use super::RawId;
        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
        }
    }
}
