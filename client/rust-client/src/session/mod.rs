use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use crate::error::ApiResult;

pub mod file_store;

pub use file_store::FileSessionStore;

/// Tokens and user id persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Credentials {
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user_id.is_none()
    }
}

/// Storage for session credentials, injected into the API client.
///
/// The client reads the store on every request, so a token written by the
/// refresh cycle is picked up by the replayed request and everything after it.
pub trait SessionStore: Send + Sync {
    fn get(&self) -> Credentials;
    fn set(&self, credentials: Credentials) -> ApiResult<()>;
    fn clear(&self) -> ApiResult<()>;
}

/// Process-local store used by tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: RwLock<Credentials>,
}

impl MemorySessionStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            inner: RwLock::new(credentials),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Credentials {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set(&self, credentials: Credentials) -> ApiResult<()> {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = credentials;
        Ok(())
    }

    fn clear(&self) -> ApiResult<()> {
        self.set(Credentials::default())
    }
}
