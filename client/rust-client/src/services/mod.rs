use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::ApiResult;
use crate::session::{FileSessionStore, SessionStore};

pub mod admin_service;
pub mod auth_service;
pub mod play_service;
pub mod profile_service;

pub use admin_service::AdminService;
pub use auth_service::AuthService;
pub use play_service::PlayService;
pub use profile_service::ProfileService;

/// Everything a front-end needs, built once from configuration.
pub struct ClientState {
    pub config: Config,
    pub api: ApiClient,
    pub auth: Arc<AuthService>,
    pub play: Arc<PlayService>,
    pub profile: ProfileService,
    pub admin: AdminService,
}

impl ClientState {
    /// Builds the state with a file-backed session store at `config.session_file`.
    pub fn new(config: Config) -> ApiResult<Self> {
        config.validate()?;
        let store: Arc<dyn SessionStore> =
            Arc::new(FileSessionStore::open(config.session_file.clone())?);
        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Arc<dyn SessionStore>) -> ApiResult<Self> {
        let api = ApiClient::new(&config.api_base_url, store, config.request_timeout())?;

        tracing::debug!(
            base_url = %api.base_url(),
            timeout_secs = config.request_timeout_secs,
            "Client state initialized"
        );

        Ok(Self {
            auth: Arc::new(AuthService::new(api.clone())),
            play: Arc::new(PlayService::new(api.clone())),
            profile: ProfileService::new(api.clone()),
            admin: AdminService::new(api.clone()),
            api,
            config,
        })
    }
}
