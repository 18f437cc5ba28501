pub mod api;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod play;
pub mod services;
pub mod session;

pub use api::ApiClient;
pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use play::{PlayController, PlayerIdentity};
pub use services::ClientState;
pub use session::{Credentials, FileSessionStore, MemorySessionStore, SessionStore};
