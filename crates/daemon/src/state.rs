use std::sync::Arc;

use crate::auth::AuthClient;
use crate::config::Config;
use crate::db::Database;
use crate::llm::StoryboardClient;
use crate::sessions::SessionStore;
use crate::videogen::VideoGenClient;

/// Shared handles for request handlers and background tasks.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<Database>,
    pub sessions: Arc<SessionStore>,
    pub storyboards: Arc<StoryboardClient>,
    pub videogen: Arc<VideoGenClient>,
    pub auth: Arc<AuthClient>,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        AppState {
            storyboards: Arc::new(StoryboardClient::new(&config)),
            videogen: Arc::new(VideoGenClient::new(&config)),
            auth: Arc::new(AuthClient::new(&config)),
            sessions: Arc::new(SessionStore::new()),
            db: Arc::new(db),
            config: Arc::new(config),
        }
    }

    /// State backed by an in-memory database, for tests.
    #[cfg(test)]
    pub fn for_tests(config: Config) -> anyhow::Result<Self> {
        Ok(Self::new(config, Database::open_in_memory()?))
    }
}
