use std::sync::Arc;
use std::time::Duration;

use crate::application::ChatService;
use crate::infrastructure::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(chat: Arc<ChatService>, config: AppConfig) -> Self {
        Self {
            chat,
            config: Arc::new(config),
        }
    }

    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.config.llm.timeout_seconds)
    }
}
