use crate::env_config::models::app_setting::AppSettings;
use crate::services::practicum::client::TraitHomeworkApi;
use crate::services::telegram::messenger::TraitMessenger;
use crate::utils::clock::TraitClock;

use std::sync::Arc;

/// Контекст бота: настройки и внешние зависимости, которые подменяются в тестах
pub struct AppState {
    pub settings: Arc<AppSettings>,
    pub homework_api: Arc<dyn TraitHomeworkApi + Send + Sync>,
    pub messenger: Arc<dyn TraitMessenger + Send + Sync>,
    pub clock: Arc<dyn TraitClock + Send + Sync>,
}

impl AppState {
    pub fn new(
        settings: Arc<AppSettings>,
        homework_api: Arc<dyn TraitHomeworkApi + Send + Sync>,
        messenger: Arc<dyn TraitMessenger + Send + Sync>,
        clock: Arc<dyn TraitClock + Send + Sync>,
    ) -> Self {
        Self {
            settings,
            homework_api,
            messenger,
            clock,
        }
    }
}
