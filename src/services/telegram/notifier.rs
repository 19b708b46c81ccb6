// File: src/services/telegram/notifier.rs
use super::messenger::TraitMessenger;
use crate::error::BotError;
use crate::services::homework::record::HomeworkRecord;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Формирует уведомления о статусе и отправляет их через мессенджер
pub struct StatusNotifier {
    messenger: Arc<dyn TraitMessenger + Send + Sync>,
}

impl StatusNotifier {
    pub fn new(messenger: Arc<dyn TraitMessenger + Send + Sync>) -> Self {
        Self { messenger }
    }

    /// Разбирает сырую запись из ответа API и сообщает о её статусе.
    /// Ошибки разбора (в т.ч. неизвестный статус) возвращаются до отправки.
    pub async fn notify_raw(&self, homework: &Value) -> Result<HomeworkRecord, BotError> {
        let record = HomeworkRecord::try_from(homework)?;
        self.notify(&record).await?;
        Ok(record)
    }

    pub async fn notify(&self, record: &HomeworkRecord) -> Result<(), BotError> {
        info!(
            "Homework \"{}\" changed status to {}",
            record.name, record.status
        );
        self.send(&record.message()).await
    }

    pub async fn send(&self, text: &str) -> Result<(), BotError> {
        self.messenger.send_message(text).await.map_err(|err| {
            error!("Failed to send message: {}", err);
            BotError::from(err)
        })
    }
}
