use super::vocabulary::HomeworkStatus;
use crate::error::ProtocolError;
use serde_json::Value;
use std::str::FromStr;
use tracing::error;

/// Домашняя работа из ответа API, уже с проверенным статусом
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomeworkRecord {
    pub name: String,
    pub status: HomeworkStatus,
}

impl HomeworkRecord {
    /// Текст уведомления об изменении статуса
    pub fn message(&self) -> String {
        format!(
            "Изменился статус проверки работы \"{}\". {}",
            self.name,
            self.status.verdict()
        )
    }
}

impl TryFrom<&Value> for HomeworkRecord {
    type Error = ProtocolError;

    fn try_from(homework: &Value) -> Result<Self, Self::Error> {
        let name = homework
            .get("homework_name")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                error!("Homework has no homework_name: {}", homework);
                ProtocolError::MissingField("homework_name")
            })?;

        let status = homework
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                error!("Homework has no status: {}", homework);
                ProtocolError::MissingField("status")
            })?;

        // Статус проверяется до обращения к словарю вердиктов
        let status = HomeworkStatus::from_str(status).inspect_err(|_| {
            error!("Undocumented homework status: {}", status);
        })?;

        Ok(Self {
            name: name.to_string(),
            status,
        })
    }
}
