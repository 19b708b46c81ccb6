use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Источник текущего времени и пауз для цикла опроса
#[async_trait]
pub trait TraitClock {
    /// Текущее время, Unix timestamp в секундах
    fn now(&self) -> i64;

    async fn sleep(&self, duration: Duration);
}

pub struct StructSystemClock;

#[async_trait]
impl TraitClock for StructSystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// Форматирование метки времени для логов
pub fn format_timestamp(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
