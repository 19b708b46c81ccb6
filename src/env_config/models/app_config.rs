use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub practicum: PracticumConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PracticumConfig {
    #[serde(default = "default_practicum_endpoint")]
    pub endpoint: String,
    /// Пауза между опросами, если новых статусов нет или произошёл сбой
    #[serde(default = "default_retry_seconds")]
    pub retry_seconds: u64,
    /// Без значения используется поведение HTTP-клиента по умолчанию
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub request_timeout_seconds: Option<u64>,
}

impl PracticumConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_seconds)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }
}

impl TelegramConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds.map(Duration::from_secs)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for PracticumConfig {
    fn default() -> Self {
        Self {
            endpoint: default_practicum_endpoint(),
            retry_seconds: default_retry_seconds(),
            request_timeout_seconds: None,
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: default_telegram_api_url(),
            request_timeout_seconds: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "plain".to_string()
}

fn default_practicum_endpoint() -> String {
    "https://practicum.yandex.ru/api/user_api/homework_statuses/".to_string()
}

fn default_retry_seconds() -> u64 {
    600
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}
