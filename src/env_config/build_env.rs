use super::models::app_env::{AppEnv, Credentials, Env};
use crate::error::BotError;
use std::env;
use std::str::FromStr;
use tracing::error;

pub const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

const DEFAULT_CONFIG_DIR: &str = "config";

impl AppEnv {
    /// Читает окружение процесса, предварительно подгрузив `.env`, если он есть
    pub fn new() -> Result<AppEnv, BotError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<AppEnv, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("ENV") {
            Some(raw) => Env::from_str(&raw).map_err(BotError::Configuration)?,
            None => Env::Local,
        };

        Ok(AppEnv {
            env,
            config_dir: lookup("CONFIG_DIR").unwrap_or_else(|| DEFAULT_CONFIG_DIR.to_string()),
            practicum_token: non_empty(lookup(PRACTICUM_TOKEN)),
            telegram_token: non_empty(lookup(TELEGRAM_TOKEN)),
            telegram_chat_id: non_empty(lookup(TELEGRAM_CHAT_ID)),
        })
    }

    /// Возвращает токены, если заданы все три, иначе перечисляет недостающие
    pub fn credentials(&self) -> Result<Credentials, BotError> {
        match (
            &self.practicum_token,
            &self.telegram_token,
            &self.telegram_chat_id,
        ) {
            (Some(practicum), Some(telegram), Some(chat_id)) => Ok(Credentials {
                practicum_token: practicum.clone(),
                telegram_token: telegram.clone(),
                telegram_chat_id: chat_id.clone(),
            }),
            _ => {
                let missing: Vec<&str> = [
                    (PRACTICUM_TOKEN, self.practicum_token.is_none()),
                    (TELEGRAM_TOKEN, self.telegram_token.is_none()),
                    (TELEGRAM_CHAT_ID, self.telegram_chat_id.is_none()),
                ]
                .into_iter()
                .filter(|(_, absent)| *absent)
                .map(|(name, _)| name)
                .collect();

                Err(BotError::Configuration(format!(
                    "отсутствуют обязательные переменные окружения: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

/// Проверка доступности переменных окружения перед запуском цикла
pub fn check_tokens(app_env: &AppEnv) -> bool {
    match app_env.credentials() {
        Ok(_) => true,
        Err(err) => {
            error!(severity = "critical", "Bot cannot start: {}", err);
            false
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
