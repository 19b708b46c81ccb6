// File: src/services/telegram/messenger.rs
use crate::env_config::models::app_config::TelegramConfig;
use crate::error::NotifyError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info};

#[async_trait]
pub trait TraitMessenger {
    /// Отправляет одно текстовое сообщение в чат пользователя
    async fn send_message(&self, text: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Deserialize)]
struct TgResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<u16>,
}

pub struct StructTelegramMessenger {
    client: Client,
    api_url: String,
    token: String,
    chat_id: String,
}

impl StructTelegramMessenger {
    pub fn new(config: &TelegramConfig, token: &str, chat_id: &str) -> Result<Self, NotifyError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| NotifyError::Other(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }
}

#[async_trait]
impl TraitMessenger for StructTelegramMessenger {
    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        // Токен бота имеет вид "<id>:<secret>" и попадает в путь запроса
        if !is_well_formed_token(&self.token) {
            error!("Telegram token is malformed");
            return Err(NotifyError::InvalidToken);
        }

        info!("Sending message to Telegram chat {}", self.chat_id);

        let url = format!("{}/bot{}/sendMessage", self.api_url, self.token);
        let payload = json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                // Текст ошибки reqwest содержит URL вместе с токеном
                let e = e.without_url();
                error!("sendMessage request failed: {}", e);
                NotifyError::Other(format!("sendMessage request failed: {}", e))
            })?;

        let status = response.status();
        let body: TgResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                error!("sendMessage response is not valid: {} ({})", status, e.without_url());
                return Err(classify(status.as_u16(), None));
            }
        };

        if !body.ok {
            let code = body.error_code.unwrap_or(status.as_u16());
            let err = classify(code, body.description.as_deref());
            error!(
                "Telegram rejected message: {} {}",
                code,
                body.description.as_deref().unwrap_or_default()
            );
            return Err(err);
        }

        debug!("Message delivered to Telegram");
        Ok(())
    }
}

fn is_well_formed_token(token: &str) -> bool {
    match token.split_once(':') {
        Some((id, secret)) => {
            !id.is_empty()
                && id.chars().all(|c| c.is_ascii_digit())
                && !secret.is_empty()
                && !secret.contains(|c: char| c.is_whitespace() || c == '/')
        }
        None => false,
    }
}

/// Ошибки Bot API по коду ответа и описанию
fn classify(code: u16, description: Option<&str>) -> NotifyError {
    let description = description.unwrap_or_default();

    match code {
        // Неверный токен Telegram отдаёт как 401 или 404 на весь путь
        401 | 404 => NotifyError::InvalidToken,
        400 if description.to_lowercase().contains("chat not found") => NotifyError::ChatNotFound,
        _ if description.is_empty() => NotifyError::Other(format!("Bot API responded with {}", code)),
        _ => NotifyError::Other(description.to_string()),
    }
}
