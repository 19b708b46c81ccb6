// File: src/services/practicum/client.rs
use crate::env_config::models::app_config::PracticumConfig;
use crate::error::{BotError, ProtocolError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::AUTHORIZATION};
use serde_json::Value;
use tracing::{debug, error, info};

#[async_trait]
pub trait TraitHomeworkApi {
    /// Запрос статусов домашних работ, изменившихся начиная с `from_date`
    async fn get_api_answer(&self, from_date: i64) -> Result<Value, BotError>;
}

pub struct StructHomeworkApi {
    client: Client,
    endpoint: String,
    token: String,
}

impl StructHomeworkApi {
    pub fn new(config: &PracticumConfig, token: &str) -> Result<Self, BotError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BotError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl TraitHomeworkApi for StructHomeworkApi {
    async fn get_api_answer(&self, from_date: i64) -> Result<Value, BotError> {
        info!("Requesting homework statuses from_date={}", from_date);

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await
            .map_err(|e| {
                error!("Homework API request failed: {}", e);
                BotError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;

        if status != StatusCode::OK {
            error!("Homework API responded with {}: {}", status, body);
            return Err(ProtocolError::EndpointUnavailable(status.as_u16()).into());
        }

        let answer: Value = serde_json::from_str(&body).map_err(|e| {
            error!("Homework API response is not JSON: {}", e);
            ProtocolError::InvalidJson(e.to_string())
        })?;

        debug!("Received homework API answer: {}", answer);
        Ok(answer)
    }
}
