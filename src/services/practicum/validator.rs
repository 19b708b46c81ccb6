// File: src/services/practicum/validator.rs
use crate::error::ProtocolError;
use serde_json::Value;
use tracing::{debug, error, info};

/// Проверяет ответ API на корректность и возвращает список домашних работ.
///
/// Схема проверяется целиком до обращения к полям:
/// объект → явная ошибка сервера → наличие `homeworks` → `null` → список.
pub fn check_response(response: &Value) -> Result<Vec<Value>, ProtocolError> {
    debug!("Checking API response shape");

    let body = response.as_object().ok_or_else(|| {
        error!("API response is not an object: {}", response);
        ProtocolError::NotAnObject
    })?;

    // Сервер может вернуть ошибку в одном из двух форматов
    if let Some(err) = body.get("error") {
        let message = describe(err);
        error!("API returned an error: {}", message);
        return Err(ProtocolError::Api(message));
    }
    if let (Some(code), Some(message)) = (body.get("code"), body.get("message")) {
        let message = format!("{}: {}", describe(code), describe(message));
        error!("API returned an error: {}", message);
        return Err(ProtocolError::Api(message));
    }

    match body.get("homeworks") {
        None => {
            error!("API response has no homeworks key");
            Err(ProtocolError::MissingHomeworks)
        }
        Some(Value::Null) => {
            info!("No assignments in API response");
            Err(ProtocolError::NoAssignments)
        }
        Some(Value::Array(homeworks)) => {
            debug!("API response is valid: {} homeworks", homeworks.len());
            Ok(homeworks.clone())
        }
        Some(other) => {
            error!("homeworks is not a list: {}", other);
            Err(ProtocolError::NotAList(other.to_string()))
        }
    }
}

/// Метка времени сервера, с которой начнётся следующий опрос
pub fn current_date(response: &Value) -> Result<i64, ProtocolError> {
    response
        .get("current_date")
        .and_then(Value::as_i64)
        .ok_or(ProtocolError::MissingField("current_date"))
}

// Строки без кавычек, остальное как JSON
fn describe(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
