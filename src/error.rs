use thiserror::Error;

/// Ошибки одного цикла опроса и старта приложения.
///
/// Текст ошибок уходит в чат пользователю, поэтому он на русском.
#[derive(Error, Debug)]
pub enum BotError {
    /// Не заданы переменные окружения или сломан файл конфигурации.
    #[error("Ошибка конфигурации: {0}")]
    Configuration(String),

    /// Сервер проверки недоступен на сетевом уровне.
    #[error("Ошибка в запросе: {0}")]
    Transport(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Ответ сервера проверки не соответствует ожидаемому формату.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Эндпоинт не отвечает (код {0})")]
    EndpointUnavailable(u16),

    #[error("Ответ не в формате JSON: {0}")]
    InvalidJson(String),

    #[error("Ответ API не является словарём")]
    NotAnObject,

    /// Сервер вернул явную ошибку (`error` или пару `code` + `message`).
    #[error("{0}")]
    Api(String),

    #[error("Отсутствует ключевое значение - \"homeworks\"")]
    MissingHomeworks,

    /// `homeworks: null`. Ожидаемое состояние, а не поломка протокола.
    #[error("Нет заданий")]
    NoAssignments,

    #[error("{0} Не является списком")]
    NotAList(String),

    #[error("Отсутствует ключ {0}")]
    MissingField(&'static str),

    #[error("Неизвестный статус: {0}")]
    UnknownStatus(String),
}

/// Сбой отправки сообщения в Telegram.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Ошибка токена")]
    InvalidToken,

    #[error("Ошибка CHAT_ID")]
    ChatNotFound,

    #[error("Ошибка {0}")]
    Other(String),
}

impl BotError {
    /// Ожидаемое состояние "нет заданий", о котором не нужно сообщать в чат.
    pub fn is_no_assignments(&self) -> bool {
        matches!(self, BotError::Protocol(ProtocolError::NoAssignments))
    }
}
