use super::models::app_config::AppConfig;
use super::models::app_env::Env;
use crate::error::BotError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

impl AppConfig {
    /// Загружает `<config_dir>/<env>.toml`. Если файла нет, берутся значения по умолчанию.
    pub fn new(config_dir: &str, env: &Env) -> Result<AppConfig, BotError> {
        let path = Path::new(config_dir).join(format!("{}.toml", env));

        match fs::read_to_string(&path) {
            Ok(raw) => Self::from_toml(&raw).map_err(|err| {
                BotError::Configuration(format!("{}: {}", path.display(), err))
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(AppConfig::default()),
            Err(err) => Err(BotError::Configuration(format!(
                "{}: {}",
                path.display(),
                err
            ))),
        }
    }

    pub fn from_toml(raw: &str) -> Result<AppConfig, BotError> {
        toml::from_str(raw).map_err(|err| BotError::Configuration(err.to_string()))
    }
}
