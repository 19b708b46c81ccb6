mod app_state;
mod env_config;
mod error;
mod logger;
mod services;
mod utils;

use app_state::models::AppState;
use env_config::build_env::check_tokens;
use env_config::models::{app_config::AppConfig, app_env::AppEnv, app_setting::AppSettings};
use services::homework::scheduler::HomeworkScheduler;
use services::practicum::client::StructHomeworkApi;
use services::telegram::messenger::StructTelegramMessenger;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::signal;
use utils::clock::StructSystemClock;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> ExitCode {
    // Инициализация настроек и логирования
    let settings: Arc<AppSettings> = match initialize_application() {
        Ok(settings) => Arc::new(settings),
        Err(code) => return code,
    };

    // Без токенов бот не запускается
    if !check_tokens(&settings.app_env) {
        return ExitCode::SUCCESS;
    }

    // Создание контекста с HTTP-клиентами
    let app_state = match initialize_app_state(settings.clone()) {
        Ok(app_state) => Arc::new(app_state),
        Err(err) => {
            error!("Failed to initialize HTTP clients: {}", err);
            return ExitCode::FAILURE;
        }
    };

    // Запуск цикла опроса до сигнала остановки
    let scheduler = HomeworkScheduler::new(app_state);
    tokio::select! {
        _ = scheduler.start() => {}
        _ = signal::ctrl_c() => info!("Shutdown signal received, stopping bot"),
    }

    ExitCode::SUCCESS
}

/// Загружает окружение, конфигурацию и настраивает логирование
fn initialize_application() -> Result<AppSettings, ExitCode> {
    // Логгер ещё не настроен, поэтому ошибки старта идут в stderr
    let environment = AppEnv::new().map_err(|err| {
        eprintln!("{}", err);
        ExitCode::FAILURE
    })?;
    let config = AppConfig::new(&environment.config_dir, &environment.env).map_err(|err| {
        eprintln!("{}", err);
        ExitCode::FAILURE
    })?;
    let app_settings = AppSettings {
        app_config: config,
        app_env: environment,
    };

    logger::init_logger(
        &app_settings.app_config.log.level,
        &app_settings.app_config.log.format,
        app_settings.app_env.is_local(),
    )
    .map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        ExitCode::FAILURE
    })?;

    info!("Starting homework status bot...");
    info!("Current environment: {}", app_settings.app_env.env);

    if app_settings.app_env.is_local() {
        info!("Running in local development mode");
        debug!("Configuration details: {:#?}", app_settings);
    } else {
        info!("Running in production mode");
    }

    Ok(app_settings)
}

fn initialize_app_state(settings: Arc<AppSettings>) -> Result<AppState, error::BotError> {
    let credentials = settings.app_env.credentials()?;

    let homework_api = StructHomeworkApi::new(
        &settings.app_config.practicum,
        &credentials.practicum_token,
    )?;
    let messenger = StructTelegramMessenger::new(
        &settings.app_config.telegram,
        &credentials.telegram_token,
        &credentials.telegram_chat_id,
    )?;

    info!("HTTP clients initialized");

    Ok(AppState::new(
        settings,
        Arc::new(homework_api),
        Arc::new(messenger),
        Arc::new(StructSystemClock),
    ))
}
