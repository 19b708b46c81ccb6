// File: src/services/homework/scheduler.rs
use super::record::HomeworkRecord;
use crate::app_state::models::AppState;
use crate::error::BotError;
use crate::services::practicum::validator::{check_response, current_date};
use crate::services::telegram::notifier::StatusNotifier;
use crate::utils::clock::format_timestamp;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Результат одного цикла опроса
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Отправлено уведомление о первой работе из списка
    Notified(HomeworkRecord),
    /// Новых статусов нет, курсор сдвинут
    NoUpdates { cursor: i64 },
    /// `homeworks: null`
    NoAssignments,
    /// Сбой на любом шаге цикла
    Failed(String),
}

impl CycleOutcome {
    /// После уведомления опрос повторяется сразу, в остальных случаях после паузы
    pub fn needs_pause(&self) -> bool {
        !matches!(self, CycleOutcome::Notified(_))
    }
}

pub struct HomeworkScheduler {
    app_state: Arc<AppState>,
    notifier: StatusNotifier,
    cursor: i64,
}

impl HomeworkScheduler {
    pub fn new(app_state: Arc<AppState>) -> Self {
        let cursor = app_state.clock.now();
        let notifier = StatusNotifier::new(app_state.messenger.clone());

        Self {
            app_state,
            notifier,
            cursor,
        }
    }

    /// Метка времени, начиная с которой запрашиваются изменения
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Выполняет один цикл опроса и обрабатывает любые его сбои
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.poll().await {
            Ok(outcome) => outcome,
            Err(err) if err.is_no_assignments() => {
                info!("No assignments yet, cursor stays at {}", self.cursor);
                CycleOutcome::NoAssignments
            }
            Err(err) => {
                let message = format!("Сбой в работе программы: {}", err);
                error!(severity = "critical", "{}", message);

                // Сообщение о сбое отправляется без гарантий
                if let Err(send_err) = self.notifier.send(&message).await {
                    error!("Failed to report failure to chat: {}", send_err);
                }
                CycleOutcome::Failed(err.to_string())
            }
        }
    }

    /// Цикл опроса и, если нужно, пауза перед следующим
    pub async fn tick(&mut self) -> CycleOutcome {
        let outcome = self.run_cycle().await;

        if outcome.needs_pause() {
            let retry = self.app_state.settings.app_config.practicum.retry_interval();
            debug!("Sleeping {:?} before next poll", retry);
            self.app_state.clock.sleep(retry).await;
        }

        outcome
    }

    /// Бесконечный цикл опроса. Завершается только вместе с процессом.
    pub async fn start(mut self) {
        info!(
            "Starting homework scheduler with {} second interval from {}",
            self.app_state.settings.app_config.practicum.retry_seconds,
            format_timestamp(self.cursor)
        );

        loop {
            let outcome = self.tick().await;
            debug!("Poll cycle finished: {:?}", outcome);
        }
    }

    async fn poll(&mut self) -> Result<CycleOutcome, BotError> {
        let from_date = if self.cursor == 0 {
            self.app_state.clock.now()
        } else {
            self.cursor
        };

        let response = self.app_state.homework_api.get_api_answer(from_date).await?;
        let homeworks = check_response(&response)?;

        match homeworks.first() {
            // Курсор не сдвигается: следующий опрос снова вернёт последнюю работу
            Some(homework) => {
                let record = self.notifier.notify_raw(homework).await?;
                Ok(CycleOutcome::Notified(record))
            }
            None => {
                let server_date = current_date(&response)?;
                self.advance_cursor(server_date);
                Ok(CycleOutcome::NoUpdates {
                    cursor: self.cursor,
                })
            }
        }
    }

    // Курсор двигается только вперёд
    fn advance_cursor(&mut self, server_date: i64) {
        if server_date > self.cursor {
            info!(
                "No new statuses, cursor moved to {} ({})",
                server_date,
                format_timestamp(server_date)
            );
            self.cursor = server_date;
        } else {
            debug!(
                "No new statuses, server date {} is not after cursor {}",
                server_date, self.cursor
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env_config::models::{
        app_config::AppConfig, app_env::AppEnv, app_setting::AppSettings,
    };
    use crate::error::{NotifyError, ProtocolError};
    use crate::services::homework::vocabulary::HomeworkStatus;
    use crate::services::practicum::client::TraitHomeworkApi;
    use crate::services::telegram::messenger::TraitMessenger;
    use crate::utils::clock::TraitClock;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct FakeHomeworkApi {
        answers: Mutex<VecDeque<Result<Value, BotError>>>,
        requested: Mutex<Vec<i64>>,
    }

    impl FakeHomeworkApi {
        fn with_answers(answers: Vec<Result<Value, BotError>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl TraitHomeworkApi for FakeHomeworkApi {
        async fn get_api_answer(&self, from_date: i64) -> Result<Value, BotError> {
            self.requested.lock().unwrap().push(from_date);
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected API call")
        }
    }

    #[derive(Default)]
    struct FakeMessenger {
        sent: Mutex<Vec<String>>,
        fail_with: Option<NotifyError>,
    }

    #[async_trait]
    impl TraitMessenger for FakeMessenger {
        async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct FakeClock {
        now: AtomicI64,
        sleeps: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl TraitClock for FakeClock {
        fn now(&self) -> i64 {
            self.now.load(Ordering::SeqCst)
        }

        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    struct Harness {
        api: Arc<FakeHomeworkApi>,
        messenger: Arc<FakeMessenger>,
        clock: Arc<FakeClock>,
        scheduler: HomeworkScheduler,
    }

    fn harness_with(
        now: i64,
        answers: Vec<Result<Value, BotError>>,
        messenger: FakeMessenger,
    ) -> Harness {
        let api = Arc::new(FakeHomeworkApi::with_answers(answers));
        let messenger = Arc::new(messenger);
        let clock = Arc::new(FakeClock {
            now: AtomicI64::new(now),
            sleeps: Mutex::new(Vec::new()),
        });
        let settings = Arc::new(AppSettings {
            app_config: AppConfig::default(),
            app_env: AppEnv::from_lookup(|_| None).unwrap(),
        });
        let app_state = Arc::new(AppState::new(
            settings,
            api.clone(),
            messenger.clone(),
            clock.clone(),
        ));

        Harness {
            api,
            messenger,
            clock,
            scheduler: HomeworkScheduler::new(app_state),
        }
    }

    fn harness(now: i64, answers: Vec<Result<Value, BotError>>) -> Harness {
        harness_with(now, answers, FakeMessenger::default())
    }

    impl Harness {
        fn sent(&self) -> Vec<String> {
            self.messenger.sent.lock().unwrap().clone()
        }

        fn sleeps(&self) -> Vec<Duration> {
            self.clock.sleeps.lock().unwrap().clone()
        }

        fn requested(&self) -> Vec<i64> {
            self.api.requested.lock().unwrap().clone()
        }
    }

    const RETRY: Duration = Duration::from_secs(600);

    #[tokio::test]
    async fn test_status_change_is_sent_without_pause() {
        let mut h = harness(
            500,
            vec![Ok(json!({
                "homeworks": [
                    {"homework_name": "X", "status": "approved"},
                    {"homework_name": "Y", "status": "rejected"}
                ],
                "current_date": 1000
            }))],
        );

        let outcome = h.scheduler.tick().await;

        assert_eq!(
            outcome,
            CycleOutcome::Notified(HomeworkRecord {
                name: "X".to_string(),
                status: HomeworkStatus::Approved,
            })
        );
        assert_eq!(
            h.sent(),
            vec![
                "Изменился статус проверки работы \"X\". Работа проверена: ревьюеру всё понравилось. Ура!"
                    .to_string()
            ]
        );
        assert_eq!(h.requested(), vec![500]);
        assert!(h.sleeps().is_empty());
        // Курсор после уведомления не сдвигается
        assert_eq!(h.scheduler.cursor(), 500);
    }

    #[tokio::test]
    async fn test_empty_list_advances_cursor() {
        let mut h = harness(
            500,
            vec![
                Ok(json!({"homeworks": [], "current_date": 1000})),
                Ok(json!({"homeworks": [], "current_date": 1600})),
            ],
        );

        assert_eq!(
            h.scheduler.tick().await,
            CycleOutcome::NoUpdates { cursor: 1000 }
        );
        assert_eq!(
            h.scheduler.tick().await,
            CycleOutcome::NoUpdates { cursor: 1600 }
        );

        assert_eq!(h.requested(), vec![500, 1000]);
        assert_eq!(h.sleeps(), vec![RETRY, RETRY]);
        assert!(h.sent().is_empty());
    }

    #[tokio::test]
    async fn test_cursor_never_moves_backwards() {
        let mut h = harness(
            2000,
            vec![
                Ok(json!({"homeworks": [], "current_date": 1000})),
                Ok(json!({"homeworks": [], "current_date": 2500})),
                Ok(json!({"homeworks": [], "current_date": 2400})),
            ],
        );

        h.scheduler.tick().await;
        assert_eq!(h.scheduler.cursor(), 2000);
        h.scheduler.tick().await;
        assert_eq!(h.scheduler.cursor(), 2500);
        h.scheduler.tick().await;
        assert_eq!(h.scheduler.cursor(), 2500);
    }

    #[tokio::test]
    async fn test_null_homeworks_is_quiet() {
        let mut h = harness(
            500,
            vec![Ok(json!({"homeworks": null, "current_date": 1000}))],
        );

        assert_eq!(h.scheduler.tick().await, CycleOutcome::NoAssignments);
        assert!(h.sent().is_empty());
        assert_eq!(h.sleeps(), vec![RETRY]);
        assert_eq!(h.scheduler.cursor(), 500);
    }

    #[tokio::test]
    async fn test_unknown_status_reports_failure() {
        let mut h = harness(
            500,
            vec![Ok(json!({
                "homeworks": [{"homework_name": "X", "status": "unknown_value"}],
                "current_date": 1000
            }))],
        );

        let outcome = h.scheduler.tick().await;

        assert_eq!(
            outcome,
            CycleOutcome::Failed("Неизвестный статус: unknown_value".to_string())
        );
        // Уходит только сообщение о сбое, не о статусе
        assert_eq!(
            h.sent(),
            vec!["Сбой в работе программы: Неизвестный статус: unknown_value".to_string()]
        );
        assert_eq!(h.sleeps(), vec![RETRY]);
    }

    #[tokio::test]
    async fn test_endpoint_failure_is_retried_with_same_cursor() {
        let mut h = harness(
            500,
            vec![
                Err(ProtocolError::EndpointUnavailable(503).into()),
                Err(BotError::Transport("connection refused".to_string())),
                Ok(json!({"homeworks": [], "current_date": 900})),
            ],
        );

        assert!(matches!(h.scheduler.tick().await, CycleOutcome::Failed(_)));
        assert!(matches!(h.scheduler.tick().await, CycleOutcome::Failed(_)));
        assert_eq!(
            h.scheduler.tick().await,
            CycleOutcome::NoUpdates { cursor: 900 }
        );

        assert_eq!(h.requested(), vec![500, 500, 500]);
        assert_eq!(
            h.sent(),
            vec![
                "Сбой в работе программы: Эндпоинт не отвечает (код 503)".to_string(),
                "Сбой в работе программы: Ошибка в запросе: connection refused".to_string(),
            ]
        );
        assert_eq!(h.sleeps(), vec![RETRY, RETRY, RETRY]);
    }

    #[tokio::test]
    async fn test_malformed_response_is_failure() {
        let mut h = harness(
            500,
            vec![
                Ok(json!({"current_date": 1000})),
                Ok(json!({"homeworks": []})),
            ],
        );

        assert_eq!(
            h.scheduler.tick().await,
            CycleOutcome::Failed("Отсутствует ключевое значение - \"homeworks\"".to_string())
        );
        assert_eq!(
            h.scheduler.tick().await,
            CycleOutcome::Failed("Отсутствует ключ current_date".to_string())
        );
        assert_eq!(h.scheduler.cursor(), 500);
    }

    #[tokio::test]
    async fn test_failure_report_that_fails_is_swallowed() {
        let mut h = harness_with(
            500,
            vec![Ok(json!({
                "homeworks": [{"homework_name": "X", "status": "reviewing"}],
                "current_date": 1000
            }))],
            FakeMessenger {
                fail_with: Some(NotifyError::ChatNotFound),
                ..Default::default()
            },
        );

        let outcome = h.scheduler.tick().await;

        assert_eq!(outcome, CycleOutcome::Failed("Ошибка CHAT_ID".to_string()));
        assert_eq!(h.sleeps(), vec![RETRY]);
    }

    #[tokio::test]
    async fn test_zero_cursor_falls_back_to_now() {
        let mut h = harness(
            0,
            vec![Ok(json!({"homeworks": [], "current_date": 800}))],
        );
        h.clock.now.store(700, Ordering::SeqCst);

        h.scheduler.tick().await;

        assert_eq!(h.requested(), vec![700]);
        assert_eq!(h.scheduler.cursor(), 800);
    }

    #[test]
    fn test_needs_pause() {
        assert!(
            !CycleOutcome::Notified(HomeworkRecord {
                name: "X".to_string(),
                status: HomeworkStatus::Reviewing,
            })
            .needs_pause()
        );
        assert!(CycleOutcome::NoUpdates { cursor: 1 }.needs_pause());
        assert!(CycleOutcome::NoAssignments.needs_pause());
        assert!(CycleOutcome::Failed(String::new()).needs_pause());
    }
}
