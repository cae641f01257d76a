use crate::config::AppConfig;
use crate::services::ai::AnswerProvider;
use crate::services::records::RecordsProvider;

pub struct AppState {
    pub config: AppConfig,
    pub ai: Box<dyn AnswerProvider>,
    pub records: Box<dyn RecordsProvider>,
}
