use std::sync::Arc;

use crate::config::Config;
use crate::llm::LanguageModel;
use crate::ocr::OcrProvider;
use crate::persistence::CardStore;
use crate::storage::SubmissionStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub store: SubmissionStore,
    pub ocr: Arc<dyn OcrProvider>,
    pub llm: Arc<dyn LanguageModel>,
    pub cards: Arc<dyn CardStore>,
}
