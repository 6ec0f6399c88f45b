use crate::error::ScanError;
use crate::llm::LanguageModel;

use super::prompts;

/// Ask the model to repair OCR noise. The reply is passed on untouched.
pub async fn correct(
    llm: &dyn LanguageModel,
    model: &str,
    raw_text: &str,
) -> Result<String, ScanError> {
    let prompt = prompts::correction(raw_text);
    llm.complete(model, &prompt)
        .await
        .map_err(ScanError::CorrectionService)
}
