pub mod openai;

use async_trait::async_trait;

/// A text-in, text-out language model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, String>;
}
