pub mod dummy;
pub mod gemini;
pub mod openai;

use crate::LLMError;
use std::future::Future;

pub trait LLMBuilder {
    type Built: LLM;

    fn build(&self) -> Result<Self::Built, LLMError>;
}

/// A remote text-generation model: one prompt in, one text out.
pub trait LLM {
    fn complete(&self, prompt: String) -> impl Future<Output = Result<String, LLMError>> + Send;
}

/// Any of the supported backends, picked at startup from configuration.
pub enum Backend {
    Gemini(gemini::GeminiLLM),
    OpenAi(openai::OpenAiLLM),
    Dummy(dummy::DummyLLM),
}

impl LLM for Backend {
    async fn complete(&self, prompt: String) -> Result<String, LLMError> {
        match self {
            Backend::Gemini(llm) => llm.complete(prompt).await,
            Backend::OpenAi(llm) => llm.complete(prompt).await,
            Backend::Dummy(llm) => llm.complete(prompt).await,
        }
    }
}

pub fn word_to_prompt(word: &str, target_language: &str) -> String {
    format!(
        r#"Translate the Uzbek word "{word}" into {target_language}. Provide a clear and concise definition or meaning of the word in {target_language}. If the word has multiple meanings, list the most common ones."#
    )
}

/// Heuristic shared by backends: Google-style services report a rejected key
/// in the error message rather than with a dedicated status.
fn is_invalid_key_message(message: &str) -> bool {
    message.contains("API key not valid")
}
