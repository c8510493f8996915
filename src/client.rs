use crate::TranslationError;
use crate::llm::{LLM, word_to_prompt};
use crate::utils::preview;

/// Turns a word and a target language into definition text from an [`LLM`].
///
/// Inputs are expected to be validated by the caller. Every failure is logged
/// with its cause and reported as a [`TranslationError`]; no retries happen here.
pub struct TranslationClient<L> {
    llm: L,
}

impl<L: LLM> TranslationClient<L> {
    pub fn new(llm: L) -> Self {
        TranslationClient { llm }
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }

    pub async fn translate(
        &self,
        word: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        log::info!(
            r#"Translating "{}" into {}"#,
            preview(word, 20),
            target_language
        );

        let prompt = word_to_prompt(word, target_language);
        match self.llm.complete(prompt).await {
            Ok(text) => Ok(text),
            Err(err) => {
                log::error!("Text generation call failed: {err}");
                Err(TranslationError::from(&err))
            }
        }
    }
}
