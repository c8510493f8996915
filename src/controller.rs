use crate::client::TranslationClient;
use crate::languages::{Language, find_by_name};
use crate::llm::LLM;
use crate::{TranslationError, ValidationError};

pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred. Please try again.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub word: String,
    pub target_language: String,
    pub is_loading: bool,
    pub error_message: Option<String>,
    pub result_text: String,
}

/// A request the form has committed to; its outcome goes back through
/// [`TranslationForm::settle`] under the same `seq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTranslation {
    pub seq: u64,
    pub word: String,
    pub target_language: String,
}

/// Owns the form's [`SessionState`] and allows at most one translation in flight.
///
/// Each accepted trigger gets a new sequence number, and outcomes carrying any
/// other number are dropped, so a late answer can never overwrite a newer one.
#[derive(Debug)]
pub struct TranslationForm {
    state: SessionState,
    languages: Vec<Language>,
    last_seq: u64,
}

impl TranslationForm {
    pub fn new(languages: Vec<Language>, target_language: &str) -> Self {
        let target_language = match find_by_name(&languages, target_language) {
            Some(lang) => lang.name.clone(),
            None => {
                let fallback = languages
                    .first()
                    .map(|lang| lang.name.clone())
                    .unwrap_or_default();
                log::warn!("Unknown target language {target_language:?}, using {fallback:?}");
                fallback
            }
        };

        TranslationForm {
            state: SessionState {
                target_language,
                ..Default::default()
            },
            languages,
            last_seq: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn languages(&self) -> &[Language] {
        &self.languages
    }

    pub fn set_word(&mut self, word: impl Into<String>) {
        self.state.word = word.into();
    }

    /// Returns false and keeps the current selection if `name` is not offered.
    pub fn select_language(&mut self, name: &str) -> bool {
        if find_by_name(&self.languages, name).is_none() {
            log::warn!("Ignoring unsupported target language {name:?}");
            return false;
        }
        self.state.target_language = name.to_owned();
        true
    }

    /// Whether the trigger should be enabled.
    pub fn can_trigger(&self) -> bool {
        !self.state.is_loading && !self.state.word.trim().is_empty()
    }

    /// Validates the input and enters the loading state.
    ///
    /// Returns `None` when nothing should be sent: either a request is already
    /// in flight (no state change), or the word is blank (validation error shown).
    pub fn begin(&mut self) -> Option<PendingTranslation> {
        if self.state.is_loading {
            log::debug!("Translation #{} still in flight, ignoring trigger", self.last_seq);
            return None;
        }

        if self.state.word.trim().is_empty() {
            self.state.error_message = Some(ValidationError::EmptyWord.to_string());
            self.state.result_text.clear();
            return None;
        }

        self.state.error_message = None;
        self.state.result_text.clear();
        self.state.is_loading = true;
        self.last_seq += 1;

        Some(PendingTranslation {
            seq: self.last_seq,
            word: self.state.word.clone(),
            target_language: self.state.target_language.clone(),
        })
    }

    /// Applies the outcome of request `seq`. Returns false if it was stale.
    pub fn settle(&mut self, seq: u64, outcome: Result<String, TranslationError>) -> bool {
        if !self.accepts(seq) {
            return false;
        }

        self.state.is_loading = false;
        match outcome {
            Ok(text) => self.state.result_text = text,
            Err(err) => self.state.error_message = Some(err.to_string()),
        }
        true
    }

    /// Request `seq` ended without an outcome (e.g. its task panicked).
    pub fn abandon(&mut self, seq: u64) -> bool {
        if !self.accepts(seq) {
            return false;
        }

        self.state.is_loading = false;
        self.state.error_message = Some(UNKNOWN_ERROR_MESSAGE.to_owned());
        true
    }

    /// Runs a whole trigger cycle against `client`. Returns false if no
    /// request was sent.
    pub async fn translate<L: LLM>(&mut self, client: &TranslationClient<L>) -> bool {
        let Some(pending) = self.begin() else {
            return false;
        };
        let outcome = client
            .translate(&pending.word, &pending.target_language)
            .await;
        self.settle(pending.seq, outcome)
    }

    fn accepts(&self, seq: u64) -> bool {
        if !self.state.is_loading || seq != self.last_seq {
            log::debug!(
                "Discarding outcome of translation #{seq}, latest is #{}",
                self.last_seq
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::languages::default_languages;
    use crate::llm::dummy::{DummyLLM, DummyMode};
    use crate::llm::word_to_prompt;

    fn form() -> TranslationForm {
        TranslationForm::new(default_languages(), "English")
    }

    #[test]
    fn starts_idle() {
        let form = form();
        assert_eq!(
            form.state(),
            &SessionState {
                target_language: "English".to_owned(),
                ..Default::default()
            }
        );
        assert!(!form.can_trigger());
    }

    #[test]
    fn unknown_initial_language_falls_back_to_first() {
        let form = TranslationForm::new(default_languages(), "Klingon");
        assert_eq!(form.state().target_language, "English");
    }

    #[test]
    fn select_language_rejects_unsupported() {
        let mut form = form();
        assert!(form.select_language("German"));
        assert!(!form.select_language("german"));
        assert_eq!(form.state().target_language, "German");
    }

    #[tokio::test]
    async fn blank_words_never_reach_the_client() {
        let client = TranslationClient::new(DummyLLM::default());
        let mut form = form();
        for word in ["", " ", "   ", "\t\n"] {
            form.set_word(word);
            assert!(!form.can_trigger());
            assert!(!form.translate(&client).await);
            assert_eq!(
                form.state().error_message.as_deref(),
                Some("Please enter a word to translate.")
            );
            assert!(!form.state().is_loading);
        }
        assert_eq!(client.llm().calls(), 0);
    }

    #[tokio::test]
    async fn validation_clears_previous_result() {
        let client = TranslationClient::new(DummyLLM::replying("book"));
        let mut form = form();
        form.set_word("kitob");
        form.translate(&client).await;
        assert_eq!(form.state().result_text, "book");

        form.set_word("   ");
        assert!(form.begin().is_none());
        assert_eq!(form.state().result_text, "");
    }

    #[test]
    fn begin_clears_previous_outcome_and_loads() {
        let mut form = form();
        form.set_word("");
        form.begin();
        assert!(form.state().error_message.is_some());

        form.set_word(" salom ");
        form.select_language("Russian");
        let pending = form.begin().unwrap();
        assert_eq!(pending.word, " salom ");
        assert_eq!(pending.target_language, "Russian");
        assert!(form.state().is_loading);
        assert_eq!(form.state().error_message, None);
        assert_eq!(form.state().result_text, "");
        assert!(!form.can_trigger());
    }

    #[tokio::test]
    async fn salom_into_english() {
        let client = TranslationClient::new(DummyLLM::replying("hello (greeting)"));
        let mut form = form();
        form.set_word("salom");
        assert!(form.translate(&client).await);

        assert_eq!(
            client.llm().prompts(),
            vec![word_to_prompt("salom", "English")]
        );
        assert_eq!(
            form.state(),
            &SessionState {
                word: "salom".to_owned(),
                target_language: "English".to_owned(),
                is_loading: false,
                error_message: None,
                result_text: "hello (greeting)".to_owned(),
            }
        );
    }

    #[tokio::test]
    async fn rejected_key_shows_configuration_hint() {
        let client = TranslationClient::new(DummyLLM::new(DummyMode::RejectKey));
        let mut form = form();
        form.set_word("salom");
        form.translate(&client).await;

        assert_eq!(
            form.state().error_message.as_deref(),
            Some("The provided API Key is not valid. Please check your configuration.")
        );
        assert!(!form.state().is_loading);
        assert_eq!(form.state().result_text, "");
    }

    #[tokio::test]
    async fn service_failure_shows_retry_hint() {
        let client = TranslationClient::new(DummyLLM::new(DummyMode::Unavailable));
        let mut form = form();
        form.set_word("salom");
        form.translate(&client).await;

        let message = form.state().error_message.clone().unwrap();
        assert!(message.contains("try again later"));
        assert!(!form.state().is_loading);
        assert_eq!(form.state().result_text, "");
    }

    #[tokio::test]
    async fn second_trigger_while_loading_is_a_noop() {
        let client = TranslationClient::new(DummyLLM::replying("hello"));
        let mut form = form();
        form.set_word("salom");

        let pending = form.begin().unwrap();
        let loading = form.state().clone();
        assert!(form.begin().is_none());
        assert!(!form.translate(&client).await);
        assert_eq!(form.state(), &loading);

        let outcome = client
            .translate(&pending.word, &pending.target_language)
            .await;
        assert!(form.settle(pending.seq, outcome));
        assert_eq!(client.llm().calls(), 1);
        assert_eq!(form.state().result_text, "hello");
    }

    #[test]
    fn stale_outcomes_are_discarded() {
        let mut form = form();
        form.set_word("salom");
        let first = form.begin().unwrap();
        assert!(form.settle(first.seq, Ok("hello".to_owned())));

        form.set_word("kitob");
        let second = form.begin().unwrap();
        assert!(second.seq > first.seq);
        assert!(!form.settle(first.seq, Ok("late hello".to_owned())));
        assert!(form.state().is_loading);

        assert!(form.settle(second.seq, Ok("book".to_owned())));
        assert!(!form.settle(second.seq, Err(TranslationError::ServiceError)));
        assert_eq!(form.state().result_text, "book");
        assert_eq!(form.state().error_message, None);
    }

    #[test]
    fn abandoned_request_shows_unknown_error() {
        let mut form = form();
        form.set_word("salom");
        let pending = form.begin().unwrap();
        assert!(form.abandon(pending.seq));
        assert!(!form.state().is_loading);
        assert_eq!(
            form.state().error_message.as_deref(),
            Some(UNKNOWN_ERROR_MESSAGE)
        );
        assert!(!form.abandon(pending.seq));
    }

    #[test]
    fn editing_mid_request_does_not_change_the_request() {
        let mut form = form();
        form.set_word("salom");
        let pending = form.begin().unwrap();
        form.set_word("kitob");
        assert_eq!(pending.word, "salom");
        assert!(form.settle(pending.seq, Ok("hello".to_owned())));
        assert_eq!(form.state().word, "kitob");
    }
}
