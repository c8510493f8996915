use super::LLM;
use crate::LLMError;
use anyhow::anyhow;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub enum DummyMode {
    Reply(String),
    RejectKey,
    Unavailable,
}

/// In-process backend that answers from a script and remembers every prompt.
#[derive(Debug)]
pub struct DummyLLM {
    mode: DummyMode,
    prompts: Mutex<Vec<String>>,
}

impl DummyLLM {
    pub fn new(mode: DummyMode) -> Self {
        DummyLLM {
            mode,
            prompts: Mutex::new(vec![]),
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(DummyMode::Reply(text.to_owned()))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }
}

impl Default for DummyLLM {
    fn default() -> Self {
        Self::replying("Dummy output")
    }
}

impl LLM for DummyLLM {
    async fn complete(&self, prompt: String) -> Result<String, LLMError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt);
        }
        match &self.mode {
            DummyMode::Reply(text) => Ok(text.clone()),
            DummyMode::RejectKey => Err(LLMError::Unauthorized(anyhow!(
                "API key not valid. Please pass a valid API key."
            ))),
            DummyMode::Unavailable => Err(LLMError::ConnectionError(anyhow!(
                "error sending request: connection refused"
            ))),
        }
    }
}
