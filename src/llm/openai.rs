use super::{LLM, LLMBuilder};
use crate::LLMError;
use crate::utils::preview;
use anyhow::anyhow;
use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::{ApiError, OpenAIError};
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use backoff::ExponentialBackoff;
use std::error::Error;
use std::time::Duration;

const INVALID_KEY_CODE: &str = "invalid_api_key";
const AUTH_ERROR_TYPE: &str = "authentication_error";

/// Builder for OpenAI-compatible chat completion APIs
pub struct OpenAiBuilder {
    model: String,
    api_key: String,
    api_base: Option<String>,
}

impl OpenAiBuilder {
    pub fn new(model: String, api_key: String) -> Self {
        OpenAiBuilder {
            model,
            api_key,
            api_base: None,
        }
    }

    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = Some(api_base);
        self
    }
}

impl LLMBuilder for OpenAiBuilder {
    type Built = OpenAiLLM;

    fn build(&self) -> Result<Self::Built, LLMError> {
        let mut config = OpenAIConfig::new().with_api_key(&self.api_key);
        if let Some(api_base) = self.api_base.as_deref() {
            config = config.with_api_base(api_base);
        }

        // async-openai retries rate-limited calls on its own; a failed
        // request must surface right away instead.
        let no_retries = ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        Ok(OpenAiLLM {
            client: Client::with_config(config).with_backoff(no_retries),
            model: self.model.clone(),
        })
    }
}

pub struct OpenAiLLM {
    client: Client<OpenAIConfig>,
    model: String,
}

impl LLM for OpenAiLLM {
    async fn complete(&self, prompt: String) -> Result<String, LLMError> {
        log::debug!(r#"Sending prompt "{}" to {}"#, preview(&prompt, 40), self.model);

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .build()?;

        let response = self.client.chat().create(request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LLMError::MalformedResponse(anyhow!("Response has no message content")))
    }
}

fn is_auth_error(e: &ApiError) -> bool {
    e.code.as_deref() == Some(INVALID_KEY_CODE)
        || e.r#type.as_deref() == Some(AUTH_ERROR_TYPE)
        || super::is_invalid_key_message(&e.message)
}

impl From<OpenAIError> for LLMError {
    fn from(err: OpenAIError) -> Self {
        match err {
            OpenAIError::Reqwest(e) => LLMError::ConnectionError(if let Some(e) = e.source() {
                anyhow!("{e}")
            } else {
                e.into()
            }),
            OpenAIError::ApiError(e) if is_auth_error(&e) => LLMError::Unauthorized(anyhow!("{e}")),
            OpenAIError::ApiError(e) => LLMError::ApiError(anyhow!("{e}")),
            OpenAIError::JSONDeserialize(e) => LLMError::MalformedResponse(e.into()),
            OpenAIError::FileSaveError(e) => LLMError::OtherError(anyhow!("{e}")),
            OpenAIError::FileReadError(e) => LLMError::OtherError(anyhow!("{e}")),
            OpenAIError::StreamError(e) => LLMError::ConnectionError(anyhow!("{e}")),
            OpenAIError::InvalidArgument(e) => LLMError::OtherError(anyhow!("{e}")),
        }
    }
}
