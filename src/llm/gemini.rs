use super::{LLM, LLMBuilder};
use crate::LLMError;
use crate::utils::preview;
use anyhow::anyhow;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";
const INVALID_KEY_REASON: &str = "API_KEY_INVALID";

/// Builder for the native Gemini `generateContent` API
pub struct GeminiBuilder {
    model: String,
    api_key: String,
    api_base: String,
}

impl GeminiBuilder {
    pub fn new(model: String, api_key: String) -> Self {
        GeminiBuilder {
            model,
            api_key,
            api_base: DEFAULT_API_BASE.to_owned(),
        }
    }

    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base;
        self
    }
}

impl LLMBuilder for GeminiBuilder {
    type Built = GeminiLLM;

    fn build(&self) -> Result<Self::Built, LLMError> {
        let client = Client::builder()
            .build()
            .map_err(|e| LLMError::OtherError(e.into()))?;

        Ok(GeminiLLM {
            client,
            endpoint: format!(
                "{}/models/{}:generateContent",
                self.api_base.trim_end_matches('/'),
                self.model
            ),
            api_key: self.api_key.clone(),
        })
    }
}

pub struct GeminiLLM {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiLLM {
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl LLM for GeminiLLM {
    async fn complete(&self, prompt: String) -> Result<String, LLMError> {
        log::debug!(r#"Sending prompt "{}" to {}"#, preview(&prompt, 40), self.endpoint);

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LLMError::ConnectionError(e.into()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LLMError::ConnectionError(e.into()))?;

        parse_response(status, &body)
    }
}

fn parse_response(status: StatusCode, body: &str) -> Result<String, LLMError> {
    if !status.is_success() {
        return Err(parse_error(status, body));
    }

    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| LLMError::MalformedResponse(e.into()))?;

    let Some(content) = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
    else {
        return Err(LLMError::MalformedResponse(anyhow!(
            "Response contains no candidates"
        )));
    };

    let texts = content
        .parts
        .into_iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text)
        .collect::<Vec<_>>();

    if texts.is_empty() {
        return Err(LLMError::MalformedResponse(anyhow!(
            "Response candidate has no text parts"
        )));
    }
    Ok(texts.concat())
}

fn parse_error(status: StatusCode, body: &str) -> LLMError {
    let Ok(ErrorEnvelope { error }) = serde_json::from_str::<ErrorEnvelope>(body) else {
        let err = anyhow!("{status}: {}", preview(body, 200));
        return if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            LLMError::Unauthorized(err)
        } else {
            LLMError::ApiError(err)
        };
    };

    let key_rejected = matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || super::is_invalid_key_message(&error.message)
        || error
            .details
            .iter()
            .any(|d| d.get("reason").and_then(|r| r.as_str()) == Some(INVALID_KEY_REASON));

    let err = anyhow!(
        "{status} {}: {}",
        error.status.as_deref().unwrap_or("UNKNOWN"),
        error.message
    );
    if key_rejected {
        LLMError::Unauthorized(err)
    } else {
        LLMError::ApiError(err)
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    /// Set on reasoning summaries, which are not part of the answer.
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_endpoint_from_base_and_model() {
        let llm = GeminiBuilder::new("gemini-2.5-flash".to_owned(), "k".to_owned())
            .with_api_base("http://localhost:8080/v1beta/".to_owned())
            .build()
            .unwrap();
        assert_eq!(
            llm.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn request_body_shape() {
        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: "hi".to_owned(),
                }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "contents": [{ "parts": [{ "text": "hi" }] }] })
        );
    }

    #[test]
    fn joins_text_parts_and_skips_thoughts() {
        let body = r#"{
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "thinking...", "thought": true },
                        { "text": "hello " },
                        { "text": "(greeting)" }
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "totalTokenCount": 12 }
        }"#;
        assert_eq!(
            parse_response(StatusCode::OK, body).unwrap(),
            "hello (greeting)"
        );
    }

    #[test]
    fn missing_text_is_malformed() {
        for body in [
            r#"{}"#,
            r#"{"candidates": [{"finishReason": "SAFETY"}]}"#,
            r#"{"candidates": [{"content": {"parts": []}}]}"#,
            "not json",
        ] {
            assert!(matches!(
                parse_response(StatusCode::OK, body),
                Err(LLMError::MalformedResponse(_))
            ));
        }
    }

    #[test]
    fn invalid_key_is_unauthorized() {
        let body = r#"{
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{
                    "@type": "type.googleapis.com/google.rpc.ErrorInfo",
                    "reason": "API_KEY_INVALID",
                    "domain": "googleapis.com"
                }]
            }
        }"#;
        assert!(matches!(
            parse_response(StatusCode::BAD_REQUEST, body),
            Err(LLMError::Unauthorized(_))
        ));
    }

    #[test]
    fn auth_statuses_are_unauthorized_even_without_json() {
        assert!(matches!(
            parse_response(StatusCode::UNAUTHORIZED, "<html>denied</html>"),
            Err(LLMError::Unauthorized(_))
        ));
    }

    #[test]
    fn other_failures_are_api_errors() {
        let body = r#"{"error": {"code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE"}}"#;
        assert!(matches!(
            parse_response(StatusCode::SERVICE_UNAVAILABLE, body),
            Err(LLMError::ApiError(_))
        ));
        assert!(matches!(
            parse_response(StatusCode::BAD_GATEWAY, "upstream"),
            Err(LLMError::ApiError(_))
        ));
    }
}
