use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::{
    ContentPart, ContentRequest, ContentResponse, LlmError, ResponseMetadata, TokenUsage,
};

use super::LlmProvider;
use super::env::{read_env_var, read_timeout_with, resolve_timeout_with_global_fallback};
use super::response_parsing::truncate_message;

const PROVIDER_ID: &str = "gemini";
const API_VERSION: &str = "v1beta";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const USER_ROLE: &str = "user";
const ENV_API_KEY: &str = "STUDYKIT_GEMINI_API_KEY";
const ENV_API_KEY_FALLBACK: &str = "GEMINI_API_KEY";
const ENV_BASE_URL: &str = "STUDYKIT_GEMINI_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "STUDYKIT_GEMINI_TIMEOUT_SECS";
const ENV_GLOBAL_TIMEOUT_SECS: &str = "STUDYKIT_LLM_TIMEOUT_SECS";

/// Blocking client for the Gemini `generateContent` endpoint.
pub struct GeminiProvider {
    api_key: String,
    api_base_url: String,
    client: Client,
}

impl GeminiProvider {
    pub fn from_api_key(api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_config(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(read_env_var)
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, LlmError>
    where
        F: Fn(&str) -> Result<Option<String>, LlmError>,
    {
        let api_key = match lookup(ENV_API_KEY)? {
            Some(key) => key,
            None => lookup(ENV_API_KEY_FALLBACK)?.ok_or_else(|| {
                LlmError::validation(
                    "Gemini API key is missing (set STUDYKIT_GEMINI_API_KEY or GEMINI_API_KEY)",
                )
            })?,
        };
        let api_base_url = lookup(ENV_BASE_URL)?.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let provider_timeout = read_timeout_with(&lookup, ENV_TIMEOUT_SECS)?;
        let timeout = resolve_timeout_with_global_fallback(
            provider_timeout,
            || read_timeout_with(&lookup, ENV_GLOBAL_TIMEOUT_SECS),
            DEFAULT_TIMEOUT,
        )?;

        Self::with_config(api_key, api_base_url, timeout)
    }

    pub fn with_config(
        api_key: impl Into<String>,
        api_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::validation("Gemini API key must not be empty"));
        }

        let api_base_url = api_base_url.into();
        if api_base_url.trim().is_empty() {
            return Err(LlmError::validation("Gemini API base URL must not be empty"));
        }

        let client = Client::builder().timeout(timeout).build().map_err(|err| {
            LlmError::internal(format!("failed to create Gemini HTTP client: {err}"))
        })?;

        Ok(Self {
            api_key,
            api_base_url,
            client,
        })
    }

    fn endpoint_url(&self, model: &str) -> String {
        format!(
            "{}/{API_VERSION}/models/{}:generateContent",
            self.api_base_url.trim_end_matches('/'),
            model.trim()
        )
    }

    fn build_request_payload(&self, request: &ContentRequest) -> GenerateContentRequest {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::InlineData(document) => {
                    GeminiRequestPart::InlineData(GeminiInlineData {
                        mime_type: document.mime_type().to_string(),
                        data: document.data().to_string(),
                    })
                }
                ContentPart::Text(text) => GeminiRequestPart::Text(text.clone()),
            })
            .collect();

        let generation_config =
            request
                .response_format
                .as_ref()
                .map(|format| GeminiGenerationConfig {
                    response_mime_type: format.mime_type.clone(),
                    response_schema: format.schema.to_gemini_value(),
                });

        GenerateContentRequest {
            contents: vec![GeminiContent {
                role: USER_ROLE.to_string(),
                parts,
            }],
            generation_config,
        }
    }

    fn map_success_response(
        &self,
        response_body: &str,
        latency_ms: u64,
    ) -> Result<ContentResponse, LlmError> {
        let response: GenerateContentResponse =
            serde_json::from_str(response_body).map_err(|err| {
                LlmError::invalid_response(format!("Gemini response decode failed: {err}"))
            })?;

        let candidate = response.candidates.first();
        let text = candidate
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(GeminiCandidateContent::joined_text);
        let finish_reason = candidate
            .and_then(|candidate| candidate.finish_reason.as_deref())
            .or_else(|| {
                response
                    .prompt_feedback
                    .as_ref()
                    .and_then(|feedback| feedback.block_reason.as_deref())
            })
            .and_then(non_empty_owned);

        let metadata = ResponseMetadata {
            latency_ms: Some(latency_ms),
            provider_request_id: response.response_id.as_deref().and_then(non_empty_owned),
            model_version: response.model_version.as_deref().and_then(non_empty_owned),
            finish_reason,
            usage: response.usage_metadata.and_then(map_usage),
        };

        debug!(
            latency_ms,
            finish_reason = metadata.finish_reason.as_deref().unwrap_or("none"),
            total_tokens = metadata.usage.as_ref().and_then(|usage| usage.total_tokens),
            has_text = text.is_some(),
            "received Gemini response"
        );

        Ok(ContentResponse { text, metadata })
    }
}

impl LlmProvider for GeminiProvider {
    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }

    fn generate_content(&self, request: &ContentRequest) -> Result<ContentResponse, LlmError> {
        request.validate()?;
        let payload = self.build_request_payload(request);

        debug!(
            model = %request.model,
            parts = request.parts.len(),
            structured = request.response_format.is_some(),
            "sending Gemini generateContent request"
        );
        let started = Instant::now();

        let response = self
            .client
            .post(self.endpoint_url(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .map_err(map_transport_error)?;

        let status = response.status();
        let response_body = response.text().map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_http_error(status, &response_body));
        }

        let elapsed_ms = started.elapsed().as_millis();
        let latency_ms = u64::try_from(elapsed_ms).unwrap_or(u64::MAX);
        self.map_success_response(&response_body, latency_ms)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiRequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum GeminiRequestPart {
    InlineData(GeminiInlineData),
    Text(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
    #[serde(default)]
    response_id: Option<String>,
    #[serde(default)]
    model_version: Option<String>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiCandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

impl GeminiCandidateContent {
    /// Concatenated text of all non-thought parts, `None` when there is none.
    fn joined_text(&self) -> Option<String> {
        let mut texts = self
            .parts
            .iter()
            .filter(|part| part.thought != Some(true))
            .filter_map(|part| part.text.as_deref())
            .peekable();
        texts.peek()?;
        Some(texts.collect())
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
    #[serde(default)]
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    #[serde(default)]
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

fn map_usage(usage: GeminiUsage) -> Option<TokenUsage> {
    let total_tokens = usage.total_token_count.or_else(|| {
        let (Some(prompt), Some(candidates)) =
            (usage.prompt_token_count, usage.candidates_token_count)
        else {
            return None;
        };
        prompt.checked_add(candidates)
    });

    let mapped = TokenUsage {
        prompt_tokens: usage.prompt_token_count,
        candidates_tokens: usage.candidates_token_count,
        total_tokens,
    };

    if mapped.prompt_tokens.is_some()
        || mapped.candidates_tokens.is_some()
        || mapped.total_tokens.is_some()
    {
        Some(mapped)
    } else {
        None
    }
}

fn map_http_error(status: StatusCode, body: &str) -> LlmError {
    let parsed_error = serde_json::from_str::<GeminiErrorEnvelope>(body).ok();
    let detail = parsed_error
        .as_ref()
        .and_then(|envelope| envelope.error.as_ref());
    let error_status = detail.and_then(|detail| detail.status.as_deref());
    let error_message = detail.map(|detail| detail.message.as_str()).unwrap_or("");

    if status == StatusCode::UNAUTHORIZED
        || status == StatusCode::FORBIDDEN
        || matches!(error_status, Some("UNAUTHENTICATED" | "PERMISSION_DENIED"))
        || error_message.contains("API key not valid")
    {
        return LlmError::Auth;
    }

    if status == StatusCode::TOO_MANY_REQUESTS || matches!(error_status, Some("RESOURCE_EXHAUSTED"))
    {
        return LlmError::RateLimited;
    }

    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::GATEWAY_TIMEOUT
        || matches!(error_status, Some("DEADLINE_EXCEEDED"))
    {
        return LlmError::Timeout;
    }

    let message = Some(error_message)
        .filter(|message| !message.trim().is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| truncate_message(body));

    LlmError::Transport {
        message: format!("Gemini API returned HTTP {status}: {message}"),
    }
}

fn map_transport_error(error: reqwest::Error) -> LlmError {
    if error.is_timeout() {
        return LlmError::Timeout;
    }

    LlmError::Transport {
        message: format!("Gemini transport error: {error}"),
    }
}

fn non_empty_owned(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use reqwest::StatusCode;
    use serde_json::json;

    use super::{GeminiProvider, map_http_error};
    use crate::domain::{
        ContentRequest, InlineDocument, LlmError, ResponseFormat, ResponseSchema,
    };

    fn provider() -> GeminiProvider {
        GeminiProvider::with_config(
            "test-key",
            "https://generativelanguage.googleapis.com/",
            Duration::from_secs(2),
        )
        .expect("provider should build")
    }

    type Lookup = Box<dyn Fn(&str) -> Result<Option<String>, LlmError>>;

    fn lookup_from(vars: &[(&str, &str)]) -> Lookup {
        let vars = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        Box::new(move |name: &str| Ok::<_, LlmError>(vars.get(name).cloned()))
    }

    #[test]
    fn endpoint_url_targets_generate_content_for_model() {
        assert_eq!(
            provider().endpoint_url("gemini-3-flash-preview"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-3-flash-preview:generateContent"
        );
    }

    #[test]
    fn build_request_payload_serializes_inline_data_and_schema() {
        let request = ContentRequest::new("gemini-3-flash-preview")
            .with_document(&InlineDocument::pdf_from_base64("JVBERi0="))
            .with_text("Analyze this document.")
            .with_response_format(ResponseFormat::json(
                ResponseSchema::object().required_property("title", ResponseSchema::string()),
            ));

        let payload = serde_json::to_value(provider().build_request_payload(&request))
            .expect("payload should serialize");

        assert_eq!(
            payload,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "inlineData": { "mimeType": "application/pdf", "data": "JVBERi0=" } },
                        { "text": "Analyze this document." }
                    ]
                }],
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": {
                        "type": "OBJECT",
                        "properties": { "title": { "type": "STRING" } },
                        "required": ["title"]
                    }
                }
            })
        );
    }

    #[test]
    fn build_request_payload_omits_generation_config_without_format() {
        let request = ContentRequest::new("gemini-3-flash-preview").with_text("hello");

        let payload = serde_json::to_value(provider().build_request_payload(&request))
            .expect("payload should serialize");

        assert!(payload.get("generationConfig").is_none());
    }

    #[test]
    fn map_success_response_joins_text_and_skips_thoughts() {
        let body = json!({
            "responseId": "resp-1",
            "modelVersion": "gemini-3-flash-preview",
            "candidates": [{
                "finishReason": "STOP",
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "planning...", "thought": true },
                        { "text": "hello " },
                        { "text": "world" }
                    ]
                }
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 3 }
        })
        .to_string();

        let response = provider()
            .map_success_response(&body, 42)
            .expect("response mapping should succeed");

        assert_eq!(response.text(), Some("hello world"));
        assert_eq!(response.metadata.latency_ms, Some(42));
        assert_eq!(
            response.metadata.provider_request_id.as_deref(),
            Some("resp-1")
        );
        assert_eq!(response.metadata.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(
            response
                .metadata
                .usage
                .as_ref()
                .and_then(|usage| usage.total_tokens),
            Some(15)
        );
    }

    #[test]
    fn map_success_response_without_candidates_has_no_text() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;

        let response = provider()
            .map_success_response(body, 5)
            .expect("blocked prompt is still a decodable response");

        assert_eq!(response.text, None);
        assert_eq!(response.metadata.finish_reason.as_deref(), Some("SAFETY"));
        assert_eq!(response.metadata.usage, None);
    }

    #[test]
    fn map_success_response_rejects_non_json_body() {
        let error = provider()
            .map_success_response("<html>", 5)
            .expect_err("non-JSON body should fail");

        assert!(matches!(error, LlmError::InvalidResponse { .. }));
    }

    #[test]
    fn map_http_error_maps_status_and_error_status() {
        let auth = map_http_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#,
        );
        let rate_limited = map_http_error(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#,
        );
        let timeout = map_http_error(
            StatusCode::GATEWAY_TIMEOUT,
            r#"{"error":{"code":504,"message":"deadline","status":"DEADLINE_EXCEEDED"}}"#,
        );
        let other = map_http_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream\nexploded");

        assert!(matches!(auth, LlmError::Auth));
        assert!(matches!(rate_limited, LlmError::RateLimited));
        assert!(matches!(timeout, LlmError::Timeout));
        assert!(matches!(
            other,
            LlmError::Transport { message }
            if message == "Gemini API returned HTTP 500 Internal Server Error: upstream exploded"
        ));
    }

    #[test]
    fn with_config_rejects_blank_api_key() {
        let error = GeminiProvider::with_config(" ", "https://example.test", Duration::from_secs(1))
            .err()
            .expect("blank key should fail");

        assert!(matches!(
            error,
            LlmError::Validation { message } if message == "Gemini API key must not be empty"
        ));
    }

    #[test]
    fn from_lookup_requires_an_api_key() {
        let error = GeminiProvider::from_lookup(lookup_from(&[]))
            .err()
            .expect("missing key should fail");

        assert!(matches!(
            error,
            LlmError::Validation { message }
            if message == "Gemini API key is missing (set STUDYKIT_GEMINI_API_KEY or GEMINI_API_KEY)"
        ));
    }

    #[test]
    fn from_lookup_uses_fallback_key_and_base_url() {
        let provider = GeminiProvider::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "fallback-key"),
            ("STUDYKIT_GEMINI_BASE_URL", "http://127.0.0.1:9"),
            ("STUDYKIT_LLM_TIMEOUT_SECS", "30"),
        ]))
        .expect("fallback configuration should build");

        assert_eq!(provider.api_key, "fallback-key");
        assert_eq!(
            provider.endpoint_url("m"),
            "http://127.0.0.1:9/v1beta/models/m:generateContent"
        );
    }

    #[test]
    fn from_lookup_rejects_invalid_timeout() {
        let error = GeminiProvider::from_lookup(lookup_from(&[
            ("STUDYKIT_GEMINI_API_KEY", "key"),
            ("STUDYKIT_GEMINI_TIMEOUT_SECS", "soon"),
        ]))
        .err()
        .expect("invalid timeout should fail");

        assert!(matches!(
            error,
            LlmError::Validation { message }
            if message == "STUDYKIT_GEMINI_TIMEOUT_SECS must be a positive integer"
        ));
    }
}
