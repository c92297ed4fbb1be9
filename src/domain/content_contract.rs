use super::{InlineDocument, LlmError, ResponseSchema};

pub const JSON_MIME_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    InlineData(InlineDocument),
    Text(String),
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::InlineData(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseFormat {
    pub mime_type: String,
    pub schema: ResponseSchema,
}

impl ResponseFormat {
    pub fn json(schema: ResponseSchema) -> Self {
        Self {
            mime_type: JSON_MIME_TYPE.to_string(),
            schema,
        }
    }
}

/// One single-turn `generateContent` exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRequest {
    pub model: String,
    pub parts: Vec<ContentPart>,
    pub response_format: Option<ResponseFormat>,
}

impl ContentRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            parts: Vec::new(),
            response_format: None,
        }
    }

    pub fn with_document(mut self, document: &InlineDocument) -> Self {
        self.parts.push(ContentPart::InlineData(document.clone()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(ContentPart::text(text));
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Text of the last text part, which carries the instruction.
    pub fn instruction(&self) -> Option<&str> {
        self.parts.iter().rev().find_map(ContentPart::as_text)
    }

    pub fn validate(&self) -> Result<(), LlmError> {
        if self.model.trim().is_empty() {
            return Err(LlmError::validation("model must not be empty"));
        }
        if self.parts.is_empty() {
            return Err(LlmError::validation(
                "request must contain at least one content part",
            ));
        }
        for part in &self.parts {
            match part {
                ContentPart::Text(text) if text.trim().is_empty() => {
                    return Err(LlmError::validation("text parts must not be empty"));
                }
                ContentPart::InlineData(document) if document.mime_type().trim().is_empty() => {
                    return Err(LlmError::validation(
                        "inline data parts must declare a MIME type",
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u32>,
    pub candidates_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
    pub latency_ms: Option<u64>,
    pub provider_request_id: Option<String>,
    pub model_version: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentResponse {
    pub text: Option<String>,
    pub metadata: ResponseMetadata,
}

impl ContentResponse {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            metadata: ResponseMetadata::default(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Response text, treating an empty string the same as no text.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }
}
