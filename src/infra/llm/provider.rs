use crate::domain::{ContentRequest, ContentResponse, LlmError};

pub trait LlmProvider: Send + Sync {
    fn provider_id(&self) -> &str;

    fn generate_content(&self, request: &ContentRequest) -> Result<ContentResponse, LlmError>;
}
