use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::{
    ContentRequest, ContentResponse, DocumentAnalysis, InlineDocument, Quiz, ResponseFormat,
    Segment, SegmentStudy, StudyError,
};
use crate::infra::llm::schema_validator::ResponseSchemaValidator;
use crate::infra::llm::{LlmProvider, PromptBuilder};

use super::StudyConfig;

/// Document analysis, segment extraction and quiz generation against one
/// injected provider. Holds no mutable state, so a shared reference can be
/// used from several threads at once.
pub struct StudyService {
    provider: Arc<dyn LlmProvider>,
    config: StudyConfig,
    analysis_validator: ResponseSchemaValidator,
    quiz_validator: ResponseSchemaValidator,
}

impl StudyService {
    pub fn new(provider: Arc<dyn LlmProvider>, config: StudyConfig) -> Result<Self, StudyError> {
        config.validate()?;

        Ok(Self {
            provider,
            config,
            analysis_validator: ResponseSchemaValidator::compile(
                &DocumentAnalysis::response_schema(),
            )?,
            quiz_validator: ResponseSchemaValidator::compile(&Quiz::response_schema())?,
        })
    }

    pub fn with_provider<P>(provider: P, config: StudyConfig) -> Result<Self, StudyError>
    where
        P: LlmProvider + 'static,
    {
        Self::new(Arc::new(provider), config)
    }

    pub fn config(&self) -> &StudyConfig {
        &self.config
    }

    pub fn analyze_document_structure(
        &self,
        document: &InlineDocument,
    ) -> Result<DocumentAnalysis, StudyError> {
        let request = ContentRequest::new(&self.config.model)
            .with_document(document)
            .with_text(PromptBuilder::document_structure(
                self.config.min_segments,
                self.config.max_segments,
            ))
            .with_response_format(ResponseFormat::json(DocumentAnalysis::response_schema()));

        let response = self.provider.generate_content(&request)?;
        let analysis: DocumentAnalysis = decode_structured(&self.analysis_validator, &response)
            .map_err(|reason| StudyError::DocumentAnalysis { reason })?;

        for issue in analysis.consistency_issues(self.config.segment_range()) {
            warn!(%issue, "document analysis breaks a requested invariant");
        }
        debug!(
            total_pages = analysis.total_pages,
            segments = analysis.parts.len(),
            "analyzed document structure"
        );

        Ok(analysis)
    }

    /// Returns the model's text for the matching section without any trimming.
    pub fn extract_segment_text(
        &self,
        document: &InlineDocument,
        part_title: &str,
        part_description: &str,
    ) -> Result<String, StudyError> {
        let request = ContentRequest::new(&self.config.model)
            .with_document(document)
            .with_text(PromptBuilder::segment_extraction(
                part_title,
                part_description,
            ));

        let response = self.provider.generate_content(&request)?;
        let text = response
            .text()
            .map(str::to_owned)
            .ok_or(StudyError::SegmentExtraction)?;

        debug!(part_title, chars = text.chars().count(), "extracted segment text");
        Ok(text)
    }

    pub fn generate_quiz(&self, text: &str) -> Result<Quiz, StudyError> {
        let limit = self.config.max_quiz_source_chars;
        let source = truncate_chars(text, limit);
        if source.len() < text.len() {
            warn!(
                original_chars = text.chars().count(),
                forwarded_chars = limit,
                "quiz source text exceeds the character budget and was truncated"
            );
        }

        let request = ContentRequest::new(&self.config.model)
            .with_text(PromptBuilder::quiz(source, self.config.quiz_question_count))
            .with_response_format(ResponseFormat::json(Quiz::response_schema()));

        let response = self.provider.generate_content(&request)?;
        let quiz: Quiz = decode_structured(&self.quiz_validator, &response)
            .map_err(|reason| StudyError::QuizGeneration { reason })?;

        for issue in quiz.consistency_issues(self.config.quiz_question_count) {
            warn!(%issue, "quiz breaks a requested invariant");
        }

        Ok(quiz)
    }

    /// Extracts one segment and builds a quiz from its text, in that order.
    pub fn study_segment(
        &self,
        document: &InlineDocument,
        segment: &Segment,
    ) -> Result<SegmentStudy, StudyError> {
        let text = self.extract_segment_text(document, &segment.title, &segment.description)?;
        let quiz = self.generate_quiz(&text)?;

        Ok(SegmentStudy {
            segment: segment.clone(),
            text,
            quiz,
        })
    }
}

fn decode_structured<T>(
    validator: &ResponseSchemaValidator,
    response: &ContentResponse,
) -> Result<T, String>
where
    T: DeserializeOwned,
{
    let text = response
        .text()
        .ok_or_else(|| "response did not include text".to_string())?;
    validator
        .validate_response_text(text)
        .map_err(|err| err.to_string())
}

/// Prefix of `text` holding at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
