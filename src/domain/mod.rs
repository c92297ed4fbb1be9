mod content_contract;
mod document;
mod errors;
mod response_schema;
mod study_material;

pub use content_contract::{
    ContentPart, ContentRequest, ContentResponse, JSON_MIME_TYPE, ResponseFormat,
    ResponseMetadata, TokenUsage,
};
pub use document::{InlineDocument, PDF_MIME_TYPE};
pub use errors::{LlmError, LlmErrorCategory, StudyError};
pub use response_schema::{ResponseSchema, SchemaType};
pub use study_material::{
    Citations, DocumentAnalysis, Question, Quiz, Segment, SegmentStudy,
};
