use std::fs;
use std::io;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Binary document sent inline with a request, already base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineDocument {
    mime_type: String,
    data: String,
}

impl InlineDocument {
    /// Wraps caller-encoded PDF data as-is; the payload is not inspected.
    pub fn pdf_from_base64(data: impl Into<String>) -> Self {
        Self {
            mime_type: PDF_MIME_TYPE.to_string(),
            data: data.into(),
        }
    }

    pub fn pdf_from_bytes(bytes: &[u8]) -> Self {
        Self::pdf_from_base64(STANDARD.encode(bytes))
    }

    pub fn pdf_from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        Ok(Self::pdf_from_bytes(&bytes))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &str {
        &self.data
    }
}
