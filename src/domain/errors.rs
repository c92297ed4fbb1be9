use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorCategory {
    UserActionRequired,
    TemporaryFailure,
    InternalFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("validation failed: {message}")]
    Validation { message: String },
    #[error("provider authentication failed")]
    Auth,
    #[error("provider rate limit reached")]
    RateLimited,
    #[error("provider request timed out")]
    Timeout,
    #[error("provider returned an invalid response: {message}")]
    InvalidResponse { message: String },
    #[error("provider transport failed: {message}")]
    Transport { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl LlmError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn category(&self) -> LlmErrorCategory {
        match self {
            Self::Validation { .. } | Self::Auth => LlmErrorCategory::UserActionRequired,
            Self::RateLimited | Self::Timeout | Self::Transport { .. } => {
                LlmErrorCategory::TemporaryFailure
            }
            Self::InvalidResponse { .. } | Self::Internal { .. } => {
                LlmErrorCategory::InternalFailure
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited | Self::Timeout | Self::Transport { .. }
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } => {
                format!("Please review the study configuration: {message}")
            }
            Self::Auth => {
                "Authentication failed. Check your Gemini API key and configuration.".to_string()
            }
            Self::RateLimited => {
                "The model service is rate limiting requests. Please retry in a moment."
                    .to_string()
            }
            Self::Timeout => "The model service did not respond in time. Please retry.".to_string(),
            Self::InvalidResponse { message } => {
                format!("The model service returned an invalid response: {message}")
            }
            Self::Transport { message } => {
                format!("Could not reach the model service: {message}")
            }
            Self::Internal { message } => {
                format!("An internal error occurred while contacting the model: {message}")
            }
        }
    }
}

/// Failures surfaced by the study operations.
///
/// Response-shape failures carry a fixed display message per operation; the
/// underlying cause is kept in `reason` for diagnostics only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudyError {
    #[error("Failed to analyze document structure.")]
    DocumentAnalysis { reason: String },
    #[error("Could not extract text for this part.")]
    SegmentExtraction,
    #[error("Failed to generate quiz.")]
    QuizGeneration { reason: String },
    #[error("invalid study configuration: {message}")]
    Config { message: String },
    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl StudyError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Reason attached to a response-shape failure, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::DocumentAnalysis { reason } | Self::QuizGeneration { reason } => Some(reason),
            _ => None,
        }
    }
}
