use std::ops::RangeInclusive;

use crate::domain::{LlmError, StudyError};
use crate::infra::llm::{parse_positive_integer, read_env_var};

const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_MAX_QUIZ_SOURCE_CHARS: usize = 8000;
const DEFAULT_MIN_SEGMENTS: usize = 5;
const DEFAULT_MAX_SEGMENTS: usize = 10;
const DEFAULT_QUIZ_QUESTION_COUNT: usize = 5;

const ENV_MODEL: &str = "STUDYKIT_GEMINI_MODEL";
const ENV_QUIZ_SOURCE_CHARS: &str = "STUDYKIT_QUIZ_SOURCE_CHARS";

/// Policy knobs for the study requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyConfig {
    pub model: String,
    /// Characters of source text forwarded to the quiz prompt; the rest is dropped.
    pub max_quiz_source_chars: usize,
    pub min_segments: usize,
    pub max_segments: usize,
    pub quiz_question_count: usize,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_quiz_source_chars: DEFAULT_MAX_QUIZ_SOURCE_CHARS,
            min_segments: DEFAULT_MIN_SEGMENTS,
            max_segments: DEFAULT_MAX_SEGMENTS,
            quiz_question_count: DEFAULT_QUIZ_QUESTION_COUNT,
        }
    }
}

impl StudyConfig {
    pub fn from_env() -> Result<Self, StudyError> {
        Self::from_lookup(read_env_var)
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, StudyError>
    where
        F: Fn(&str) -> Result<Option<String>, LlmError>,
    {
        let mut config = Self::default();
        if let Some(model) = lookup(ENV_MODEL).map_err(into_config_error)? {
            config.model = model.trim().to_string();
        }
        if let Some(chars) = lookup(ENV_QUIZ_SOURCE_CHARS).map_err(into_config_error)? {
            config.max_quiz_source_chars =
                parse_positive_integer(ENV_QUIZ_SOURCE_CHARS, &chars).map_err(into_config_error)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn segment_range(&self) -> RangeInclusive<usize> {
        self.min_segments..=self.max_segments
    }

    pub fn validate(&self) -> Result<(), StudyError> {
        if self.model.trim().is_empty() {
            return Err(StudyError::config("model must not be empty"));
        }
        if self.max_quiz_source_chars == 0 {
            return Err(StudyError::config(
                "max_quiz_source_chars must be greater than 0",
            ));
        }
        if self.quiz_question_count == 0 {
            return Err(StudyError::config(
                "quiz_question_count must be greater than 0",
            ));
        }
        if self.min_segments == 0 || self.min_segments > self.max_segments {
            return Err(StudyError::config(format!(
                "segment range must satisfy 1 <= min <= max (got {}..={})",
                self.min_segments, self.max_segments
            )));
        }
        Ok(())
    }
}

fn into_config_error(error: LlmError) -> StudyError {
    match error {
        LlmError::Validation { message } => StudyError::Config { message },
        other => StudyError::Llm(other),
    }
}
