//! Client for turning a PDF into study material with a hosted Gemini model:
//! citations and reading segments, verbatim segment text, and quizzes.

pub mod app;
pub mod domain;
pub mod infra;
