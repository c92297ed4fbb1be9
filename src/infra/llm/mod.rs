mod env;
mod gemini;
mod prompt_builder;
mod provider;
mod response_parsing;
pub mod schema_validator;

pub use gemini::GeminiProvider;
pub use prompt_builder::{PromptBuilder, quiz_prompt_prefix};
pub use provider::LlmProvider;

pub(crate) use env::{parse_positive_integer, read_env_var};
