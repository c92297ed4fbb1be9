use jsonschema::JSONSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{LlmError, ResponseSchema};

use super::response_parsing::extract_json_payload;

/// Compiled form of a [`ResponseSchema`] used to check what the model sent
/// back before it is decoded into a typed value.
pub struct ResponseSchemaValidator {
    compiled_schema: JSONSchema,
}

impl ResponseSchemaValidator {
    pub fn compile(schema: &ResponseSchema) -> Result<Self, LlmError> {
        let schema = schema.to_json_schema();
        let compiled_schema = JSONSchema::compile(&schema).map_err(|err| {
            LlmError::internal(format!("failed to compile response schema: {err}"))
        })?;
        Ok(Self { compiled_schema })
    }

    pub fn validate_response_text<T>(&self, response_text: &str) -> Result<T, LlmError>
    where
        T: DeserializeOwned,
    {
        let payload = extract_json_payload(response_text)
            .ok_or_else(|| LlmError::invalid_response("response text is empty"))?;
        let json_value: Value = serde_json::from_str(payload).map_err(|err| {
            LlmError::invalid_response(format!("response JSON decode failed: {err}"))
        })?;
        self.validate_response_value(json_value)
    }

    pub fn validate_response_value<T>(&self, response: Value) -> Result<T, LlmError>
    where
        T: DeserializeOwned,
    {
        self.compiled_schema
            .validate(&response)
            .map_err(schema_validation_error)?;

        serde_json::from_value(response).map_err(|err| {
            LlmError::invalid_response(format!(
                "response JSON did not match the expected contract: {err}"
            ))
        })
    }
}

fn schema_validation_error<'a, I>(errors: I) -> LlmError
where
    I: IntoIterator<Item = jsonschema::ValidationError<'a>>,
{
    let details = errors
        .into_iter()
        .map(|err| err.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    LlmError::invalid_response(format!("response schema validation failed: {details}"))
}
