use std::time::Duration;

use crate::domain::LlmError;

pub(crate) fn read_env_var(name: &str) -> Result<Option<String>, LlmError> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(error) => Err(LlmError::validation(format!(
            "{name} could not be read: {error}"
        ))),
    }
}

pub(crate) fn parse_timeout_seconds(name: &str, value: &str) -> Result<Duration, LlmError> {
    let parsed = parse_positive_integer(name, value)?;
    Ok(Duration::from_secs(parsed as u64))
}

pub(crate) fn parse_positive_integer(name: &str, value: &str) -> Result<usize, LlmError> {
    let parsed = value
        .trim()
        .parse::<usize>()
        .map_err(|_| LlmError::validation(format!("{name} must be a positive integer")))?;
    if parsed == 0 {
        return Err(LlmError::validation(format!("{name} must be greater than 0")));
    }
    Ok(parsed)
}

pub(crate) fn read_timeout_with<F>(lookup: &F, name: &str) -> Result<Option<Duration>, LlmError>
where
    F: Fn(&str) -> Result<Option<String>, LlmError>,
{
    let Some(value) = lookup(name)? else {
        return Ok(None);
    };
    Ok(Some(parse_timeout_seconds(name, &value)?))
}

pub(crate) fn resolve_timeout_with_global_fallback<F>(
    provider_timeout: Option<Duration>,
    read_global_timeout: F,
    default_timeout: Duration,
) -> Result<Duration, LlmError>
where
    F: FnOnce() -> Result<Option<Duration>, LlmError>,
{
    if let Some(timeout) = provider_timeout {
        return Ok(timeout);
    }

    Ok(read_global_timeout()?.unwrap_or(default_timeout))
}
