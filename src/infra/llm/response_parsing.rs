const MAX_ERROR_MESSAGE_LEN: usize = 256;

pub(crate) fn truncate_message(body: &str) -> String {
    let compact = body.trim().replace('\n', " ");
    compact.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}

/// Strips a surrounding markdown fence, if the model added one despite the
/// declared JSON MIME type.
pub(crate) fn extract_json_payload(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(fenced) = extract_markdown_fenced_block(trimmed) {
        let fenced = fenced.trim();
        if !fenced.is_empty() {
            return Some(fenced);
        }
    }

    Some(trimmed)
}

fn extract_markdown_fenced_block(text: &str) -> Option<&str> {
    let stripped = text.strip_prefix("```")?;
    let first_newline = stripped.find('\n')?;
    let (_, rest) = stripped.split_at(first_newline + 1);
    let end = rest.rfind("```")?;
    Some(&rest[..end])
}
