use crate::error::CollaboratorError;

/// Find the first JSON object embedded in free-form model output.
///
/// Model output may be bare JSON, fenced in a markdown block, or preceded by
/// prose. Each `{` is tried as the start of a JSON value in turn; the first
/// one that parses as an object wins. Braces inside prose that do not start
/// a valid object are skipped.
pub fn extract_object(text: &str) -> Result<serde_json::Value, CollaboratorError> {
    for (start, _) in text.match_indices('{') {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<serde_json::Value>();
        if let Some(Ok(value)) = values.next() {
            if value.is_object() {
                return Ok(value);
            }
        }
    }

    Err(CollaboratorError::Parse(format!(
        "No JSON object found in response (length={})",
        text.len()
    )))
}
