use serde_json::{Map, Value};

use crate::error::ScanError;
use crate::llm::LanguageModel;
use crate::models::IdCardData;

use super::prompts;

const FENCE: &str = "```";

/// Ask the model for the nine card fields and parse its reply.
pub async fn extract_fields(
    llm: &dyn LanguageModel,
    model: &str,
    corrected_text: &str,
) -> Result<IdCardData, ScanError> {
    let prompt = prompts::field_extraction(corrected_text);
    let response = llm
        .complete(model, &prompt)
        .await
        .map_err(ScanError::ExtractionService)?;
    parse_response(&response)
}

/// Parse a model reply into card fields.
///
/// The whole reply is tried as a JSON object first. Failing that, the first
/// fenced block (preferring one tagged `json`) is parsed instead.
pub fn parse_response(response: &str) -> Result<IdCardData, ScanError> {
    let object = match parse_object(response) {
        Ok(object) => object,
        Err(strict_err) => {
            let Some(block) = fenced_block(response) else {
                return Err(parse_error(strict_err, response));
            };
            parse_object(block)
                .map_err(|e| parse_error(format!("fenced block: {e}"), response))?
        }
    };

    Ok(project(&object))
}

/// Content of the preferred fenced block, without its tag. `None` when no fence is closed.
///
/// A fence opened with a `json` tag is closed by the next marker after it,
/// whatever stray markers come before it. Without one, markers are paired in
/// order and the first pair wins.
pub fn fenced_block(text: &str) -> Option<&str> {
    json_block(text)
        .or_else(|| first_pair(text))
        .map(str::trim)
}

fn json_block(text: &str) -> Option<&str> {
    let (open, _) = text
        .match_indices(FENCE)
        .find(|(i, _)| split_tag(&text[i + FENCE.len()..]).0.eq_ignore_ascii_case("json"))?;

    let (_, rest) = split_tag(&text[open + FENCE.len()..]);
    rest.find(FENCE).map(|close| &rest[..close])
}

fn first_pair(text: &str) -> Option<&str> {
    let mut marks = text.match_indices(FENCE).map(|(i, _)| i);
    let open = marks.next()?;
    let close = marks.next()?;
    Some(split_tag(&text[open + FENCE.len()..close]).1)
}

/// Split the info-string tag (`json`, `JSON`, empty) off the text after an opening fence.
fn split_tag(after_fence: &str) -> (&str, &str) {
    let tag_len = after_fence
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after_fence.len());
    after_fence.split_at(tag_len)
}

fn parse_object(text: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {}", kind_of(&other))),
        Err(e) => Err(format!("invalid JSON: {e}")),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_error(message: String, response: &str) -> ScanError {
    ScanError::FieldExtractionParse {
        message,
        raw_response: response.to_string(),
    }
}

/// Keep only the known fields. Unknown keys are ignored, missing ones stay absent.
fn project(object: &Map<String, Value>) -> IdCardData {
    let mut data = IdCardData::default();
    for name in IdCardData::FIELD_NAMES {
        if let Some(slot) = data.field_mut(name) {
            *slot = object.get(name).and_then(field_value);
        }
    }
    data
}

fn field_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        // Models sometimes emit the national id as a bare number
        Value::Number(n) => integer_text(n),
        _ => None,
    }
}

/// Largest magnitude below which every whole `f64` is exact.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Whole numbers as plain decimal digits. Fractions and imprecise floats are absent.
fn integer_text(n: &serde_json::Number) -> Option<String> {
    if let Some(v) = n.as_u64() {
        return Some(v.to_string());
    }
    if let Some(v) = n.as_i64() {
        return Some(v.to_string());
    }
    let v = n.as_f64()?;
    (v.is_finite() && v.fract() == 0.0 && v.abs() < MAX_EXACT_FLOAT).then(|| format!("{v:.0}"))
}
