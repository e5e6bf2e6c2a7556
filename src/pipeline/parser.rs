//! Tolerant extraction of the JSON payload from free-form model output.
//!
//! Models wrap JSON in prose or markdown fences unpredictably. Bracket
//! matching on the outermost braces tolerates leading and trailing commentary
//! without a full tokenizer. It assumes the payload is a single top-level
//! object with no unescaped `}` before the intended end; an input violating
//! that is silently mis-sliced rather than detected, and the retry loop only
//! compensates when the bad slice also fails to parse.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no JSON object found in response")]
    NoJson,

    #[error("JSON parsing error: {0}")]
    MalformedJson(String),
}

/// Locate and parse the JSON object embedded in `response`.
///
/// 1. Find the first `{` and the last `}`.
/// 2. Either absent, or an empty span, is `NoJson`.
/// 3. Parse the inclusive slice; failure is `MalformedJson` with the
///    serde error retained for diagnostics.
/// 4. Success returns the value as-is — no schema validation. Callers read
///    fields defensively (`AnalysisResult::from_value`).
pub fn extract_json(response: &str) -> Result<Value, ExtractError> {
    let start = response.find('{').ok_or(ExtractError::NoJson)?;
    let end = response.rfind('}').ok_or(ExtractError::NoJson)?;
    if end < start {
        return Err(ExtractError::NoJson);
    }

    let json_str = &response[start..=end];
    serde_json::from_str(json_str).map_err(|e| ExtractError::MalformedJson(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_fenced_json_from_commentary() {
        let response = "Here is the result:\n```json\n{\"a\":1}\n```\nDone.";
        let value = extract_json(response).unwrap();
        assert_eq!(value, json!({"a": 1}));
    }

    #[test]
    fn idempotent_on_bare_json() {
        let original = json!({
            "aiReviewFramework": [],
            "aiRecommendationSummary": "ok"
        });
        let serialized = serde_json::to_string(&original).unwrap();
        let value = extract_json(&serialized).unwrap();
        assert_eq!(value, original);
    }

    #[test]
    fn no_brace_classifies_as_no_json() {
        assert!(matches!(
            extract_json("The model declined to answer."),
            Err(ExtractError::NoJson)
        ));
        assert!(matches!(extract_json(""), Err(ExtractError::NoJson)));
    }

    #[test]
    fn close_before_open_is_no_json() {
        assert!(matches!(extract_json("} then {"), Err(ExtractError::NoJson)));
    }

    #[test]
    fn brace_bounded_prose_is_malformed() {
        let response = "see {curly note} below";
        assert!(matches!(
            extract_json(response),
            Err(ExtractError::MalformedJson(_))
        ));
    }

    #[test]
    fn malformed_error_keeps_serde_diagnostics() {
        let err = extract_json("{not json}").unwrap_err();
        match err {
            ExtractError::MalformedJson(msg) => assert!(!msg.is_empty()),
            other => panic!("expected MalformedJson, got {other:?}"),
        }
    }

    #[test]
    fn outermost_braces_win_over_nested_objects() {
        let response = "prefix {\"outer\": {\"inner\": 2}} suffix";
        let value = extract_json(response).unwrap();
        assert_eq!(value["outer"]["inner"], 2);
    }

    // Known limitation: a stray brace in trailing prose widens the slice and
    // breaks the parse. The retry loop re-asks in that case.
    #[test]
    fn stray_trailing_brace_is_malformed_not_silent() {
        let response = "{\"a\": 1} and a stray } here";
        assert!(matches!(
            extract_json(response),
            Err(ExtractError::MalformedJson(_))
        ));
    }
}
