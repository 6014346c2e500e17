use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::RefineError;
use crate::llm::{
    build_extraction_prompt, strip_code_fences, CompletionEngine, CompletionPayload,
    CompletionRequest, ResponseFormat, EXTRACTION_SYSTEM_PROMPT,
};

/// Configuration for the extraction pass
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    /// Check categorical values against the vocabulary after pruning
    pub validate_vocabulary: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 3000,
            validate_vocabulary: true,
        }
    }
}

/// Turn an engine payload into a record object
///
/// Text payloads are fence-stripped and parsed; anything that is not a JSON
/// object is malformed.
pub fn parse_record_payload(payload: CompletionPayload) -> Result<Value, RefineError> {
    let value = match payload.into_json() {
        Ok(value) => value,
        Err(raw) => {
            let stripped = strip_code_fences(&raw);
            match serde_json::from_str::<Value>(stripped) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Extraction output is not valid JSON: {}", e);
                    return Err(RefineError::malformed(e.to_string(), raw));
                }
            }
        }
    };

    if !value.is_object() {
        return Err(RefineError::malformed(
            "expected a JSON object at the top level",
            value.to_string(),
        ));
    }
    Ok(value)
}

/// Execute Stage 2: extract the structured record from the corrected conversation
pub async fn extract_record(
    engine: &dyn CompletionEngine,
    corrected: &str,
    model: Option<&str>,
    config: &ExtractionConfig,
) -> Result<Value, RefineError> {
    let request = CompletionRequest {
        model: model.map(str::to_string),
        system: EXTRACTION_SYSTEM_PROMPT.to_string(),
        user: build_extraction_prompt(corrected),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        response_format: ResponseFormat::JsonObject,
    };

    debug!("Extraction prompt: {} chars", request.user.len());

    let payload = engine.complete(&request).await?;
    let record = parse_record_payload(payload)?;

    info!(
        "Stage 2: extracted {} categories",
        record.as_object().map(|m| m.len()).unwrap_or(0)
    );

    Ok(record)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::llm::mock::ScriptedEngine;

    #[test]
    fn test_parse_fenced_text() {
        let payload = CompletionPayload::Text("```json\n{\"patientInfo\":{}}\n```".to_string());
        assert_eq!(parse_record_payload(payload).unwrap(), json!({"patientInfo": {}}));
    }

    #[test]
    fn test_parse_json_payload_directly() {
        let payload = CompletionPayload::Json(json!({"dispatch": {"dispatchType": "정상"}}));
        assert_eq!(
            parse_record_payload(payload).unwrap()["dispatch"]["dispatchType"],
            "정상"
        );
    }

    #[test]
    fn test_parse_invalid_json_keeps_raw() {
        let payload = CompletionPayload::Text("환자 정보를 찾을 수 없습니다".to_string());
        let err = parse_record_payload(payload).unwrap_err();

        assert!(matches!(err, RefineError::MalformedOutput { .. }));
        assert_eq!(err.raw_output(), Some("환자 정보를 찾을 수 없습니다"));
    }

    #[test]
    fn test_parse_prose_before_fence_is_malformed() {
        let raw = "Here is the JSON:\n```json\n{\"dispatch\":{}}\n```";
        let err = parse_record_payload(CompletionPayload::Text(raw.to_string())).unwrap_err();

        assert!(matches!(err, RefineError::MalformedOutput { .. }));
        assert_eq!(err.raw_output(), Some(raw));
    }

    #[test]
    fn test_parse_non_object_is_malformed() {
        let err = parse_record_payload(CompletionPayload::Text("[1, 2]".to_string())).unwrap_err();
        assert!(matches!(err, RefineError::MalformedOutput { .. }));
    }

    #[tokio::test]
    async fn test_extraction_request_shape() {
        let engine = ScriptedEngine::new(vec![ScriptedEngine::text(
            r#"{"dispatch":{"symptoms":{"pain":[{"name":"두통"}]}}}"#,
        )]);

        let record = extract_record(
            &engine,
            "[speaker C]: 머리가 아파요.",
            None,
            &ExtractionConfig::default(),
        )
        .await
        .unwrap();

        assert_eq!(record["dispatch"]["symptoms"]["pain"][0]["name"], "두통");

        let requests = engine.requests();
        assert_eq!(requests[0].response_format, ResponseFormat::JsonObject);
        assert_eq!(requests[0].temperature, 0.1);
        assert_eq!(requests[0].max_tokens, 3000);
        assert!(requests[0].user.contains("[speaker C]: 머리가 아파요."));
    }
}
