use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::llm::VocabularyIssue;

/// Envelope returned for every pipeline invocation, successful or not
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Whether every stage completed
    pub success: bool,
    /// Transcription text exactly as supplied by the caller
    pub original_text: String,
    /// Corrected, speaker-tagged conversation (empty on failure)
    pub corrected_text: String,
    /// Pruned structured record (empty object on failure)
    pub structured_data: Value,
    /// Completion model that served the run
    pub model_used: String,
    /// Completion engine that served the run
    pub engine: String,
    /// Identifier for this invocation
    pub run_id: String,
    /// RFC 3339 timestamp at which the result was assembled
    pub generated_at: String,
    /// Wall-clock seconds from invocation start to result assembly
    pub processing_time: f64,
    /// Distinct speakers with at least one non-empty utterance (0 on failure)
    pub speaker_count: usize,
    /// Values that fall outside the closed vocabulary or lack a required elaboration
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vocabulary_issues: Vec<VocabularyIssue>,
    /// Human-readable failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineResult {
    /// Top-level categories present in the structured record
    pub fn categories(&self) -> Vec<&str> {
        self.structured_data
            .as_object()
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Empty structured record used when a run fails
pub fn empty_record() -> Value {
    Value::Object(Map::new())
}

/// Round elapsed seconds to two decimals for reporting
pub fn round_seconds(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed_result() -> PipelineResult {
        PipelineResult {
            success: false,
            original_text: "머리가 아파요".to_string(),
            corrected_text: String::new(),
            structured_data: empty_record(),
            model_used: "gpt-4.1-2025-04-14".to_string(),
            engine: "openai".to_string(),
            run_id: "run".to_string(),
            generated_at: "2024-01-01T00:00:00Z".to_string(),
            processing_time: 0.12,
            speaker_count: 0,
            vocabulary_issues: vec![],
            error: Some("correction stage failed".to_string()),
        }
    }

    #[test]
    fn test_round_seconds() {
        assert_eq!(round_seconds(1.23456), 1.23);
        assert_eq!(round_seconds(0.005), 0.01);
        assert_eq!(round_seconds(0.0), 0.0);
    }

    #[test]
    fn test_failed_result_serialization() {
        let value = serde_json::to_value(failed_result()).unwrap();

        assert_eq!(value["success"], false);
        assert_eq!(value["structured_data"], serde_json::json!({}));
        assert_eq!(value["error"], "correction stage failed");
        // Empty issue lists are omitted
        assert!(value.get("vocabulary_issues").is_none());
    }

    #[test]
    fn test_categories_of_empty_record() {
        let result = failed_result();
        assert!(result.categories().is_empty());
    }
}
