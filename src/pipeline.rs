use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::RefineError;
use crate::llm::{validate_record, CompletionEngine, VocabularyIssue};
use crate::models::{empty_record, round_seconds, PipelineResult, Segment};
use crate::stages::{
    correct_conversation, extract_record, group_segments, prune_record, CorrectionConfig,
    ExtractionConfig,
};

/// One refinement invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefineRequest {
    /// Full transcription text as produced upstream
    #[serde(default)]
    pub transcription: String,
    #[serde(default)]
    pub segments: Vec<Segment>,
    /// Free-form note about the call, e.g. "traffic accident on the highway"
    #[serde(default)]
    pub context: Option<String>,
    /// Overrides the engine's default model
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub correction: CorrectionConfig,
    pub extraction: ExtractionConfig,
}

/// Where a run is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    Grouped,
    Corrected,
    Extracted,
    Pruned,
    Done,
    Failed,
}

impl PipelineState {
    /// Work performed when leaving this state
    pub fn next_step(&self) -> &'static str {
        match self {
            PipelineState::Start => "segment grouping",
            PipelineState::Grouped => "text correction",
            PipelineState::Corrected => "structured extraction",
            PipelineState::Extracted => "empty value pruning",
            PipelineState::Pruned => "result assembly",
            PipelineState::Done | PipelineState::Failed => "none",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Start => "start",
            PipelineState::Grouped => "grouped",
            PipelineState::Corrected => "corrected",
            PipelineState::Extracted => "extracted",
            PipelineState::Pruned => "pruned",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Output of the stages that make up a successful run
struct RunOutput {
    corrected: String,
    record: Value,
    speaker_count: usize,
    issues: Vec<VocabularyIssue>,
}

/// Grouping, correction, extraction and pruning over one shared engine
pub struct RefinePipeline {
    engine: Arc<dyn CompletionEngine>,
    config: PipelineConfig,
}

impl RefinePipeline {
    pub fn new(engine: Arc<dyn CompletionEngine>, config: PipelineConfig) -> Self {
        Self { engine, config }
    }

    /// Run every stage; failures come back as an unsuccessful result
    pub async fn refine(&self, request: &RefineRequest) -> PipelineResult {
        let started = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let model_used = self.engine.resolve_model(request.model.as_deref());

        info!(
            "Run {}: {} segments, engine {} ({})",
            run_id,
            request.segments.len(),
            self.engine.name(),
            model_used
        );

        let mut state = PipelineState::Start;
        let outcome = self.run(request, &mut state).await;
        let processing_time = round_seconds(started.elapsed().as_secs_f64());

        let mut result = PipelineResult {
            success: false,
            original_text: request.transcription.clone(),
            corrected_text: String::new(),
            structured_data: empty_record(),
            model_used,
            engine: self.engine.name().to_string(),
            run_id,
            generated_at: chrono::Utc::now().to_rfc3339(),
            processing_time,
            speaker_count: 0,
            vocabulary_issues: Vec::new(),
            error: None,
        };

        match outcome {
            Ok(output) => {
                info!("Run {}: done in {:.2}s", result.run_id, processing_time);
                result.success = true;
                result.corrected_text = output.corrected;
                result.structured_data = output.record;
                result.speaker_count = output.speaker_count;
                result.vocabulary_issues = output.issues;
            }
            Err(e) => {
                let step = state.next_step();
                self.advance(&mut state, PipelineState::Failed);
                warn!(
                    "Run {}: {} failed after {:.2}s: {}",
                    result.run_id, step, processing_time, e
                );
                if let Some(raw) = e.raw_output() {
                    warn!("Raw completion output: {}", raw);
                }
                result.error = Some(format!("{} failed: {}", step, e));
            }
        }

        result
    }

    async fn run(
        &self,
        request: &RefineRequest,
        state: &mut PipelineState,
    ) -> Result<RunOutput, RefineError> {
        let model = request.model.as_deref();

        let grouped = group_segments(&request.segments);
        for (speaker, utterances) in &grouped.speakers {
            info!("Speaker {}: {} utterances", speaker, utterances.len());
        }
        self.advance(state, PipelineState::Grouped);

        let corrected = correct_conversation(
            self.engine.as_ref(),
            &grouped.conversation,
            request.context.as_deref(),
            model,
            &self.config.correction,
        )
        .await?;
        self.advance(state, PipelineState::Corrected);

        let record = extract_record(
            self.engine.as_ref(),
            &corrected,
            model,
            &self.config.extraction,
        )
        .await?;
        self.advance(state, PipelineState::Extracted);

        let record = prune_record(record);
        self.advance(state, PipelineState::Pruned);

        let issues = if self.config.extraction.validate_vocabulary {
            let validation = validate_record(&record);
            if !validation.is_clean() {
                warn!(
                    "{} of {} categorical values flagged",
                    validation.issues.len(),
                    validation.fields_checked
                );
            }
            validation.issues
        } else {
            Vec::new()
        };
        self.advance(state, PipelineState::Done);

        Ok(RunOutput {
            corrected,
            record,
            speaker_count: grouped.speaker_count(),
            issues,
        })
    }

    fn advance(&self, state: &mut PipelineState, next: PipelineState) {
        info!("Pipeline: {} -> {}", state, next);
        *state = next;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::llm::mock::ScriptedEngine;
    use crate::llm::{IssueKind, LlmError};

    fn request() -> RefineRequest {
        RefineRequest {
            transcription: "어디가 아프세요? 머리가 두동이에요.".to_string(),
            segments: vec![
                Segment::new("seg_0", "A", 0.0, 1.2, "어디가 아프세요?"),
                Segment::new("seg_1", "B", 1.4, 2.8, "머리가 두동이에요."),
                Segment::new("seg_2", "C", 3.0, 3.4, "저는 딸이에요."),
                Segment::new("seg_3", "A", 3.6, 4.0, " "),
            ],
            context: None,
            model: None,
        }
    }

    fn pipeline(engine: ScriptedEngine) -> (Arc<ScriptedEngine>, RefinePipeline) {
        let engine = Arc::new(engine);
        let pipeline = RefinePipeline::new(engine.clone(), PipelineConfig::default());
        (engine, pipeline)
    }

    #[tokio::test]
    async fn test_refine_success() {
        let (engine, pipeline) = pipeline(ScriptedEngine::new(vec![
            ScriptedEngine::text("[speaker A]: 어디가 아프세요?\n[speaker B]: 머리가 두통이에요."),
            ScriptedEngine::text(
                "```json\n{\"dispatch\":{\"schema_version\":1,\"symptoms\":{\"pain\":[{\"name\":\"두통\",\"value\":\"\"}]}},\"medicalGuidance\":{}}\n```",
            ),
        ]));

        let result = pipeline.refine(&request()).await;

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.speaker_count, 3);
        assert_eq!(
            result.structured_data,
            json!({"dispatch": {"schema_version": 1, "symptoms": {"pain": [{"name": "두통"}]}}})
        );
        assert_eq!(result.model_used, "scripted-model");
        assert_eq!(result.engine, "scripted");
        assert!(result.vocabulary_issues.is_empty());
        assert!(result.error.is_none());

        // Correction sees the grouped transcript
        let requests = engine.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].user.contains("[speaker B]: 머리가 두동이에요."));
        assert!(requests[1].user.contains("[speaker B]: 머리가 두통이에요."));
    }

    #[tokio::test]
    async fn test_correction_failure_skips_extraction() {
        let (engine, pipeline) = pipeline(ScriptedEngine::new(vec![Err(
            LlmError::EmptyResponse { engine: "scripted" },
        )]));

        let result = pipeline.refine(&request()).await;

        assert!(!result.success);
        assert_eq!(result.original_text, request().transcription);
        assert_eq!(result.corrected_text, "");
        assert_eq!(result.structured_data, json!({}));
        assert_eq!(result.speaker_count, 0);
        assert!(result.error.unwrap().starts_with("text correction failed"));
        assert_eq!(engine.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_extraction_never_returns_partial_result() {
        let (_, pipeline) = pipeline(ScriptedEngine::new(vec![
            ScriptedEngine::text("[speaker A]: 어디가 아프세요?"),
            ScriptedEngine::text("{\"dispatch\": {\"symptoms\": "),
        ]));

        let result = pipeline.refine(&request()).await;

        assert!(!result.success);
        assert_eq!(result.corrected_text, "");
        assert_eq!(result.structured_data, json!({}));
        assert!(result.error.unwrap().starts_with("structured extraction failed"));
    }

    #[tokio::test]
    async fn test_fenced_empty_category_prunes_to_empty_record() {
        let (_, pipeline) = pipeline(ScriptedEngine::new(vec![
            ScriptedEngine::text("[speaker A]: 119입니다."),
            ScriptedEngine::text("```json\n{\"patientInfo\":{}}\n```"),
        ]));

        let result = pipeline.refine(&request()).await;

        assert!(result.success);
        assert_eq!(result.structured_data, json!({}));
        assert!(result.categories().is_empty());
    }

    #[tokio::test]
    async fn test_vocabulary_issues_are_flagged_not_rejected() {
        let (_, pipeline) = pipeline(ScriptedEngine::new(vec![
            ScriptedEngine::text("[speaker A]: 어디가 아프세요?"),
            ScriptedEngine::text(r#"{"dispatch":{"dispatchType":"기타"}}"#),
        ]));

        let result = pipeline.refine(&request()).await;

        assert!(result.success);
        assert_eq!(result.structured_data["dispatch"]["dispatchType"], "기타");
        assert_eq!(result.vocabulary_issues.len(), 1);
        assert_eq!(result.vocabulary_issues[0].kind, IssueKind::MissingDetail);
    }

    #[tokio::test]
    async fn test_model_override_reported() {
        let (engine, pipeline) = pipeline(ScriptedEngine::new(vec![
            ScriptedEngine::text("[speaker A]: 어디가 아프세요?"),
            ScriptedEngine::text("{}"),
        ]));
        let request = RefineRequest {
            model: Some("gpt-4o-mini".to_string()),
            ..request()
        };

        let result = pipeline.refine(&request).await;

        assert_eq!(result.model_used, "gpt-4o-mini");
        assert!(engine
            .requests()
            .iter()
            .all(|r| r.model.as_deref() == Some("gpt-4o-mini")));
    }

    #[tokio::test]
    async fn test_concurrent_runs_share_one_engine() {
        let (engine, pipeline) = pipeline(ScriptedEngine::by_format(
            "[speaker A]: 어디가 아프세요?",
            r#"{"patientAssessment":{"patientLevel":"LEVEL 3"}}"#,
        ));
        let pipeline = Arc::new(pipeline);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = pipeline.clone();
                tokio::spawn(async move { pipeline.refine(&request()).await })
            })
            .collect();

        let mut run_ids = Vec::new();
        for handle in handles {
            let result = handle.await.unwrap();
            assert!(result.success);
            assert_eq!(result.structured_data["patientAssessment"]["patientLevel"], "LEVEL 3");
            run_ids.push(result.run_id);
        }

        run_ids.sort();
        run_ids.dedup();
        assert_eq!(run_ids.len(), 4);
        assert_eq!(engine.requests().len(), 8);
    }

    #[test]
    fn test_request_from_json() {
        let request: RefineRequest = serde_json::from_str(
            r#"{"transcription": "hi", "segments": [{"id": "s", "speaker": "A", "start": 0, "end": 1, "text": "hi"}]}"#,
        )
        .unwrap();

        assert_eq!(request.segments.len(), 1);
        assert!(request.context.is_none());
    }
}
