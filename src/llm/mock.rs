//! Scripted completion engine for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CompletionEngine, CompletionPayload, CompletionRequest, LlmError, ResponseFormat};

type Scripted = Result<CompletionPayload, LlmError>;

/// Replays queued responses and records every request it receives
///
/// In keyed mode responses are chosen by response format instead of call
/// order, so concurrent runs sharing one engine see deterministic output.
pub struct ScriptedEngine {
    queue: Mutex<VecDeque<Scripted>>,
    keyed: Option<(String, String)>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedEngine {
    pub fn new(responses: Vec<Scripted>) -> Self {
        Self {
            queue: Mutex::new(responses.into()),
            keyed: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Correction and extraction calls get fixed text, in any order
    pub fn by_format(correction: &str, extraction: &str) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            keyed: Some((correction.to_string(), extraction.to_string())),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: &str) -> Scripted {
        Ok(CompletionPayload::Text(text.to_string()))
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionEngine for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionPayload, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some((correction, extraction)) = &self.keyed {
            let text = match request.response_format {
                ResponseFormat::Text => correction,
                ResponseFormat::JsonObject => extraction,
            };
            return Ok(CompletionPayload::Text(text.clone()));
        }

        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyResponse {
                engine: "scripted",
            }))
    }
}
