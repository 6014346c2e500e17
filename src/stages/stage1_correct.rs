use tracing::{debug, info};

use crate::error::RefineError;
use crate::llm::{
    build_correction_prompt, CompletionEngine, CompletionRequest, ResponseFormat,
    CORRECTION_SYSTEM_PROMPT,
};

/// Configuration for the correction pass
#[derive(Debug, Clone)]
pub struct CorrectionConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 2000,
        }
    }
}

/// Prefix the conversation with a context annotation line
///
/// Blank or missing context leaves the conversation unchanged.
pub fn annotate_with_context(conversation: &str, context: Option<&str>) -> String {
    match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!(
            "[emergency call context: {}]\n\n{}",
            context, conversation
        ),
        None => conversation.to_string(),
    }
}

/// Execute Stage 1: correct recognition errors in the conversation
pub async fn correct_conversation(
    engine: &dyn CompletionEngine,
    conversation: &str,
    context: Option<&str>,
    model: Option<&str>,
    config: &CorrectionConfig,
) -> Result<String, RefineError> {
    let annotated = annotate_with_context(conversation, context);

    let request = CompletionRequest {
        model: model.map(str::to_string),
        system: CORRECTION_SYSTEM_PROMPT.to_string(),
        user: build_correction_prompt(&annotated),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        response_format: ResponseFormat::Text,
    };

    debug!("Correction prompt: {} chars", request.user.len());

    let payload = engine.complete(&request).await?;
    let corrected = payload.as_text().trim().to_string();

    info!(
        "Stage 1: corrected conversation ({} -> {} chars)",
        conversation.chars().count(),
        corrected.chars().count()
    );

    Ok(corrected)
}
