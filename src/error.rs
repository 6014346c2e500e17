use thiserror::Error;

use crate::llm::LlmError;

/// Failures that end a refinement run
#[derive(Debug, Error)]
pub enum RefineError {
    /// The completion engine could not be reached or returned nothing usable
    #[error("completion engine failed: {0}")]
    UpstreamFailure(#[from] LlmError),

    /// The completion text is not a JSON object, even after fence stripping
    #[error("completion output is not a valid JSON object: {diagnostic}")]
    MalformedOutput {
        /// Parser diagnostic
        diagnostic: String,
        /// Completion text as received, for operator inspection
        raw: String,
    },

    /// Request shape checks at the input boundary
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RefineError {
    pub fn malformed(diagnostic: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::MalformedOutput {
            diagnostic: diagnostic.into(),
            raw: raw.into(),
        }
    }

    /// Raw completion text, when the failure carries one
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            Self::MalformedOutput { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_output_keeps_raw_text() {
        let err = RefineError::malformed("expected value at line 1 column 1", "not json");

        assert_eq!(err.raw_output(), Some("not json"));
        assert!(err.to_string().contains("expected value"));
    }

    #[test]
    fn test_upstream_failure_from_llm_error() {
        let err: RefineError = LlmError::EmptyResponse { engine: "openai" }.into();

        assert!(matches!(err, RefineError::UpstreamFailure(_)));
        assert!(err.raw_output().is_none());
    }
}
