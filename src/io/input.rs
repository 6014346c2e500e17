use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::error::RefineError;
use crate::models::Segment;
use crate::pipeline::RefineRequest;

/// Parse a refine request JSON file
pub fn parse_request_file(path: &Path) -> Result<RefineRequest> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_request_json(&content)
}

/// Parse a refine request JSON string and check its segments
pub fn parse_request_json(json: &str) -> Result<RefineRequest> {
    let mut request: RefineRequest =
        serde_json::from_str(json).context("Failed to parse request JSON")?;

    validate_segments(&request.segments)?;

    if let Some(segment) = fallback_segment(&request) {
        info!("No segments supplied; using the whole transcription as one segment");
        request.segments.push(segment);
    }

    Ok(request)
}

/// Shape checks on caller-supplied segments
pub fn validate_segments(segments: &[Segment]) -> Result<(), RefineError> {
    let mut seen = HashSet::new();

    for (index, segment) in segments.iter().enumerate() {
        if segment.id.trim().is_empty() {
            return Err(RefineError::InvalidInput(format!(
                "segment {} has a blank id",
                index
            )));
        }
        if !seen.insert(segment.id.as_str()) {
            return Err(RefineError::InvalidInput(format!(
                "duplicate segment id {}",
                segment.id
            )));
        }
        if segment.end < segment.start {
            return Err(RefineError::InvalidInput(format!(
                "segment {} ends before it starts ({} < {})",
                segment.id, segment.end, segment.start
            )));
        }
    }

    Ok(())
}

/// A single speaker-A segment holding the whole transcription, when there are
/// no segments but there is text
pub fn fallback_segment(request: &RefineRequest) -> Option<Segment> {
    if !request.segments.is_empty() || request.transcription.trim().is_empty() {
        return None;
    }
    Some(Segment::new(
        "seg_0",
        "A",
        0.0,
        0.0,
        request.transcription.as_str(),
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_request_with_segments() {
        let json = r#"{
            "transcription": "어디가 아프세요? 머리가요.",
            "segments": [
                {"id": "seg_0", "speaker": "A", "start": 0.0, "end": 1.2, "text": "어디가 아프세요?"},
                {"id": "seg_1", "speaker": "B", "start": 1.3, "end": 2.0, "text": "머리가요."}
            ],
            "context": "자택 낙상"
        }"#;

        let request = parse_request_json(json).unwrap();
        assert_eq!(request.segments.len(), 2);
        assert_eq!(request.context.as_deref(), Some("자택 낙상"));
    }

    #[test]
    fn test_fallback_to_single_segment() {
        let request = parse_request_json(r#"{"transcription": "숨을 못 쉬겠어요"}"#).unwrap();

        assert_eq!(
            request.segments,
            vec![Segment::new("seg_0", "A", 0.0, 0.0, "숨을 못 쉬겠어요")]
        );
    }

    #[test]
    fn test_no_fallback_for_blank_transcription() {
        let request = parse_request_json(r#"{"transcription": "  ", "segments": []}"#).unwrap();
        assert!(request.segments.is_empty());
    }

    #[test]
    fn test_segment_ending_before_start_is_rejected() {
        let err = parse_request_json(
            r#"{"segments": [{"id": "seg_0", "speaker": "A", "start": 2.0, "end": 1.0, "text": "x"}]}"#,
        )
        .unwrap_err();

        let invalid = err.downcast_ref::<RefineError>().unwrap();
        assert!(matches!(invalid, RefineError::InvalidInput(_)));
    }

    #[test]
    fn test_blank_and_duplicate_ids_are_rejected() {
        let blank = vec![Segment::new(" ", "A", 0.0, 1.0, "x")];
        assert!(validate_segments(&blank).is_err());

        let duplicate = vec![
            Segment::new("seg_0", "A", 0.0, 1.0, "x"),
            Segment::new("seg_0", "B", 1.0, 2.0, "y"),
        ];
        assert!(validate_segments(&duplicate).is_err());
    }

    #[test]
    fn test_parse_request_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"transcription": "hi", "segments": []}}"#).unwrap();

        let request = parse_request_file(file.path()).unwrap();
        assert_eq!(request.segments.len(), 1);
        assert_eq!(request.segments[0].text, "hi");
    }
}
