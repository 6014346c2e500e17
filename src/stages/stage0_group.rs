use tracing::debug;

use crate::models::{GroupedConversation, Segment};

/// Per-speaker statistics for logging and offline rendering
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerSummary {
    pub speaker: String,
    pub utterances: usize,
    /// Sum of segment durations, seconds
    pub speaking_secs: f64,
}

/// Transcript line for one utterance
pub fn format_line(speaker: &str, text: &str) -> String {
    format!("[speaker {}]: {}", speaker, text)
}

/// Execute Stage 0: group segments by speaker
///
/// Input order is kept as-is; blank segments are dropped from both the
/// speaker map and the transcript.
pub fn group_segments(segments: &[Segment]) -> GroupedConversation {
    let mut grouped = GroupedConversation::default();
    let mut lines = Vec::new();

    for segment in segments {
        if segment.is_blank() {
            debug!("Skipping blank segment {}", segment.id);
            continue;
        }
        let text = segment.trimmed_text();

        match grouped
            .speakers
            .iter_mut()
            .find(|(label, _)| *label == segment.speaker)
        {
            Some((_, texts)) => texts.push(text.to_string()),
            None => grouped
                .speakers
                .push((segment.speaker.clone(), vec![text.to_string()])),
        }

        lines.push(format_line(&segment.speaker, text));
    }

    grouped.conversation = lines.join("\n");
    grouped
}

/// Utterance counts and speaking time per speaker, in first-appearance order
pub fn summarize_speakers(segments: &[Segment]) -> Vec<SpeakerSummary> {
    let mut summaries: Vec<SpeakerSummary> = Vec::new();

    for segment in segments.iter().filter(|s| !s.is_blank()) {
        match summaries.iter_mut().find(|s| s.speaker == segment.speaker) {
            Some(summary) => {
                summary.utterances += 1;
                summary.speaking_secs += segment.duration();
            }
            None => summaries.push(SpeakerSummary {
                speaker: segment.speaker.clone(),
                utterances: 1,
                speaking_secs: segment.duration(),
            }),
        }
    }

    summaries
}
