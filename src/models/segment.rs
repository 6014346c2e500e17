use serde::{Deserialize, Serialize};

/// One timestamped, speaker-attributed utterance from the speech-to-text engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Identifier, unique within one transcript
    pub id: String,
    /// Call-local speaker label (e.g. "A", "B")
    pub speaker: String,
    /// Start timestamp in seconds
    pub start: f64,
    /// End timestamp in seconds
    pub end: f64,
    /// Recognized text, possibly empty
    #[serde(default)]
    pub text: String,
}

impl Segment {
    pub fn new(
        id: impl Into<String>,
        speaker: impl Into<String>,
        start: f64,
        end: f64,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            speaker: speaker.into(),
            start,
            end,
            text: text.into(),
        }
    }

    /// Text with surrounding whitespace removed
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Whether the segment carries no utterance after trimming
    pub fn is_blank(&self) -> bool {
        self.trimmed_text().is_empty()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// Speaker-labeled view of a segment sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedConversation {
    /// Speaker label -> that speaker's non-empty utterances, in first-appearance order
    pub speakers: Vec<(String, Vec<String>)>,
    /// One `[speaker X]: text` line per non-empty segment, newline-joined
    pub conversation: String,
}

impl GroupedConversation {
    /// Number of distinct speakers with at least one non-empty utterance
    pub fn speaker_count(&self) -> usize {
        self.speakers.len()
    }

    /// Utterances for a speaker label
    pub fn utterances(&self, speaker: &str) -> Option<&[String]> {
        self.speakers
            .iter()
            .find(|(label, _)| label == speaker)
            .map(|(_, texts)| texts.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.speakers.is_empty()
    }
}
