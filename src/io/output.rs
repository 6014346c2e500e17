use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::{PipelineResult, Segment};
use crate::stages::{format_line, summarize_speakers};

/// Write a pipeline result as pretty JSON
pub fn write_result_json(result: &PipelineResult, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create file: {:?}", path))?;
    serde_json::to_writer_pretty(file, result).context("Failed to write JSON")?;
    Ok(())
}

/// Human-readable corrected transcript
pub struct HumanTranscript<'a> {
    result: &'a PipelineResult,
}

impl<'a> HumanTranscript<'a> {
    pub fn new(result: &'a PipelineResult) -> Self {
        Self { result }
    }

    pub fn format(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Run {}\n", self.result.run_id));
        output.push_str(&format!(
            "# {} ({}), {} speakers, {:.2}s\n\n",
            self.result.model_used,
            self.result.engine,
            self.result.speaker_count,
            self.result.processing_time
        ));

        if self.result.success {
            output.push_str(&self.result.corrected_text);
            output.push('\n');
        } else {
            output.push_str(&format!(
                "Refinement failed: {}\n",
                self.result.error.as_deref().unwrap_or("unknown error")
            ));
        }

        output
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        write!(file, "{}", self.format())?;
        Ok(())
    }
}

/// Grouped transcript with segment timestamps and per-speaker totals
pub fn render_segments(segments: &[Segment]) -> String {
    let mut output = String::new();

    for segment in segments.iter().filter(|s| !s.is_blank()) {
        output.push_str(&format!(
            "{} {}\n",
            format_timestamp(segment.start),
            format_line(&segment.speaker, segment.trimmed_text())
        ));
    }

    let summaries = summarize_speakers(segments);
    if !summaries.is_empty() {
        output.push('\n');
    }
    for summary in summaries {
        output.push_str(&format!(
            "speaker {}: {} utterances, {:.1}s\n",
            summary.speaker, summary.utterances, summary.speaking_secs
        ));
    }

    output
}

/// Format seconds as MM:SS.mmm
fn format_timestamp(seconds: f64) -> String {
    let ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let secs = ms / 1000;
    format!("{:02}:{:02}.{:03}", secs / 60, secs % 60, ms % 1000)
}
