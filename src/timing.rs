use serde::{Deserialize, Serialize};

use crate::error::{KatariError, Result};
use crate::text::TextSegment;

/// A timed caption entry bound to one narration segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub index: usize,
    pub start_secs: f64,
    pub end_secs: f64,
    pub text: String,
}

impl Cue {
    pub fn start_timestamp(&self) -> String {
        format_ass_time(self.start_secs)
    }

    pub fn end_timestamp(&self) -> String {
        format_ass_time(self.end_secs)
    }
}

/// Build the cue sheet for a segment list from the ordered audio durations.
///
/// Total audio duration is apportioned evenly across all segments rather
/// than using each segment's own clip duration. This mirrors the reference
/// behavior exactly; with unequal clip durations the captions can drift
/// from the audio (see DESIGN.md).
pub fn build_cues(segments: &[TextSegment], durations: &[f64]) -> Result<Vec<Cue>> {
    if segments.is_empty() {
        return Err(KatariError::EmptySegmentList);
    }

    let total_duration: f64 = durations.iter().sum();
    let per_segment = total_duration / segments.len() as f64;

    let mut cues = Vec::with_capacity(segments.len());
    let mut clock = 0.0;
    for segment in segments {
        cues.push(Cue {
            index: segment.index,
            start_secs: clock,
            end_secs: clock + per_segment,
            text: segment.text.clone(),
        });
        clock += per_segment;
    }

    Ok(cues)
}

/// Format seconds as an ASS timestamp `H:MM:SS.cc`.
///
/// Fractional centiseconds are truncated, not rounded.
pub fn format_ass_time(seconds: f64) -> String {
    let centis = ((seconds % 1.0) * 100.0) as u64;
    let whole = seconds as u64;
    let hours = whole / 3600;
    let minutes = (whole % 3600) / 60;
    let secs = whole % 60;
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}
