//! Record filter and decoder.
//!
//! Each line is trimmed, pre-filtered on [`USAGE_MARKER`], then decoded as JSON.
//! Blank, filtered and malformed lines are skipped; none of them abort a run.

use crate::error::RecordError;
use crate::models::UsageRecord;
use serde_json::Value;
use tracing::{debug, trace};

/// Substring every relevant usage record contains.
///
/// Lines without it are dropped before JSON decoding. This assumes the marker only occurs
/// in records that carry audio/text token details; a line that mentions it elsewhere is
/// still decoded and then contributes whatever its usage fields hold (usually zero).
pub const USAGE_MARKER: &str = "audio_tokens";

/// What the decoder made of a single line.
#[derive(Debug)]
pub enum LineOutcome {
    Blank,
    Filtered,
    Malformed(RecordError),
    Record(UsageRecord),
}

// Trait for consuming decoded records
pub trait RecordProcessor {
    type Output;

    fn process_record(&mut self, record: &UsageRecord, line_number: usize);
    fn process_skipped(&mut self, _outcome: &LineOutcome, _line_number: usize) {}
    fn finalize(self) -> Self::Output;
}

#[derive(Debug, Clone)]
pub struct RecordDecoder {
    marker: &'static str,
}

impl Default for RecordDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordDecoder {
    pub fn new() -> Self {
        Self {
            marker: USAGE_MARKER,
        }
    }

    pub fn decode_line(&self, line: &str) -> LineOutcome {
        let line = line.trim();
        if line.is_empty() {
            return LineOutcome::Blank;
        }

        if !line.contains(self.marker) {
            return LineOutcome::Filtered;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(value) => LineOutcome::Record(UsageRecord::new(value)),
            Err(e) => LineOutcome::Malformed(RecordError::from(e)),
        }
    }

    /// Feed every line through the decoder into `processor`.
    pub fn process_lines<I, S, P>(&self, lines: I, mut processor: P) -> P::Output
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        P: RecordProcessor,
    {
        for (idx, line) in lines.into_iter().enumerate() {
            let line_number = idx + 1;
            match self.decode_line(line.as_ref()) {
                LineOutcome::Record(record) => processor.process_record(&record, line_number),
                outcome => {
                    match &outcome {
                        LineOutcome::Malformed(err) => {
                            debug!(line_number, error = %err, "Skipping malformed line")
                        }
                        LineOutcome::Filtered => {
                            trace!(line_number, "Skipping line without usage marker")
                        }
                        _ => {}
                    }
                    processor.process_skipped(&outcome, line_number);
                }
            }
        }

        processor.finalize()
    }
}
