//! Usage extraction: decoded record to six raw counters.
//!
//! Every path step tolerates a missing key. A missing object, a missing leaf, or a leaf that
//! is not a non-negative integer all count as zero.

use crate::error::RecordError;
use crate::models::{TokenCounts, UsageRecord};
use serde_json::Value;

pub const INPUT_AUDIO_TOTAL: &str = "/response/usage/input_token_details/audio_tokens";
pub const INPUT_TEXT_TOTAL: &str = "/response/usage/input_token_details/text_tokens";
pub const INPUT_AUDIO_CACHED: &str =
    "/response/usage/input_token_details/cached_tokens_details/audio_tokens";
pub const INPUT_TEXT_CACHED: &str =
    "/response/usage/input_token_details/cached_tokens_details/text_tokens";
pub const OUTPUT_AUDIO: &str = "/response/usage/output_token_details/audio_tokens";
pub const OUTPUT_TEXT: &str = "/response/usage/output_token_details/text_tokens";

pub const COUNTER_PATHS: [&str; 6] = [
    INPUT_AUDIO_TOTAL,
    INPUT_TEXT_TOTAL,
    INPUT_AUDIO_CACHED,
    INPUT_TEXT_CACHED,
    OUTPUT_AUDIO,
    OUTPUT_TEXT,
];

pub fn extract_usage(record: &UsageRecord) -> TokenCounts {
    let value = record.value();
    TokenCounts {
        input_audio_total: counter_at(value, INPUT_AUDIO_TOTAL),
        input_text_total: counter_at(value, INPUT_TEXT_TOTAL),
        input_audio_cached: counter_at(value, INPUT_AUDIO_CACHED),
        input_text_cached: counter_at(value, INPUT_TEXT_CACHED),
        output_audio: counter_at(value, OUTPUT_AUDIO),
        output_text: counter_at(value, OUTPUT_TEXT),
    }
}

/// Strict lookup of one counter, used for diagnostics.
pub fn require_counter(record: &UsageRecord, path: &'static str) -> Result<u64, RecordError> {
    record
        .pointer(path)
        .and_then(Value::as_u64)
        .ok_or(RecordError::MissingField(path))
}

fn counter_at(value: &Value, path: &str) -> u64 {
    value.pointer(path).and_then(Value::as_u64).unwrap_or(0)
}
