//! Core Data Models
//!
//! The data flows through these models in the following sequence:
//!
//! 1. **Raw Data**: [`UsageRecord`] - one decoded log line
//! 2. **Extraction**: [`TokenCounts`] - the six raw counters of a record, or a running sum of them
//! 3. **Aggregation**: [`AggregatedTokens`] - final totals plus the derived non-cached counters
//!
//! Pricing and report types live in [`crate::pricing`] and [`crate::report`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::{Add, AddAssign};

/// A decoded usage log line.
///
/// The expected shape is
/// `{ response: { usage: { input_token_details: { .. }, output_token_details: { .. } } } }`
/// but any JSON value is accepted; fields are resolved leniently by
/// [`crate::extractor::extract_usage`].
#[derive(Debug, Clone, PartialEq)]
pub struct UsageRecord {
    value: Value,
}

impl UsageRecord {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Look up a JSON pointer such as `/response/usage`.
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        self.value.pointer(path)
    }
}

impl From<Value> for UsageRecord {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// The six raw counters carried by a usage record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCounts {
    pub input_audio_total: u64,
    pub input_text_total: u64,
    pub input_audio_cached: u64,
    pub input_text_cached: u64,
    pub output_audio: u64,
    pub output_text: u64,
}

impl TokenCounts {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl AddAssign for TokenCounts {
    fn add_assign(&mut self, rhs: Self) {
        // Counters saturate instead of wrapping.
        self.input_audio_total = self.input_audio_total.saturating_add(rhs.input_audio_total);
        self.input_text_total = self.input_text_total.saturating_add(rhs.input_text_total);
        self.input_audio_cached = self.input_audio_cached.saturating_add(rhs.input_audio_cached);
        self.input_text_cached = self.input_text_cached.saturating_add(rhs.input_text_cached);
        self.output_audio = self.output_audio.saturating_add(rhs.output_audio);
        self.output_text = self.output_text.saturating_add(rhs.output_text);
    }
}

impl Add for TokenCounts {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl std::iter::Sum for TokenCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Final snapshot of a run: the raw totals and the two derived non-cached counters.
///
/// The derived counters are signed. A log whose cached counts exceed its totals yields a
/// negative value unless clamping is enabled in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedTokens {
    #[serde(flatten)]
    pub totals: TokenCounts,
    pub input_audio_noncached: i64,
    pub input_text_noncached: i64,
}

impl AggregatedTokens {
    pub fn from_totals(totals: TokenCounts) -> Self {
        Self {
            totals,
            input_audio_noncached: signed_difference(
                totals.input_audio_total,
                totals.input_audio_cached,
            ),
            input_text_noncached: signed_difference(
                totals.input_text_total,
                totals.input_text_cached,
            ),
        }
    }

    /// Same as [`AggregatedTokens::from_totals`], with negative derived counters raised to zero.
    pub fn from_totals_clamped(totals: TokenCounts) -> Self {
        let mut tokens = Self::from_totals(totals);
        tokens.input_audio_noncached = tokens.input_audio_noncached.max(0);
        tokens.input_text_noncached = tokens.input_text_noncached.max(0);
        tokens
    }

    pub fn has_negative_noncached(&self) -> bool {
        self.input_audio_noncached < 0 || self.input_text_noncached < 0
    }
}

fn signed_difference(total: u64, cached: u64) -> i64 {
    let diff = i128::from(total) - i128::from(cached);
    diff.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}
