//! Token aggregation.
//!
//! [`TokenAggregator`] folds extracted counters into run-local totals. Two aggregators can be
//! merged by plain addition, so a log split into shards and aggregated independently gives the
//! same totals as a single pass.

use crate::extractor::{extract_usage, require_counter, COUNTER_PATHS};
use crate::models::{AggregatedTokens, TokenCounts, UsageRecord};
use crate::parser::{LineOutcome, RecordDecoder, RecordProcessor};
use serde::Serialize;
use tracing::{trace, warn};

/// Per-run line accounting. Has no effect on the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub lines: usize,
    pub blank: usize,
    pub filtered: usize,
    pub malformed: usize,
    pub records: usize,
    /// Counter leaves absent (or not a non-negative integer) across decoded records.
    pub missing_fields: usize,
}

impl ScanStats {
    pub fn merge(&mut self, other: &ScanStats) {
        self.lines += other.lines;
        self.blank += other.blank;
        self.filtered += other.filtered;
        self.malformed += other.malformed;
        self.records += other.records;
        self.missing_fields += other.missing_fields;
    }

    pub fn skipped(&self) -> usize {
        self.blank + self.filtered + self.malformed
    }
}

/// How the derived non-cached counters treat cached counts above totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoncachedPolicy {
    /// Keep the raw difference, which may be negative.
    #[default]
    Signed,
    /// Raise negative differences to zero.
    ClampToZero,
}

/// The immutable result of a finished aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Aggregation {
    pub tokens: AggregatedTokens,
    pub stats: ScanStats,
}

#[derive(Debug, Clone, Default)]
pub struct TokenAggregator {
    totals: TokenCounts,
    stats: ScanStats,
}

impl TokenAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, counts: TokenCounts) {
        self.totals += counts;
    }

    pub fn add_record(&mut self, record: &UsageRecord) {
        for path in COUNTER_PATHS {
            if let Err(e) = require_counter(record, path) {
                trace!(error = %e, "Counter defaults to zero");
                self.stats.missing_fields += 1;
            }
        }
        self.add(extract_usage(record));
        self.stats.records += 1;
    }

    pub fn merge(&mut self, other: TokenAggregator) {
        self.totals += other.totals;
        self.stats.merge(&other.stats);
    }

    pub fn totals(&self) -> &TokenCounts {
        &self.totals
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// Aggregate an in-memory sequence of lines in one pass.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        RecordDecoder::new().process_lines(lines, Self::new())
    }

    /// Derive the non-cached counters and freeze the result.
    pub fn finish(self, policy: NoncachedPolicy) -> Aggregation {
        let raw = AggregatedTokens::from_totals(self.totals);
        if raw.has_negative_noncached() {
            warn!(
                input_audio_noncached = raw.input_audio_noncached,
                input_text_noncached = raw.input_text_noncached,
                clamped = policy == NoncachedPolicy::ClampToZero,
                "Cached tokens exceed total tokens"
            );
        }

        let tokens = match policy {
            NoncachedPolicy::Signed => raw,
            NoncachedPolicy::ClampToZero => AggregatedTokens::from_totals_clamped(self.totals),
        };

        Aggregation {
            tokens,
            stats: self.stats,
        }
    }
}

impl RecordProcessor for TokenAggregator {
    type Output = Self;

    fn process_record(&mut self, record: &UsageRecord, _line_number: usize) {
        self.stats.lines += 1;
        self.add_record(record);
    }

    fn process_skipped(&mut self, outcome: &LineOutcome, _line_number: usize) {
        self.stats.lines += 1;
        match outcome {
            LineOutcome::Blank => self.stats.blank += 1,
            LineOutcome::Filtered => self.stats.filtered += 1,
            LineOutcome::Malformed(_) => self.stats.malformed += 1,
            LineOutcome::Record(_) => {}
        }
    }

    fn finalize(self) -> Self {
        self
    }
}

/// Aggregate `lines` split into `chunks` shards on the rayon pool.
#[cfg(feature = "parallel")]
pub fn aggregate_parallel(lines: &[String], chunks: usize) -> TokenAggregator {
    use rayon::prelude::*;

    if lines.is_empty() {
        return TokenAggregator::new();
    }

    let chunks = chunks.clamp(1, lines.len());
    let chunk_len = lines.len() / chunks + usize::from(lines.len() % chunks != 0);
    lines
        .par_chunks(chunk_len)
        .map(|shard| TokenAggregator::from_lines(shard))
        .reduce(TokenAggregator::new, |mut acc, shard| {
            acc.merge(shard);
            acc
        })
}
