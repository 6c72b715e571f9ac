//! Usage Analysis Engine
//!
//! [`CostAnalyzer`] wires the pipeline together:
//!
//! 1. **Source**: [`LineSource`] opens the log (the only fatal failure point)
//! 2. **Decoding**: [`RecordDecoder`] drops blank, unrelated and malformed lines
//! 3. **Extraction and Aggregation**: [`TokenAggregator`] folds every record's counters
//! 4. **Reporting**: [`CostReport`] prices the totals under each configured table
//!
//! ## Usage Example
//!
//! ```no_run
//! use realtime_cost::{config::Config, CostAnalyzer};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let analyzer = CostAnalyzer::new(Config::default());
//! let report = analyzer.run(Path::new("usage.log"))?;
//! print!("{}", report.render_text());
//! # Ok(())
//! # }
//! ```

use crate::aggregator::{Aggregation, TokenAggregator};
use crate::config::{Config, OutputFormat};
use crate::error::{Result, UsageError};
use crate::logging::new_run_id;
use crate::parser::RecordDecoder;
use crate::report::CostReport;
use crate::source::LineSource;
use std::path::Path;
use tracing::{debug, info, info_span};

pub struct CostAnalyzer {
    config: Config,
    decoder: RecordDecoder,
}

impl Default for CostAnalyzer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl CostAnalyzer {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            decoder: RecordDecoder::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Aggregate every usage record in the log at `path`.
    pub fn aggregate_file(&self, path: &Path) -> Result<Aggregation> {
        let run_id = new_run_id();
        let span = info_span!("analyze", %run_id, path = %path.display());
        let _enter = span.enter();

        let source = LineSource::open(path)?;
        let aggregator = self.aggregate_source(source)?;
        let aggregation = aggregator.finish(self.config.accounting.noncached_policy());

        let stats = aggregation.stats;
        info!(
            lines = stats.lines,
            records = stats.records,
            blank = stats.blank,
            filtered = stats.filtered,
            malformed = stats.malformed,
            missing_fields = stats.missing_fields,
            "Finished reading usage log"
        );

        Ok(aggregation)
    }

    fn aggregate_source(&self, source: LineSource) -> Result<TokenAggregator> {
        let chunks = self.config.processing.parallel_chunks;

        #[cfg(feature = "parallel")]
        if chunks > 1 {
            debug!(chunks, "Aggregating log shards in parallel");
            let lines = source.collect::<Result<Vec<String>>>()?;
            return Ok(crate::aggregator::aggregate_parallel(&lines, chunks));
        }

        #[cfg(not(feature = "parallel"))]
        if chunks > 1 {
            debug!(chunks, "Parallel support not compiled in, reading sequentially");
        }

        let mut read_error: Option<UsageError> = None;
        let lines = source.map_while(|line| match line {
            Ok(line) => Some(line),
            Err(e) => {
                read_error = Some(e);
                None
            }
        });
        let aggregator = self.decoder.process_lines(lines, TokenAggregator::new());

        match read_error {
            Some(e) => Err(e),
            None => Ok(aggregator),
        }
    }

    /// Aggregate the log and price it under every configured table.
    pub fn run(&self, path: &Path) -> Result<CostReport> {
        let aggregation = self.aggregate_file(path)?;
        Ok(CostReport::evaluate(aggregation.tokens, &self.config.pricing))
    }

    /// Render `report` in the configured output format.
    pub fn render(&self, report: &CostReport) -> serde_json::Result<String> {
        match self.config.output.format {
            OutputFormat::Text => Ok(report.render_text()),
            OutputFormat::Json => {
                let mut json = report.render_json(self.config.output.json_pretty)?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn log_file(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let analyzer = CostAnalyzer::default();
        let err = analyzer.run(&dir.path().join("missing.log")).unwrap_err();
        assert!(matches!(err, UsageError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_unreadable_source_is_fatal() {
        // A directory opens on Linux but fails on the first read.
        let dir = tempfile::tempdir().unwrap();
        let err = CostAnalyzer::default().run(dir.path()).unwrap_err();
        match err {
            UsageError::SourceRead { path, .. } => assert_eq!(path, dir.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_run_over_mixed_log() {
        let file = log_file(&[
            "",
            r#"{"type":"heartbeat"}"#,
            r#"{"response":{"usage":{"input_token_details":{"audio_tokens":7}}}}"#,
            r#"{"response": {"usage": audio_tokens"#,
            r#"{"response":{"usage":{"output_token_details":{"text_tokens":3}}}}"#,
        ]);

        let aggregation = CostAnalyzer::default().aggregate_file(file.path()).unwrap();
        assert_eq!(aggregation.tokens.totals.input_audio_total, 7);
        assert_eq!(aggregation.tokens.input_audio_noncached, 7);
        // No audio marker on the text-only line, so it is filtered out.
        assert_eq!(aggregation.tokens.totals.output_text, 0);
        assert_eq!(aggregation.stats.records, 1);
        assert_eq!(aggregation.stats.malformed, 1);
        assert_eq!(aggregation.stats.filtered, 2);
        assert_eq!(aggregation.stats.blank, 1);
    }

    #[test]
    fn test_clamp_setting_is_applied() {
        let file = log_file(&[concat!(
            r#"{"response":{"usage":{"input_token_details":"#,
            r#"{"audio_tokens":1,"cached_tokens_details":{"audio_tokens":5}}}}}"#
        )]);

        let mut config = Config::default();
        config.accounting.clamp_negative_noncached = true;
        let report = CostAnalyzer::new(config).run(file.path()).unwrap();
        assert_eq!(report.tokens.input_audio_noncached, 0);

        let report = CostAnalyzer::default().run(file.path()).unwrap();
        assert_eq!(report.tokens.input_audio_noncached, -4);
    }

    #[test]
    fn test_json_render() {
        let file = log_file(&[]);
        let mut config = Config::default();
        config.output.format = OutputFormat::Json;
        let analyzer = CostAnalyzer::new(config);
        let report = analyzer.run(file.path()).unwrap();
        let rendered = analyzer.render(&report).unwrap();

        let value: serde_json::Value = serde_json::from_str(rendered.trim()).unwrap();
        assert_eq!(value["tables"][0]["total"], 0.0);
    }
}
