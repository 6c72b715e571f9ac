//! Realtime Cost Library
//!
//! Reads usage logs written by a realtime voice agent (one JSON record per line), totals the
//! audio and text token counters, and prices the totals under one or more pricing tables.
//!
//! ## Architecture Overview
//!
//! - [`source`] - Line source over the log file
//! - [`parser`] - Cheap marker pre-filter and lenient JSON decoding
//! - [`extractor`] - Six raw counters out of any decoded record
//! - [`aggregator`] - Run-local fold, shard merging, derived non-cached counters
//! - [`pricing`] - Named pricing tables as data
//! - [`report`] - Per-category and total costs, text and JSON rendering
//! - [`analyzer`] - Pipeline coordinator
//! - [`config`] - Configuration with file and environment overrides
//! - [`logging`] - Structured logging setup
//! - [`error`] - Error types
//!
//! ## Main Entry Point
//!
//! ```no_run
//! use realtime_cost::CostAnalyzer;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let report = CostAnalyzer::default().run(Path::new("agent.log"))?;
//! print!("{}", report.render_text());
//! # Ok(())
//! # }
//! ```

pub mod aggregator;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod models;
pub mod parser;
pub mod pricing;
pub mod report;
pub mod source;

pub use aggregator::{Aggregation, NoncachedPolicy, ScanStats, TokenAggregator};
pub use analyzer::CostAnalyzer;
pub use error::{RecordError, UsageError};
pub use models::*;
pub use pricing::{CostCategory, PricingCatalog, PricingTable};
pub use report::CostReport;
