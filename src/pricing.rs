//! Pricing tables.
//!
//! A [`PricingCatalog`] is an ordered list of named [`PricingTable`]s. Evaluation code only
//! iterates the catalog, so adding a tier is a data change (see `[[pricing.tables]]` in the
//! config file).

use crate::error::{Result, UsageError};
use crate::models::AggregatedTokens;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const TOKENS_PER_PRICE_UNIT: f64 = 1_000_000.0;

/// The six billed categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    AudioInput,
    CachedAudioInput,
    AudioOutput,
    TextInput,
    CachedTextInput,
    TextOutput,
}

impl CostCategory {
    pub const ALL: [CostCategory; 6] = [
        CostCategory::AudioInput,
        CostCategory::CachedAudioInput,
        CostCategory::AudioOutput,
        CostCategory::TextInput,
        CostCategory::CachedTextInput,
        CostCategory::TextOutput,
    ];

    /// The counter billed under this category.
    pub fn token_count(self, tokens: &AggregatedTokens) -> i64 {
        let t = &tokens.totals;
        match self {
            CostCategory::AudioInput => tokens.input_audio_noncached,
            CostCategory::CachedAudioInput => saturating_i64(t.input_audio_cached),
            CostCategory::AudioOutput => saturating_i64(t.output_audio),
            CostCategory::TextInput => tokens.input_text_noncached,
            CostCategory::CachedTextInput => saturating_i64(t.input_text_cached),
            CostCategory::TextOutput => saturating_i64(t.output_text),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CostCategory::AudioInput => "audio_input",
            CostCategory::CachedAudioInput => "cached_audio_input",
            CostCategory::AudioOutput => "audio_output",
            CostCategory::TextInput => "text_input",
            CostCategory::CachedTextInput => "cached_text_input",
            CostCategory::TextOutput => "text_output",
        }
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Unit prices in currency per one million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    pub audio_input: f64,
    pub cached_audio_input: f64,
    pub audio_output: f64,
    pub text_input: f64,
    pub cached_text_input: f64,
    pub text_output: f64,
}

impl PricingTable {
    pub fn unit_price(&self, category: CostCategory) -> f64 {
        match category {
            CostCategory::AudioInput => self.audio_input,
            CostCategory::CachedAudioInput => self.cached_audio_input,
            CostCategory::AudioOutput => self.audio_output,
            CostCategory::TextInput => self.text_input,
            CostCategory::CachedTextInput => self.cached_text_input,
            CostCategory::TextOutput => self.text_output,
        }
    }

    pub fn cost(&self, category: CostCategory, tokens: &AggregatedTokens) -> f64 {
        category.token_count(tokens) as f64 * self.unit_price(category) / TOKENS_PER_PRICE_UNIT
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPricing {
    pub name: String,
    #[serde(flatten)]
    pub table: PricingTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingCatalog {
    pub tables: Vec<NamedPricing>,
}

impl Default for PricingCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PricingCatalog {
    /// Realtime pricing: the full-size tier followed by the mini tier.
    pub fn builtin() -> Self {
        Self {
            tables: vec![
                NamedPricing {
                    name: "gpt-rt".to_string(),
                    table: PricingTable {
                        audio_input: 32.00,
                        cached_audio_input: 0.40,
                        audio_output: 64.00,
                        text_input: 4.00,
                        cached_text_input: 0.40,
                        text_output: 16.00,
                    },
                },
                NamedPricing {
                    name: "gpt-mini-rt".to_string(),
                    table: PricingTable {
                        audio_input: 10.00,
                        cached_audio_input: 0.30,
                        audio_output: 20.00,
                        text_input: 0.60,
                        cached_text_input: 0.30,
                        text_output: 2.40,
                    },
                },
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &NamedPricing> {
        self.tables.iter()
    }

    pub fn get(&self, name: &str) -> Option<&PricingTable> {
        self.tables.iter().find(|t| t.name == name).map(|t| &t.table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.tables.is_empty() {
            return Err(UsageError::Config(
                "at least one pricing table is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for named in &self.tables {
            if named.name.trim().is_empty() {
                return Err(UsageError::Config(
                    "pricing table names must not be empty".to_string(),
                ));
            }
            if !seen.insert(named.name.as_str()) {
                return Err(UsageError::Config(format!(
                    "duplicate pricing table '{}'",
                    named.name
                )));
            }
            for category in CostCategory::ALL {
                let price = named.table.unit_price(category);
                if !price.is_finite() || price < 0.0 {
                    return Err(UsageError::Config(format!(
                        "pricing table '{}' has invalid {} price {}",
                        named.name,
                        category.as_str(),
                        price
                    )));
                }
            }
        }

        Ok(())
    }
}
