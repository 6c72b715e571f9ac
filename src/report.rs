//! Cost evaluation and report rendering.
//!
//! Text output is one line per counter followed by one total line per pricing table:
//!
//! ```text
//! 110 audio input tokens ($0.004, $0.001)
//! ...
//! Total cost (gpt-rt):      $0.01
//! Total cost (gpt-mini-rt): $0.00
//! ```

use crate::models::AggregatedTokens;
use crate::pricing::{CostCategory, PricingCatalog, PricingTable};
use serde::Serialize;
use std::fmt::Write as _;

/// Counter lines in display order.
const LINE_ORDER: [(CostCategory, &str); 6] = [
    (CostCategory::AudioInput, "audio input tokens"),
    (CostCategory::TextInput, "text input tokens"),
    (CostCategory::CachedAudioInput, "cached audio input tokens"),
    (CostCategory::CachedTextInput, "cached text input tokens"),
    (CostCategory::AudioOutput, "audio output tokens"),
    (CostCategory::TextOutput, "text output tokens"),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryCosts {
    pub audio_input: f64,
    pub cached_audio_input: f64,
    pub audio_output: f64,
    pub text_input: f64,
    pub cached_text_input: f64,
    pub text_output: f64,
}

impl CategoryCosts {
    pub fn evaluate(table: &PricingTable, tokens: &AggregatedTokens) -> Self {
        Self {
            audio_input: table.cost(CostCategory::AudioInput, tokens),
            cached_audio_input: table.cost(CostCategory::CachedAudioInput, tokens),
            audio_output: table.cost(CostCategory::AudioOutput, tokens),
            text_input: table.cost(CostCategory::TextInput, tokens),
            cached_text_input: table.cost(CostCategory::CachedTextInput, tokens),
            text_output: table.cost(CostCategory::TextOutput, tokens),
        }
    }

    pub fn get(&self, category: CostCategory) -> f64 {
        match category {
            CostCategory::AudioInput => self.audio_input,
            CostCategory::CachedAudioInput => self.cached_audio_input,
            CostCategory::AudioOutput => self.audio_output,
            CostCategory::TextInput => self.text_input,
            CostCategory::CachedTextInput => self.cached_text_input,
            CostCategory::TextOutput => self.text_output,
        }
    }

    pub fn total(&self) -> f64 {
        CostCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCost {
    pub name: String,
    pub costs: CategoryCosts,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostReport {
    pub tokens: AggregatedTokens,
    pub tables: Vec<TableCost>,
}

impl CostReport {
    pub fn evaluate(tokens: AggregatedTokens, catalog: &PricingCatalog) -> Self {
        let tables = catalog
            .iter()
            .map(|named| {
                let costs = CategoryCosts::evaluate(&named.table, &tokens);
                TableCost {
                    name: named.name.clone(),
                    total: costs.total(),
                    costs,
                }
            })
            .collect();

        Self { tokens, tables }
    }

    pub fn table(&self, name: &str) -> Option<&TableCost> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();

        for (category, label) in LINE_ORDER {
            let costs = self
                .tables
                .iter()
                .map(|t| format!("${:.3}", t.costs.get(category)))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(
                out,
                "{} {} ({})",
                category.token_count(&self.tokens),
                label,
                costs
            );
        }

        let widest = self.tables.iter().map(|t| t.name.len()).max().unwrap_or(0);
        for table in &self.tables {
            let pad = widest - table.name.len() + 1;
            let _ = writeln!(
                out,
                "Total cost ({}):{:pad$}${:.2}",
                table.name,
                "",
                table.total,
                pad = pad
            );
        }

        out
    }

    pub fn render_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}
