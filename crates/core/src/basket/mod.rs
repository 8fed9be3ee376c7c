//! Market-basket analysis
//!
//! Turns order lines into cross-sell recommendations: orders are grouped into
//! transactions, co-occurring product pairs are mined by support, each pair is
//! expanded into two directional rules scored by confidence and lift, and the
//! positively correlated rules are ranked for presentation.

mod pairs;
mod recommendations;
mod rules;
mod transactions;
mod types;

pub use pairs::{CoOccurrenceCounts, FrequentPairMiner};
pub use recommendations::RecommendationRanker;
pub use rules::AssociationRuleGenerator;
pub use transactions::TransactionExtractor;
pub use types::*;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::DomainError;
use crate::rounding::{ratio_or_zero, round_to};

/// Default minimum pair support (2% of transactions)
pub const DEFAULT_MIN_SUPPORT: f64 = 0.02;

/// Default minimum rule confidence
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.3;

/// Default cap on returned pairs and recommendations
pub const DEFAULT_TOP_N: usize = 10;

/// Thresholds for one basket analysis call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasketOptions {
    /// Minimum pair support as a fraction in `(0, 1]` (default: 0.02)
    pub min_support: f64,
    /// Minimum rule confidence as a fraction in `(0, 1]` (default: 0.3)
    pub min_confidence: f64,
    /// Maximum pairs and recommendations returned (default: 10)
    pub top_n: usize,
}

impl Default for BasketOptions {
    fn default() -> Self {
        Self {
            min_support: DEFAULT_MIN_SUPPORT,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl BasketOptions {
    pub fn with_min_support(mut self, min_support: f64) -> Self {
        self.min_support = min_support;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        validate_fraction("min_support", self.min_support)?;
        validate_fraction("min_confidence", self.min_confidence)?;
        if self.top_n == 0 {
            return Err(DomainError::invalid_option("top_n", "must be greater than zero"));
        }
        Ok(())
    }
}

pub(crate) fn validate_fraction(option: &'static str, value: f64) -> Result<(), DomainError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(DomainError::invalid_option(option, format!("must be in (0, 1], got {value}")))
    }
}

/// Runs the full basket pipeline over a batch of order lines.
#[derive(Debug, Clone, Default)]
pub struct BasketAnalyzer {
    options: BasketOptions,
    extractor: TransactionExtractor,
    miner: FrequentPairMiner,
    rule_generator: AssociationRuleGenerator,
    ranker: RecommendationRanker,
}

impl BasketAnalyzer {
    pub fn new(options: BasketOptions) -> Result<Self, DomainError> {
        options.validate()?;
        Ok(Self { options, ..Self::default() })
    }

    pub fn options(&self) -> &BasketOptions {
        &self.options
    }

    pub fn analyze(&self, records: &[OrderLineRecord]) -> BasketAnalysisReport {
        let transactions = self.extractor.extract(records);
        if transactions.is_empty() {
            debug!(
                event_name = "basket.analysis.empty",
                record_count = records.len(),
                "no complete order lines to analyze"
            );
            return BasketAnalysisReport::default();
        }

        let counts = CoOccurrenceCounts::from_transactions(&transactions);
        let frequent_pairs = self.miner.frequent_pairs(&counts, self.options.min_support);
        let rules =
            self.rule_generator.generate(&frequent_pairs, &counts, self.options.min_confidence);
        let recommendations = self.ranker.rank(&rules, self.options.top_n);
        let stats = basket_stats(&transactions, &counts);

        debug!(
            event_name = "basket.analysis.completed",
            transactions = stats.total_transactions,
            unique_products = stats.unique_products,
            frequent_pairs = frequent_pairs.len(),
            rules = rules.len(),
            recommendations = recommendations.len(),
            "basket analysis completed"
        );

        BasketAnalysisReport {
            frequent_pairs: frequent_pairs.into_iter().take(self.options.top_n).collect(),
            recommendations,
            stats,
        }
    }
}

/// Validates `options` and analyzes `records` in one call.
pub fn analyze_basket(
    records: &[OrderLineRecord],
    options: &BasketOptions,
) -> Result<BasketAnalysisReport, DomainError> {
    Ok(BasketAnalyzer::new(*options)?.analyze(records))
}

fn basket_stats(transactions: &[Transaction], counts: &CoOccurrenceCounts) -> BasketStats {
    let total_items: usize = transactions.iter().map(Transaction::len).sum();
    BasketStats {
        total_transactions: transactions.len(),
        avg_items_per_transaction: round_to(
            ratio_or_zero(total_items as f64, transactions.len() as f64),
            1,
        ),
        unique_products: counts.unique_items(),
    }
}
