//! Types for market-basket analysis

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// One order line as handed over by the ingestion stage.
///
/// Both fields are optional because spreadsheet exports routinely carry blank
/// cells; incomplete lines are skipped during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderLineRecord {
    #[serde(default, alias = "orderId", deserialize_with = "deserialize_key")]
    pub order_id: Option<String>,
    #[serde(default, alias = "productName")]
    pub product_name: Option<String>,
}

impl OrderLineRecord {
    pub fn new(order_id: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self { order_id: Some(order_id.into()), product_name: Some(product_name.into()) }
    }
}

/// Order identifiers arrive as text or as bare spreadsheet numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawKey {
    Text(String),
    Integer(i64),
    Float(f64),
}

fn deserialize_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawKey>::deserialize(deserializer)?;
    Ok(raw.map(|key| match key {
        RawKey::Text(text) => text,
        RawKey::Integer(value) => value.to_string(),
        RawKey::Float(value) => value.to_string(),
    }))
}

/// The distinct products bought in one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub order_id: String,
    pub items: BTreeSet<String>,
}

impl Transaction {
    pub fn new(order_id: impl Into<String>) -> Self {
        Self { order_id: order_id.into(), items: BTreeSet::new() }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Canonically ordered product pair: `item_a <= item_b` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey {
    pub item_a: String,
    pub item_b: String,
}

impl PairKey {
    pub fn new(first: &str, second: &str) -> Self {
        let (item_a, item_b) = if first <= second { (first, second) } else { (second, first) };
        Self { item_a: item_a.to_owned(), item_b: item_b.to_owned() }
    }
}

/// Co-occurrence statistics for one frequent pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPairStat {
    pub item_a: String,
    pub item_b: String,
    /// Number of transactions containing both items.
    pub count: usize,
    /// `count / total_transactions`, a fraction in `[0, 1]`.
    pub support: f64,
}

impl ItemPairStat {
    pub fn support_percent(&self) -> f64 {
        crate::rounding::round_to(self.support * 100.0, 1)
    }
}

/// Directional rule `antecedent => consequent`.
///
/// Metrics are presentation-scaled: `confidence` and `support` are percentages
/// rounded to one decimal, `lift` is rounded to two decimals. Thresholds are
/// applied to the unrounded values before scaling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationRule {
    pub antecedent: String,
    pub consequent: String,
    pub confidence: f64,
    pub lift: f64,
    pub support: f64,
    /// Joint transaction count backing the rule.
    pub transactions: usize,
}

/// Strength tier of a recommendation, derived from rule confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationStrength {
    /// Confidence above 70%
    High,
    /// Confidence above 50%
    Medium,
    /// Everything else
    Low,
}

impl RecommendationStrength {
    pub fn from_confidence(confidence_percent: f64) -> Self {
        if confidence_percent > 70.0 {
            RecommendationStrength::High
        } else if confidence_percent > 50.0 {
            RecommendationStrength::Medium
        } else {
            RecommendationStrength::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// A positively correlated rule ready for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub rule: AssociationRule,
    pub strength: RecommendationStrength,
    /// `round((lift - 1) * 100)`
    pub uplift_potential: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BasketStats {
    pub total_transactions: usize,
    /// Mean distinct items per order, rounded to one decimal.
    pub avg_items_per_transaction: f64,
    pub unique_products: usize,
}

/// Full output of one basket analysis call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BasketAnalysisReport {
    pub frequent_pairs: Vec<ItemPairStat>,
    pub recommendations: Vec<Recommendation>,
    pub stats: BasketStats,
}

impl BasketAnalysisReport {
    pub fn is_empty(&self) -> bool {
        self.stats.total_transactions == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_is_order_independent() {
        assert_eq!(PairKey::new("Milk", "Bread"), PairKey::new("Bread", "Milk"));
        assert_eq!(PairKey::new("Milk", "Bread").item_a, "Bread");
    }

    #[test]
    fn strength_tiers_use_strict_thresholds() {
        assert_eq!(RecommendationStrength::from_confidence(70.1), RecommendationStrength::High);
        assert_eq!(RecommendationStrength::from_confidence(70.0), RecommendationStrength::Medium);
        assert_eq!(RecommendationStrength::from_confidence(50.0), RecommendationStrength::Low);
    }

    #[test]
    fn order_line_accepts_upstream_field_names_and_numeric_ids() {
        let record: OrderLineRecord =
            serde_json::from_str(r#"{"orderId": 1042, "productName": "Coffee"}"#)
                .expect("record should deserialize");

        assert_eq!(record.order_id.as_deref(), Some("1042"));
        assert_eq!(record.product_name.as_deref(), Some("Coffee"));
    }

    #[test]
    fn order_line_tolerates_missing_fields() {
        let record: OrderLineRecord =
            serde_json::from_str(r#"{"productName": "Tea"}"#).expect("record should deserialize");

        assert_eq!(record.order_id, None);
    }

    #[test]
    fn recommendation_serializes_rule_fields_inline() {
        let recommendation = Recommendation {
            rule: AssociationRule {
                antecedent: "A".to_string(),
                consequent: "B".to_string(),
                confidence: 80.0,
                lift: 1.6,
                support: 40.0,
                transactions: 4,
            },
            strength: RecommendationStrength::High,
            uplift_potential: 60,
        };

        let value = serde_json::to_value(&recommendation).expect("serialize");
        assert_eq!(value["antecedent"], "A");
        assert_eq!(value["uplift_potential"], 60);
        assert_eq!(value["strength"], "High");
    }
}
