//! Directional association rules with confidence and lift.

use crate::rounding::{ratio_or_zero, round_to};

use super::pairs::CoOccurrenceCounts;
use super::types::{AssociationRule, ItemPairStat};

#[derive(Debug, Clone, Copy, Default)]
pub struct AssociationRuleGenerator;

impl AssociationRuleGenerator {
    /// Emits `A => B` and `B => A` for each frequent pair whose confidence
    /// reaches `min_confidence`, sorted by confidence descending.
    pub fn generate(
        &self,
        frequent_pairs: &[ItemPairStat],
        counts: &CoOccurrenceCounts,
        min_confidence: f64,
    ) -> Vec<AssociationRule> {
        let mut rules = Vec::new();

        for pair in frequent_pairs {
            let support_a = counts.item_support(&pair.item_a);
            let support_b = counts.item_support(&pair.item_b);
            let lift = ratio_or_zero(pair.support, support_a * support_b);

            let directions = [(&pair.item_a, &pair.item_b), (&pair.item_b, &pair.item_a)];
            for (antecedent, consequent) in directions {
                let confidence =
                    ratio_or_zero(pair.count as f64, counts.item_count(antecedent) as f64);
                if confidence < min_confidence {
                    continue;
                }

                rules.push(AssociationRule {
                    antecedent: antecedent.clone(),
                    consequent: consequent.clone(),
                    confidence: round_to(confidence * 100.0, 1),
                    lift: round_to(lift, 2),
                    support: round_to(pair.support * 100.0, 1),
                    transactions: pair.count,
                });
            }
        }

        rules.sort_by(|left, right| {
            right
                .confidence
                .total_cmp(&left.confidence)
                .then_with(|| right.lift.total_cmp(&left.lift))
                .then_with(|| left.antecedent.cmp(&right.antecedent))
                .then_with(|| left.consequent.cmp(&right.consequent))
        });
        rules
    }
}
