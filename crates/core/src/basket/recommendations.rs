//! Ranking of positively correlated rules.

use super::types::{AssociationRule, Recommendation, RecommendationStrength};

#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationRanker;

impl RecommendationRanker {
    /// Keeps the first `top_n` rules with `lift > 1`, preserving input order.
    pub fn rank(&self, rules: &[AssociationRule], top_n: usize) -> Vec<Recommendation> {
        rules
            .iter()
            .filter(|rule| rule.lift > 1.0)
            .take(top_n)
            .map(|rule| Recommendation {
                rule: rule.clone(),
                strength: RecommendationStrength::from_confidence(rule.confidence),
                uplift_potential: ((rule.lift - 1.0) * 100.0).round() as i64,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(antecedent: &str, confidence: f64, lift: f64) -> AssociationRule {
        AssociationRule {
            antecedent: antecedent.to_string(),
            consequent: "X".to_string(),
            confidence,
            lift,
            support: 10.0,
            transactions: 3,
        }
    }

    #[test]
    fn excludes_rules_without_positive_correlation() {
        let rules = vec![rule("A", 90.0, 1.0), rule("B", 80.0, 0.7), rule("C", 60.0, 1.25)];

        let ranked = RecommendationRanker.rank(&rules, 10);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].rule.antecedent, "C");
        assert_eq!(ranked[0].strength, RecommendationStrength::Medium);
        assert_eq!(ranked[0].uplift_potential, 25);
    }

    #[test]
    fn caps_at_top_n_and_keeps_order() {
        let rules = vec![rule("A", 95.0, 2.0), rule("B", 60.0, 1.5), rule("C", 40.0, 3.1)];

        let ranked = RecommendationRanker.rank(&rules, 2);

        let names: Vec<&str> = ranked.iter().map(|item| item.rule.antecedent.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(ranked[0].strength, RecommendationStrength::High);
        assert_eq!(ranked[0].uplift_potential, 100);
    }

    #[test]
    fn low_confidence_rules_are_labelled_low() {
        let ranked = RecommendationRanker.rank(&[rule("A", 35.5, 1.8)], 5);
        assert_eq!(ranked[0].strength, RecommendationStrength::Low);
        assert_eq!(ranked[0].uplift_potential, 80);
    }
}
