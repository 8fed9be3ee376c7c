//! Item and pair occurrence counting.

use std::collections::HashMap;

use super::types::{ItemPairStat, PairKey, Transaction};

/// Occurrence counters accumulated over a set of transactions.
///
/// Counters are plain sums, so partial counts built over disjoint slices of
/// the transaction list can be combined with [`CoOccurrenceCounts::merge`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoOccurrenceCounts {
    pub total_transactions: usize,
    item_counts: HashMap<String, usize>,
    pair_counts: HashMap<PairKey, usize>,
}

impl CoOccurrenceCounts {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut counts = Self::default();
        for transaction in transactions {
            counts.record(transaction);
        }
        counts
    }

    pub fn record(&mut self, transaction: &Transaction) {
        self.total_transactions += 1;

        let items: Vec<&String> = transaction.items.iter().collect();
        for item in &items {
            *self.item_counts.entry((*item).clone()).or_default() += 1;
        }

        for (position, first) in items.iter().enumerate() {
            for second in &items[position + 1..] {
                *self.pair_counts.entry(PairKey::new(first, second)).or_default() += 1;
            }
        }
    }

    pub fn merge(mut self, other: Self) -> Self {
        self.total_transactions += other.total_transactions;
        for (item, count) in other.item_counts {
            *self.item_counts.entry(item).or_default() += count;
        }
        for (pair, count) in other.pair_counts {
            *self.pair_counts.entry(pair).or_default() += count;
        }
        self
    }

    pub fn item_count(&self, item: &str) -> usize {
        self.item_counts.get(item).copied().unwrap_or(0)
    }

    pub fn pair_count(&self, first: &str, second: &str) -> usize {
        self.pair_counts.get(&PairKey::new(first, second)).copied().unwrap_or(0)
    }

    pub fn unique_items(&self) -> usize {
        self.item_counts.len()
    }

    /// Fraction of transactions containing `item`.
    pub fn item_support(&self, item: &str) -> f64 {
        crate::rounding::ratio_or_zero(self.item_count(item) as f64, self.total_transactions as f64)
    }

    fn pairs(&self) -> impl Iterator<Item = (&PairKey, usize)> {
        self.pair_counts.iter().map(|(key, count)| (key, *count))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrequentPairMiner;

impl FrequentPairMiner {
    /// Counts the transactions and keeps pairs whose support reaches `min_support`.
    pub fn mine(&self, transactions: &[Transaction], min_support: f64) -> Vec<ItemPairStat> {
        let counts = CoOccurrenceCounts::from_transactions(transactions);
        self.frequent_pairs(&counts, min_support)
    }

    /// Frequent pairs sorted by support descending, then by pair key.
    pub fn frequent_pairs(&self, counts: &CoOccurrenceCounts, min_support: f64) -> Vec<ItemPairStat> {
        if counts.total_transactions == 0 {
            return Vec::new();
        }

        let total = counts.total_transactions as f64;
        let mut pairs: Vec<ItemPairStat> = counts
            .pairs()
            .map(|(key, count)| ItemPairStat {
                item_a: key.item_a.clone(),
                item_b: key.item_b.clone(),
                count,
                support: count as f64 / total,
            })
            .filter(|pair| pair.support >= min_support)
            .collect();

        pairs.sort_by(|left, right| {
            right
                .count
                .cmp(&left.count)
                .then_with(|| left.item_a.cmp(&right.item_a))
                .then_with(|| left.item_b.cmp(&right.item_b))
        });
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transaction(order_id: &str, items: &[&str]) -> Transaction {
        let mut transaction = Transaction::new(order_id);
        transaction.items.extend(items.iter().map(|item| item.to_string()));
        transaction
    }

    fn sample() -> Vec<Transaction> {
        vec![
            transaction("1", &["A", "B"]),
            transaction("2", &["B", "A"]),
            transaction("3", &["A", "C"]),
        ]
    }

    #[test]
    fn counts_items_and_canonical_pairs() {
        let counts = CoOccurrenceCounts::from_transactions(&sample());

        assert_eq!(counts.total_transactions, 3);
        assert_eq!(counts.item_count("A"), 3);
        assert_eq!(counts.item_count("B"), 2);
        assert_eq!(counts.pair_count("B", "A"), 2);
        assert_eq!(counts.pair_count("A", "C"), 1);
        assert_eq!(counts.pair_count("B", "C"), 0);
        assert_eq!(counts.unique_items(), 3);
    }

    #[test]
    fn counts_every_unordered_pair_in_a_transaction() {
        let counts = CoOccurrenceCounts::from_transactions(&[transaction("1", &["A", "B", "C", "D"])]);

        for (first, second) in [("A", "B"), ("A", "C"), ("A", "D"), ("B", "C"), ("B", "D"), ("C", "D")] {
            assert_eq!(counts.pair_count(first, second), 1, "{first}|{second}");
        }
    }

    #[test]
    fn mined_pairs_respect_min_support_and_are_sorted() {
        let pairs = FrequentPairMiner.mine(&sample(), 0.3);

        assert_eq!(pairs.len(), 2);
        assert_eq!((pairs[0].item_a.as_str(), pairs[0].item_b.as_str()), ("A", "B"));
        assert_eq!(pairs[0].count, 2);
        assert_eq!(pairs[0].support, 2.0 / 3.0);
        assert_eq!(pairs[0].support_percent(), 66.7);
        assert_eq!(pairs[1].count, 1);
        assert_eq!(pairs[1].support_percent(), 33.3);

        let strict = FrequentPairMiner.mine(&sample(), 0.5);
        assert_eq!(strict.len(), 1);
    }

    #[test]
    fn support_is_a_fraction_of_total_transactions() {
        let transactions = vec![
            transaction("1", &["A", "B", "C"]),
            transaction("2", &["A", "B"]),
            transaction("3", &["C"]),
            transaction("4", &["B", "C"]),
        ];

        for pair in FrequentPairMiner.mine(&transactions, 0.01) {
            assert!((0.0..=1.0).contains(&pair.support));
            assert_eq!(pair.support, pair.count as f64 / 4.0);
        }
    }

    #[test]
    fn single_item_transactions_produce_no_pairs() {
        let pairs = FrequentPairMiner.mine(&[transaction("1", &["A"]), transaction("2", &["B"])], 0.01);
        assert!(pairs.is_empty());
    }

    #[test]
    fn empty_input_produces_no_pairs() {
        assert!(FrequentPairMiner.mine(&[], 0.02).is_empty());
    }

    #[test]
    fn merged_partial_counts_match_a_single_pass() {
        let transactions = sample();
        let (left, right) = transactions.split_at(1);

        let merged = CoOccurrenceCounts::from_transactions(left)
            .merge(CoOccurrenceCounts::from_transactions(right));

        assert_eq!(merged, CoOccurrenceCounts::from_transactions(&transactions));
    }
}
