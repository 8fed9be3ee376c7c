//! Groups order lines into per-order item sets.

use std::collections::HashMap;

use super::types::{OrderLineRecord, Transaction};

#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionExtractor;

impl TransactionExtractor {
    /// Builds one transaction per distinct order id, in first-seen order.
    ///
    /// Lines without an order id or product name are skipped. A product that
    /// repeats within an order is kept once.
    pub fn extract(&self, records: &[OrderLineRecord]) -> Vec<Transaction> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut transactions: Vec<Transaction> = Vec::new();

        for record in records {
            let (Some(order_id), Some(product)) =
                (present(&record.order_id), present(&record.product_name))
            else {
                continue;
            };

            let slot = *index.entry(order_id).or_insert_with(|| {
                transactions.push(Transaction::new(order_id));
                transactions.len() - 1
            });
            transactions[slot].items.insert(product.to_owned());
        }

        transactions
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_lines_by_order_and_dedupes_products() {
        let records = vec![
            OrderLineRecord::new("o-1", "Bread"),
            OrderLineRecord::new("o-2", "Milk"),
            OrderLineRecord::new("o-1", "Butter"),
            OrderLineRecord::new("o-1", "Bread"),
        ];

        let transactions = TransactionExtractor.extract(&records);

        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].order_id, "o-1");
        assert_eq!(transactions[0].len(), 2);
        assert!(transactions[0].items.contains("Butter"));
        assert_eq!(transactions[1].order_id, "o-2");
    }

    #[test]
    fn skips_lines_missing_order_or_product() {
        let records = vec![
            OrderLineRecord { order_id: None, product_name: Some("Bread".to_string()) },
            OrderLineRecord { order_id: Some("o-1".to_string()), product_name: None },
            OrderLineRecord { order_id: Some("  ".to_string()), product_name: Some("Jam".into()) },
            OrderLineRecord::new("o-2", "Milk"),
        ];

        let transactions = TransactionExtractor.extract(&records);

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].order_id, "o-2");
    }

    #[test]
    fn empty_input_yields_no_transactions() {
        assert!(TransactionExtractor.extract(&[]).is_empty());
    }
}
