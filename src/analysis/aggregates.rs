/// Per-account aggregates computed in a single pass over the table.
///
/// Both directions are summed: a transfer adds its amount to the sender's and
/// the receiver's volume, and bumps both transaction counts.
use std::collections::HashMap;

use crate::core::TransactionTable;

#[derive(Debug, Clone, Default)]
pub struct AccountAggregates {
    volume: HashMap<String, f64>,
    tx_count: HashMap<String, u64>,
}

impl AccountAggregates {
    pub fn collect(table: &TransactionTable) -> Self {
        let mut volume: HashMap<String, f64> = HashMap::new();
        let mut tx_count: HashMap<String, u64> = HashMap::new();

        for tx in table.rows() {
            *volume.entry(tx.sender_id.clone()).or_insert(0.0) += tx.amount;
            *volume.entry(tx.receiver_id.clone()).or_insert(0.0) += tx.amount;
            *tx_count.entry(tx.sender_id.clone()).or_insert(0) += 1;
            *tx_count.entry(tx.receiver_id.clone()).or_insert(0) += 1;
        }

        AccountAggregates { volume, tx_count }
    }

    pub fn volume_of(&self, account: &str) -> f64 {
        self.volume.get(account).copied().unwrap_or(0.0)
    }

    pub fn count_of(&self, account: &str) -> u64 {
        self.tx_count.get(account).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &HashMap<String, u64> {
        &self.tx_count
    }

    pub fn account_count(&self) -> usize {
        self.tx_count.len()
    }
}
