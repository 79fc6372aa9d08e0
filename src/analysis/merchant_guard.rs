/// Merchant whitelist derived from the transaction-count distribution.
///
/// Accounts at or above max(MERCHANT_MIN_TX, P97 of counts) are treated as
/// legitimate high-volume endpoints (merchants, payroll hubs) and excluded
/// from smurfing and shell flags. Cycle membership is structural and is not
/// neutralized by volume, so whitelisted accounts stay cycle-eligible.
use std::collections::HashSet;

use crate::analysis::aggregates::AccountAggregates;
use crate::core::DetectionConfig;

pub fn build_whitelist(
    aggregates: &AccountAggregates,
    config: &DetectionConfig,
) -> HashSet<String> {
    let counts = aggregates.counts();
    if counts.is_empty() {
        return HashSet::new();
    }

    let mut sorted_counts: Vec<u64> = counts.values().copied().collect();
    sorted_counts.sort_unstable();

    let idx = ((sorted_counts.len() as f64 * config.merchant_percentile / 100.0).floor() as usize)
        .min(sorted_counts.len() - 1);
    let threshold = config.merchant_min_tx.max(sorted_counts[idx]);

    counts
        .iter()
        .filter(|(_, &cnt)| cnt >= threshold)
        .map(|(acct, _)| acct.clone())
        .collect()
}
