/// Suspicion scoring and pattern labelling.
///
/// The score is a fixed weighted blend of the three detector flags plus a
/// log-scaled volume component, capped at 100.
use crate::analysis::aggregates::AccountAggregates;
use crate::analysis::rings::RingTables;
use crate::analysis::round2;
use crate::analysis::smurf_detector::SmurfPattern;
use crate::core::DetectionConfig;

#[derive(Debug, Clone)]
pub struct ScoredAccount {
    pub account_id: String,
    pub score: f64,
    pub patterns: Vec<String>,
    pub ring_id: String,
}

/// Volume component in [0, 1], saturating at the log scale.
pub fn vol_score(volume: f64, log_scale: f64) -> f64 {
    if volume <= 0.0 {
        return 0.0;
    }
    ((1.0 + volume).ln() / (1.0 + log_scale).ln()).min(1.0)
}

/// Score every flagged account, in first-flag order.
pub fn score_accounts(
    tables: &RingTables,
    aggregates: &AccountAggregates,
    config: &DetectionConfig,
) -> Vec<ScoredAccount> {
    let mut scored = Vec::with_capacity(tables.flagged_order.len());

    for account in &tables.flagged_order {
        let cycle_len = tables.cycle_len.get(account).copied();
        let smurf = tables.smurf_flags.get(account);
        let in_shell = tables.shell_interiors.contains(account);
        let volume = aggregates.volume_of(account);

        let raw = config.weight_cycle * if cycle_len.is_some() { 100.0 } else { 0.0 }
            + config.weight_smurf * if smurf.is_some() { 100.0 } else { 0.0 }
            + config.weight_shell * if in_shell { 100.0 } else { 0.0 }
            + config.weight_volume * vol_score(volume, config.volume_log_scale) * 100.0;
        let score = round2(raw.min(100.0));

        let mut patterns = Vec::new();
        if let Some(k) = cycle_len {
            patterns.push(format!("cycle_length_{}", k));
        }
        if let Some(flag) = smurf {
            patterns.push(
                match flag.pattern {
                    SmurfPattern::FanIn => "high_velocity",
                    SmurfPattern::FanOut => "fan_out",
                }
                .to_string(),
            );
        }
        if in_shell {
            patterns.push("layered_shell".to_string());
        }
        if volume > config.high_volume_threshold {
            patterns.push("high_volume".to_string());
        }
        patterns.sort();

        scored.push(ScoredAccount {
            account_id: account.clone(),
            score,
            patterns,
            ring_id: tables
                .ring_of
                .get(account)
                .cloned()
                .unwrap_or_else(|| "NONE".to_string()),
        });
    }

    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::rings::assemble;
    use crate::analysis::smurf_detector::SmurfFlag;
    use crate::core::{Transaction, TransactionTable};
    use chrono::{TimeZone, Utc};

    fn aggregates_for(rows: Vec<(&str, &str, f64)>) -> AccountAggregates {
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, (from, to, amount))| Transaction {
                transaction_id: format!("t{}", i),
                sender_id: from.to_string(),
                receiver_id: to.to_string(),
                amount,
                timestamp: "2024-01-01T00:00:00Z".to_string(),
            })
            .collect();
        AccountAggregates::collect(&TransactionTable::new(rows))
    }

    #[test]
    fn vol_score_edges() {
        assert_eq!(vol_score(0.0, 1_000_000.0), 0.0);
        assert_eq!(vol_score(-5.0, 1_000_000.0), 0.0);
        assert_eq!(vol_score(1_000_000.0, 1_000_000.0), 1.0);
        assert_eq!(vol_score(10_000_000.0, 1_000_000.0), 1.0);
        let mid = vol_score(1000.0, 1_000_000.0);
        assert!(mid > 0.0 && mid < 1.0);
    }

    #[test]
    fn cycle_member_score_and_label() {
        let tables = assemble(
            vec![vec!["A".to_string(), "B".to_string(), "C".to_string()]],
            vec![],
            vec![],
        );
        let agg = aggregates_for(vec![("A", "B", 100.0), ("B", "C", 100.0), ("C", "A", 100.0)]);
        let cfg = DetectionConfig::default();
        let scored = score_accounts(&tables, &agg, &cfg);

        assert_eq!(scored.len(), 3);
        let a = &scored[0];
        assert_eq!(a.account_id, "A");
        assert_eq!(a.patterns, vec!["cycle_length_3"]);
        assert_eq!(a.ring_id, "RING_001");

        let expected = round2(40.0 + 0.15 * vol_score(200.0, cfg.volume_log_scale) * 100.0);
        assert_eq!(a.score, expected);
    }

    #[test]
    fn combined_flags_stack_and_cap() {
        let tables = assemble(
            vec![vec![
                "A".to_string(),
                "B".to_string(),
                "C".to_string(),
                "D".to_string(),
            ]],
            vec![vec![
                "X".to_string(),
                "A".to_string(),
                "Z".to_string(),
                "Y".to_string(),
            ]],
            vec![(
                "A".to_string(),
                SmurfFlag {
                    pattern: SmurfPattern::FanIn,
                    fan_count: 12,
                    amount: 9_999_999.0,
                    window_start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                },
            )],
        );
        let agg = aggregates_for(vec![("A", "B", 10_000_000.0)]);
        let cfg = DetectionConfig::default();
        let scored = score_accounts(&tables, &agg, &cfg);

        let a = scored.iter().find(|s| s.account_id == "A").unwrap();
        // 40 + 30 + 15 + 15 caps at 100.
        assert_eq!(a.score, 100.0);
        assert_eq!(
            a.patterns,
            vec![
                "cycle_length_4",
                "high_velocity",
                "high_volume",
                "layered_shell"
            ]
        );
        assert_eq!(a.ring_id, "RING_001");
    }

    #[test]
    fn labels_sort_lexicographically() {
        let tables = assemble(
            vec![],
            vec![],
            vec![(
                "A".to_string(),
                SmurfFlag {
                    pattern: SmurfPattern::FanOut,
                    fan_count: 10,
                    amount: 100.0,
                    window_start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                },
            )],
        );
        let agg = aggregates_for(vec![("A", "B", 600_000.0)]);
        let scored = score_accounts(&tables, &agg, &DetectionConfig::default());

        assert_eq!(scored[0].patterns, vec!["fan_out", "high_volume"]);
    }
}
