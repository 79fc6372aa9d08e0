/// Final report shaping.
///
/// The JSON layout of these types is the external contract consumed by the
/// reporting side; field names and rounding are fixed.
use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analysis::rings::{RingPattern, RingTables};
use crate::analysis::scoring::ScoredAccount;
use crate::analysis::{round1, round4};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuspiciousAccount {
    pub account_id: String,
    pub suspicion_score: f64,
    pub detected_patterns: Vec<String>,
    pub ring_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudRing {
    pub ring_id: String,
    pub member_accounts: Vec<String>,
    pub pattern_type: RingPattern,
    pub risk_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_accounts_analyzed: usize,
    pub suspicious_accounts_flagged: usize,
    pub fraud_rings_detected: usize,
    pub processing_time_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub suspicious_accounts: Vec<SuspiciousAccount>,
    pub fraud_rings: Vec<FraudRing>,
    pub summary: AnalysisSummary,
}

pub fn build_report(
    scored: Vec<ScoredAccount>,
    tables: RingTables,
    total_accounts: usize,
    elapsed: Duration,
) -> AnalysisReport {
    let score_of: HashMap<&str, f64> = scored
        .iter()
        .map(|s| (s.account_id.as_str(), s.score))
        .collect();

    let fraud_rings: Vec<FraudRing> = tables
        .rings
        .iter()
        .map(|ring| {
            // Members outside the suspicion map (shell heads/tails) count as 0.
            let total: f64 = ring
                .members
                .iter()
                .map(|m| score_of.get(m.as_str()).copied().unwrap_or(0.0))
                .sum();
            FraudRing {
                ring_id: ring.ring_id.clone(),
                member_accounts: ring.members.clone(),
                pattern_type: ring.pattern,
                risk_score: round1(total / ring.members.len() as f64),
            }
        })
        .collect();

    let mut suspicious_accounts: Vec<SuspiciousAccount> = scored
        .into_iter()
        .map(|s| SuspiciousAccount {
            account_id: s.account_id,
            suspicion_score: s.score,
            detected_patterns: s.patterns,
            ring_id: s.ring_id,
        })
        .collect();
    // Stable sort: ties keep first-flag order.
    suspicious_accounts.sort_by(|a, b| {
        b.suspicion_score
            .partial_cmp(&a.suspicion_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let summary = AnalysisSummary {
        total_accounts_analyzed: total_accounts,
        suspicious_accounts_flagged: suspicious_accounts.len(),
        fraud_rings_detected: fraud_rings.len(),
        processing_time_seconds: round4(elapsed.as_secs_f64()),
    };

    AnalysisReport {
        suspicious_accounts,
        fraud_rings,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::rings::{assemble, Ring};

    fn scored(account: &str, score: f64) -> ScoredAccount {
        ScoredAccount {
            account_id: account.to_string(),
            score,
            patterns: vec![],
            ring_id: "RING_001".to_string(),
        }
    }

    #[test]
    fn sorts_descending_with_stable_ties() {
        let tables = RingTables::default();
        let report = build_report(
            vec![scored("A", 40.0), scored("B", 70.0), scored("C", 40.0)],
            tables,
            3,
            Duration::from_millis(1),
        );

        let order: Vec<&str> = report
            .suspicious_accounts
            .iter()
            .map(|s| s.account_id.as_str())
            .collect();
        assert_eq!(order, vec!["B", "A", "C"]);
    }

    #[test]
    fn ring_risk_averages_with_zero_for_unscored_members() {
        let mut tables = RingTables::default();
        tables.rings.push(Ring {
            ring_id: "RING_001".to_string(),
            members: vec![
                "H".to_string(),
                "M1".to_string(),
                "M2".to_string(),
                "T".to_string(),
            ],
            pattern: RingPattern::LayeredShells,
        });

        let report = build_report(
            vec![scored("M1", 20.0), scored("M2", 30.0)],
            tables,
            4,
            Duration::from_millis(1),
        );

        // (0 + 20 + 30 + 0) / 4
        assert_eq!(report.fraud_rings[0].risk_score, 12.5);
    }

    #[test]
    fn summary_counts_match_list_lengths() {
        let tables = assemble(
            vec![vec!["A".to_string(), "B".to_string(), "C".to_string()]],
            vec![],
            vec![],
        );
        let report = build_report(
            vec![scored("A", 40.0), scored("B", 40.0), scored("C", 40.0)],
            tables,
            7,
            Duration::from_millis(2),
        );

        assert_eq!(report.summary.suspicious_accounts_flagged, 3);
        assert_eq!(report.summary.fraud_rings_detected, 1);
        assert_eq!(report.summary.total_accounts_analyzed, 7);
    }

    #[test]
    fn pattern_type_serializes_snake_case() {
        let ring = FraudRing {
            ring_id: "RING_001".to_string(),
            member_accounts: vec!["A".to_string()],
            pattern_type: RingPattern::LayeredShells,
            risk_score: 10.0,
        };
        let json = serde_json::to_value(&ring).unwrap();
        assert_eq!(json["pattern_type"], "layered_shells");
    }
}
