/// Smurfing detection: many distinct counterparties funneling through one
/// focal account inside a short window, in either direction.
///
/// Fan-in scans receivers against their senders; fan-out is the mirror image.
/// Fan-in runs first and wins ties: an account flagged fan-in is never
/// re-evaluated for fan-out.
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};

use crate::analysis::round2;
use crate::core::{DetectionConfig, TransactionTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmurfPattern {
    FanIn,
    FanOut,
}

/// Window evidence attached to a flagged focal account.
#[derive(Debug, Clone)]
pub struct SmurfFlag {
    pub pattern: SmurfPattern,
    /// Distinct counterparties inside the window at the moment of crossing.
    pub fan_count: usize,
    /// Total amount inside the window, rounded to cents.
    pub amount: f64,
    /// Timestamp of the earliest row still inside the window.
    pub window_start: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct SmurfOutcome {
    /// Flagged focal accounts in detection order.
    pub flags: Vec<(String, SmurfFlag)>,
    /// Rows excluded from this detector because their timestamp failed to parse.
    pub dropped_rows: usize,
}

struct TimedRow {
    ts: DateTime<Utc>,
    sender: String,
    receiver: String,
    amount: f64,
}

pub fn detect_smurfing(
    table: &TransactionTable,
    whitelist: &HashSet<String>,
    config: &DetectionConfig,
) -> SmurfOutcome {
    let mut rows: Vec<TimedRow> = Vec::with_capacity(table.len());
    for tx in table.rows() {
        if let Some(ts) = tx.parsed_timestamp() {
            rows.push(TimedRow {
                ts,
                sender: tx.sender_id.clone(),
                receiver: tx.receiver_id.clone(),
                amount: tx.amount,
            });
        }
    }
    let dropped_rows = table.len() - rows.len();

    // Global time order; the stable sort keeps input order among equal stamps.
    rows.sort_by(|a, b| a.ts.cmp(&b.ts));

    let mut outcome = SmurfOutcome {
        flags: Vec::new(),
        dropped_rows,
    };
    let mut flagged: HashSet<String> = HashSet::new();

    for pattern in [SmurfPattern::FanIn, SmurfPattern::FanOut] {
        // Group rows by the focal column, keeping each group in time order.
        let mut groups: BTreeMap<&str, Vec<&TimedRow>> = BTreeMap::new();
        for row in &rows {
            let focal = match pattern {
                SmurfPattern::FanIn => row.receiver.as_str(),
                SmurfPattern::FanOut => row.sender.as_str(),
            };
            groups.entry(focal).or_default().push(row);
        }

        for (focal, group) in groups {
            if whitelist.contains(focal) || flagged.contains(focal) {
                continue;
            }
            if let Some(flag) = scan_group(&group, pattern, config) {
                flagged.insert(focal.to_string());
                outcome.flags.push((focal.to_string(), flag));
            }
        }
    }

    outcome
}

/// Two-pointer sliding window over one focal account's rows.
///
/// Invariants: counterparty counts stay positive (entries removed at zero) and
/// the running amount always equals the sum over `left..=right`.
fn scan_group(
    group: &[&TimedRow],
    pattern: SmurfPattern,
    config: &DetectionConfig,
) -> Option<SmurfFlag> {
    let window = Duration::hours(config.smurf_window_hours);
    let mut left = 0usize;
    let mut cp_counts: HashMap<&str, usize> = HashMap::new();
    let mut window_amt = 0.0_f64;

    for right in 0..group.len() {
        let row = group[right];
        let counterpart = match pattern {
            SmurfPattern::FanIn => row.sender.as_str(),
            SmurfPattern::FanOut => row.receiver.as_str(),
        };
        *cp_counts.entry(counterpart).or_insert(0) += 1;
        window_amt += row.amount;

        let cutoff = row.ts - window;
        while group[left].ts < cutoff {
            let old = group[left];
            let old_cp = match pattern {
                SmurfPattern::FanIn => old.sender.as_str(),
                SmurfPattern::FanOut => old.receiver.as_str(),
            };
            if let Some(count) = cp_counts.get_mut(old_cp) {
                *count -= 1;
                if *count == 0 {
                    cp_counts.remove(old_cp);
                }
            }
            window_amt -= old.amount;
            left += 1;
        }

        if cp_counts.len() >= config.smurf_min_counterparties {
            return Some(SmurfFlag {
                pattern,
                fan_count: cp_counts.len(),
                amount: round2(window_amt),
                window_start: group[left].ts,
            });
        }
    }

    None
}
