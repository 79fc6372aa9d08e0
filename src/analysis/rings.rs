/// Ring assembly: merges detector outputs into stable, deduplicated tables.
///
/// Detectors are consumed in a fixed order (cycles, then shell chains, then
/// smurfed accounts) so ring identifiers are deterministic no matter which
/// worker finished first.
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::analysis::smurf_detector::SmurfFlag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingPattern {
    Cycle,
    LayeredShells,
    Smurfing,
}

#[derive(Debug, Clone)]
pub struct Ring {
    pub ring_id: String,
    pub members: Vec<String>,
    pub pattern: RingPattern,
}

/// Unified flag tables owned by the assembler.
#[derive(Debug, Default)]
pub struct RingTables {
    pub rings: Vec<Ring>,
    /// Account -> owning ring id; first assignment wins.
    pub ring_of: HashMap<String, String>,
    /// Account -> length of the first cycle it was seen in.
    pub cycle_len: HashMap<String, usize>,
    /// Accounts that appeared as a shell-chain interior.
    pub shell_interiors: HashSet<String>,
    pub smurf_flags: HashMap<String, SmurfFlag>,
    /// Every flagged account, in first-flag order.
    pub flagged_order: Vec<String>,
}

impl RingTables {
    fn note_flagged(&mut self, account: &str, noted: &mut HashSet<String>) {
        if noted.insert(account.to_string()) {
            self.flagged_order.push(account.to_string());
        }
    }
}

fn ring_id(n: usize) -> String {
    format!("RING_{:03}", n)
}

pub fn assemble(
    cycles: Vec<Vec<String>>,
    chains: Vec<Vec<String>>,
    smurfs: Vec<(String, SmurfFlag)>,
) -> RingTables {
    let mut tables = RingTables::default();
    let mut noted: HashSet<String> = HashSet::new();
    let mut next = 1usize;

    for cycle in cycles {
        let id = ring_id(next);
        next += 1;
        for member in &cycle {
            tables
                .ring_of
                .entry(member.clone())
                .or_insert_with(|| id.clone());
            tables.cycle_len.entry(member.clone()).or_insert(cycle.len());
            tables.note_flagged(member, &mut noted);
        }
        tables.rings.push(Ring {
            ring_id: id,
            members: cycle,
            pattern: RingPattern::Cycle,
        });
    }

    for chain in chains {
        debug_assert!(chain.len() >= 3, "shell chain must have an interior");
        let id = ring_id(next);
        next += 1;
        // Head and tail are listed as members but only interiors are owned by
        // the shell ring.
        for interior in &chain[1..chain.len() - 1] {
            tables
                .ring_of
                .entry(interior.clone())
                .or_insert_with(|| id.clone());
            tables.shell_interiors.insert(interior.clone());
            tables.note_flagged(interior, &mut noted);
        }
        tables.rings.push(Ring {
            ring_id: id,
            members: chain,
            pattern: RingPattern::LayeredShells,
        });
    }

    for (account, flag) in smurfs {
        tables.smurf_flags.insert(account.clone(), flag);
        tables.note_flagged(&account, &mut noted);
        if !tables.ring_of.contains_key(&account) {
            let id = ring_id(next);
            next += 1;
            tables.ring_of.insert(account.clone(), id.clone());
            tables.rings.push(Ring {
                ring_id: id,
                members: vec![account],
                pattern: RingPattern::Smurfing,
            });
        }
    }

    tables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::smurf_detector::SmurfPattern;
    use chrono::{TimeZone, Utc};

    fn smurf(pattern: SmurfPattern) -> SmurfFlag {
        SmurfFlag {
            pattern,
            fan_count: 10,
            amount: 1000.0,
            window_start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn owned(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ids_are_dense_and_ordered_cycle_shell_smurf() {
        let tables = assemble(
            vec![owned(&["A", "B", "C"])],
            vec![owned(&["H", "M1", "M2", "T"])],
            vec![("Z".to_string(), smurf(SmurfPattern::FanIn))],
        );

        let ids: Vec<&str> = tables.rings.iter().map(|r| r.ring_id.as_str()).collect();
        assert_eq!(ids, vec!["RING_001", "RING_002", "RING_003"]);
        assert_eq!(tables.rings[0].pattern, RingPattern::Cycle);
        assert_eq!(tables.rings[1].pattern, RingPattern::LayeredShells);
        assert_eq!(tables.rings[2].pattern, RingPattern::Smurfing);
    }

    #[test]
    fn first_ring_assignment_wins() {
        // B is in both cycles; it keeps the first ring id.
        let tables = assemble(
            vec![owned(&["A", "B", "C"]), owned(&["B", "D", "E"])],
            vec![],
            vec![],
        );
        assert_eq!(tables.ring_of["B"], "RING_001");
        assert_eq!(tables.ring_of["D"], "RING_002");
        assert_eq!(tables.cycle_len["B"], 3);
    }

    #[test]
    fn shell_head_and_tail_are_members_but_not_owned() {
        let tables = assemble(vec![], vec![owned(&["H", "M1", "M2", "T"])], vec![]);

        assert_eq!(tables.rings[0].members, owned(&["H", "M1", "M2", "T"]));
        assert!(tables.ring_of.contains_key("M1"));
        assert!(tables.ring_of.contains_key("M2"));
        assert!(!tables.ring_of.contains_key("H"));
        assert!(!tables.ring_of.contains_key("T"));
        assert!(tables.shell_interiors.contains("M1"));
        assert!(!tables.shell_interiors.contains("H"));
    }

    #[test]
    fn smurfed_cycle_member_gets_no_singleton_ring() {
        let tables = assemble(
            vec![owned(&["A", "B", "C"])],
            vec![],
            vec![("B".to_string(), smurf(SmurfPattern::FanIn))],
        );

        assert_eq!(tables.rings.len(), 1);
        assert_eq!(tables.ring_of["B"], "RING_001");
        assert!(tables.smurf_flags.contains_key("B"));
    }

    #[test]
    fn flagged_order_is_first_seen() {
        let tables = assemble(
            vec![owned(&["A", "B", "C"])],
            vec![owned(&["H", "B", "D", "T"])],
            vec![("Z".to_string(), smurf(SmurfPattern::FanOut))],
        );
        // B repeats (cycle first), D is new, Z arrives last.
        assert_eq!(tables.flagged_order, owned(&["A", "B", "C", "D", "Z"]));
    }
}
