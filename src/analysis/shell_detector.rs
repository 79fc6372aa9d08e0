/// Layered shell-chain detection.
///
/// A shell chain is a directed simple path of at least `shell_min_hops` edges
/// whose interior accounts all sit below a small transaction-count ceiling:
/// low-activity pass-throughs layered between a head and a tail. Whitelisted
/// accounts are cut from the subgraph up front, which also keeps them out of
/// interior positions.
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::analysis::aggregates::AccountAggregates;
use crate::core::DetectionConfig;
use crate::graph::FlowGraph;

pub fn detect_shell_chains(
    graph: &FlowGraph,
    aggregates: &AccountAggregates,
    whitelist: &HashSet<String>,
    config: &DetectionConfig,
) -> Vec<Vec<String>> {
    // Subgraph induced by non-whitelisted accounts.
    let nodes: BTreeSet<&str> = graph
        .nodes()
        .map(String::as_str)
        .filter(|n| !whitelist.contains(*n))
        .collect();

    let mut succ: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut has_incoming: HashSet<&str> = HashSet::new();
    for &node in &nodes {
        let targets: BTreeSet<&str> = graph
            .successors(node)
            .into_iter()
            .filter(|t| nodes.contains(t))
            .collect();
        for &t in &targets {
            has_incoming.insert(t);
        }
        succ.insert(node, targets);
    }

    // Chain heads: sources of the subgraph; if it has none (everything sits
    // on some loop), every node is a candidate head.
    let mut heads: Vec<&str> = nodes
        .iter()
        .copied()
        .filter(|n| !has_incoming.contains(n))
        .collect();
    if heads.is_empty() {
        heads = nodes.iter().copied().collect();
    }

    let mut chains: Vec<Vec<String>> = Vec::new();
    let mut seen: HashSet<Vec<String>> = HashSet::new();

    for head in heads {
        let mut path: Vec<&str> = vec![head];
        let mut on_path: HashSet<&str> = HashSet::new();
        on_path.insert(head);
        walk(
            head,
            &succ,
            aggregates,
            whitelist,
            config,
            &mut path,
            &mut on_path,
            &mut chains,
            &mut seen,
        );
    }

    chains
}

#[allow(clippy::too_many_arguments)]
fn walk<'a>(
    current: &'a str,
    succ: &BTreeMap<&'a str, BTreeSet<&'a str>>,
    aggregates: &AccountAggregates,
    whitelist: &HashSet<String>,
    config: &DetectionConfig,
    path: &mut Vec<&'a str>,
    on_path: &mut HashSet<&'a str>,
    chains: &mut Vec<Vec<String>>,
    seen: &mut HashSet<Vec<String>>,
) {
    // Chain length is counted in hops: a qualifying chain has at least
    // `shell_min_hops` edges, so at least two interior accounts.
    if path.len() > config.shell_min_hops {
        let interior = &path[1..path.len() - 1];
        let qualifies = !interior.is_empty()
            && interior.iter().all(|m| {
                aggregates.count_of(m) <= config.shell_max_tx_per_node
                    && !whitelist.contains(*m)
            });
        if qualifies {
            let chain: Vec<String> = path.iter().map(|s| s.to_string()).collect();
            if seen.insert(chain.clone()) {
                chains.push(chain);
            }
        }
    }

    if path.len() >= config.shell_max_depth {
        return;
    }

    let successors = match succ.get(current) {
        Some(s) => s,
        None => return,
    };
    for &next in successors {
        if on_path.contains(next) {
            continue;
        }
        path.push(next);
        on_path.insert(next);
        walk(
            next, succ, aggregates, whitelist, config, path, on_path, chains, seen,
        );
        on_path.remove(next);
        path.pop();
    }
}
