/// Circular routing detection.
///
/// Enumerates all simple directed cycles of bounded length after collapsing
/// the multigraph to a simple digraph and iteratively pruning nodes that
/// cannot sit on any cycle. Each cycle is reported once, rotated so the
/// lexicographically smallest account leads.
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::core::DetectionConfig;
use crate::graph::FlowGraph;

/// Simple digraph adjacency retained during pruning and enumeration.
struct SimpleDigraph {
    succ: BTreeMap<String, BTreeSet<String>>,
    pred: BTreeMap<String, BTreeSet<String>>,
}

impl SimpleDigraph {
    fn collapse(graph: &FlowGraph) -> Self {
        let mut succ: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut pred: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for node in graph.nodes() {
            succ.entry(node.clone()).or_default();
            pred.entry(node.clone()).or_default();
        }
        for node in graph.nodes() {
            for next in graph.successors(node) {
                if let Some(s) = succ.get_mut(node) {
                    s.insert(next.to_string());
                }
                pred.entry(next.to_string())
                    .or_default()
                    .insert(node.clone());
            }
        }

        SimpleDigraph { succ, pred }
    }

    /// Undirected degree in the collapsed graph: distinct neighbors either way.
    fn undirected_degree(&self, node: &str) -> usize {
        let mut neighbors: BTreeSet<&str> = BTreeSet::new();
        if let Some(s) = self.succ.get(node) {
            neighbors.extend(s.iter().map(String::as_str));
        }
        if let Some(p) = self.pred.get(node) {
            neighbors.extend(p.iter().map(String::as_str));
        }
        neighbors.len()
    }

    /// Remove every node of undirected degree < 2 until a fixpoint.
    ///
    /// Such nodes cannot lie on any cycle; dropping them first keeps the
    /// enumeration bounded on realistic inputs.
    fn prune_low_degree(&mut self) {
        loop {
            let removable: Vec<String> = self
                .succ
                .keys()
                .filter(|n| self.undirected_degree(n) < 2)
                .cloned()
                .collect();
            if removable.is_empty() {
                break;
            }

            for node in &removable {
                self.succ.remove(node);
                self.pred.remove(node);
            }
            for set in self.succ.values_mut() {
                for node in &removable {
                    set.remove(node);
                }
            }
            for set in self.pred.values_mut() {
                for node in &removable {
                    set.remove(node);
                }
            }
        }
    }
}

/// All simple directed cycles with `cycle_min_len <= len <= cycle_max_len`,
/// each in canonical rotation, in deterministic order.
pub fn detect_cycles(graph: &FlowGraph, config: &DetectionConfig) -> Vec<Vec<String>> {
    let mut simple = SimpleDigraph::collapse(graph);
    simple.prune_low_degree();

    let mut cycles: Vec<Vec<String>> = Vec::new();
    let mut seen: HashSet<Vec<String>> = HashSet::new();

    // Starting each walk at the smallest node of its cycle (never revisiting
    // smaller nodes) yields exactly the canonical rotation.
    let starts: Vec<String> = simple.succ.keys().cloned().collect();
    for start in &starts {
        let mut path = vec![start.clone()];
        let mut on_path: HashSet<String> = HashSet::new();
        on_path.insert(start.clone());
        walk(
            start,
            start,
            &simple,
            &mut path,
            &mut on_path,
            &mut cycles,
            &mut seen,
            config,
        );
    }

    cycles
}

#[allow(clippy::too_many_arguments)]
fn walk(
    start: &str,
    current: &str,
    simple: &SimpleDigraph,
    path: &mut Vec<String>,
    on_path: &mut HashSet<String>,
    cycles: &mut Vec<Vec<String>>,
    seen: &mut HashSet<Vec<String>>,
    config: &DetectionConfig,
) {
    let successors = match simple.succ.get(current) {
        Some(s) => s,
        None => return,
    };

    for next in successors {
        if next == start {
            if path.len() >= config.cycle_min_len && seen.insert(path.clone()) {
                cycles.push(path.clone());
            }
        } else if path.len() < config.cycle_max_len
            && next.as_str() > start
            && !on_path.contains(next)
        {
            path.push(next.clone());
            on_path.insert(next.clone());
            walk(start, next, simple, path, on_path, cycles, seen, config);
            on_path.remove(next);
            path.pop();
        }
    }
}
