/// Flow Graph - a directed multigraph of money movements between accounts
///
/// One edge per transaction; parallel edges are preserved so edge-count
/// reasoning stays available downstream. The node set is implicit from the
/// edges: any account appearing as sender or receiver is a node.
use std::collections::{BTreeSet, HashMap};

use crate::core::TransactionTable;

/// A single directed money movement.
#[derive(Debug, Clone)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

/// Directed multigraph over account ids, adjacency-list representation.
#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    nodes: BTreeSet<String>,
    edges: HashMap<String, Vec<FlowEdge>>, // from -> outgoing edges
    reverse_edges: HashMap<String, Vec<FlowEdge>>, // to -> incoming edges
    edge_count: usize,
}

impl FlowGraph {
    pub fn new() -> Self {
        FlowGraph::default()
    }

    /// Build the graph from a transaction snapshot, one edge per row.
    pub fn from_table(table: &TransactionTable) -> Self {
        let mut graph = FlowGraph::new();
        for tx in table.rows() {
            graph.add_edge(&tx.sender_id, &tx.receiver_id, tx.amount);
        }
        graph
    }

    pub fn add_edge(&mut self, from: &str, to: &str, amount: f64) {
        self.nodes.insert(from.to_string());
        self.nodes.insert(to.to_string());

        let edge = FlowEdge {
            from: from.to_string(),
            to: to.to_string(),
            amount,
        };

        self.edges
            .entry(from.to_string())
            .or_default()
            .push(edge.clone());
        self.reverse_edges.entry(to.to_string()).or_default().push(edge);
        self.edge_count += 1;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// All nodes in lexicographic order.
    pub fn nodes(&self) -> impl Iterator<Item = &String> {
        self.nodes.iter()
    }

    pub fn contains(&self, account: &str) -> bool {
        self.nodes.contains(account)
    }

    pub fn outgoing_edges(&self, account: &str) -> &[FlowEdge] {
        self.edges.get(account).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn incoming_edges(&self, account: &str) -> &[FlowEdge] {
        self.reverse_edges
            .get(account)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Distinct downstream accounts, sorted. Parallel edges collapse here.
    pub fn successors(&self, account: &str) -> BTreeSet<&str> {
        self.outgoing_edges(account)
            .iter()
            .map(|e| e.to.as_str())
            .collect()
    }

    /// Distinct upstream accounts, sorted.
    pub fn predecessors(&self, account: &str) -> BTreeSet<&str> {
        self.incoming_edges(account)
            .iter()
            .map(|e| e.from.as_str())
            .collect()
    }
}
