pub mod flow_graph;

pub use flow_graph::{FlowEdge, FlowGraph};
